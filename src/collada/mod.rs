//! COLLADA document production: XML emission, list generation, and the
//! document writer.

pub mod lists;
pub mod sink;
pub mod writer;
pub mod xml;

pub use sink::{FileSink, PakSink, XmlSink};
pub use writer::{ColladaConfig, ColladaWriter};
pub use xml::XmlWriter;

/// COLLADA schema namespace.
pub const COLLADA_NAMESPACE: &str = "http://www.collada.org/2005/11/COLLADASchema";
/// COLLADA schema version.
pub const COLLADA_VERSION: &str = "1.4.1";
