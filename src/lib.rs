//! # collada-export
//!
//! COLLADA (.dae) export pipeline for scene data captured from a DCC tool.
//!
//! A pluggable [`source::ExportSource`] supplies the scene (models,
//! skeletons, geometry, materials, morphs, skinning weights, animation
//! curves). The pipeline converts it into a COLLADA 1.4.1 document and then
//! drives an external resource compiler to turn that document into
//! engine-native binary assets.
//!
//! ## Modules
//!
//! - [`util`] - Error type, math helpers, logging setup
//! - [`scene`] - In-memory scene data model
//! - [`source`] - Export source abstraction and narrowing adapters
//! - [`collada`] - XML emission, list generators, document writer
//! - [`pak`] - Compressed pak archive writing
//! - [`export`] - Export orchestration and resource-compiler boundary
//!
//! ## Example
//!
//! ```ignore
//! use collada_export::export::{ExportContext, ExportWriter};
//!
//! let writer = ExportWriter::new();
//! writer.export(&my_source, &context)?;
//! ```

pub mod util;
pub mod scene;
pub mod source;
pub mod collada;
pub mod pak;
pub mod export;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::scene::*;
    pub use crate::source::{ExportMetadata, ExportSource, UpAxis};
    pub use crate::collada::{ColladaConfig, ColladaWriter};
    pub use crate::export::{ExportContext, ExportWriter};
}
