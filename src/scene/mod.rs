//! In-memory scene data model.
//!
//! Plain owned containers populated once per export by an
//! [`crate::source::ExportSource`]. Index-based insertion and lookup only;
//! nothing here persists across exports.

pub mod animation;
pub mod geometry;
pub mod geometry_file;
pub mod material;
pub mod model;
pub mod morph;
pub mod skeleton;
pub mod skinning;

pub use animation::{AnimationData, NonSkeletalAnimationData, SplineKey, SplineTracks, TrsSample};
pub use geometry::{GeometryData, Polygon, PolygonVertex};
pub use geometry_file::{
    FileProperties, GeometryFile, GeometryFileData, FILE_TYPE_ANM, FILE_TYPE_CAF, FILE_TYPE_CGA,
    FILE_TYPE_CGF, FILE_TYPE_CHR, FILE_TYPE_INTERMEDIATE_CAF, FILE_TYPE_SKIN,
};
pub use material::{Material, MaterialData};
pub use model::{Helper, HelperKind, Model, ModelData};
pub use morph::{MorphData, MorphTarget};
pub use skeleton::{Bone, LimitAxis, LimitExtreme, SkeletonData};
pub use skinning::{SkinningData, VertexWeight};
