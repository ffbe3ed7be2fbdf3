//! Export source abstraction.
//!
//! A DCC-tool adapter implements [`ExportSource`] to supply scene data.
//! The pipeline treats it purely as a pull data source and never mutates
//! it; the writer works on its own data-model mirrors.

pub mod adapters;

pub use adapters::{GeometrySubsetSource, SingleAnimationSource};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scene::{
    AnimationData, GeometryData, GeometryFileData, MaterialData, ModelData, MorphData,
    NonSkeletalAnimationData, SkeletonData, SkinningData,
};
use crate::util::Result;

/// Document up axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpAxis {
    Y,
    Z,
}

impl UpAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpAxis::Y => "Y_UP",
            UpAxis::Z => "Z_UP",
        }
    }
}

/// Asset metadata written into the document header.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub author: String,
    pub tool: String,
    pub up_axis: UpAxis,
    /// Scene unit expressed in meters.
    pub meters_per_unit: f32,
    pub frame_rate: f32,
}

impl Default for ExportMetadata {
    fn default() -> Self {
        Self {
            author: String::new(),
            tool: String::new(),
            up_axis: UpAxis::Z,
            meters_per_unit: 1.0,
            frame_rate: 30.0,
        }
    }
}

/// Name and time span of one exportable animation.
#[derive(Clone, Debug)]
pub struct AnimationInfo {
    pub name: String,
    pub start: f32,
    pub end: f32,
}

/// Pull interface a DCC-tool adapter implements to feed the exporter.
pub trait ExportSource {
    /// Directory the scene was saved in; `None` when the scene has never
    /// been saved (exporting is then impossible).
    fn export_directory(&self) -> Option<PathBuf>;

    /// Enumerate the exportable geometry files.
    fn geometry_files(&self) -> Result<GeometryFileData>;

    /// Read the model tree of one geometry file.
    fn models(&self, file: usize) -> Result<ModelData>;

    /// Read the scene-wide material list.
    fn materials(&self) -> Result<MaterialData>;

    /// Read the skeleton of a (file, model) pair, if it has one.
    fn skeleton(&self, file: usize, model: usize) -> Result<Option<SkeletonData>>;

    /// Read a model's mesh.
    fn geometry(&self, file: usize, model: usize) -> Result<GeometryData>;

    /// Read the proxy mesh of a bone flagged as having geometry.
    fn bone_geometry(&self, file: usize, model: usize, bone: usize) -> Result<GeometryData>;

    /// Read the mesh of one morph target.
    fn morph_geometry(&self, file: usize, model: usize, morph: usize) -> Result<GeometryData>;

    /// Read a model's skinning weights, if any.
    fn skinning(&self, file: usize, model: usize) -> Result<Option<SkinningData>>;

    /// Read a model's morph target list (possibly empty).
    fn morphs(&self, file: usize, model: usize) -> Result<MorphData>;

    /// Number of animations in the scene.
    fn animation_count(&self) -> usize;

    /// Name and time span of one animation.
    fn animation_info(&self, index: usize) -> Result<AnimationInfo>;

    /// Sample one animation for a skinned (file, model) pair. Returns
    /// `None` when the pair has no skeletal motion in this animation.
    fn skeletal_animation(
        &self,
        animation: usize,
        file: usize,
        model: usize,
    ) -> Result<Option<AnimationData>>;

    /// Read the keyframe curves of a non-skeletal model for one
    /// animation. Returns `None` when the model is not animated.
    fn spline_animation(
        &self,
        animation: usize,
        file: usize,
        model: usize,
    ) -> Result<Option<NonSkeletalAnimationData>>;

    /// Path to the resource compiler, when the adapter knows better than
    /// the environment.
    fn compiler_path_override(&self) -> Option<PathBuf> {
        None
    }
}
