//! Capability-narrowing views over an export source.
//!
//! The set of views is closed, so narrowing is plain composition over a
//! borrowed source rather than a decorator hierarchy: each view holds the
//! wrapped source plus an explicit index or filter and delegates the rest.

use std::path::PathBuf;

use crate::scene::{
    AnimationData, GeometryData, GeometryFileData, MaterialData, ModelData, MorphData,
    NonSkeletalAnimationData, SkeletonData, SkinningData,
};
use crate::util::{Error, Result};

use super::{AnimationInfo, ExportSource};

/// View exposing exactly one animation of the wrapped source.
pub struct SingleAnimationSource<'a, S: ExportSource> {
    inner: &'a S,
    animation: usize,
}

impl<'a, S: ExportSource> SingleAnimationSource<'a, S> {
    pub fn new(inner: &'a S, animation: usize) -> Self {
        Self { inner, animation }
    }
}

impl<S: ExportSource> ExportSource for SingleAnimationSource<'_, S> {
    fn export_directory(&self) -> Option<PathBuf> {
        self.inner.export_directory()
    }

    fn geometry_files(&self) -> Result<GeometryFileData> {
        self.inner.geometry_files()
    }

    fn models(&self, file: usize) -> Result<ModelData> {
        self.inner.models(file)
    }

    fn materials(&self) -> Result<MaterialData> {
        self.inner.materials()
    }

    fn skeleton(&self, file: usize, model: usize) -> Result<Option<SkeletonData>> {
        self.inner.skeleton(file, model)
    }

    fn geometry(&self, file: usize, model: usize) -> Result<GeometryData> {
        self.inner.geometry(file, model)
    }

    fn bone_geometry(&self, file: usize, model: usize, bone: usize) -> Result<GeometryData> {
        self.inner.bone_geometry(file, model, bone)
    }

    fn morph_geometry(&self, file: usize, model: usize, morph: usize) -> Result<GeometryData> {
        self.inner.morph_geometry(file, model, morph)
    }

    fn skinning(&self, file: usize, model: usize) -> Result<Option<SkinningData>> {
        self.inner.skinning(file, model)
    }

    fn morphs(&self, file: usize, model: usize) -> Result<MorphData> {
        self.inner.morphs(file, model)
    }

    fn animation_count(&self) -> usize {
        1
    }

    fn animation_info(&self, index: usize) -> Result<AnimationInfo> {
        if index != 0 {
            return Err(Error::invalid(format!(
                "single-animation view has no animation {}",
                index
            )));
        }
        self.inner.animation_info(self.animation)
    }

    fn skeletal_animation(
        &self,
        animation: usize,
        file: usize,
        model: usize,
    ) -> Result<Option<AnimationData>> {
        if animation != 0 {
            return Ok(None);
        }
        self.inner.skeletal_animation(self.animation, file, model)
    }

    fn spline_animation(
        &self,
        animation: usize,
        file: usize,
        model: usize,
    ) -> Result<Option<NonSkeletalAnimationData>> {
        if animation != 0 {
            return Ok(None);
        }
        self.inner.spline_animation(self.animation, file, model)
    }

    fn compiler_path_override(&self) -> Option<PathBuf> {
        self.inner.compiler_path_override()
    }
}

/// View exposing a subset of the wrapped source's geometry files,
/// renumbered to be contiguous.
pub struct GeometrySubsetSource<'a, S: ExportSource> {
    inner: &'a S,
    retained: Vec<usize>,
}

impl<'a, S: ExportSource> GeometrySubsetSource<'a, S> {
    pub fn new(inner: &'a S, retained: Vec<usize>) -> Self {
        Self { inner, retained }
    }

    fn map_file(&self, file: usize) -> Result<usize> {
        self.retained.get(file).copied().ok_or_else(|| {
            Error::invalid(format!("geometry-subset view has no file {}", file))
        })
    }
}

impl<S: ExportSource> ExportSource for GeometrySubsetSource<'_, S> {
    fn export_directory(&self) -> Option<PathBuf> {
        self.inner.export_directory()
    }

    fn geometry_files(&self) -> Result<GeometryFileData> {
        let all = self.inner.geometry_files()?;
        let mut subset = GeometryFileData::new();
        for &index in &self.retained {
            let file = all
                .get(index)
                .ok_or_else(|| Error::invalid(format!("retained file {} out of range", index)))?;
            subset.add_file(file.handle(), file.name(), file.properties().clone());
        }
        Ok(subset)
    }

    fn models(&self, file: usize) -> Result<ModelData> {
        self.inner.models(self.map_file(file)?)
    }

    fn materials(&self) -> Result<MaterialData> {
        self.inner.materials()
    }

    fn skeleton(&self, file: usize, model: usize) -> Result<Option<SkeletonData>> {
        self.inner.skeleton(self.map_file(file)?, model)
    }

    fn geometry(&self, file: usize, model: usize) -> Result<GeometryData> {
        self.inner.geometry(self.map_file(file)?, model)
    }

    fn bone_geometry(&self, file: usize, model: usize, bone: usize) -> Result<GeometryData> {
        self.inner.bone_geometry(self.map_file(file)?, model, bone)
    }

    fn morph_geometry(&self, file: usize, model: usize, morph: usize) -> Result<GeometryData> {
        self.inner.morph_geometry(self.map_file(file)?, model, morph)
    }

    fn skinning(&self, file: usize, model: usize) -> Result<Option<SkinningData>> {
        self.inner.skinning(self.map_file(file)?, model)
    }

    fn morphs(&self, file: usize, model: usize) -> Result<MorphData> {
        self.inner.morphs(self.map_file(file)?, model)
    }

    fn animation_count(&self) -> usize {
        self.inner.animation_count()
    }

    fn animation_info(&self, index: usize) -> Result<AnimationInfo> {
        self.inner.animation_info(index)
    }

    fn skeletal_animation(
        &self,
        animation: usize,
        file: usize,
        model: usize,
    ) -> Result<Option<AnimationData>> {
        self.inner
            .skeletal_animation(animation, self.map_file(file)?, model)
    }

    fn spline_animation(
        &self,
        animation: usize,
        file: usize,
        model: usize,
    ) -> Result<Option<NonSkeletalAnimationData>> {
        self.inner
            .spline_animation(animation, self.map_file(file)?, model)
    }

    fn compiler_path_override(&self) -> Option<PathBuf> {
        self.inner.compiler_path_override()
    }
}
