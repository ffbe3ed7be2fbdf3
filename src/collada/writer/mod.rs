//! COLLADA document writer.
//!
//! Sections are split into focused submodules; this module owns the
//! read pass, the section ordering, and the asset header. The library
//! order is fixed: `asset`, `library_animation_clips`,
//! `library_animations`, `library_effects`, `library_materials`,
//! `library_geometries`, `library_controllers`,
//! `library_visual_scenes`, `library_images`, `scene`.

mod animations;
mod controllers;
mod geometries;
mod materials;
mod scenes;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use crate::collada::lists::{BoneKey, DocumentLists, FileModelKey, MorphKey};
use crate::collada::sink::XmlSink;
use crate::collada::xml::{format_scientific, XmlWriter};
use crate::collada::{COLLADA_NAMESPACE, COLLADA_VERSION};
use crate::scene::{
    GeometryData, GeometryFileData, MaterialData, ModelData, MorphData, SkeletonData,
    SkinningData,
};
use crate::source::{ExportMetadata, ExportSource};
use crate::util::math::floating_point_has_precision_issues;
use crate::util::{Error, Result};

/// Id of the single visual scene instance.
pub const VISUAL_SCENE_ID: &str = "visual_scene_0";

/// Prefix marking a top-level node as a root the downstream compiler
/// should process.
pub const EXPORT_NODE_PREFIX: &str = "ExportNode_";

/// Bone name some loaders expect at index 1.
const PELVIS_BONE_NAME: &str = "Bip01 Pelvis";

/// Writer configuration.
#[derive(Clone, Debug, Default)]
pub struct ColladaConfig {
    /// Reorder a bone named "Bip01 Pelvis" to skeleton index 1 when it
    /// sits elsewhere. Off by default; only enable for loaders that
    /// assume the pelvis at bone 1.
    pub force_pelvis_bone_1: bool,
}

/// Scene data read once per document write. Owned exclusively by the
/// writer for the duration of one export; nothing persists afterwards.
pub struct SceneSnapshot {
    pub files: GeometryFileData,
    /// Model tree per geometry file.
    pub models: Vec<ModelData>,
    pub materials: MaterialData,
    pub skeletons: BTreeMap<FileModelKey, SkeletonData>,
    pub morphs: BTreeMap<FileModelKey, MorphData>,
    pub geometries: BTreeMap<FileModelKey, GeometryData>,
    pub skinnings: BTreeMap<FileModelKey, SkinningData>,
    pub bone_geometries: BTreeMap<BoneKey, GeometryData>,
    pub morph_geometries: BTreeMap<MorphKey, GeometryData>,
}

impl SceneSnapshot {
    /// Populate the snapshot from a source. Any read failure aborts the
    /// whole write; the caller is responsible for discarding a partially
    /// written document.
    pub fn read<S: ExportSource>(source: &S, config: &ColladaConfig) -> Result<Self> {
        let files = source.geometry_files()?;
        let materials = source.materials()?;

        let mut models = Vec::with_capacity(files.len());
        for file_index in 0..files.len() {
            models.push(source.models(file_index)?);
        }

        let mut skeletons = BTreeMap::new();
        let mut morphs = BTreeMap::new();
        let mut geometries = BTreeMap::new();
        let mut skinnings = BTreeMap::new();
        let mut bone_geometries = BTreeMap::new();
        let mut morph_geometries = BTreeMap::new();

        for (file_index, model_data) in models.iter().enumerate() {
            for model_index in 0..model_data.len() {
                let key = (file_index, model_index);

                // Zero-morph entries are dropped at read time.
                let morph_data = source.morphs(file_index, model_index)?;
                if !morph_data.is_empty() {
                    for morph_index in 0..morph_data.len() {
                        morph_geometries.insert(
                            (key, morph_index),
                            source.morph_geometry(file_index, model_index, morph_index)?,
                        );
                    }
                    morphs.insert(key, morph_data);
                }

                if let Some(mut skeleton) = source.skeleton(file_index, model_index)? {
                    if config.force_pelvis_bone_1 {
                        skeleton.force_bone_at_index_1(PELVIS_BONE_NAME);
                    }
                    for bone_index in 0..skeleton.len() {
                        if skeleton.get(bone_index).map(|b| b.has_geometry) == Some(true) {
                            bone_geometries.insert(
                                (key, bone_index),
                                source.bone_geometry(file_index, model_index, bone_index)?,
                            );
                        }
                    }
                    skeletons.insert(key, skeleton);
                }

                let has_geometry = model_data
                    .get(model_index)
                    .map(|m| m.has_geometry)
                    .unwrap_or(false);
                if has_geometry {
                    geometries.insert(key, source.geometry(file_index, model_index)?);
                    if let Some(skinning) = source.skinning(file_index, model_index)? {
                        skinnings.insert(key, skinning);
                    }
                }
            }
        }

        Ok(Self {
            files,
            models,
            materials,
            skeletons,
            morphs,
            geometries,
            skinnings,
            bone_geometries,
            morph_geometries,
        })
    }
}

/// Streaming COLLADA document writer.
pub struct ColladaWriter<'a, S: ExportSource> {
    source: &'a S,
    metadata: &'a ExportMetadata,
    config: ColladaConfig,
}

impl<'a, S: ExportSource> ColladaWriter<'a, S> {
    pub fn new(source: &'a S, metadata: &'a ExportMetadata) -> Self {
        Self {
            source,
            metadata,
            config: ColladaConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ColladaConfig) -> Self {
        self.config = config;
        self
    }

    /// Write the complete document to `sink`.
    pub fn write<K: XmlSink>(&self, sink: K) -> Result<()> {
        if floating_point_has_precision_issues() {
            return Err(Error::PrecisionCheck);
        }

        let snapshot = SceneSnapshot::read(self.source, &self.config)?;
        let lists = DocumentLists::generate(
            &snapshot.models,
            &snapshot.materials,
            &snapshot.skeletons,
            &snapshot.morphs,
        );
        let plans = animations::build_animation_plans(self.source, &snapshot, &lists)?;

        let mut xml = XmlWriter::new(sink)?;
        xml.begin("COLLADA")?;
        xml.attr("xmlns", COLLADA_NAMESPACE)?;
        xml.attr("version", COLLADA_VERSION)?;

        self.write_asset(&mut xml)?;
        animations::write_animation_clips(&mut xml, &lists, &plans)?;
        animations::write_animations(&mut xml, &lists, &plans)?;
        materials::write_effects(&mut xml, &lists)?;
        materials::write_materials(&mut xml, &lists)?;
        geometries::write_geometries(&mut xml, &snapshot, &lists)?;
        controllers::write_controllers(&mut xml, &snapshot, &lists)?;
        scenes::write_visual_scenes(&mut xml, &snapshot, &lists)?;

        // Known stub: nothing references images, the library stays empty.
        xml.begin("library_images")?;
        xml.end()?;

        xml.begin("scene")?;
        xml.begin("instance_visual_scene")?;
        xml.attr("url", &format!("#{}", VISUAL_SCENE_ID))?;
        xml.end()?;
        xml.end()?;

        xml.end()?;
        xml.finish()
    }

    fn write_asset<K: XmlSink>(&self, xml: &mut XmlWriter<K>) -> Result<()> {
        xml.begin("asset")?;
        xml.begin("contributor")?;
        xml.element_text("author", &self.metadata.author)?;
        xml.element_text("authoring_tool", &self.metadata.tool)?;
        xml.element_text(
            "comments",
            &format!("frameRate={}", format_scientific(self.metadata.frame_rate)),
        )?;
        xml.end()?;
        xml.begin("unit")?;
        xml.attr_f32("meter", self.metadata.meters_per_unit)?;
        xml.attr("name", "unit")?;
        xml.end()?;
        xml.element_text("up_axis", self.metadata.up_axis.as_str())?;
        xml.end()
    }
}
