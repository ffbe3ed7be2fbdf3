//! List/index generation for cross-referenced document entities.
//!
//! Every entity class the document cross-references gets an ordered list
//! of named entries plus a map from a composite key back to the entry's
//! list position, so later writer passes can reference entities by name
//! without re-deriving identity. Iteration always follows geometry-file,
//! model, and bone enumeration order; the maps are ordered so emission
//! stays byte-reproducible.
//!
//! The synthesized names are read back by the downstream resource
//! compiler: material names embed `__<id+1>__`, bone names append a
//! `%modelName%` suffix and, where the display name or joint properties
//! need preserving, an escaped `--PRprops_name=` block. Separators and
//! ordering are a wire format and must not change.

use std::collections::BTreeMap;

use crate::scene::{MaterialData, ModelData, MorphData, SkeletonData};

/// Composite key: (geometry file index, model index).
pub type FileModelKey = (usize, usize);
/// Composite key: ((geometry file index, model index), bone index).
pub type BoneKey = (FileModelKey, usize);
/// Composite key: ((geometry file index, model index), morph index).
pub type MorphKey = (FileModelKey, usize);

/// A named export entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedEntry {
    pub name: String,
}

/// A named material entry, remembering which material produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialEntry {
    pub name: String,
    pub material_index: usize,
}

/// One animation parameter channel of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationChannelEntry {
    /// Unique id base within the document, e.g. `Hero-translation_X`.
    pub name: String,
    /// Node the channel targets (bone node name or model name).
    pub node_name: String,
    pub target: ChannelTarget,
}

/// Animated parameter component of a node transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelTarget {
    TranslationX,
    TranslationY,
    TranslationZ,
    RotationX,
    RotationY,
    RotationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

/// Per-node channels, in emission order.
pub const NODE_CHANNELS: [ChannelTarget; 9] = [
    ChannelTarget::TranslationX,
    ChannelTarget::TranslationY,
    ChannelTarget::TranslationZ,
    ChannelTarget::RotationX,
    ChannelTarget::RotationY,
    ChannelTarget::RotationZ,
    ChannelTarget::ScaleX,
    ChannelTarget::ScaleY,
    ChannelTarget::ScaleZ,
];

/// Number of channels generated per animated node.
pub const CHANNELS_PER_NODE: usize = NODE_CHANNELS.len();

impl ChannelTarget {
    /// Target address suffix, e.g. `translation.X` or `rotation_x.ANGLE`.
    pub fn target_suffix(&self) -> &'static str {
        match self {
            ChannelTarget::TranslationX => "translation.X",
            ChannelTarget::TranslationY => "translation.Y",
            ChannelTarget::TranslationZ => "translation.Z",
            ChannelTarget::RotationX => "rotation_x.ANGLE",
            ChannelTarget::RotationY => "rotation_y.ANGLE",
            ChannelTarget::RotationZ => "rotation_z.ANGLE",
            ChannelTarget::ScaleX => "scale.X",
            ChannelTarget::ScaleY => "scale.Y",
            ChannelTarget::ScaleZ => "scale.Z",
        }
    }

    /// Id-safe suffix, e.g. `translation_X`.
    pub fn id_suffix(&self) -> &'static str {
        match self {
            ChannelTarget::TranslationX => "translation_X",
            ChannelTarget::TranslationY => "translation_Y",
            ChannelTarget::TranslationZ => "translation_Z",
            ChannelTarget::RotationX => "rotation_x",
            ChannelTarget::RotationY => "rotation_y",
            ChannelTarget::RotationZ => "rotation_z",
            ChannelTarget::ScaleX => "scale_X",
            ChannelTarget::ScaleY => "scale_Y",
            ChannelTarget::ScaleZ => "scale_Z",
        }
    }

    /// Index of the driven component within a [`crate::scene::TrsSample`]
    /// channel triple: 0 = x, 1 = y, 2 = z.
    pub fn component(&self) -> usize {
        match self {
            ChannelTarget::TranslationX | ChannelTarget::RotationX | ChannelTarget::ScaleX => 0,
            ChannelTarget::TranslationY | ChannelTarget::RotationY | ChannelTarget::ScaleY => 1,
            ChannelTarget::TranslationZ | ChannelTarget::RotationZ | ChannelTarget::ScaleZ => 2,
        }
    }

    /// Which transform channel the target belongs to.
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChannelTarget::TranslationX | ChannelTarget::TranslationY | ChannelTarget::TranslationZ => {
                ChannelKind::Translation
            }
            ChannelTarget::RotationX | ChannelTarget::RotationY | ChannelTarget::RotationZ => {
                ChannelKind::Rotation
            }
            ChannelTarget::ScaleX | ChannelTarget::ScaleY | ChannelTarget::ScaleZ => {
                ChannelKind::Scale
            }
        }
    }
}

/// Transform channel group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    Translation,
    Rotation,
    Scale,
}

/// Replace whitespace with underscores for use in ids and node names.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Escape a display string for a `--PRprops_name=` block: whitespace
/// becomes `*`.
pub fn escape_display(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_whitespace() { '*' } else { c })
        .collect()
}

/// Synthesize the exported node name of a bone.
///
/// The base form is `<name>%<model>%` with whitespace replaced by
/// underscores. When the raw name contains whitespace, or the bone
/// carries joint properties, an escaped override block preserves the
/// original display name and properties for the compiler:
/// `--PRprops_name=<name><props>__` with whitespace as `*`.
pub fn bone_node_name(bone_name: &str, bone_properties: &str, model_name: &str) -> String {
    let mut name = format!("{}%{}%", sanitize_name(bone_name), sanitize_name(model_name));
    let has_whitespace = bone_name.chars().any(char::is_whitespace);
    if has_whitespace || !bone_properties.is_empty() {
        name.push_str("--PRprops_name=");
        name.push_str(&escape_display(bone_name));
        name.push_str(&escape_display(bone_properties));
        name.push_str("__");
    }
    name
}

/// Synthesize the exported material name. The compiler parses
/// `<name>__<id+1>__<submatname><properties>` to select compilation
/// settings, so this string is a wire format.
pub fn material_export_name(name: &str, id: i32, sub_material_name: &str, properties: &str) -> String {
    format!(
        "{}__{}__{}{}",
        sanitize_name(name),
        id + 1,
        sanitize_name(sub_material_name),
        properties
    )
}

/// Generated lists and index maps for one document.
#[derive(Debug, Default)]
pub struct DocumentLists {
    pub geometry: Vec<NamedEntry>,
    pub geometry_map: BTreeMap<FileModelKey, usize>,

    pub bone_geometry: Vec<NamedEntry>,
    pub bone_geometry_map: BTreeMap<BoneKey, usize>,

    pub morph_geometry: Vec<NamedEntry>,
    pub morph_geometry_map: BTreeMap<MorphKey, usize>,

    pub materials: Vec<MaterialEntry>,
    pub material_map: BTreeMap<usize, usize>,

    pub effects: Vec<NamedEntry>,

    pub skin_controllers: Vec<NamedEntry>,
    pub skin_controller_map: BTreeMap<FileModelKey, usize>,

    pub morph_controllers: Vec<NamedEntry>,
    pub morph_controller_map: BTreeMap<FileModelKey, usize>,

    pub animation_channels: Vec<AnimationChannelEntry>,
    pub model_animation_map: BTreeMap<FileModelKey, usize>,
    pub bone_animation_map: BTreeMap<BoneKey, usize>,

    pub bones: Vec<NamedEntry>,
    pub bone_map: BTreeMap<BoneKey, usize>,
}

impl DocumentLists {
    /// Derive every list and index map from the populated scene data.
    pub fn generate(
        models: &[ModelData],
        materials: &MaterialData,
        skeletons: &BTreeMap<FileModelKey, SkeletonData>,
        morphs: &BTreeMap<FileModelKey, MorphData>,
    ) -> Self {
        let mut lists = Self::default();

        generate_geometry_list(models, &mut lists);
        generate_bone_geometry_list(models, skeletons, &mut lists);
        generate_morph_geometry_list(models, morphs, &mut lists);
        generate_material_list(materials, &mut lists);
        generate_effects_list(&mut lists);
        generate_skin_controller_list(models, skeletons, &mut lists);
        generate_morph_controller_list(models, morphs, &mut lists);
        generate_animation_list(models, skeletons, &mut lists);
        generate_bone_list(models, skeletons, &mut lists);

        lists
    }
}

fn model_name(models: &[ModelData], key: FileModelKey) -> &str {
    models[key.0]
        .get(key.1)
        .map(|m| m.name())
        .unwrap_or_default()
}

/// One entry per model flagged as having geometry.
fn generate_geometry_list(models: &[ModelData], lists: &mut DocumentLists) {
    for (file_index, model_data) in models.iter().enumerate() {
        for (model_index, model) in model_data.iter().enumerate() {
            if !model.has_geometry {
                continue;
            }
            let position = lists.geometry.len();
            lists.geometry.push(NamedEntry {
                name: sanitize_name(model.name()),
            });
            lists.geometry_map.insert((file_index, model_index), position);
        }
    }
}

/// One entry per bone flagged as having geometry.
fn generate_bone_geometry_list(
    models: &[ModelData],
    skeletons: &BTreeMap<FileModelKey, SkeletonData>,
    lists: &mut DocumentLists,
) {
    for (&key, skeleton) in skeletons {
        let model = model_name(models, key);
        for (bone_index, bone) in skeleton.iter().enumerate() {
            if !bone.has_geometry {
                continue;
            }
            let position = lists.bone_geometry.len();
            lists.bone_geometry.push(NamedEntry {
                name: format!(
                    "{}_boneGeometry",
                    bone_node_name(bone.name(), &bone.properties, model)
                ),
            });
            lists.bone_geometry_map.insert((key, bone_index), position);
        }
    }
}

/// One entry per morph target of every model with a non-empty morph set.
fn generate_morph_geometry_list(
    models: &[ModelData],
    morphs: &BTreeMap<FileModelKey, MorphData>,
    lists: &mut DocumentLists,
) {
    for (&key, morph_data) in morphs {
        let model = sanitize_name(model_name(models, key));
        for (morph_index, target) in morph_data.iter().enumerate() {
            let position = lists.morph_geometry.len();
            lists.morph_geometry.push(NamedEntry {
                name: format!("{}_morph_{}", model, sanitize_name(target.full_name())),
            });
            lists.morph_geometry_map.insert((key, morph_index), position);
        }
    }
}

/// One entry per material, named with the compiler-readable encoding.
fn generate_material_list(materials: &MaterialData, lists: &mut DocumentLists) {
    for (material_index, material) in materials.iter().enumerate() {
        let position = lists.materials.len();
        lists.materials.push(MaterialEntry {
            name: material_export_name(
                &material.name,
                material.id,
                &material.sub_material_name,
                &material.properties,
            ),
            material_index,
        });
        lists.material_map.insert(material_index, position);
    }
}

/// One effect per material entry, aligned by position.
fn generate_effects_list(lists: &mut DocumentLists) {
    lists.effects = lists
        .materials
        .iter()
        .map(|entry| NamedEntry {
            name: format!("{}_effect", entry.name),
        })
        .collect();
}

/// One skin controller per (file, model) that has both a skeleton and a
/// geometry entry. The controller wins over a plain geometry instance at
/// hierarchy-write time.
fn generate_skin_controller_list(
    models: &[ModelData],
    skeletons: &BTreeMap<FileModelKey, SkeletonData>,
    lists: &mut DocumentLists,
) {
    for &key in skeletons.keys() {
        if !lists.geometry_map.contains_key(&key) {
            continue;
        }
        let position = lists.skin_controllers.len();
        lists.skin_controllers.push(NamedEntry {
            name: format!("{}_skinController", sanitize_name(model_name(models, key))),
        });
        lists.skin_controller_map.insert(key, position);
    }
}

/// One morph controller per model with a non-empty morph set.
fn generate_morph_controller_list(
    models: &[ModelData],
    morphs: &BTreeMap<FileModelKey, MorphData>,
    lists: &mut DocumentLists,
) {
    for (&key, morph_data) in morphs {
        if morph_data.is_empty() {
            continue;
        }
        let position = lists.morph_controllers.len();
        lists.morph_controllers.push(NamedEntry {
            name: format!("{}_morphController", sanitize_name(model_name(models, key))),
        });
        lists.morph_controller_map.insert(key, position);
    }
}

/// Parameter channels per animated node: bones where a skeleton exists
/// for the (file, model) pair, the model itself otherwise. The two paths
/// are mutually exclusive per pair.
fn generate_animation_list(
    models: &[ModelData],
    skeletons: &BTreeMap<FileModelKey, SkeletonData>,
    lists: &mut DocumentLists,
) {
    for (file_index, model_data) in models.iter().enumerate() {
        for (model_index, model) in model_data.iter().enumerate() {
            let key = (file_index, model_index);
            match skeletons.get(&key) {
                Some(skeleton) => {
                    for (bone_index, bone) in skeleton.iter().enumerate() {
                        let node = bone_node_name(bone.name(), &bone.properties, model.name());
                        lists
                            .bone_animation_map
                            .insert((key, bone_index), lists.animation_channels.len());
                        push_node_channels(&node, lists);
                    }
                }
                None => {
                    let node = sanitize_name(model.name());
                    lists
                        .model_animation_map
                        .insert(key, lists.animation_channels.len());
                    push_node_channels(&node, lists);
                }
            }
        }
    }
}

fn push_node_channels(node_name: &str, lists: &mut DocumentLists) {
    for target in NODE_CHANNELS {
        lists.animation_channels.push(AnimationChannelEntry {
            name: format!("{}-{}", node_name, target.id_suffix()),
            node_name: node_name.to_string(),
            target,
        });
    }
}

/// Node names of every bone, per skeleton, in bone order.
fn generate_bone_list(
    models: &[ModelData],
    skeletons: &BTreeMap<FileModelKey, SkeletonData>,
    lists: &mut DocumentLists,
) {
    for (&key, skeleton) in skeletons {
        let model = model_name(models, key);
        for (bone_index, bone) in skeleton.iter().enumerate() {
            let position = lists.bones.len();
            lists.bones.push(NamedEntry {
                name: bone_node_name(bone.name(), &bone.properties, model),
            });
            lists.bone_map.insert((key, bone_index), position);
        }
    }
}
