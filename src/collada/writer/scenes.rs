//! Visual scene emission: export-marker nodes, the model hierarchy, the
//! skeleton hierarchy with transform decomposition, and the parallel
//! physics-proxy hierarchy.

use crate::collada::lists::{sanitize_name, DocumentLists, FileModelKey};
use crate::collada::sink::XmlSink;
use crate::collada::xml::{format_scientific, XmlWriter};
use crate::scene::{
    Bone, GeometryFile, HelperKind, LimitAxis, LimitExtreme, Model, SkeletonData,
    FILE_TYPE_ANM, FILE_TYPE_CAF, FILE_TYPE_CGA, FILE_TYPE_CGF, FILE_TYPE_CHR,
    FILE_TYPE_INTERMEDIATE_CAF, FILE_TYPE_SKIN,
};
use crate::util::math::{compose_trs, decompose_transform, Decomposed, Mat4, Vec3};
use crate::util::Result;

use super::geometries::material_symbol;
use super::{SceneSnapshot, EXPORT_NODE_PREFIX, VISUAL_SCENE_ID};

pub fn write_visual_scenes<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
) -> Result<()> {
    xml.begin("library_visual_scenes")?;
    xml.begin("visual_scene")?;
    xml.attr("id", VISUAL_SCENE_ID)?;
    xml.attr("name", VISUAL_SCENE_ID)?;

    for (file_index, file) in snapshot.files.iter().enumerate() {
        write_export_node(xml, snapshot, lists, file_index, file)?;
    }

    xml.end()?;
    xml.end()
}

/// One top-level node per geometry file, carrying the export marker the
/// downstream compiler looks for.
fn write_export_node<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
    file_index: usize,
    file: &GeometryFile,
) -> Result<()> {
    let node_id = format!("{}{}", EXPORT_NODE_PREFIX, sanitize_name(file.name()));
    xml.begin("node")?;
    xml.attr("id", &node_id)?;
    xml.attr("name", &node_id)?;

    let models = &snapshot.models[file_index];
    for root in models.root_indices() {
        write_model_recurse(xml, snapshot, lists, file_index, root)?;
    }

    // The skeleton and its physics-proxy counterpart belong to the
    // first model only.
    let first_key: FileModelKey = (file_index, 0);
    if let Some(skeleton) = snapshot.skeletons.get(&first_key) {
        for root in skeleton.root_indices() {
            write_skeleton_recurse(xml, lists, first_key, skeleton, root)?;
            write_phys_skeleton_recurse(xml, lists, first_key, skeleton, root, Mat4::IDENTITY)?;
        }
    }

    write_export_properties(xml, file)?;
    xml.end()
}

/// The file-type and flag tokens the compiler reads off the marker node.
fn write_export_properties<K: XmlSink>(xml: &mut XmlWriter<K>, file: &GeometryFile) -> Result<()> {
    let properties = file.properties();
    let mut tokens: Vec<String> = Vec::new();
    for (mask, token) in [
        (FILE_TYPE_CGF, "fileType=cgf"),
        (FILE_TYPE_CGA, "fileType=cga"),
        (FILE_TYPE_CHR, "fileType=chr"),
        (FILE_TYPE_CAF, "fileType=caf"),
        (FILE_TYPE_ANM, "fileType=anm"),
        (FILE_TYPE_SKIN, "fileType=skin"),
        (FILE_TYPE_INTERMEDIATE_CAF, "fileType=i_caf"),
    ] {
        if properties.has_type(mask) {
            tokens.push(token.to_string());
        }
    }
    if properties.do_not_merge {
        tokens.push("DoNotMerge".to_string());
    }
    if properties.use_custom_normals {
        tokens.push("UseCustomNormals".to_string());
    }
    if properties.use_f32_vertex_format {
        tokens.push("UseF32VertexFormat".to_string());
    }
    if let Some(path) = &properties.custom_export_path {
        tokens.push(format!("CustomExportPath={}", path.display()));
    }

    xml.begin("extra")?;
    xml.begin("technique")?;
    xml.attr("profile", "EXPORT")?;
    xml.element_text("properties", &tokens.join("\n"))?;
    xml.end()?;
    xml.end()
}

fn write_model_recurse<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
    file_index: usize,
    model_index: usize,
) -> Result<()> {
    let models = &snapshot.models[file_index];
    let model = models
        .get(model_index)
        .expect("model index from enumeration");
    let key: FileModelKey = (file_index, model_index);
    let node_id = sanitize_name(model.name());

    xml.begin("node")?;
    xml.attr("id", &node_id)?;
    xml.attr("name", &node_id)?;
    xml.attr("type", "NODE")?;

    write_trs_elements(
        xml,
        &Decomposed {
            translation: model.translation,
            rotation_deg: model.rotation_deg,
            scale: model.scale,
        },
    )?;

    // A skin controller wins over a morph controller, which wins over a
    // plain geometry instance.
    if let Some(&position) = lists.skin_controller_map.get(&key) {
        xml.begin("instance_controller")?;
        xml.attr("url", &format!("#{}", lists.skin_controllers[position].name))?;
        if let Some(&root_bone) = lists.bone_map.get(&(key, 0)) {
            xml.element_text("skeleton", &format!("#{}", lists.bones[root_bone].name))?;
        }
        write_bind_material(xml, snapshot, lists, key)?;
        xml.end()?;
    } else if let Some(&position) = lists.morph_controller_map.get(&key) {
        xml.begin("instance_controller")?;
        xml.attr("url", &format!("#{}", lists.morph_controllers[position].name))?;
        write_bind_material(xml, snapshot, lists, key)?;
        xml.end()?;
    } else if let Some(&position) = lists.geometry_map.get(&key) {
        xml.begin("instance_geometry")?;
        xml.attr("url", &format!("#{}", lists.geometry[position].name))?;
        write_bind_material(xml, snapshot, lists, key)?;
        xml.end()?;
    }

    for child in models.children_of(model_index) {
        write_model_recurse(xml, snapshot, lists, file_index, child)?;
    }

    write_model_extra(xml, model)?;
    xml.end()
}

/// Bind every material the model's mesh references.
fn write_bind_material<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
    key: FileModelKey,
) -> Result<()> {
    let Some(geometry) = snapshot.geometries.get(&key) else {
        return Ok(());
    };
    let mut material_ids: Vec<i32> = geometry
        .polygons()
        .iter()
        .map(|p| p.material_id)
        .filter(|&id| id >= 0)
        .collect();
    material_ids.sort_unstable();
    material_ids.dedup();
    if material_ids.is_empty() {
        return Ok(());
    }

    xml.begin("bind_material")?;
    xml.begin("technique_common")?;
    for material_id in material_ids {
        if let Some(symbol) = material_symbol(material_id, snapshot, lists) {
            xml.begin("instance_material")?;
            xml.attr("symbol", symbol)?;
            xml.attr("target", &format!("#{}", symbol))?;
            xml.end()?;
        }
    }
    xml.end()?;
    xml.end()
}

fn write_model_extra<K: XmlSink>(xml: &mut XmlWriter<K>, model: &Model) -> Result<()> {
    let has_properties = !model.properties.is_empty();
    if model.helper.is_none() && !has_properties {
        return Ok(());
    }

    xml.begin("extra")?;
    xml.begin("technique")?;
    xml.attr("profile", "EXPORT")?;
    if let Some(helper) = &model.helper {
        xml.begin("helper")?;
        xml.attr(
            "type",
            match helper.kind {
                HelperKind::Point => "point",
                HelperKind::Dummy => "dummy",
            },
        )?;
        if let Some(bbox) = &helper.bounding_box {
            xml.element_text("bound_box_min", &vec3_text(bbox.min))?;
            xml.element_text("bound_box_max", &vec3_text(bbox.max))?;
        }
        xml.end()?;
    }
    if has_properties {
        xml.element_text("properties", &model.properties)?;
    }
    xml.end()?;
    xml.end()
}

/// Render skeleton recursion. Each bone node emits its transform as
/// translate, three single-axis rotates in z, y, x sid order, and scale.
fn write_skeleton_recurse<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    lists: &DocumentLists,
    key: FileModelKey,
    skeleton: &SkeletonData,
    bone_index: usize,
) -> Result<()> {
    let bone = skeleton.get(bone_index).expect("bone index from enumeration");
    let name = &lists.bones[lists.bone_map[&(key, bone_index)]].name;

    xml.begin("node")?;
    xml.attr("id", name)?;
    xml.attr("sid", name)?;
    xml.attr("name", name)?;
    xml.attr("type", "JOINT")?;

    write_trs_elements(
        xml,
        &Decomposed {
            translation: bone.translation,
            rotation_deg: bone.rotation_deg,
            scale: bone.scale,
        },
    )?;

    // Non-physicalized bones keep their proxy mesh on the render joint;
    // physicalized ones instance it from the physics hierarchy instead.
    if bone.has_geometry && !bone.physicalized {
        if let Some(&position) = lists.bone_geometry_map.get(&(key, bone_index)) {
            xml.begin("instance_geometry")?;
            xml.attr("url", &format!("#{}", lists.bone_geometry[position].name))?;
            xml.end()?;
        }
    }

    for child in skeleton.children_of(bone_index) {
        write_skeleton_recurse(xml, lists, key, skeleton, child)?;
    }

    write_bone_extra(xml, bone)?;
    xml.end()
}

/// Physics-proxy recursion. The proxy chain composes each bone's parent
/// frame (falling back to the bone's local transform) independently of
/// the skeletal parent chain. Bones that are not physicalized emit no
/// node of their own but still recurse so physicalized descendants
/// appear; `carry` accumulates the transform since the last emitted
/// ancestor.
fn write_phys_skeleton_recurse<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    lists: &DocumentLists,
    key: FileModelKey,
    skeleton: &SkeletonData,
    bone_index: usize,
    carry: Mat4,
) -> Result<()> {
    let bone = skeleton.get(bone_index).expect("bone index from enumeration");
    let local = bone
        .parent_frame
        .unwrap_or_else(|| compose_trs(bone.translation, bone.rotation_deg, bone.scale));
    let total = carry * local;

    if bone.physicalized {
        let name = format!(
            "{}_Phys",
            lists.bones[lists.bone_map[&(key, bone_index)]].name
        );
        xml.begin("node")?;
        xml.attr("id", &name)?;
        xml.attr("sid", &name)?;
        xml.attr("name", &name)?;
        xml.attr("type", "JOINT")?;

        write_trs_elements(xml, &decompose_transform(&total))?;

        if bone.has_geometry {
            if let Some(&position) = lists.bone_geometry_map.get(&(key, bone_index)) {
                xml.begin("instance_geometry")?;
                xml.attr("url", &format!("#{}", lists.bone_geometry[position].name))?;
                xml.end()?;
            }
        }

        for child in skeleton.children_of(bone_index) {
            write_phys_skeleton_recurse(xml, lists, key, skeleton, child, Mat4::IDENTITY)?;
        }
        xml.end()
    } else {
        for child in skeleton.children_of(bone_index) {
            write_phys_skeleton_recurse(xml, lists, key, skeleton, child, total)?;
        }
        Ok(())
    }
}

/// Joint limits, springs, damping, and bone geometry properties.
fn write_bone_extra<K: XmlSink>(xml: &mut XmlWriter<K>, bone: &Bone) -> Result<()> {
    let mut tokens: Vec<String> = Vec::new();
    for (axis, axis_name) in [
        (LimitAxis::X, "x"),
        (LimitAxis::Y, "y"),
        (LimitAxis::Z, "z"),
    ] {
        for (extreme, extreme_name) in [(LimitExtreme::Min, "min"), (LimitExtreme::Max, "max")] {
            if let Some(value) = bone.limit(axis, extreme) {
                tokens.push(format!(
                    "limit_{}_{}={}",
                    axis_name,
                    extreme_name,
                    format_scientific(value)
                ));
            }
        }
        if let Some(value) = bone.spring_tension(axis) {
            tokens.push(format!("spring_tension_{}={}", axis_name, format_scientific(value)));
        }
        if let Some(value) = bone.spring_angle(axis) {
            tokens.push(format!("spring_angle_{}={}", axis_name, format_scientific(value)));
        }
        if let Some(value) = bone.damping(axis) {
            tokens.push(format!("damping_{}={}", axis_name, format_scientific(value)));
        }
    }
    if !bone.geometry_properties.is_empty() {
        tokens.push(bone.geometry_properties.clone());
    }
    if tokens.is_empty() {
        return Ok(());
    }

    xml.begin("extra")?;
    xml.begin("technique")?;
    xml.attr("profile", "EXPORT")?;
    xml.element_text("properties", &tokens.join("\n"))?;
    xml.end()?;
    xml.end()
}

/// Emit a decomposed transform: translate, rotate z, rotate y, rotate x
/// (sid order z, y, x; application order x, y, z), scale.
fn write_trs_elements<K: XmlSink>(xml: &mut XmlWriter<K>, transform: &Decomposed) -> Result<()> {
    xml.begin("translate")?;
    xml.attr("sid", "translation")?;
    xml.text(&vec3_text(transform.translation))?;
    xml.end()?;

    for (sid, axis, angle) in [
        ("rotation_z", "0 0 1", transform.rotation_deg.z),
        ("rotation_y", "0 1 0", transform.rotation_deg.y),
        ("rotation_x", "1 0 0", transform.rotation_deg.x),
    ] {
        xml.begin("rotate")?;
        xml.attr("sid", sid)?;
        xml.text(&format!("{} {}", axis, format_scientific(angle)))?;
        xml.end()?;
    }

    xml.begin("scale")?;
    xml.attr("sid", "scale")?;
    xml.text(&vec3_text(transform.scale))?;
    xml.end()
}

fn vec3_text(v: Vec3) -> String {
    format!(
        "{} {} {}",
        format_scientific(v.x),
        format_scientific(v.y),
        format_scientific(v.z)
    )
}
