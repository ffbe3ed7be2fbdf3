//! Skin and morph controller emission.

use crate::collada::lists::DocumentLists;
use crate::collada::sink::XmlSink;
use crate::collada::xml::XmlWriter;
use crate::scene::SkinningData;
use crate::util::math::{compose_trs, matrix_row_major};
use crate::util::Result;

use super::SceneSnapshot;

pub fn write_controllers<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
) -> Result<()> {
    xml.begin("library_controllers")?;
    write_skin_controllers(xml, snapshot, lists)?;
    write_morph_controllers(xml, lists)?;
    xml.end()
}

fn write_skin_controllers<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
) -> Result<()> {
    let empty = SkinningData::new();

    for (key, &position) in &lists.skin_controller_map {
        let controller = &lists.skin_controllers[position].name;
        let geometry = &lists.geometry[lists.geometry_map[key]].name;
        let skeleton = &snapshot.skeletons[key];
        let skinning = snapshot.skinnings.get(key).unwrap_or(&empty);

        xml.begin("controller")?;
        xml.attr("id", controller)?;
        xml.begin("skin")?;
        xml.attr("source", &format!("#{}", geometry))?;

        // Joint names, in skeleton bone order.
        let joints_id = format!("{}-joints", controller);
        xml.begin("source")?;
        xml.attr("id", &joints_id)?;
        xml.begin("Name_array")?;
        xml.attr("id", &format!("{}-array", joints_id))?;
        xml.attr_usize("count", skeleton.len())?;
        xml.text_names(
            (0..skeleton.len()).map(|b| lists.bones[lists.bone_map[&(*key, b)]].name.as_str()),
        )?;
        xml.end()?;
        xml.begin("technique_common")?;
        xml.begin("accessor")?;
        xml.attr("source", &format!("#{}-array", joints_id))?;
        xml.attr_usize("count", skeleton.len())?;
        xml.begin("param")?;
        xml.attr("name", "JOINT")?;
        xml.attr("type", "Name")?;
        xml.end()?;
        xml.end()?;
        xml.end()?;
        xml.end()?;

        // Bind matrices: inverse of each bone's local composed transform.
        let matrices_id = format!("{}-matrices", controller);
        xml.begin("source")?;
        xml.attr("id", &matrices_id)?;
        xml.begin("float_array")?;
        xml.attr("id", &format!("{}-array", matrices_id))?;
        xml.attr_usize("count", 16 * skeleton.len())?;
        xml.text_floats(skeleton.iter().flat_map(|bone| {
            let local = compose_trs(bone.translation, bone.rotation_deg, bone.scale);
            matrix_row_major(&local.inverse())
        }))?;
        xml.end()?;
        xml.begin("technique_common")?;
        xml.begin("accessor")?;
        xml.attr("source", &format!("#{}-array", matrices_id))?;
        xml.attr_usize("count", skeleton.len())?;
        xml.attr_usize("stride", 16)?;
        xml.begin("param")?;
        xml.attr("name", "TRANSFORM")?;
        xml.attr("type", "float4x4")?;
        xml.end()?;
        xml.end()?;
        xml.end()?;
        xml.end()?;

        // Flattened weight array; the <v> pairs index into it by
        // running position.
        let weights_id = format!("{}-weights", controller);
        xml.begin("source")?;
        xml.attr("id", &weights_id)?;
        xml.begin("float_array")?;
        xml.attr("id", &format!("{}-array", weights_id))?;
        xml.attr_usize("count", skinning.total_weights())?;
        xml.text_floats(skinning.iter().flatten().map(|w| w.weight))?;
        xml.end()?;
        xml.begin("technique_common")?;
        xml.begin("accessor")?;
        xml.attr("source", &format!("#{}-array", weights_id))?;
        xml.attr_usize("count", skinning.total_weights())?;
        xml.begin("param")?;
        xml.attr("name", "WEIGHT")?;
        xml.attr("type", "float")?;
        xml.end()?;
        xml.end()?;
        xml.end()?;
        xml.end()?;

        xml.begin("joints")?;
        write_input(xml, "JOINT", &format!("#{}", joints_id), None)?;
        write_input(xml, "INV_BIND_MATRIX", &format!("#{}", matrices_id), None)?;
        xml.end()?;

        xml.begin("vertex_weights")?;
        xml.attr_usize("count", skinning.num_vertices())?;
        write_input(xml, "JOINT", &format!("#{}", joints_id), Some(0))?;
        write_input(xml, "WEIGHT", &format!("#{}", weights_id), Some(1))?;

        xml.begin("vcount")?;
        xml.text_ints(skinning.iter().map(|v| v.len() as i64))?;
        xml.end()?;

        xml.begin("v")?;
        let mut pairs: Vec<i64> = Vec::with_capacity(2 * skinning.total_weights());
        let mut weight_position = 0i64;
        for vertex in skinning.iter() {
            for influence in vertex {
                pairs.push(influence.bone_index as i64);
                pairs.push(weight_position);
                weight_position += 1;
            }
        }
        xml.text_ints(pairs)?;
        xml.end()?;

        xml.end()?;
        xml.end()?;
        xml.end()?;
    }

    Ok(())
}

fn write_morph_controllers<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    lists: &DocumentLists,
) -> Result<()> {
    for (key, &position) in &lists.morph_controller_map {
        let controller = &lists.morph_controllers[position].name;
        let base = lists
            .geometry_map
            .get(key)
            .map(|&p| lists.geometry[p].name.as_str());

        // Morph targets of this model, in morph order.
        let targets: Vec<&str> = lists
            .morph_geometry_map
            .range((*key, 0)..=(*key, usize::MAX))
            .map(|(_, &p)| lists.morph_geometry[p].name.as_str())
            .collect();

        xml.begin("controller")?;
        xml.attr("id", controller)?;
        xml.begin("morph")?;
        if let Some(base) = base {
            xml.attr("source", &format!("#{}", base))?;
        }
        xml.attr("method", "NORMALIZED")?;

        let targets_id = format!("{}-targets", controller);
        xml.begin("source")?;
        xml.attr("id", &targets_id)?;
        xml.begin("IDREF_array")?;
        xml.attr("id", &format!("{}-array", targets_id))?;
        xml.attr_usize("count", targets.len())?;
        xml.text_names(targets.iter().copied())?;
        xml.end()?;
        xml.begin("technique_common")?;
        xml.begin("accessor")?;
        xml.attr("source", &format!("#{}-array", targets_id))?;
        xml.attr_usize("count", targets.len())?;
        xml.begin("param")?;
        xml.attr("name", "MORPH_TARGET")?;
        xml.attr("type", "IDREF")?;
        xml.end()?;
        xml.end()?;
        xml.end()?;
        xml.end()?;

        // Weight placeholders; the engine animates the real values.
        let weights_id = format!("{}-weights", controller);
        xml.begin("source")?;
        xml.attr("id", &weights_id)?;
        xml.begin("float_array")?;
        xml.attr("id", &format!("{}-array", weights_id))?;
        xml.attr_usize("count", targets.len())?;
        xml.text_floats(targets.iter().map(|_| 0.0))?;
        xml.end()?;
        xml.begin("technique_common")?;
        xml.begin("accessor")?;
        xml.attr("source", &format!("#{}-array", weights_id))?;
        xml.attr_usize("count", targets.len())?;
        xml.begin("param")?;
        xml.attr("name", "MORPH_WEIGHT")?;
        xml.attr("type", "float")?;
        xml.end()?;
        xml.end()?;
        xml.end()?;
        xml.end()?;

        xml.begin("targets")?;
        write_input(xml, "MORPH_TARGET", &format!("#{}", targets_id), None)?;
        write_input(xml, "MORPH_WEIGHT", &format!("#{}", weights_id), None)?;
        xml.end()?;

        xml.end()?;
        xml.end()?;
    }

    Ok(())
}

fn write_input<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    semantic: &str,
    source: &str,
    offset: Option<usize>,
) -> Result<()> {
    xml.begin("input")?;
    xml.attr("semantic", semantic)?;
    xml.attr("source", source)?;
    if let Some(offset) = offset {
        xml.attr_usize("offset", offset)?;
    }
    xml.end()
}
