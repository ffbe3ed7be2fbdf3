//! Mesh emission.
//!
//! Every geometry, bone-geometry, and morph-geometry entry becomes one
//! `<geometry>`. Polygons are partitioned by material id (with an
//! unassigned bucket at -1) into one `<triangles>` block per non-empty
//! bucket. `<input>` offsets are assigned only for attribute streams the
//! mesh actually carries, so offset numbering is contiguous over present
//! streams.

use std::collections::BTreeMap;

use crate::collada::lists::DocumentLists;
use crate::collada::sink::XmlSink;
use crate::collada::xml::XmlWriter;
use crate::scene::GeometryData;
use crate::util::Result;

use super::SceneSnapshot;

pub fn write_geometries<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
) -> Result<()> {
    xml.begin("library_geometries")?;

    for (key, &position) in &lists.geometry_map {
        if let Some(geometry) = snapshot.geometries.get(key) {
            write_mesh(xml, &lists.geometry[position].name, geometry, snapshot, lists)?;
        }
    }
    for (key, &position) in &lists.bone_geometry_map {
        if let Some(geometry) = snapshot.bone_geometries.get(key) {
            write_mesh(
                xml,
                &lists.bone_geometry[position].name,
                geometry,
                snapshot,
                lists,
            )?;
        }
    }
    for (key, &position) in &lists.morph_geometry_map {
        if let Some(geometry) = snapshot.morph_geometries.get(key) {
            write_mesh(
                xml,
                &lists.morph_geometry[position].name,
                geometry,
                snapshot,
                lists,
            )?;
        }
    }

    xml.end()
}

fn write_mesh<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    name: &str,
    geometry: &GeometryData,
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
) -> Result<()> {
    xml.begin("geometry")?;
    xml.attr("id", name)?;
    xml.attr("name", name)?;
    xml.begin("mesh")?;

    write_attribute_source(
        xml,
        &format!("{}-positions", name),
        geometry.positions.iter().flat_map(|v| [v.x, v.y, v.z]),
        geometry.positions.len(),
        &["X", "Y", "Z"],
    )?;
    if geometry.has_normals() {
        write_attribute_source(
            xml,
            &format!("{}-normals", name),
            geometry.normals.iter().flat_map(|v| [v.x, v.y, v.z]),
            geometry.normals.len(),
            &["X", "Y", "Z"],
        )?;
    }
    if geometry.has_tex_coords() {
        write_attribute_source(
            xml,
            &format!("{}-texcoords", name),
            geometry.tex_coords.iter().flat_map(|v| [v.x, v.y]),
            geometry.tex_coords.len(),
            &["S", "T"],
        )?;
    }
    if geometry.has_colors() {
        write_attribute_source(
            xml,
            &format!("{}-colors", name),
            geometry.colors.iter().flat_map(|v| [v.x, v.y, v.z]),
            geometry.colors.len(),
            &["R", "G", "B"],
        )?;
    }

    xml.begin("vertices")?;
    xml.attr("id", &format!("{}-vertices", name))?;
    xml.begin("input")?;
    xml.attr("semantic", "POSITION")?;
    xml.attr("source", &format!("#{}-positions", name))?;
    xml.end()?;
    xml.end()?;

    // Partition by material id; -1 collects unassigned polygons and
    // sorts first.
    let mut buckets: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (index, polygon) in geometry.polygons().iter().enumerate() {
        buckets.entry(polygon.material_id).or_default().push(index);
    }

    for (&material_id, polygon_indices) in &buckets {
        write_triangles(xml, name, geometry, material_id, polygon_indices, snapshot, lists)?;
    }

    xml.end()?;
    xml.end()
}

fn write_triangles<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    name: &str,
    geometry: &GeometryData,
    material_id: i32,
    polygon_indices: &[usize],
    snapshot: &SceneSnapshot,
    lists: &DocumentLists,
) -> Result<()> {
    xml.begin("triangles")?;
    xml.attr_usize("count", polygon_indices.len())?;
    if material_id >= 0 {
        if let Some(symbol) = material_symbol(material_id, snapshot, lists) {
            xml.attr("material", symbol)?;
        }
    }

    // Offsets are contiguous over the streams this mesh carries.
    let mut offset = 0usize;
    write_triangle_input(xml, "VERTEX", &format!("#{}-vertices", name), offset)?;
    offset += 1;
    let normal_offset = geometry.has_normals().then(|| {
        let o = offset;
        offset += 1;
        o
    });
    if let Some(o) = normal_offset {
        write_triangle_input(xml, "NORMAL", &format!("#{}-normals", name), o)?;
    }
    let tex_coord_offset = geometry.has_tex_coords().then(|| {
        let o = offset;
        offset += 1;
        o
    });
    if let Some(o) = tex_coord_offset {
        write_triangle_input(xml, "TEXCOORD", &format!("#{}-texcoords", name), o)?;
    }
    let color_offset = geometry.has_colors().then(|| {
        let o = offset;
        offset += 1;
        o
    });
    if let Some(o) = color_offset {
        write_triangle_input(xml, "COLOR", &format!("#{}-colors", name), o)?;
    }

    xml.begin("p")?;
    let mut indices: Vec<i64> = Vec::new();
    for &polygon_index in polygon_indices {
        let polygon = &geometry.polygons()[polygon_index];
        for vertex in &polygon.vertices {
            indices.push(vertex.position_index().unwrap_or(0) as i64);
            if normal_offset.is_some() {
                indices.push(vertex.normal_index().unwrap_or(0) as i64);
            }
            if tex_coord_offset.is_some() {
                indices.push(vertex.tex_coord_index().unwrap_or(0) as i64);
            }
            if color_offset.is_some() {
                indices.push(vertex.color_index().unwrap_or(0) as i64);
            }
        }
    }
    xml.text_ints(indices)?;
    xml.end()?;

    xml.end()
}

/// Resolve a polygon material id to the exported material name.
pub(super) fn material_symbol<'a>(
    material_id: i32,
    snapshot: &SceneSnapshot,
    lists: &'a DocumentLists,
) -> Option<&'a str> {
    let material_index = snapshot.materials.find_by_id(material_id)?;
    let position = *lists.material_map.get(&material_index)?;
    Some(&lists.materials[position].name)
}

fn write_triangle_input<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    semantic: &str,
    source: &str,
    offset: usize,
) -> Result<()> {
    xml.begin("input")?;
    xml.attr("semantic", semantic)?;
    xml.attr("source", source)?;
    xml.attr_usize("offset", offset)?;
    xml.end()
}

fn write_attribute_source<K: XmlSink>(
    xml: &mut XmlWriter<K>,
    id: &str,
    values: impl Iterator<Item = f32>,
    count: usize,
    params: &[&str],
) -> Result<()> {
    let stride = params.len();
    xml.begin("source")?;
    xml.attr("id", id)?;
    xml.begin("float_array")?;
    xml.attr("id", &format!("{}-array", id))?;
    xml.attr_usize("count", count * stride)?;
    xml.text_floats(values)?;
    xml.end()?;
    xml.begin("technique_common")?;
    xml.begin("accessor")?;
    xml.attr("source", &format!("#{}-array", id))?;
    xml.attr_usize("count", count)?;
    xml.attr_usize("stride", stride)?;
    for param in params {
        xml.begin("param")?;
        xml.attr("name", param)?;
        xml.attr("type", "float")?;
        xml.end()?;
    }
    xml.end()?;
    xml.end()?;
    xml.end()
}
