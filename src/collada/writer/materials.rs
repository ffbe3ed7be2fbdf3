//! Effect and material emission.
//!
//! One dummy Phong effect per material. No real shading data is
//! exported; the downstream compiler derives shading from the material's
//! encoded name.

use crate::collada::lists::DocumentLists;
use crate::collada::sink::XmlSink;
use crate::collada::xml::XmlWriter;
use crate::util::Result;

pub fn write_effects<K: XmlSink>(xml: &mut XmlWriter<K>, lists: &DocumentLists) -> Result<()> {
    xml.begin("library_effects")?;
    for effect in &lists.effects {
        xml.begin("effect")?;
        xml.attr("id", &effect.name)?;
        xml.attr("name", &effect.name)?;
        xml.begin("profile_COMMON")?;
        xml.begin("technique")?;
        xml.attr("sid", "common")?;
        xml.begin("phong")?;
        write_color(xml, "ambient", "0 0 0 1")?;
        write_color(xml, "diffuse", "1 1 1 1")?;
        write_color(xml, "specular", "0 0 0 1")?;
        xml.begin("shininess")?;
        xml.element_text("float", "0")?;
        xml.end()?;
        xml.end()?;
        xml.end()?;
        xml.end()?;
        xml.end()?;
    }
    xml.end()
}

fn write_color<K: XmlSink>(xml: &mut XmlWriter<K>, slot: &str, rgba: &str) -> Result<()> {
    xml.begin(slot)?;
    xml.element_text("color", rgba)?;
    xml.end()
}

pub fn write_materials<K: XmlSink>(xml: &mut XmlWriter<K>, lists: &DocumentLists) -> Result<()> {
    xml.begin("library_materials")?;
    for (position, material) in lists.materials.iter().enumerate() {
        xml.begin("material")?;
        xml.attr("id", &material.name)?;
        xml.attr("name", &material.name)?;
        xml.begin("instance_effect")?;
        xml.attr("url", &format!("#{}", lists.effects[position].name))?;
        xml.end()?;
        xml.end()?;
    }
    xml.end()
}
