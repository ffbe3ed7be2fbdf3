//! Materials.

/// One material slot.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    /// Numeric sub-material id; encoded as `id + 1` in the export name.
    pub id: i32,
    pub sub_material_name: String,
    pub handle: u64,
    /// Free-form properties consumed by the resource compiler through
    /// the encoded export name.
    pub properties: String,
}

/// Ordered collection of materials for one export.
#[derive(Clone, Debug, Default)]
pub struct MaterialData {
    materials: Vec<Material>,
}

impl MaterialData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    /// Find the material with the given numeric id.
    pub fn find_by_id(&self, id: i32) -> Option<usize> {
        self.materials.iter().position(|m| m.id == id)
    }
}
