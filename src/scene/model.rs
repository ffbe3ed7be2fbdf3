//! Model nodes: the per-file transform hierarchy.

use crate::util::math::{BBox, Vec3};
use crate::util::{Error, Result};

/// Helper node kind (point or dummy box).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelperKind {
    Point,
    Dummy,
}

/// Helper metadata attached to non-drawable nodes.
#[derive(Clone, Debug)]
pub struct Helper {
    pub kind: HelperKind,
    pub bounding_box: Option<BBox>,
}

/// One node in the model tree.
#[derive(Clone, Debug)]
pub struct Model {
    handle: u64,
    name: String,
    parent: Option<usize>,
    pub translation: Vec3,
    /// XYZ Euler angles in degrees.
    pub rotation_deg: Vec3,
    pub scale: Vec3,
    pub helper: Option<Helper>,
    pub properties: String,
    pub has_geometry: bool,
}

impl Model {
    pub fn handle(&self) -> u64 {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent model index; `None` for roots.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }
}

/// Model tree for one geometry file. Parents always precede children,
/// so the structure is a tree, never a DAG.
#[derive(Clone, Debug, Default)]
pub struct ModelData {
    models: Vec<Model>,
}

impl ModelData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model and return its index. The parent, when given, must
    /// refer to an earlier-indexed model.
    pub fn add_model(
        &mut self,
        handle: u64,
        name: &str,
        parent: Option<usize>,
    ) -> Result<usize> {
        if let Some(p) = parent {
            if p >= self.models.len() {
                return Err(Error::invalid(format!(
                    "model \"{}\" references parent {} before it exists",
                    name, p
                )));
            }
        }
        self.models.push(Model {
            handle,
            name: name.to_string(),
            parent,
            translation: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
            scale: Vec3::ONE,
            helper: None,
            properties: String::new(),
            has_geometry: false,
        });
        Ok(self.models.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Model> {
        self.models.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    /// Indices of root models, in insertion order.
    pub fn root_indices(&self) -> Vec<usize> {
        self.models
            .iter()
            .enumerate()
            .filter(|(_, m)| m.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the direct children of `index`, in insertion order.
    pub fn children_of(&self, index: usize) -> Vec<usize> {
        self.models
            .iter()
            .enumerate()
            .filter(|(_, m)| m.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_shape() {
        let mut data = ModelData::new();
        let root = data.add_model(1, "root", None).unwrap();
        let a = data.add_model(2, "a", Some(root)).unwrap();
        let b = data.add_model(3, "b", Some(root)).unwrap();
        let c = data.add_model(4, "c", Some(a)).unwrap();

        assert_eq!(data.root_indices(), vec![root]);
        assert_eq!(data.children_of(root), vec![a, b]);
        assert_eq!(data.children_of(a), vec![c]);
        assert_eq!(data.children_of(c), Vec::<usize>::new());
    }

    #[test]
    fn test_forward_parent_rejected() {
        let mut data = ModelData::new();
        assert!(data.add_model(1, "orphan", Some(0)).is_err());
    }
}
