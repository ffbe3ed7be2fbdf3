//! Skeletons: per-(file, model) bone trees.

use crate::util::math::{Mat4, Vec3};
use crate::util::{Error, Result};

/// Joint limit axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitAxis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Joint limit extreme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitExtreme {
    Min = 0,
    Max = 1,
}

/// One bone in a skeleton.
#[derive(Clone, Debug)]
pub struct Bone {
    handle: u64,
    name: String,
    parent: Option<usize>,
    pub translation: Vec3,
    /// XYZ Euler angles in degrees.
    pub rotation_deg: Vec3,
    pub scale: Vec3,
    pub physicalized: bool,
    pub has_geometry: bool,
    /// Auxiliary transform for physics-proxy placement, independent of
    /// the skeletal parent transform.
    pub parent_frame: Option<Mat4>,
    limits: [[Option<f32>; 2]; 3],
    spring_tension: [Option<f32>; 3],
    spring_angle: [Option<f32>; 3],
    damping: [Option<f32>; 3],
    pub properties: String,
    pub geometry_properties: String,
}

impl Bone {
    pub fn handle(&self) -> u64 {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent bone index; `None` for roots.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn set_limit(&mut self, axis: LimitAxis, extreme: LimitExtreme, value: f32) {
        self.limits[axis as usize][extreme as usize] = Some(value);
    }

    pub fn limit(&self, axis: LimitAxis, extreme: LimitExtreme) -> Option<f32> {
        self.limits[axis as usize][extreme as usize]
    }

    pub fn set_spring_tension(&mut self, axis: LimitAxis, value: f32) {
        self.spring_tension[axis as usize] = Some(value);
    }

    pub fn spring_tension(&self, axis: LimitAxis) -> Option<f32> {
        self.spring_tension[axis as usize]
    }

    pub fn set_spring_angle(&mut self, axis: LimitAxis, value: f32) {
        self.spring_angle[axis as usize] = Some(value);
    }

    pub fn spring_angle(&self, axis: LimitAxis) -> Option<f32> {
        self.spring_angle[axis as usize]
    }

    pub fn set_damping(&mut self, axis: LimitAxis, value: f32) {
        self.damping[axis as usize] = Some(value);
    }

    pub fn damping(&self, axis: LimitAxis) -> Option<f32> {
        self.damping[axis as usize]
    }
}

/// Bone tree for one (geometry file, model) pair. Bone names must be
/// unique within a skeleton for `find_bone` to be meaningful.
#[derive(Clone, Debug, Default)]
pub struct SkeletonData {
    bones: Vec<Bone>,
}

impl SkeletonData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone and return its index. The parent, when given, must
    /// refer to an earlier-indexed bone.
    pub fn add_bone(&mut self, handle: u64, name: &str, parent: Option<usize>) -> Result<usize> {
        if let Some(p) = parent {
            if p >= self.bones.len() {
                return Err(Error::invalid(format!(
                    "bone \"{}\" references parent {} before it exists",
                    name, p
                )));
            }
        }
        self.bones.push(Bone {
            handle,
            name: name.to_string(),
            parent,
            translation: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
            scale: Vec3::ONE,
            physicalized: false,
            has_geometry: false,
            parent_frame: None,
            limits: [[None; 2]; 3],
            spring_tension: [None; 3],
            spring_angle: [None; 3],
            damping: [None; 3],
            properties: String::new(),
            geometry_properties: String::new(),
        });
        Ok(self.bones.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter()
    }

    /// Find a bone by name.
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Indices of root bones, in insertion order.
    pub fn root_indices(&self) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the direct children of `index`, in insertion order.
    pub fn children_of(&self, index: usize) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Move the named bone to index 1, remapping all parent references.
    ///
    /// Off by default; some loaders expect the pelvis at bone index 1.
    /// Returns `true` if a reorder happened.
    pub fn force_bone_at_index_1(&mut self, name: &str) -> bool {
        let from = match self.find_bone(name) {
            Some(i) if i != 1 => i,
            _ => return false,
        };
        if self.bones.len() < 2 || from == 0 {
            return false;
        }

        // Build the index permutation: old index -> new index.
        let mut order: Vec<usize> = (0..self.bones.len()).collect();
        order.remove(from);
        order.insert(1, from);
        let mut remap = vec![0usize; self.bones.len()];
        for (new_index, &old_index) in order.iter().enumerate() {
            remap[old_index] = new_index;
        }

        let mut reordered: Vec<Bone> = order
            .iter()
            .map(|&old_index| self.bones[old_index].clone())
            .collect();
        for bone in &mut reordered {
            bone.parent = bone.parent.map(|p| remap[p]);
        }
        self.bones = reordered;
        true
    }
}
