//! Per-vertex skinning weights.

use smallvec::SmallVec;

/// One (bone, weight) influence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexWeight {
    pub bone_index: usize,
    pub weight: f32,
}

/// Per-vertex influence lists. Weights are taken as supplied; callers
/// must normalize before populating.
#[derive(Clone, Debug, Default)]
pub struct SkinningData {
    vertices: Vec<SmallVec<[VertexWeight; 4]>>,
}

impl SkinningData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the influence list for the next vertex and return its index.
    pub fn add_vertex(&mut self, weights: impl IntoIterator<Item = VertexWeight>) -> usize {
        self.vertices.push(weights.into_iter().collect());
        self.vertices.len() - 1
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn weights(&self, vertex: usize) -> &[VertexWeight] {
        &self.vertices[vertex]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[VertexWeight]> {
        self.vertices.iter().map(|v| v.as_slice())
    }

    /// Total number of influences across all vertices.
    pub fn total_weights(&self) -> usize {
        self.vertices.iter().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_influence_lists() {
        let mut data = SkinningData::new();
        data.add_vertex([
            VertexWeight { bone_index: 0, weight: 0.75 },
            VertexWeight { bone_index: 2, weight: 0.25 },
        ]);
        data.add_vertex([VertexWeight { bone_index: 1, weight: 1.0 }]);

        assert_eq!(data.num_vertices(), 2);
        assert_eq!(data.total_weights(), 3);
        assert_eq!(data.weights(0)[1].bone_index, 2);
    }
}
