//! Mesh geometry: flat attribute arrays plus indexed triangles.

use crate::util::math::{Vec2, Vec3};
use crate::util::{Error, Result};

/// Index value meaning "this attribute is unused for this vertex".
pub const INDEX_UNUSED: i32 = -1;

/// Per-corner attribute indices. Each index points into the matching
/// attribute array of the owning [`GeometryData`], or is
/// [`INDEX_UNUSED`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolygonVertex {
    pub position: i32,
    pub normal: i32,
    pub tex_coord: i32,
    pub color: i32,
}

impl PolygonVertex {
    /// A corner referencing only a position.
    pub fn position_only(position: i32) -> Self {
        Self {
            position,
            normal: INDEX_UNUSED,
            tex_coord: INDEX_UNUSED,
            color: INDEX_UNUSED,
        }
    }

    #[inline]
    pub fn position_index(&self) -> Option<usize> {
        index_opt(self.position)
    }

    #[inline]
    pub fn normal_index(&self) -> Option<usize> {
        index_opt(self.normal)
    }

    #[inline]
    pub fn tex_coord_index(&self) -> Option<usize> {
        index_opt(self.tex_coord)
    }

    #[inline]
    pub fn color_index(&self) -> Option<usize> {
        index_opt(self.color)
    }
}

#[inline]
fn index_opt(index: i32) -> Option<usize> {
    (index >= 0).then_some(index as usize)
}

/// One triangle with a material assignment. A material id of -1 means
/// "unassigned".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Polygon {
    pub material_id: i32,
    pub vertices: [PolygonVertex; 3],
}

/// Mesh data: attribute arrays plus triangle polygons.
#[derive(Clone, Debug, Default)]
pub struct GeometryData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub colors: Vec<Vec3>,
    polygons: Vec<Polygon>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a polygon, validating that every present index is in range.
    pub fn add_polygon(&mut self, polygon: Polygon) -> Result<()> {
        for vertex in &polygon.vertices {
            self.check_index(vertex.position_index(), self.positions.len(), "position")?;
            self.check_index(vertex.normal_index(), self.normals.len(), "normal")?;
            self.check_index(vertex.tex_coord_index(), self.tex_coords.len(), "texture coordinate")?;
            self.check_index(vertex.color_index(), self.colors.len(), "color")?;
        }
        self.polygons.push(polygon);
        Ok(())
    }

    fn check_index(&self, index: Option<usize>, len: usize, what: &str) -> Result<()> {
        match index {
            Some(i) if i >= len => Err(Error::invalid(format!(
                "{} index {} out of range (count {})",
                what, i, len
            ))),
            _ => Ok(()),
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_polygon_validates_indices() {
        let mut geometry = GeometryData::new();
        geometry.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];

        let ok = Polygon {
            material_id: 0,
            vertices: [
                PolygonVertex::position_only(0),
                PolygonVertex::position_only(1),
                PolygonVertex::position_only(2),
            ],
        };
        assert!(geometry.add_polygon(ok).is_ok());

        let bad = Polygon {
            material_id: 0,
            vertices: [
                PolygonVertex::position_only(0),
                PolygonVertex::position_only(1),
                PolygonVertex::position_only(3),
            ],
        };
        assert!(geometry.add_polygon(bad).is_err());
        assert_eq!(geometry.polygons().len(), 1);
    }

    #[test]
    fn test_unused_indices_skip_validation() {
        let mut geometry = GeometryData::new();
        geometry.positions = vec![Vec3::ZERO];
        // No normals exist, but -1 normals are fine.
        let polygon = Polygon {
            material_id: -1,
            vertices: [PolygonVertex::position_only(0); 3],
        };
        assert!(geometry.add_polygon(polygon).is_ok());
        assert!(!geometry.has_normals());
    }
}
