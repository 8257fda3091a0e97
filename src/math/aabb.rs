//! Chunk bounding boxes

use crate::core::types::Vec3;

/// Axis-aligned box, `min <= max` on every axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self::new(center - half_extent, center + half_extent)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Inclusive on every face.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Distance to the closest point of the box; 0 inside.
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        p.clamp(self.min, self.max).distance(p)
    }

    /// Same box with the top face lifted by `height`.
    pub fn raised(&self, height: f32) -> Self {
        Self::new(self.min, self.max + Vec3::Y * height.max(0.0))
    }

    /// Corner farthest along `direction` (the p-vertex of a plane test).
    pub fn corner_toward(&self, direction: Vec3) -> Vec3 {
        Vec3::select(direction.cmpge(Vec3::ZERO), self.max, self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_half_extent() {
        let aabb = Aabb::from_center_half_extent(Vec3::new(1.0, 0.0, -1.0), Vec3::new(2.0, 10.0, 2.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(aabb.half_extent(), Vec3::new(2.0, 10.0, 2.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -10.0, -3.0));
    }

    #[test]
    fn test_contains_point_inclusive() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains_point(Vec3::splat(0.5)));
        assert!(aabb.contains_point(Vec3::ONE));
        assert!(!aabb.contains_point(Vec3::new(0.5, 1.01, 0.5)));
    }

    #[test]
    fn test_distance_to_point() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.distance_to_point(Vec3::splat(0.5)), 0.0);
        assert!((aabb.distance_to_point(Vec3::new(4.0, 0.5, 0.5)) - 3.0).abs() < 1e-6);
        assert!((aabb.distance_to_point(Vec3::new(4.0, 5.0, 0.5)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_raised_only_moves_top() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)).raised(0.5);
        assert_eq!(aabb.min, Vec3::splat(-1.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 1.5, 1.0));
        assert_eq!(Aabb::default().raised(-3.0), Aabb::default());
    }

    #[test]
    fn test_corner_toward() {
        let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.corner_toward(Vec3::new(1.0, -1.0, 0.0)), Vec3::new(1.0, -2.0, 3.0));
    }
}
