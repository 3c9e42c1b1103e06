use glam::Vec2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Inclusive overlap test against another box (touching edges count)
    pub fn touches(&self, other: &Aabb) -> bool {
        self.max.x >= other.min.x
            && self.min.x <= other.max.x
            && self.max.y >= other.min.y
            && self.min.y <= other.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center_size() {
        let aabb = Aabb::from_center_size(Vec2::new(400.0, 150.0), Vec2::new(10.0, 60.0));
        assert_eq!(aabb.min, Vec2::new(395.0, 120.0));
        assert_eq!(aabb.max, Vec2::new(405.0, 180.0));
    }

    #[test]
    fn test_touching_edges_overlap() {
        let a = Aabb::from_center_size(Vec2::new(5.0, 5.0), Vec2::splat(10.0));
        let b = Aabb::from_center_size(Vec2::new(15.0, 5.0), Vec2::splat(10.0));
        let c = Aabb::from_center_size(Vec2::new(15.5, 5.0), Vec2::splat(10.0));
        assert!(a.touches(&b), "Shared edge counts as contact");
        assert!(!a.touches(&c));
    }
}
