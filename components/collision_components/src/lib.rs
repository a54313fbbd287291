use bevy::prelude::*;

pub struct CollisionComponentsPlugin;

impl Plugin for CollisionComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AabbCollider>()
            .register_type::<ColliderType>();
    }
}

/// Axis-aligned rectangle in world space.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds2D {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds2D {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Overlap on both axes. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds2D) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColliderType {
    #[default]
    Bullet,
    Enemy,
    Player,
}

/// Box collider attached to a unit or skill instance.
///
/// Registered with the collision registry while its owner is active. A
/// collider with `enabled == false` stays registered but is skipped by the
/// scan.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct AabbCollider {
    pub size: Vec2,
    pub offset: Vec2,
    pub kind: ColliderType,
    pub enabled: bool,
}

impl Default for AabbCollider {
    fn default() -> Self {
        Self {
            size: Vec2::ONE,
            offset: Vec2::ZERO,
            kind: ColliderType::default(),
            enabled: true,
        }
    }
}

impl AabbCollider {
    pub fn new(kind: ColliderType, size: Vec2) -> Self {
        Self {
            size,
            kind,
            ..default()
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// World bounds for an owner standing at `position`.
    pub fn bounds(&self, position: Vec2) -> Bounds2D {
        Bounds2D::from_center_size(position + self.offset, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes_intersect() {
        let a = Bounds2D::from_center_size(Vec2::ZERO, Vec2::splat(2.0));
        let b = Bounds2D::from_center_size(Vec2::new(1.5, 0.5), Vec2::splat(2.0));

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Bounds2D::new(Vec2::ZERO, Vec2::ONE);
        let right = Bounds2D::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        let above = Bounds2D::new(Vec2::new(0.0, 1.0), Vec2::new(1.0, 2.0));

        assert!(!a.intersects(&right));
        assert!(!a.intersects(&above));
    }

    #[test]
    fn overlap_on_one_axis_only_is_not_enough() {
        let a = Bounds2D::new(Vec2::ZERO, Vec2::ONE);
        let b = Bounds2D::new(Vec2::new(0.5, 3.0), Vec2::new(1.5, 4.0));

        assert!(!a.intersects(&b));
    }

    #[test]
    fn collider_bounds_follow_owner_and_offset() {
        let collider = AabbCollider::new(ColliderType::Enemy, Vec2::new(2.0, 4.0))
            .with_offset(Vec2::new(1.0, 0.0));

        let bounds = collider.bounds(Vec2::new(3.0, 3.0));

        assert_eq!(bounds.center(), Vec2::new(4.0, 3.0));
        assert_eq!(bounds.min, Vec2::new(3.0, 1.0));
        assert_eq!(bounds.max, Vec2::new(5.0, 5.0));
    }
}
