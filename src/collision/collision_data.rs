use crate::bodies::RigidBody;
use crate::math::Vector3;

/// Raw contact geometry for one candidate point, as produced by narrow-phase detection.
///
/// The normal is unit length and points from body A towards body B. The local
/// offsets are world-aligned lever arms from each body's center to its contact
/// point; the world points are those contact points at detection time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// Unit contact normal, from A to B
    pub normal: Vector3,

    /// Contact point relative to body A's center
    pub local_a: Vector3,

    /// Contact point relative to body B's center
    pub local_b: Vector3,

    /// Deepest point of A inside B, in world space, at detection time
    pub world_a: Vector3,

    /// Deepest point of B inside A, in world space, at detection time
    pub world_b: Vector3,

    /// Overlap depth along the normal (positive when penetrating)
    pub penetration: f32,
}

impl CollisionData {
    /// Creates collision data from explicit values
    pub fn new(
        normal: Vector3,
        local_a: Vector3,
        local_b: Vector3,
        world_a: Vector3,
        world_b: Vector3,
        penetration: f32,
    ) -> Self {
        Self {
            normal,
            local_a,
            local_b,
            world_a,
            world_b,
            penetration,
        }
    }

    /// Derives offsets and depth from the two world contact points and the bodies' current positions
    pub fn from_world_points(
        body_a: &RigidBody,
        body_b: &RigidBody,
        world_a: Vector3,
        world_b: Vector3,
        normal: Vector3,
    ) -> Self {
        let normal = normal.normalize();

        Self {
            normal,
            local_a: world_a - body_a.get_position(),
            local_b: world_b - body_b.get_position(),
            world_a,
            world_b,
            penetration: (world_a - world_b).dot(&normal),
        }
    }

    /// The same contact described from body B's point of view
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            local_a: self.local_b,
            local_b: self.local_a,
            world_a: self.world_b,
            world_b: self.world_a,
            penetration: self.penetration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_from_world_points() {
        let ground = RigidBody::new_static(Vector3::new(0.0, -0.5, 0.0));
        let cube = RigidBody::new_dynamic(Vector3::new(0.0, 0.45, 0.0), 1.0);

        // The cube's bottom face sits 0.05 below the ground's top face.
        let data = CollisionData::from_world_points(
            &ground,
            &cube,
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, -0.05, 0.0),
            Vector3::unit_y(),
        );

        assert!((data.penetration - 0.05).abs() < 1e-6);
        assert_eq!(data.local_a, Vector3::new(0.0, 0.5, 0.0));
        assert!((data.local_b.y + 0.5).abs() < 1e-6);

        let flipped = data.flipped();
        assert_eq!(flipped.normal, -Vector3::unit_y());
        assert_eq!(flipped.world_a, data.world_b);
        assert_eq!(flipped.penetration, data.penetration);
    }
}
