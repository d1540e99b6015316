//! Goal bodies turn slowly in place so the player can spot them

use possession_core::wrap_degrees;
use possession_physics::PhysicsService;

use crate::possession::PossessionController;

/// Spins every unpossessed goal body about the world up axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSpinner {
    /// Yaw rate in degrees per second
    pub degrees_per_second: f32,
}

impl GoalSpinner {
    pub fn new(degrees_per_second: f32) -> Self {
        Self { degrees_per_second }
    }

    pub fn spin(&self, dt: f32, controller: &PossessionController, physics: &mut dyn PhysicsService) {
        if self.degrees_per_second == 0.0 {
            return;
        }

        let possessed = controller.possessed();
        for body in controller.bodies().filter(|body| body.is_goal()) {
            if body.id() == possessed {
                continue;
            }
            let Some(mut pose) = physics.pose(body.id()) else {
                continue;
            };
            pose.orientation.y = wrap_degrees(pose.orientation.y + self.degrees_per_second * dt);
            physics.set_pose(body.id(), pose);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::possession::{BodyTag, PossessableBody, PossessionConfig};
    use crate::test_support::SpherePhysics;
    use glam::Vec3;
    use possession_core::{BodyId, Pose};

    #[test]
    fn test_spins_only_unpossessed_goals() {
        let bodies = vec![
            PossessableBody::new(BodyId(1), "start", Pose::default()),
            PossessableBody::new(BodyId(2), "goal", Pose::from_position(Vec3::X * 5.0))
                .with_tag(BodyTag::Goal { level_id: 1 }),
            PossessableBody::new(BodyId(3), "prop", Pose::from_position(Vec3::X * 9.0)),
        ];
        let controller =
            PossessionController::new(PossessionConfig::default(), bodies, BodyId(1)).unwrap();
        let mut physics = SpherePhysics::default();
        for (id, x) in [(1, 0.0), (2, 5.0), (3, 9.0)] {
            physics.add_body(BodyId(id), Vec3::X * x, 0.5);
        }

        let spinner = GoalSpinner::new(10.0);
        spinner.spin(0.5, &controller, &mut physics);
        spinner.spin(0.5, &controller, &mut physics);

        let goal = physics.pose(BodyId(2)).unwrap();
        assert!((goal.orientation.y - 10.0).abs() < 1e-4);
        assert_eq!(goal.position, Vec3::X * 5.0);
        assert_eq!(physics.pose(BodyId(3)).unwrap().orientation, Vec3::ZERO);
        assert_eq!(physics.pose(BodyId(1)).unwrap().orientation, Vec3::ZERO);
    }
}
