use nalgebra::UnitQuaternion;
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;

use super::constants::physics as consts;

// Collision groups: the character capsule only collides with level geometry,
// and probe queries only see level geometry (never the capsule itself).
const GROUP_STATIC: Group = Group::GROUP_1; // Walls, floors, ramps
const GROUP_CHARACTER: Group = Group::GROUP_2; // Player capsule

/// Result of a shape sweep against level geometry.
#[derive(Debug, Clone, Copy)]
pub struct SweepHit {
    /// Distance travelled along the sweep direction before contact
    pub distance: f32,
    /// Contact point on the hit surface (world space)
    pub point: Vector<Real>,
    /// Surface normal at the contact, opposing the sweep direction
    pub normal: Vector<Real>,
}

/// Result of a line trace against level geometry.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vector<Real>,
    pub normal: Vector<Real>,
}

/// Wrapper around the Rapier3D pipeline for the movement arena: static level
/// geometry plus one or more dynamic character capsules driven by explicit
/// velocity writes.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Creates an empty physics world. World gravity only affects free dynamic
    /// bodies; character capsules carry gravity scale 0.
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -consts::WORLD_GRAVITY, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Steps the physics simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Refresh the query pipeline so probes see the current collider poses.
    /// Required before probing whenever colliders moved outside of `step`.
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Adds an axis-aligned or rotated box of level geometry.
    pub fn add_static_box(
        &mut self,
        position: [f32; 3],
        rotation: UnitQuaternion<f32>,
        size: [f32; 3],
    ) -> ColliderHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![position[0], position[1], position[2]])
            .rotation(rotation.scaled_axis())
            .build();
        let handle = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::cuboid(size[0] / 2.0, size[1] / 2.0, size[2] / 2.0)
            .collision_groups(InteractionGroups::new(GROUP_STATIC, Group::ALL))
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set)
    }

    /// Convenience: a ramp is a box pitched about the X axis by `angle_deg`.
    pub fn add_ramp(&mut self, position: [f32; 3], angle_deg: f32, size: [f32; 3]) -> ColliderHandle {
        let rot = UnitQuaternion::from_axis_angle(&nalgebra::Vector3::x_axis(), angle_deg.to_radians());
        self.add_static_box(position, rot, size)
    }

    /// Adds the character capsule: a dynamic body locked to yaw-only rotation
    /// with gravity scale 0 (the movement core integrates its own gravity).
    /// `half_height` is the total capsule half height, hemispheres included.
    pub fn add_character(
        &mut self,
        position: [f32; 3],
        radius: f32,
        half_height: f32,
        mass: f32,
    ) -> RigidBodyHandle {
        // Mass lives entirely on the body: the capsule collider has zero
        // density, so a crouch resize never changes it. Zero principal
        // inertia keeps the locked rotation axes inert.
        let mass_props =
            MassProperties::new(point![0.0, 0.0, 0.0], mass, vector![0.0, 0.0, 0.0]);
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position[0], position[1], position[2]])
            .gravity_scale(0.0)
            .linear_damping(0.0)
            .angular_damping(1.0)
            .enabled_rotations(false, true, false)
            .additional_mass_properties(mass_props)
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        let collider = character_collider(radius, half_height);
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);
        // Rapier defers the mass-properties update until the next step;
        // force it so the configured mass is visible immediately.
        self.rigid_body_set[body_handle]
            .recompute_mass_properties_from_colliders(&self.collider_set);

        body_handle
    }

    /// Checks whether a body handle still refers to a live body
    pub fn body_exists(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.get(handle).is_some()
    }

    pub fn get_translation(&self, handle: RigidBodyHandle) -> Option<Vector<Real>> {
        self.rigid_body_set.get(handle).map(|b| *b.translation())
    }

    pub fn get_rotation(&self, handle: RigidBodyHandle) -> Option<UnitQuaternion<f32>> {
        self.rigid_body_set.get(handle).map(|b| *b.rotation())
    }

    pub fn get_linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vector<Real>> {
        self.rigid_body_set.get(handle).map(|b| *b.linvel())
    }

    pub fn get_mass(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle).map(|b| b.mass())
    }

    /// Writes the authoritative velocity for this substep.
    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vector<Real>) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(velocity, true);
        }
    }

    /// Teleports the body by a world-space delta (jump ground clearance,
    /// crouch height compensation).
    pub fn add_translation(&mut self, handle: RigidBodyHandle, delta: Vector<Real>) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let next = *body.translation() + delta;
            body.set_translation(next, true);
        }
    }

    /// Sets the body's facing yaw (rotation about the world up axis).
    pub fn set_body_yaw(&mut self, handle: RigidBodyHandle, yaw_rad: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let rot = UnitQuaternion::from_axis_angle(&nalgebra::Vector3::y_axis(), yaw_rad);
            body.set_rotation(rot, true);
        }
    }

    /// Resizes the character capsule, keeping mass untouched (mass lives on
    /// the body, the collider carries zero density). The caller compensates
    /// the body translation for the height change.
    pub fn set_capsule_half_height(
        &mut self,
        handle: RigidBodyHandle,
        radius: f32,
        half_height: f32,
    ) {
        let Some(body) = self.rigid_body_set.get(handle) else {
            return;
        };
        let colliders: Vec<_> = body.colliders().to_vec();
        for collider_handle in colliders {
            self.collider_set.remove(
                collider_handle,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                true,
            );
        }
        let collider = character_collider(radius, half_height);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.rigid_body_set[handle]
            .recompute_mass_properties_from_colliders(&self.collider_set);
    }

    /// Sweeps a sphere from `origin` along `dir` (unit length) and returns the
    /// nearest level-geometry contact. The probing character is excluded.
    pub fn sweep_sphere(
        &self,
        origin: Vector<Real>,
        dir: Vector<Real>,
        radius: f32,
        max_dist: f32,
        exclude: RigidBodyHandle,
    ) -> Option<SweepHit> {
        let shape = Ball::new(radius);
        let pose = Isometry::translation(origin.x, origin.y, origin.z);
        let mut options = ShapeCastOptions::with_max_time_of_impact(max_dist);
        options.stop_at_penetration = true;

        let (_, hit) = self.query_pipeline.cast_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &pose,
            &dir,
            &shape,
            options,
            probe_filter(exclude),
        )?;

        // Make the normal oppose the sweep direction, then derive the surface
        // contact from the sphere center at impact (avoids relying on
        // witness-point conventions).
        let mut normal = *hit.normal1;
        if normal.dot(&dir) > 0.0 {
            normal = -normal;
        }
        let center_at_impact = origin + dir * hit.time_of_impact;
        Some(SweepHit {
            distance: hit.time_of_impact,
            point: center_at_impact - normal * radius,
            normal,
        })
    }

    /// Closest point on any level geometry within `max_dist` of `origin`.
    pub fn closest_surface_point(
        &self,
        origin: Vector<Real>,
        max_dist: f32,
        exclude: RigidBodyHandle,
    ) -> Option<Vector<Real>> {
        let point = point![origin.x, origin.y, origin.z];
        let (_, projection) = self.query_pipeline.project_point(
            &self.rigid_body_set,
            &self.collider_set,
            &point,
            true,
            probe_filter(exclude),
        )?;
        let projected = vector![projection.point.x, projection.point.y, projection.point.z];
        if (projected - origin).norm() <= max_dist {
            Some(projected)
        } else {
            None
        }
    }

    /// Line trace from `origin` toward `end`; returns the precise impact
    /// point and surface normal.
    pub fn line_trace(
        &self,
        origin: Vector<Real>,
        end: Vector<Real>,
        exclude: RigidBodyHandle,
    ) -> Option<RayHit> {
        let delta = end - origin;
        let max_dist = delta.norm();
        if max_dist < consts::EPSILON {
            return None;
        }
        let ray = Ray::new(point![origin.x, origin.y, origin.z], delta / max_dist);

        let (_, intersection) = self.query_pipeline.cast_ray_and_get_normal(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_dist,
            true,
            probe_filter(exclude),
        )?;

        Some(RayHit {
            distance: intersection.time_of_impact,
            point: ray.point_at(intersection.time_of_impact).coords,
            normal: intersection.normal,
        })
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Probe queries ignore the probing body and only see level geometry.
fn probe_filter(exclude: RigidBodyHandle) -> QueryFilter<'static> {
    QueryFilter::default()
        .exclude_rigid_body(exclude)
        .exclude_sensors()
        .groups(InteractionGroups::new(GROUP_CHARACTER, GROUP_STATIC))
}

fn character_collider(radius: f32, half_height: f32) -> Collider {
    // Rapier's capsule half height covers the cylinder only; ours includes
    // the hemisphere caps, matching how the probes measure ground distance.
    let cylinder_half = (half_height - radius).max(0.0);
    ColliderBuilder::capsule_y(cylinder_half, radius)
        .density(0.0)
        .collision_groups(InteractionGroups::new(GROUP_CHARACTER, GROUP_STATIC))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_world() -> (PhysicsWorld, RigidBodyHandle) {
        let mut world = PhysicsWorld::new();
        // Floor top at Y=0.
        world.add_static_box([0.0, -50.0, 0.0], UnitQuaternion::identity(), [2000.0, 100.0, 2000.0]);
        let body = world.add_character([0.0, 86.0, 0.0], 26.0, 86.0, 1.0);
        world.update_queries();
        (world, body)
    }

    #[test]
    fn test_character_mass_is_configured_mass() {
        let (world, body) = flat_world();
        let mass = world.get_mass(body).unwrap();
        assert!((mass - 1.0).abs() < 1e-4, "collider must not add mass, got {}", mass);
    }

    #[test]
    fn test_sweep_sphere_down_finds_floor() {
        let (world, body) = flat_world();
        let hit = world
            .sweep_sphere(
                vector![0.0, 86.0, 0.0],
                vector![0.0, -1.0, 0.0],
                26.0 * 0.95,
                9999.0,
                body,
            )
            .expect("floor should be hit");
        // Sphere bottom starts at 86 - 24.7 and stops at the floor top.
        assert!((hit.distance - (86.0 - 24.7)).abs() < 0.1, "distance {}", hit.distance);
        assert!(hit.point.y.abs() < 0.1, "impact at floor top, got {}", hit.point.y);
        assert!(hit.normal.y > 0.99);
    }

    #[test]
    fn test_sweep_excludes_own_capsule() {
        let (world, body) = flat_world();
        // A sweep starting inside the capsule must not hit it.
        let hit = world
            .sweep_sphere(vector![0.0, 86.0, 0.0], vector![0.0, -1.0, 0.0], 10.0, 9999.0, body)
            .unwrap();
        assert!(hit.distance > 50.0, "hit own capsule at {}", hit.distance);
    }

    #[test]
    fn test_line_trace_reports_wall_normal() {
        let (mut world, body) = flat_world();
        // Wall face at X=100.
        world.add_static_box([150.0, 100.0, 0.0], UnitQuaternion::identity(), [100.0, 400.0, 400.0]);
        world.update_queries();

        let hit = world
            .line_trace(vector![0.0, 86.0, 0.0], vector![300.0, 86.0, 0.0], body)
            .expect("wall should be hit");
        assert!((hit.distance - 100.0).abs() < 0.1);
        assert!(hit.normal.x < -0.99, "normal should face -X, got {:?}", hit.normal);
    }

    #[test]
    fn test_closest_surface_point_within_range() {
        let (mut world, body) = flat_world();
        world.add_static_box([150.0, 100.0, 0.0], UnitQuaternion::identity(), [100.0, 400.0, 400.0]);
        world.update_queries();

        // Floor is ~86 below the center, wall 100 away: the floor wins.
        let p = world
            .closest_surface_point(vector![0.0, 86.0, 0.0], 90.0, body)
            .expect("floor within range");
        assert!(p.y.abs() < 0.5);

        // Out of range returns None.
        assert!(world
            .closest_surface_point(vector![0.0, 500.0, 0.0], 90.0, body)
            .is_none());
    }

    #[test]
    fn test_capsule_resize_preserves_mass() {
        let (mut world, body) = flat_world();
        world.set_capsule_half_height(body, 26.0, 43.0);
        let mass = world.get_mass(body).unwrap();
        assert!((mass - 1.0).abs() < 1e-4);
        // Body still valid and movable.
        world.set_linear_velocity(body, vector![10.0, 0.0, 0.0]);
        assert!(world.get_linear_velocity(body).unwrap().x > 9.9);
    }
}
