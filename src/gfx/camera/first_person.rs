use cgmath::{InnerSpace, Vector3, Zero};
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::collision::{CollisionMesh, Ray};
use crate::settings::ViewerSettings;

use super::camera::Camera;

/// Pitch limit just shy of straight up/down to keep the view matrix stable.
const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Eye height above the ground when gravity is keeping the camera grounded.
const EYE_HEIGHT: f32 = 1.7;

/// How far ahead of the eye a horizontal step is blocked by geometry.
const COLLISION_MARGIN: f32 = 0.4;

/// Free-moving navigation: drag to look, WASD (or arrows) to move in the
/// yaw plane. Gravity, collision and position easing are opt-in via the
/// settings panel and are propagated on every mode switch.
///
/// Collision geometry is a non-owning association: the scene owns the mesh
/// and the controller receives it by reference each tick. Until the model
/// has loaded there is no mesh, and both collision and gravity are inert.
pub struct FirstPersonController {
    pub move_speed: f32,
    pub look_sensitivity: f32,
    pub apply_gravity: bool,
    pub apply_collision: bool,
    pub position_easing: bool,
    /// Easing rate in 1/seconds; higher converges faster.
    pub easing_rate: f32,
    pub gravity: f32,
    position: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    velocity: Vector3<f32>,
    vertical_velocity: f32,
    keys: KeyState,
    is_mouse_pressed: bool,
    pending_yaw: f32,
    pending_pitch: f32,
}

#[derive(Debug, Default, Clone, Copy)]
struct KeyState {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl FirstPersonController {
    pub fn new() -> Self {
        Self {
            move_speed: 3.0,
            look_sensitivity: 0.003,
            apply_gravity: false,
            apply_collision: false,
            position_easing: false,
            easing_rate: 8.0,
            gravity: 9.81,
            position: Vector3::zero(),
            yaw: 0.0,
            pitch: 0.0,
            velocity: Vector3::zero(),
            vertical_velocity: 0.0,
            keys: KeyState::default(),
            is_mouse_pressed: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }

    /// Copies the physics/easing toggles out of a settings snapshot.
    pub fn configure(&mut self, settings: &ViewerSettings) {
        self.apply_gravity = settings.gravity;
        self.apply_collision = settings.collision;
        self.position_easing = settings.position_easing;
    }

    /// Adopts the camera's position and view direction so the first frame
    /// after a mode switch continues looking the same way.
    pub fn sync_from_camera(&mut self, camera: &Camera) {
        let forward = camera.forward();
        self.position = camera.position;
        self.yaw = forward.x.atan2(-forward.z);
        self.pitch = forward.y.clamp(-1.0, 1.0).asin();
        self.velocity = Vector3::zero();
        self.vertical_velocity = 0.0;
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// View direction derived from yaw and pitch.
    pub fn forward(&self) -> Vector3<f32> {
        Vector3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed;
        if let PhysicalKey::Code(code) = event.physical_key {
            match code {
                KeyCode::KeyW | KeyCode::ArrowUp => self.keys.forward = pressed,
                KeyCode::KeyS | KeyCode::ArrowDown => self.keys.backward = pressed,
                KeyCode::KeyA | KeyCode::ArrowLeft => self.keys.left = pressed,
                KeyCode::KeyD | KeyCode::ArrowRight => self.keys.right = pressed,
                _ => (),
            }
        }
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    self.pending_yaw += delta.0 as f32 * self.look_sensitivity;
                    self.pending_pitch += -delta.1 as f32 * self.look_sensitivity;
                }
            }
            _ => (),
        }
    }

    /// Advances one tick: look, move, gravity, then camera write-back.
    pub fn update(&mut self, dt: f32, camera: &mut Camera, colliders: Option<&CollisionMesh>) {
        // Clamp dt so a stalled frame cannot teleport the camera.
        let dt = dt.clamp(0.0001, 0.1);

        self.yaw += self.pending_yaw;
        self.pitch = (self.pitch + self.pending_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;

        self.step_movement(dt, colliders);
        self.step_gravity(dt, colliders);

        camera.position = self.position;
        camera.target = self.position + self.forward();
    }

    fn step_movement(&mut self, dt: f32, colliders: Option<&CollisionMesh>) {
        // Movement stays in the yaw plane: looking up should not fly you up.
        let forward_flat = Vector3::new(self.yaw.sin(), 0.0, -self.yaw.cos());
        let right_flat = Vector3::new(-forward_flat.z, 0.0, forward_flat.x);

        let mut wish = Vector3::zero();
        if self.keys.forward {
            wish += forward_flat;
        }
        if self.keys.backward {
            wish -= forward_flat;
        }
        if self.keys.right {
            wish += right_flat;
        }
        if self.keys.left {
            wish -= right_flat;
        }

        let target_velocity = if wish.magnitude2() > 0.0 {
            wish.normalize() * self.move_speed
        } else {
            Vector3::zero()
        };

        if self.position_easing {
            // Exponential smoothing toward the commanded velocity;
            // frame-rate independent.
            let blend = 1.0 - (-self.easing_rate * dt).exp();
            self.velocity += (target_velocity - self.velocity) * blend;
        } else {
            self.velocity = target_velocity;
        }

        let step = self.velocity * dt;
        let step_len = step.magnitude();
        if step_len <= f32::EPSILON {
            return;
        }

        if self.apply_collision {
            if let Some(mesh) = colliders {
                let ray = Ray::new(self.position, step / step_len);
                if let Some(hit) = mesh.raycast(&ray, step_len + COLLISION_MARGIN) {
                    // Stop short of the surface; sliding is not attempted.
                    let allowed = (hit - COLLISION_MARGIN).max(0.0).min(step_len);
                    self.position += ray.direction * allowed;
                    self.velocity = Vector3::zero();
                    return;
                }
            }
        }

        self.position += step;
    }

    fn step_gravity(&mut self, dt: f32, colliders: Option<&CollisionMesh>) {
        if !self.apply_gravity {
            self.vertical_velocity = 0.0;
            return;
        }

        // Without geometry there is nothing to stand on; falling forever
        // through an unloaded scene helps nobody, so gravity waits for the
        // model like collision does.
        let Some(mesh) = colliders else {
            self.vertical_velocity = 0.0;
            return;
        };
        let Some(ground) = mesh.ground_height(self.position, EYE_HEIGHT, 100.0) else {
            self.vertical_velocity = 0.0;
            return;
        };

        self.vertical_velocity -= self.gravity * dt;
        self.position.y += self.vertical_velocity * dt;

        let floor = ground + EYE_HEIGHT;
        if self.position.y <= floor {
            self.position.y = floor;
            self.vertical_velocity = 0.0;
        }
    }
}

impl Default for FirstPersonController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Matrix4;

    fn camera_at_origin_vantage() -> Camera {
        Camera::new(
            Vector3::new(10.0, 3.0, 1.5),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
        )
    }

    fn floor_mesh(height: f32) -> CollisionMesh {
        let positions = [
            [-50.0, height, -50.0],
            [50.0, height, -50.0],
            [50.0, height, 50.0],
            [-50.0, height, 50.0],
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        let mut mesh = CollisionMesh::new();
        mesh.add_geometry(&positions, &indices, Matrix4::from_scale(1.0));
        mesh
    }

    #[test]
    fn test_configure_propagates_flags() {
        let mut controller = FirstPersonController::new();
        let settings = ViewerSettings {
            first_person: true,
            gravity: true,
            collision: false,
            position_easing: true,
            three_person: false,
        };
        controller.configure(&settings);
        assert!(controller.apply_gravity);
        assert!(!controller.apply_collision);
        assert!(controller.position_easing);
    }

    #[test]
    fn test_sync_preserves_view_direction() {
        let camera = camera_at_origin_vantage();
        let mut controller = FirstPersonController::new();
        controller.sync_from_camera(&camera);

        let expected = camera.forward();
        let actual = controller.forward();
        assert!((expected - actual).magnitude() < 1e-4);
        assert_eq!(controller.position(), camera.position);
    }

    #[test]
    fn test_forward_key_moves_in_view_direction() {
        let mut camera = Camera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            1.0,
        );
        let mut controller = FirstPersonController::new();
        controller.sync_from_camera(&camera);
        controller.keys.forward = true;

        controller.update(1.0 / 60.0, &mut camera, None);
        assert!(camera.position.z < 0.0);
        assert!(camera.position.x.abs() < 1e-5);
        assert!(camera.position.y.abs() < 1e-5);
    }

    #[test]
    fn test_easing_converges_to_commanded_speed() {
        let mut camera = Camera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            1.0,
        );
        let mut controller = FirstPersonController::new();
        controller.sync_from_camera(&camera);
        controller.position_easing = true;
        controller.keys.forward = true;

        controller.update(1.0 / 60.0, &mut camera, None);
        let early_speed = controller.velocity.magnitude();
        assert!(early_speed > 0.0);
        assert!(early_speed < controller.move_speed);

        for _ in 0..240 {
            controller.update(1.0 / 60.0, &mut camera, None);
        }
        assert!((controller.velocity.magnitude() - controller.move_speed).abs() < 0.05);
    }

    #[test]
    fn test_gravity_without_geometry_is_inert() {
        let mut camera = camera_at_origin_vantage();
        let mut controller = FirstPersonController::new();
        controller.sync_from_camera(&camera);
        controller.apply_gravity = true;

        let y_before = controller.position().y;
        for _ in 0..60 {
            controller.update(1.0 / 60.0, &mut camera, None);
        }
        assert_eq!(controller.position().y, y_before);
    }

    #[test]
    fn test_gravity_settles_on_ground() {
        let mut camera = camera_at_origin_vantage();
        let mut controller = FirstPersonController::new();
        controller.sync_from_camera(&camera);
        controller.apply_gravity = true;

        let mesh = floor_mesh(0.0);
        for _ in 0..600 {
            controller.update(1.0 / 60.0, &mut camera, Some(&mesh));
        }
        assert!((controller.position().y - EYE_HEIGHT).abs() < 1e-3);
        assert_eq!(camera.position.y, controller.position().y);
    }

    #[test]
    fn test_collision_blocks_step_into_wall() {
        let mut camera = Camera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            1.0,
        );
        let mut controller = FirstPersonController::new();
        controller.sync_from_camera(&camera);
        controller.apply_collision = true;
        controller.keys.forward = true;

        // Wall across the path at z = -1
        let positions = [
            [-5.0, -5.0, -1.0],
            [5.0, -5.0, -1.0],
            [5.0, 5.0, -1.0],
            [-5.0, 5.0, -1.0],
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        let mut wall = CollisionMesh::new();
        wall.add_geometry(&positions, &indices, Matrix4::from_scale(1.0));

        for _ in 0..600 {
            controller.update(1.0 / 60.0, &mut camera, Some(&wall));
        }
        // Stopped short of the wall by the collision margin.
        assert!(controller.position().z > -1.0);
        assert!(controller.position().z < -(1.0 - COLLISION_MARGIN) + 1e-3);
    }

    #[test]
    fn test_collision_allows_walk_parallel_to_wall() {
        let mut camera = Camera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            1.0,
        );
        let mut controller = FirstPersonController::new();
        controller.sync_from_camera(&camera);
        controller.apply_collision = true;
        controller.keys.forward = true;

        let positions = [
            [-5.0, -5.0, -1.0],
            [5.0, -5.0, -1.0],
            [5.0, 5.0, -1.0],
            [-5.0, 5.0, -1.0],
        ];
        let indices = [0u32, 1, 2, 0, 2, 3];
        let mut wall = CollisionMesh::new();
        wall.add_geometry(&positions, &indices, Matrix4::from_scale(1.0));

        for _ in 0..60 {
            controller.update(1.0 / 60.0, &mut camera, Some(&wall));
        }
        assert!(controller.position().x > 1.0);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = camera_at_origin_vantage();
        let mut controller = FirstPersonController::new();
        controller.sync_from_camera(&camera);

        controller.is_mouse_pressed = true;
        controller.process_device_event(&DeviceEvent::MouseMotion {
            delta: (0.0, -10000.0),
        });
        controller.update(1.0 / 60.0, &mut camera, None);
        assert!(controller.pitch <= PITCH_LIMIT);
        assert!(controller.pitch >= -PITCH_LIMIT);
    }
}
