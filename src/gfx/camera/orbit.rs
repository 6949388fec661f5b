use cgmath::{InnerSpace, Vector3};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::camera::Camera;

/// Orbit navigation: the camera circles a pivot point under drag input.
///
/// Pointer input accumulates between frames and is consumed in [`update`],
/// so the controller follows the render loop's tick rather than the event
/// stream. With a damping factor below 1.0 only that fraction of the pending
/// input is applied per tick and the remainder decays geometrically.
///
/// [`update`]: OrbitController::update
pub struct OrbitController {
    pub target: Vector3<f32>,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub bounds: OrbitBounds,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Fraction of pending input applied per tick, in (0, 1]. 1.0 disables
    /// damping.
    pub damping_factor: f32,
    is_mouse_pressed: bool,
    is_shift_held: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
    pending_pan: (f32, f32),
}

impl OrbitController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            target: Vector3::new(0.0, 0.0, 0.0),
            distance: 2.0,
            pitch: 0.0,
            yaw: 0.0,
            bounds: OrbitBounds::default(),
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            damping_factor: 0.4,
            is_mouse_pressed: false,
            is_shift_held: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
            pending_pan: (0.0, 0.0),
        }
    }

    /// Re-seats the orbit around a new pivot without moving the eye.
    ///
    /// Distance, yaw and pitch are derived from the camera's current position
    /// relative to the pivot, so the view is continuous across a mode switch.
    pub fn retarget(&mut self, camera: &mut Camera, pivot: Vector3<f32>) {
        let offset = camera.position - pivot;
        let distance = offset.magnitude();

        self.target = pivot;
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        if distance > f32::EPSILON {
            self.pitch = (offset.y / distance)
                .clamp(-1.0, 1.0)
                .asin()
                .clamp(self.bounds.min_pitch, self.bounds.max_pitch);
            self.yaw = offset.x.atan2(offset.z);
        }

        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;
        self.pending_pan = (0.0, 0.0);

        camera.look_at(pivot);
    }

    /// Accumulates pointer input. Mutation of the camera waits for `update`.
    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                self.pending_zoom += scroll_amount * self.zoom_speed;
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    if self.is_shift_held {
                        // SHIFT + DRAG = PAN (move pivot point)
                        self.pending_pan.0 += -delta.0 as f32 * self.pan_speed;
                        self.pending_pan.1 += delta.1 as f32 * self.pan_speed;
                    } else {
                        // NORMAL DRAG = ROTATE (orbit around pivot)
                        self.pending_yaw += -delta.0 as f32 * self.rotate_speed;
                        self.pending_pitch += delta.1 as f32 * self.rotate_speed;
                    }
                }
            }
            _ => (),
        }
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        if let KeyEvent {
            physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
            state,
            ..
        } = event
        {
            self.is_shift_held = *state == ElementState::Pressed;
        }
    }

    /// Consumes accumulated input and writes the camera transform.
    pub fn update(&mut self, camera: &mut Camera) {
        let factor = self.damping_factor.clamp(f32::EPSILON, 1.0);

        let yaw_step = self.pending_yaw * factor;
        let pitch_step = self.pending_pitch * factor;
        let zoom_step = self.pending_zoom * factor;
        let pan_step = (self.pending_pan.0 * factor, self.pending_pan.1 * factor);
        self.pending_yaw -= yaw_step;
        self.pending_pitch -= pitch_step;
        self.pending_zoom -= zoom_step;
        self.pending_pan.0 -= pan_step.0;
        self.pending_pan.1 -= pan_step.1;

        self.yaw += yaw_step;
        self.pitch = (self.pitch + pitch_step).clamp(self.bounds.min_pitch, self.bounds.max_pitch);

        if zoom_step != 0.0 {
            // Scale the zoom step with distance so it feels uniform close-up
            // and far out.
            let next = self.distance + zoom_step * self.distance.max(0.1);
            self.distance = next.clamp(
                self.bounds.min_distance.unwrap_or(f32::EPSILON),
                self.bounds.max_distance.unwrap_or(f32::MAX),
            );
        }

        if pan_step != (0.0, 0.0) {
            self.pan(camera, pan_step);
        }

        camera.position = self.eye_position();
        camera.target = self.target;
    }

    /// Moves the pivot in the camera's view plane, distance-scaled.
    fn pan(&mut self, camera: &Camera, delta: (f32, f32)) {
        let forward = (self.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward).normalize();

        let pan_scale = self.distance * 0.1;
        self.target += right * delta.0 * pan_scale + up * delta.1 * pan_scale;
    }

    fn eye_position(&self) -> Vector3<f32> {
        self.target
            + Vector3::new(
                self.distance * self.yaw.sin() * self.pitch.cos(),
                self.distance * self.pitch.sin(),
                self.distance * self.yaw.cos() * self.pitch.cos(),
            )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(0.2),
            max_distance: Some(80.0),
            min_pitch: -std::f32::consts::PI / 2.0 + f32::EPSILON,
            max_pitch: std::f32::consts::PI / 2.0 - f32::EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        Camera::new(
            Vector3::new(10.0, 3.0, 1.5),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
        )
    }

    #[test]
    fn test_retarget_preserves_eye() {
        let mut camera = test_camera();
        let mut orbit = OrbitController::new(0.005, 0.1);

        let pivot = camera.position + camera.forward() * 2.0;
        let eye_before = camera.position;
        orbit.retarget(&mut camera, pivot);
        orbit.update(&mut camera);

        let error = (camera.position - eye_before).magnitude();
        assert!(error < 1e-4, "eye moved by {error}");
        assert_eq!(camera.target, pivot);
        assert!((orbit.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_undamped_input_drains_in_one_tick() {
        let mut camera = test_camera();
        let mut orbit = OrbitController::new(1.0, 0.1);
        orbit.damping_factor = 1.0;
        orbit.retarget(&mut camera, Vector3::new(0.0, 0.0, 0.0));

        orbit.is_mouse_pressed = true;
        orbit.process_device_event(&DeviceEvent::MouseMotion { delta: (2.0, 0.0) });
        let yaw_before = orbit.yaw;
        orbit.update(&mut camera);

        assert!((orbit.yaw - (yaw_before - 2.0)).abs() < 1e-5);
        assert_eq!(orbit.pending_yaw, 0.0);
    }

    #[test]
    fn test_damping_applies_fraction_and_converges() {
        let mut camera = test_camera();
        let mut orbit = OrbitController::new(1.0, 0.1);
        orbit.damping_factor = 0.5;
        orbit.retarget(&mut camera, Vector3::new(0.0, 0.0, 0.0));
        let yaw_start = orbit.yaw;

        orbit.is_mouse_pressed = true;
        orbit.process_device_event(&DeviceEvent::MouseMotion { delta: (-1.0, 0.0) });
        orbit.update(&mut camera);
        assert!((orbit.yaw - (yaw_start + 0.5)).abs() < 1e-5);

        for _ in 0..64 {
            orbit.update(&mut camera);
        }
        assert!((orbit.yaw - (yaw_start + 1.0)).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_clamped_to_bounds() {
        let mut camera = test_camera();
        let mut orbit = OrbitController::new(1.0, 0.1);
        orbit.damping_factor = 1.0;
        orbit.retarget(&mut camera, Vector3::new(0.0, 0.0, 0.0));

        orbit.is_mouse_pressed = true;
        orbit.process_device_event(&DeviceEvent::MouseMotion { delta: (0.0, 100.0) });
        orbit.update(&mut camera);
        assert!(orbit.pitch <= orbit.bounds.max_pitch);
        assert!(orbit.pitch >= orbit.bounds.min_pitch);
    }

    #[test]
    fn test_zoom_respects_min_distance() {
        let mut camera = test_camera();
        let mut orbit = OrbitController::new(1.0, 1.0);
        orbit.damping_factor = 1.0;
        orbit.retarget(&mut camera, Vector3::new(0.0, 0.0, 0.0));

        for _ in 0..32 {
            orbit.process_device_event(&DeviceEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(0.0, 10.0),
            });
            orbit.update(&mut camera);
        }
        assert!(orbit.distance >= orbit.bounds.min_distance.unwrap());
    }

    #[test]
    fn test_released_button_ignores_motion() {
        let mut camera = test_camera();
        let mut orbit = OrbitController::new(1.0, 0.1);
        orbit.retarget(&mut camera, Vector3::new(0.0, 0.0, 0.0));
        let yaw = orbit.yaw;

        orbit.process_device_event(&DeviceEvent::MouseMotion { delta: (5.0, 5.0) });
        orbit.update(&mut camera);
        assert_eq!(orbit.yaw, yaw);
    }
}
