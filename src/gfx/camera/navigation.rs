//! Navigation mode switching
//!
//! Owns both controllers and the single source of truth for which one drives
//! the camera. The mode is a tagged enum rather than a pair of `enabled`
//! flags, so "exactly one controller active" holds by construction.

use cgmath::{Vector3, Zero};
use winit::event::{DeviceEvent, KeyEvent};

use crate::collision::CollisionMesh;
use crate::settings::ViewerSettings;

use super::camera::Camera;
use super::first_person::FirstPersonController;
use super::orbit::OrbitController;

/// Starting vantage when entering first-person mode.
const FIRST_PERSON_VANTAGE: Vector3<f32> = Vector3::new(10.0, 3.0, 1.5);

/// Starting vantage when entering the pulled-back third-person view.
const THIRD_PERSON_VANTAGE: Vector3<f32> = Vector3::new(15.0, 3.0, 1.5);

/// Distance along the view direction at which the orbit pivot is placed
/// when dropping back to orbit mode.
const ORBIT_PIVOT_DISTANCE: f32 = 2.0;

/// Which controller currently drives the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationMode {
    #[default]
    Orbit,
    /// Used for both the first-person and third-person toggles; the two
    /// differ only in their starting vantage.
    FirstPerson,
}

pub struct Navigator {
    mode: NavigationMode,
    orbit: OrbitController,
    first_person: FirstPersonController,
}

impl Navigator {
    /// Starts in orbit mode pivoting on the given point.
    pub fn new(camera: &mut Camera, pivot: Vector3<f32>) -> Self {
        let mut orbit = OrbitController::new(0.005, 0.1);
        orbit.retarget(camera, pivot);

        Self {
            mode: NavigationMode::Orbit,
            orbit,
            first_person: FirstPersonController::new(),
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn is_orbit_active(&self) -> bool {
        self.mode == NavigationMode::Orbit
    }

    pub fn is_first_person_active(&self) -> bool {
        self.mode == NavigationMode::FirstPerson
    }

    pub fn orbit(&self) -> &OrbitController {
        &self.orbit
    }

    pub fn first_person(&self) -> &FirstPersonController {
        &self.first_person
    }

    /// The mode-switch procedure. Called synchronously whenever a settings
    /// flag changes; also safe to call redundantly with an unchanged
    /// snapshot (same resulting mode and camera configuration).
    ///
    /// Precedence: `first_person` wins over `three_person`; with both off
    /// the camera drops back to orbiting a pivot two units ahead of it.
    pub fn apply_settings(&mut self, settings: &ViewerSettings, camera: &mut Camera) {
        if settings.first_person {
            self.enter_person_mode(FIRST_PERSON_VANTAGE, settings, camera);
        } else if settings.three_person {
            self.enter_person_mode(THIRD_PERSON_VANTAGE, settings, camera);
        } else {
            let pivot = camera.position + camera.forward() * ORBIT_PIVOT_DISTANCE;
            self.orbit.retarget(camera, pivot);
            self.mode = NavigationMode::Orbit;
        }
        log::debug!("navigation mode now {:?}", self.mode);
    }

    fn enter_person_mode(
        &mut self,
        vantage: Vector3<f32>,
        settings: &ViewerSettings,
        camera: &mut Camera,
    ) {
        camera.set_position(vantage);
        camera.look_at(Vector3::zero());
        self.first_person.configure(settings);
        self.first_person.sync_from_camera(camera);
        self.mode = NavigationMode::FirstPerson;
    }

    /// Per-tick controller advance; always runs before the frame is drawn.
    pub fn update(&mut self, dt: f32, camera: &mut Camera, colliders: Option<&CollisionMesh>) {
        match self.mode {
            NavigationMode::Orbit => self.orbit.update(camera),
            NavigationMode::FirstPerson => self.first_person.update(dt, camera, colliders),
        }
    }

    /// Routes pointer input to the active controller.
    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        match self.mode {
            NavigationMode::Orbit => self.orbit.process_device_event(event),
            NavigationMode::FirstPerson => self.first_person.process_device_event(event),
        }
    }

    /// Routes keyboard input to the active controller.
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        match self.mode {
            NavigationMode::Orbit => self.orbit.process_keyboard_event(event),
            NavigationMode::FirstPerson => self.first_person.process_keyboard_event(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn setup() -> (Camera, Navigator) {
        let mut camera = Camera::new(FIRST_PERSON_VANTAGE, Vector3::zero(), 1.0);
        let navigator = Navigator::new(&mut camera, Vector3::zero());
        (camera, navigator)
    }

    fn settings(first: bool, three: bool) -> ViewerSettings {
        ViewerSettings {
            first_person: first,
            three_person: three,
            ..ViewerSettings::default()
        }
    }

    #[test]
    fn test_first_person_flag_enables_first_person() {
        let (mut camera, mut navigator) = setup();

        // gravity/collision/easing state must not matter for mode selection
        for extras in [false, true] {
            let snapshot = ViewerSettings {
                first_person: true,
                gravity: extras,
                collision: extras,
                position_easing: extras,
                three_person: extras,
            };
            navigator.apply_settings(&snapshot, &mut camera);
            assert!(navigator.is_first_person_active());
            assert!(!navigator.is_orbit_active());
            assert_eq!(camera.position, FIRST_PERSON_VANTAGE);
        }
    }

    #[test]
    fn test_three_person_flag_uses_pulled_back_vantage() {
        let (mut camera, mut navigator) = setup();
        navigator.apply_settings(&settings(false, true), &mut camera);

        assert!(navigator.is_first_person_active());
        assert!(!navigator.is_orbit_active());
        assert_eq!(camera.position, THIRD_PERSON_VANTAGE);
        assert_ne!(THIRD_PERSON_VANTAGE, FIRST_PERSON_VANTAGE);
    }

    #[test]
    fn test_first_person_takes_precedence_over_three_person() {
        let (mut camera, mut navigator) = setup();
        navigator.apply_settings(&settings(true, true), &mut camera);
        assert_eq!(camera.position, FIRST_PERSON_VANTAGE);
    }

    #[test]
    fn test_both_off_enables_orbit_with_pivot_ahead() {
        let (mut camera, mut navigator) = setup();

        // Enter first person, then drop back to orbit
        navigator.apply_settings(&settings(true, false), &mut camera);
        let forward = camera.forward();
        let expected_pivot = camera.position + forward * 2.0;

        navigator.apply_settings(&settings(false, false), &mut camera);
        assert!(navigator.is_orbit_active());
        assert!(!navigator.is_first_person_active());

        let pivot_error = (navigator.orbit().target - expected_pivot).magnitude();
        assert!(pivot_error < 1e-5);

        let pivot_distance = (navigator.orbit().target - camera.position).magnitude();
        assert!((pivot_distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_mode_switch_is_idempotent() {
        let (mut camera, mut navigator) = setup();

        let snapshot = ViewerSettings {
            first_person: true,
            gravity: true,
            collision: true,
            position_easing: false,
            three_person: false,
        };
        navigator.apply_settings(&snapshot, &mut camera);
        let mode_once = navigator.mode();
        let position_once = camera.position;
        let target_once = camera.target;

        navigator.apply_settings(&snapshot, &mut camera);
        assert_eq!(navigator.mode(), mode_once);
        assert_eq!(camera.position, position_once);
        assert_eq!(camera.target, target_once);

        // Orbit branch too: pivot derivation must be stable under repetition
        let orbit_snapshot = settings(false, false);
        navigator.apply_settings(&orbit_snapshot, &mut camera);
        let pivot_once = navigator.orbit().target;
        navigator.apply_settings(&orbit_snapshot, &mut camera);
        let pivot_twice = navigator.orbit().target;
        assert!((pivot_once - pivot_twice).magnitude() < 1e-5);
    }

    #[test]
    fn test_exactly_one_mode_after_every_switch() {
        let (mut camera, mut navigator) = setup();

        let cases = [
            (false, false),
            (true, false),
            (false, true),
            (true, true),
            (false, false),
        ];
        for (first, three) in cases {
            navigator.apply_settings(&settings(first, three), &mut camera);
            assert_ne!(
                navigator.is_orbit_active(),
                navigator.is_first_person_active()
            );
        }
    }

    #[test]
    fn test_flag_propagation_scenario() {
        let (mut camera, mut navigator) = setup();
        let snapshot = ViewerSettings {
            first_person: true,
            gravity: true,
            collision: false,
            position_easing: true,
            three_person: false,
        };
        navigator.apply_settings(&snapshot, &mut camera);

        assert!(navigator.first_person().apply_gravity);
        assert!(!navigator.first_person().apply_collision);
        assert!(navigator.first_person().position_easing);
        assert!(!navigator.is_orbit_active());
        assert_eq!(camera.position, Vector3::new(10.0, 3.0, 1.5));
    }

    #[test]
    fn test_update_runs_active_controller_only() {
        let (mut camera, mut navigator) = setup();
        navigator.apply_settings(&settings(true, false), &mut camera);

        // Accumulate orbit input while first person is active; dropping back
        // to orbit must not replay it (retarget clears pending state).
        navigator.apply_settings(&settings(false, false), &mut camera);
        let eye_before = camera.position;
        navigator.update(1.0 / 60.0, &mut camera, None);
        assert!((camera.position - eye_before).magnitude() < 1e-4);
    }
}
