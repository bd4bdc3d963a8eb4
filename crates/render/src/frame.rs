use crate::Camera;
use glam::{Mat3, Mat4, Vec3};
use std::time::{Duration, Instant};

/// Timing for one frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Time since the previous tick.
    pub delta: f32,
    /// Wall-clock time since the clock started. Drives shader animation.
    pub elapsed: f32,
}

/// Tracks the last-frame timestamp for delta computation.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last: now,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        FrameTime {
            delta: delta.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.last.saturating_duration_since(self.start)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a backend needs from the camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
    pub time: f32,
}

impl FrameView {
    pub fn new(camera: &Camera, aspect_ratio: f32, time: f32) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect_ratio),
            eye: camera.position(),
            time,
        }
    }

    pub fn skybox_view(&self) -> Mat4 {
        skybox_view(self.view)
    }
}

/// Rotation-only copy of a view matrix, so the skybox stays centred on the
/// viewer.
pub fn skybox_view(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

/// Model transform of the water quad: the unit XY quad laid flat on the XZ
/// plane, then scaled up.
pub fn water_model_matrix(scale: f32) -> Mat4 {
    Mat4::from_rotation_x(-90.0_f32.to_radians()) * Mat4::from_scale(Vec3::splat(scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use waterscape_input::MoveDirection;

    #[test]
    fn tick_reports_delta_and_elapsed() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let first = clock.tick_at(t0 + Duration::from_millis(16));
        assert!((first.delta - 0.016).abs() < 1e-6);
        let second = clock.tick_at(t0 + Duration::from_millis(48));
        assert!((second.delta - 0.032).abs() < 1e-6);
        assert!((second.elapsed - 0.048).abs() < 1e-6);
        assert_eq!(clock.elapsed(), Duration::from_millis(48));
    }

    #[test]
    fn long_frame_moves_full_distance() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let frame = clock.tick_at(t0 + Duration::from_millis(500));
        assert!((frame.delta - 0.5).abs() < 1e-6);
        assert!((frame.elapsed - 0.5).abs() < 1e-6);

        let mut cam = Camera::default();
        cam.process_keyboard_input(MoveDirection::Forward, frame.delta);
        assert!((cam.position().z - 7.0).abs() < 1e-4);
    }

    #[test]
    fn same_instant_gives_zero_delta() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        assert_eq!(clock.tick_at(t0).delta, 0.0);
    }

    #[test]
    fn skybox_view_drops_translation() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(200.0, -30.0);
        cam.process_keyboard_input(MoveDirection::Forward, 2.0);
        let frame = FrameView::new(&cam, 2560.0 / 1080.0, 0.0);
        let sky = frame.skybox_view();

        assert_eq!(sky.w_axis, glam::Vec4::W);
        assert_eq!(Mat3::from_mat4(sky), Mat3::from_mat4(frame.view));
        // Translating the camera does not move the sky.
        let moved = skybox_view(Camera::default().view_matrix());
        let unmoved = skybox_view(Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y));
        assert!(moved.abs_diff_eq(unmoved, 1e-5));
    }

    #[test]
    fn water_quad_lies_flat() {
        let model = water_model_matrix(100.0);
        let corner = model.transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!(corner.abs_diff_eq(Vec3::new(50.0, 0.0, -50.0), 1e-3));
        let normal = model.transform_vector3(Vec3::Z).normalize();
        assert!(normal.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn frame_view_copies_camera_state() {
        let cam = Camera::default();
        let frame = FrameView::new(&cam, 1.5, 4.0);
        assert_eq!(frame.eye, cam.position());
        assert_eq!(frame.view, cam.view_matrix());
        assert_eq!(frame.projection, cam.projection_matrix(1.5));
        assert_eq!(frame.time, 4.0);
    }
}
