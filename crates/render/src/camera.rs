use glam::{Mat4, Vec3};
use waterscape_common::CameraConfig;
use waterscape_input::{HeldMoves, MoveDirection};

/// Fly camera driven by yaw/pitch in degrees. No roll.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    sensitivity: f32,
    fov: f32,
    fov_min: f32,
    fov_max: f32,
    pitch_limit: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        tracing::debug!(
            "camera at {:?}, yaw {} pitch {} fov {}",
            config.position,
            config.yaw,
            config.pitch,
            config.fov
        );
        Self {
            position: config.position,
            world_up: config.world_up.normalize_or(Vec3::Y),
            yaw: config.yaw,
            pitch: config.pitch.clamp(-config.pitch_limit, config.pitch_limit),
            speed: config.speed,
            sensitivity: config.sensitivity,
            fov: config.fov.clamp(config.fov_min, config.fov_max),
            fov_min: config.fov_min,
            fov_max: config.fov_max,
            pitch_limit: config.pitch_limit,
            near: config.near,
            far: config.far,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(self.world_up).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.front()).normalize()
    }

    /// Move along the front or right vector by `speed * delta_time`.
    pub fn process_keyboard_input(&mut self, direction: MoveDirection, delta_time: f32) {
        let velocity = self.speed * delta_time;
        match direction {
            MoveDirection::Forward => self.position += self.front() * velocity,
            MoveDirection::Backward => self.position -= self.front() * velocity,
            MoveDirection::Left => self.position -= self.right() * velocity,
            MoveDirection::Right => self.position += self.right() * velocity,
        }
    }

    /// Apply every held direction for one frame. Directions compose additively.
    pub fn process_held_keys(&mut self, held: &HeldMoves, delta_time: f32) {
        for direction in held.iter() {
            self.process_keyboard_input(direction, delta_time);
        }
    }

    /// Turn by a mouse delta in pixels. Positive y looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.sensitivity;
        self.pitch = (self.pitch + y_offset * self.sensitivity)
            .clamp(-self.pitch_limit, self.pitch_limit);
    }

    /// Zoom by narrowing the field of view. Positive offsets zoom in.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.fov = (self.fov - y_offset).clamp(self.fov_min, self.fov_max);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), self.up())
    }

    /// Perspective projection with a [0, 1] depth range.
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            1.0
        };
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }
}
