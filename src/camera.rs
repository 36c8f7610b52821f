//! Orbit camera, projection and the camera uniform.
//!
//! The camera always looks at its `target`. The [`OrbitController`] turns mouse drags
//! and wheel input into rotations around that target and dolly movement towards it,
//! smoothed with a damping factor the way browser orbit controls behave.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use instant::Duration;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Converts cgmath's OpenGL clip space (z in -1..1) to wgpu's (z in 0..1).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MIN_POLAR: f32 = 0.01;
const MAX_POLAR: f32 = std::f32::consts::PI - 0.01;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    /// Normalized direction from the target towards the camera.
    pub fn direction(&self) -> Vector3<f32> {
        let offset = self.position - self.target;
        if offset.magnitude2() > f32::EPSILON {
            offset.normalize()
        } else {
            Vector3::unit_z()
        }
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).magnitude()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse-driven orbit controls with damping.
#[derive(Debug)]
pub struct OrbitController {
    rotate_speed: f32,
    zoom_speed: f32,
    /// Fraction of the pending motion applied per 1/60 s.
    damping: f32,
    dragging: bool,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_zoom: f32,
}

impl OrbitController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            damping: 0.25,
            dragging: false,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_zoom: 0.0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.dragging = *state == ElementState::Pressed,
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.pending_zoom += scroll * self.zoom_speed;
            }
            _ => (),
        }
    }

    /// Raw mouse motion in pixels; only rotates while the left button is held.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        if !self.dragging {
            return;
        }
        self.pending_azimuth -= dx as f32 * self.rotate_speed;
        self.pending_polar -= dy as f32 * self.rotate_speed;
    }

    /// Drops any pending motion, e.g. after the camera was re-framed.
    pub fn reset(&mut self) {
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_zoom = 0.0;
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let frames = (dt.as_secs_f32() * 60.0).max(0.0);
        let factor = 1.0 - (1.0 - self.damping).powf(frames);
        let azimuth = self.pending_azimuth * factor;
        let polar = self.pending_polar * factor;
        let zoom = self.pending_zoom * factor;
        self.pending_azimuth -= azimuth;
        self.pending_polar -= polar;
        self.pending_zoom -= zoom;

        let offset = camera.position - camera.target;
        let radius = offset.magnitude();
        if radius <= f32::EPSILON {
            return;
        }
        // Spherical coordinates around the y axis
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        theta += azimuth;
        phi = (phi + polar).clamp(MIN_POLAR, MAX_POLAR);
        let radius = radius * 0.95_f32.powf(zoom);

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = camera.target + offset;
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
