//! Canvas-space camera for 2D simulations

use glam::{Mat4, Vec2};

/// Orthographic camera that maps canvas pixels (origin top-left, y down)
/// onto clip space.
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub extent: Vec2,
}

impl Camera2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            extent: Vec2::new(width, height),
        }
    }

    /// Get the view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        // A zero-sized window would produce a singular projection
        let width = self.extent.x.max(1.0);
        let height = self.extent.y.max(1.0);

        Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.extent = Vec2::new(width, height);
    }

    /// Aspect ratio of the canvas (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        if self.extent.y > 0.0 {
            self.extent.x / self.extent.y
        } else {
            1.0
        }
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub extent: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_2d(camera: &Camera2D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            extent: [camera.extent.x, camera.extent.y, 0.0, 1.0],
        }
    }
}
