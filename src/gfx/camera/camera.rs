use cgmath::{perspective, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera shared by both navigation controllers.
///
/// Position and look target live in world space with +Y up. The aspect ratio
/// must always match the viewport; the resize handler keeps it that way and
/// the projection is rebuilt from scratch on every `update_view_proj`.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera {
    pub fn new(position: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            target,
            up: Vector3::unit_y(),
            aspect,
            fovy: cgmath::Deg(65.0).into(),
            znear: 0.01,
            zfar: 100.0,
            uniform: CameraUniform::default(),
        };
        camera.update_view_proj();
        camera
    }

    /// Unit vector from the eye toward the look target.
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.position).normalize()
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    pub fn look_at(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    /// Recomputes the aspect ratio after a viewport size change. Calling with
    /// the same size repeatedly has no further effect.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    /// Refreshes the GPU-facing uniform from the current camera state.
    pub fn update_view_proj(&mut self) {
        let view_proj = self.build_view_projection_matrix();
        self.uniform.view_position =
            [self.position.x, self.position.y, self.position.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(view_proj);
        // The background pass unprojects screen rays; a non-invertible
        // view-proj cannot occur with a valid perspective but fall back to
        // identity rather than poisoning the uniform with NaNs.
        let inverse = view_proj.invert().unwrap_or_else(Matrix4::identity);
        self.uniform.inv_view_proj = convert_matrix4_to_array(inverse);
    }
}

/// GPU-facing camera data.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],

    /// Inverse of the view projection matrix, used to unproject screen rays
    /// for the environment background pass.
    pub inv_view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
            inv_view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_is_normalized() {
        let camera = Camera::new(
            Vector3::new(10.0, 3.0, 1.5),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
        );
        let forward = camera.forward();
        assert!((forward.magnitude() - 1.0).abs() < 1e-6);
        // Pointing back toward the origin
        assert!(forward.x < 0.0);
    }

    #[test]
    fn test_resize_updates_aspect_exactly() {
        let mut camera = Camera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 0.0), 1.0);
        camera.resize_projection(1920, 1080);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);

        // Idempotent
        camera.resize_projection(1920, 1080);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn test_uniform_tracks_position() {
        let mut camera = Camera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 0.0), 1.0);
        camera.set_position(Vector3::new(1.0, 2.0, 3.0));
        camera.update_view_proj();
        assert_eq!(camera.uniform.view_position, [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_inverse_view_proj_round_trips() {
        let mut camera = Camera::new(Vector3::new(4.0, 2.0, 7.0), Vector3::new(0.0, 1.0, 0.0), 1.5);
        camera.update_view_proj();

        let vp = Matrix4::from(camera.uniform.view_proj);
        let inv = Matrix4::from(camera.uniform.inv_view_proj);
        let product = vp * inv;
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((product[i][j] - expected).abs() < 1e-4);
            }
        }
    }
}
