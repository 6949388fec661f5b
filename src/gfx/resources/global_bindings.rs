//! Global uniform bindings for camera and scene data
//!
//! Manages the per-frame uniform buffer shared by every pipeline: camera
//! matrices (including the inverse used to unproject background rays), the
//! directional light, and the tone-mapping exposure. Bound to slot 0 in all
//! render pipelines.

use cgmath::InnerSpace;

use crate::{
    gfx::camera::CameraUniform,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// MUST match the Globals struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    inv_view_proj: [[f32; 4]; 4],

    light_direction: [f32; 3],
    _padding0: f32,
    light_color: [f32; 3],
    light_intensity: f32,

    exposure: f32,
    _padding1: [f32; 3],
}

unsafe impl bytemuck::Pod for GlobalUBOContent {}
unsafe impl bytemuck::Zeroable for GlobalUBOContent {}

/// Directional light configuration.
#[derive(Copy, Clone, Debug)]
pub struct LightConfig {
    /// Direction the light travels, world space. Normalized on upload.
    pub direction: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [-0.6, -1.0, -0.4],
            color: [1.0, 1.0, 1.0],
            intensity: 2.5,
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Updates the global uniform buffer with camera, light, and exposure data.
///
/// Called once per frame before any pass samples the globals.
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: LightConfig,
    exposure: f32,
) {
    let direction = cgmath::Vector3::from(light.direction).normalize();

    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        inv_view_proj: camera.inv_view_proj,

        light_direction: direction.into(),
        _padding0: 0.0,
        light_color: light.color,
        light_intensity: light.intensity,

        exposure,
        _padding1: [0.0; 3],
    };

    ubo.update_content(queue, content);
}

/// Manages bind group layouts and bind groups for global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // Globals (camera + light + exposure)
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group with the provided uniform buffer. Must be
    /// called before rendering.
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layouts(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// # Panics
    /// Panics if `create_bind_group()` hasn't been called yet
    pub fn bind_groups(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}
