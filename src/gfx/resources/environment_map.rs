//! Environment map binding
//!
//! Owns the equirectangular environment texture and its bind group. Starts
//! with a 1x1 neutral placeholder so both shading pipelines can bind group 3
//! from the first frame; the real map swaps in when the loader delivers it.

use crate::assets::EnvironmentImage;
use crate::wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

use super::texture_resource::TextureResource;

/// Dim neutral gray so an unlit scene is visible before the map arrives.
const PLACEHOLDER_TEXEL: [f32; 4] = [0.18, 0.18, 0.18, 1.0];

pub struct EnvironmentMapBinding {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
    texture: TextureResource,
    loaded: bool,
}

impl EnvironmentMapBinding {
    /// Creates the layout and binds the placeholder texture.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Environment Bind Group Layout");

        let texture = TextureResource::create_environment_map(
            device,
            queue,
            bytemuck::cast_slice(&PLACEHOLDER_TEXEL),
            1,
            1,
            "Environment Placeholder",
        );

        let bind_group = Self::build_bind_group(device, &bind_group_layout, &texture);

        Self {
            bind_group_layout,
            bind_group,
            texture,
            loaded: false,
        }
    }

    /// Swaps in a decoded environment map.
    pub fn replace(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &EnvironmentImage) {
        self.texture = TextureResource::create_environment_map(
            device,
            queue,
            image.as_bytes(),
            image.width,
            image.height,
            "Environment Map",
        );
        self.bind_group = Self::build_bind_group(device, &self.bind_group_layout, &self.texture);
        self.loaded = true;
    }

    fn build_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        texture: &TextureResource,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(wgpu::BindingResource::TextureView(&texture.view))
            .resource(wgpu::BindingResource::Sampler(&texture.sampler))
            .create(device, "Environment Bind Group")
    }

    /// True once the real map replaced the placeholder.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
