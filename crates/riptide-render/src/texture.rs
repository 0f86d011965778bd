//! Texture upload helpers and the baked absorption ramp

use riptide_core::{bake_ramp, Gradient, RAMP_WIDTH};

/// A GPU texture with its default view.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: (u32, u32),
}

impl GpuTexture {
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size: (width, height),
        }
    }

    /// 1x1 white fallback, used when a material has no texture assigned.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba8(
            device,
            queue,
            &[255, 255, 255, 255],
            1,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            Some("Default White Texture"),
        )
    }
}

/// The 128x1 absorption ramp sampled by the water surface shader.
///
/// Addressing clamps at the edges; pixel `i` is the gradient evaluated at
/// `i / 128`. Regenerated in place whenever the gradient changes.
pub struct RampTexture {
    gpu: GpuTexture,
    pub sampler: wgpu::Sampler,
}

impl RampTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, gradient: &Gradient) -> Self {
        let pixels = bake_ramp(|t| gradient.eval(t));
        let gpu = GpuTexture::from_rgba8(
            device,
            queue,
            &pixels,
            RAMP_WIDTH as u32,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            Some("Water Absorption Ramp"),
        );
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Ramp Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        log::debug!("Baked absorption ramp ({}x1)", RAMP_WIDTH);
        Self { gpu, sampler }
    }

    /// Re-bake the ramp after a gradient change; the texture is reused.
    pub fn regenerate(&mut self, queue: &wgpu::Queue, gradient: &Gradient) {
        let pixels = bake_ramp(|t| gradient.eval(t));
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.gpu.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * RAMP_WIDTH as u32),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: RAMP_WIDTH as u32,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.gpu.view
    }
}
