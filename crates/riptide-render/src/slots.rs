//! Fixed bind-group layouts and named binding slots
//!
//! Every uniform the water system publishes has a compile-time slot here;
//! nothing is looked up by string at draw time. The layouts are built once
//! at startup and shared by every pipeline the subsystem creates.

/// Bindings of the water data group (globals + wave transport).
///
/// The group comes in two layout flavors, one per transport path; the
/// binding indices are identical so shader variants only differ in the
/// declared buffer type.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaterBinding {
    /// `WaterGlobals` uniform (wave height, max wave height, max depth, count).
    Globals = 0,
    /// Wave table: read-only storage buffer or fixed-size uniform array.
    WaveData = 1,
}

/// Bindings of the water texture group.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaterTexture {
    DepthMap = 0,
    AbsorptionRamp = 1,
    RampSampler = 2,
    DepthSampler = 3,
}

impl WaterBinding {
    pub const fn binding(self) -> u32 {
        self as u32
    }
}

impl WaterTexture {
    pub const fn binding(self) -> u32 {
        self as u32
    }
}

/// The bind group layouts used by all water pipelines.
pub struct WaterLayouts {
    /// Group 0: camera uniform.
    pub camera: wgpu::BindGroupLayout,
    /// Group 1: per-draw object uniform (model matrix).
    pub object: wgpu::BindGroupLayout,
    /// Water data group, structured-buffer transport.
    pub water_structured: wgpu::BindGroupLayout,
    /// Water data group, uniform-array fallback transport.
    pub water_uniform: wgpu::BindGroupLayout,
    /// Water texture group (depth map, absorption ramp, samplers).
    pub water_textures: wgpu::BindGroupLayout,
    /// Caustics material group (params uniform, caustic map, sampler).
    pub caustics_material: wgpu::BindGroupLayout,
}

impl WaterLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            camera: Self::create_camera_layout(device),
            object: Self::create_object_layout(device),
            water_structured: Self::create_water_layout(device, true),
            water_uniform: Self::create_water_layout(device, false),
            water_textures: Self::create_water_textures_layout(device),
            caustics_material: Self::create_caustics_layout(device),
        }
    }

    fn create_camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    fn create_object_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    /// Water data group. `structured` selects the storage-buffer transport;
    /// the fallback declares the wave table as a uniform array instead.
    fn create_water_layout(device: &wgpu::Device, structured: bool) -> wgpu::BindGroupLayout {
        let wave_data_ty = if structured {
            wgpu::BufferBindingType::Storage { read_only: true }
        } else {
            wgpu::BufferBindingType::Uniform
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(if structured {
                "Water Data Layout (structured)"
            } else {
                "Water Data Layout (uniform array)"
            }),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: WaterBinding::Globals.binding(),
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: WaterBinding::WaveData.binding(),
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wave_data_ty,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    fn create_water_textures_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Water Textures Layout"),
            entries: &[
                // Water depth map captured by the depth camera
                wgpu::BindGroupLayoutEntry {
                    binding: WaterTexture::DepthMap.binding(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // 128x1 absorption ramp
                wgpu::BindGroupLayoutEntry {
                    binding: WaterTexture::AbsorptionRamp.binding(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: WaterTexture::RampSampler.binding(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: WaterTexture::DepthSampler.binding(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        })
    }

    fn create_caustics_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Caustics Material Layout"),
            entries: &[
                // Caustics params (light matrix, model, blend distance, scale)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Caustic pattern texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_slots_are_stable() {
        assert_eq!(WaterBinding::Globals.binding(), 0);
        assert_eq!(WaterBinding::WaveData.binding(), 1);
        assert_eq!(WaterTexture::DepthMap.binding(), 0);
        assert_eq!(WaterTexture::AbsorptionRamp.binding(), 1);
        assert_eq!(WaterTexture::RampSampler.binding(), 2);
        assert_eq!(WaterTexture::DepthSampler.binding(), 3);
    }
}
