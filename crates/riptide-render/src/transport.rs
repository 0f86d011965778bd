//! Wave table upload: structured-buffer and uniform-array transports
//!
//! Exactly one transport is live at a time. The structured path keeps the
//! wave table in a storage buffer sized to the table; the fallback packs
//! each wave into a vec4 lane of a fixed-size uniform array. Scalar wave
//! uniforms are published unconditionally through `WaterGlobals` on every
//! rebuild, independent of the transport.

use crate::shaders::ShaderDefine;
use crate::slots::{WaterBinding, WaterLayouts};
use riptide_core::{max_wave_height, Wave};
use std::collections::HashMap;

/// Capacity of the uniform-array fallback transport.
pub const MAX_WAVE_COUNT: usize = 20;

/// Shader define toggled to match the live transport.
pub const USE_STRUCTURED_BUFFER: &str = "USE_STRUCTURED_BUFFER";

/// Scalar wave uniforms, published on every wave-table rebuild.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterGlobals {
    /// World-space height of the water surface.
    pub wave_height: f32,
    /// Average amplitude; see `riptide_core::max_wave_height`.
    pub max_wave_height: f32,
    /// Maximum visibility depth.
    pub max_depth: f32,
    pub wave_count: u32,
}

impl WaterGlobals {
    pub fn from_waves(waves: &[Wave], wave_height: f32, max_depth: f32) -> Self {
        Self {
            wave_height,
            max_wave_height: max_wave_height(waves),
            max_depth,
            wave_count: waves.len() as u32,
        }
    }
}

/// Which transport carries the wave table to the GPU.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportKind {
    StructuredBuffer,
    VectorArray,
}

/// Pick the transport for the current platform. The override flag, a
/// backend without storage buffers in the vertex/fragment stages, or a
/// browser target all force the fallback.
pub fn select_transport(
    compute_override: bool,
    storage_supported: bool,
    web_target: bool,
) -> TransportKind {
    if compute_override || !storage_supported || web_target {
        TransportKind::VectorArray
    } else {
        TransportKind::StructuredBuffer
    }
}

/// Probe whether the device can bind the wave table as a storage buffer.
pub fn storage_supported(device: &wgpu::Device) -> bool {
    device.limits().max_storage_buffers_per_shader_stage > 0
}

/// Serialized wave table, one variant per transport. Planning is pure so
/// the exclusivity and packing rules are testable without a device.
#[derive(Clone, Debug, PartialEq)]
pub enum UploadPlan {
    StructuredBuffer(Vec<Wave>),
    VectorArray {
        data: Box<[[f32; 4]; MAX_WAVE_COUNT]>,
        count: usize,
    },
}

impl UploadPlan {
    pub fn new(waves: &[Wave], kind: TransportKind) -> Self {
        match kind {
            TransportKind::StructuredBuffer => Self::StructuredBuffer(waves.to_vec()),
            TransportKind::VectorArray => {
                if waves.len() > MAX_WAVE_COUNT {
                    log::warn!(
                        "wave table has {} entries; uniform-array transport carries the first {}",
                        waves.len(),
                        MAX_WAVE_COUNT
                    );
                }
                let mut data = Box::new([[0.0f32; 4]; MAX_WAVE_COUNT]);
                let count = waves.len().min(MAX_WAVE_COUNT);
                for (lane, wave) in data.iter_mut().zip(waves.iter()) {
                    *lane = [wave.amplitude, wave.direction, wave.wavelength, wave.omni];
                }
                Self::VectorArray { data, count }
            }
        }
    }
}

/// Whether uploading `len` waves requires replacing a buffer of the given
/// element capacity. Zero-length tables keep a one-element allocation so
/// the binding stays valid.
pub fn needs_realloc(capacity: Option<usize>, len: usize) -> bool {
    capacity != Some(len.max(1))
}

const WAVE_STRIDE: u64 = std::mem::size_of::<Wave>() as u64;
const LANE_STRIDE: u64 = std::mem::size_of::<[f32; 4]>() as u64;

/// Owns the GPU side of the wave data: the globals uniform plus exactly one
/// transport buffer. Replacing the table destroys the old buffer before the
/// new one is allocated.
pub struct WaveUploader {
    kind: TransportKind,
    globals_buffer: Option<wgpu::Buffer>,
    wave_buffer: Option<wgpu::Buffer>,
    /// Element capacity of the live structured buffer.
    capacity: Option<usize>,
    bind_group: Option<wgpu::BindGroup>,
    allocations: u64,
}

impl WaveUploader {
    pub fn new(kind: TransportKind) -> Self {
        log::info!("Wave transport: {:?}", kind);
        Self {
            kind,
            globals_buffer: None,
            wave_buffer: None,
            capacity: None,
            bind_group: None,
            allocations: 0,
        }
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Number of wave-buffer allocations made so far.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Shader define matching the live transport. The opposite path's
    /// keyword is always off because a single boolean carries both.
    pub fn shader_defines(&self) -> HashMap<String, ShaderDefine> {
        let mut defines = HashMap::new();
        defines.insert(
            USE_STRUCTURED_BUFFER.to_string(),
            ShaderDefine::Bool(self.kind == TransportKind::StructuredBuffer),
        );
        defines
    }

    /// Publish the wave table and scalar uniforms.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &WaterLayouts,
        waves: &[Wave],
        globals: WaterGlobals,
    ) {
        let globals_buffer = self.globals_buffer.get_or_insert_with(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Water Globals"),
                size: std::mem::size_of::<WaterGlobals>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        queue.write_buffer(globals_buffer, 0, bytemuck::bytes_of(&globals));

        match UploadPlan::new(waves, self.kind) {
            UploadPlan::StructuredBuffer(table) => {
                if needs_realloc(self.capacity, table.len()) {
                    if let Some(old) = self.wave_buffer.take() {
                        old.destroy();
                        log::debug!("Released wave buffer ({:?} elements)", self.capacity);
                    }
                    let elements = table.len().max(1);
                    self.wave_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some("Wave Data Buffer"),
                        size: elements as u64 * WAVE_STRIDE,
                        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    }));
                    self.capacity = Some(elements);
                    self.allocations += 1;
                    self.bind_group = None;
                }
                if !table.is_empty() {
                    if let Some(buffer) = self.wave_buffer.as_ref() {
                        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&table));
                    }
                }
            }
            UploadPlan::VectorArray { data, count: _ } => {
                if self.wave_buffer.is_none() {
                    self.wave_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some("Wave Data Array"),
                        size: MAX_WAVE_COUNT as u64 * LANE_STRIDE,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    }));
                    self.capacity = Some(MAX_WAVE_COUNT);
                    self.allocations += 1;
                    self.bind_group = None;
                }
                if let Some(buffer) = self.wave_buffer.as_ref() {
                    queue.write_buffer(buffer, 0, bytemuck::cast_slice(&data[..]));
                }
            }
        }

        if self.bind_group.is_none() {
            self.bind_group = self.create_bind_group(device, layouts);
        }
    }

    fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layouts: &WaterLayouts,
    ) -> Option<wgpu::BindGroup> {
        let globals_buffer = self.globals_buffer.as_ref()?;
        let wave_buffer = self.wave_buffer.as_ref()?;
        let layout = match self.kind {
            TransportKind::StructuredBuffer => &layouts.water_structured,
            TransportKind::VectorArray => &layouts.water_uniform,
        };
        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water Data Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: WaterBinding::Globals.binding(),
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: WaterBinding::WaveData.binding(),
                    resource: wave_buffer.as_entire_binding(),
                },
            ],
        }))
    }

    /// Release the transport buffer. Safe to call when nothing was
    /// allocated, and after another release.
    pub fn release(&mut self) {
        if let Some(buffer) = self.wave_buffer.take() {
            buffer.destroy();
            log::debug!("Released wave buffer on teardown");
        }
        if let Some(buffer) = self.globals_buffer.take() {
            buffer.destroy();
        }
        self.capacity = None;
        self.bind_group = None;
    }

    pub fn is_allocated(&self) -> bool {
        self.wave_buffer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn wave(amplitude: f32) -> Wave {
        Wave::new(amplitude, 15.0, 8.0, Vec2::ZERO, false)
    }

    #[test]
    fn override_and_capability_force_the_fallback() {
        assert_eq!(
            select_transport(false, true, false),
            TransportKind::StructuredBuffer
        );
        assert_eq!(
            select_transport(true, true, false),
            TransportKind::VectorArray
        );
        assert_eq!(
            select_transport(false, false, false),
            TransportKind::VectorArray
        );
        assert_eq!(
            select_transport(false, true, true),
            TransportKind::VectorArray
        );
    }

    #[test]
    fn plan_is_exactly_one_variant() {
        let waves = vec![wave(1.0), wave(2.0)];
        match UploadPlan::new(&waves, TransportKind::StructuredBuffer) {
            UploadPlan::StructuredBuffer(table) => assert_eq!(table, waves),
            UploadPlan::VectorArray { .. } => panic!("wrong transport planned"),
        }
        match UploadPlan::new(&waves, TransportKind::VectorArray) {
            UploadPlan::VectorArray { data, count } => {
                assert_eq!(count, 2);
                assert_eq!(data[0], [1.0, 15.0, 8.0, 0.0]);
                assert_eq!(data[1], [2.0, 15.0, 8.0, 0.0]);
                assert_eq!(data[2], [0.0; 4]);
            }
            UploadPlan::StructuredBuffer(_) => panic!("wrong transport planned"),
        }
    }

    #[test]
    fn vector_array_is_bounded() {
        let waves: Vec<Wave> = (0..MAX_WAVE_COUNT + 5).map(|i| wave(i as f32)).collect();
        match UploadPlan::new(&waves, TransportKind::VectorArray) {
            UploadPlan::VectorArray { count, .. } => assert_eq!(count, MAX_WAVE_COUNT),
            UploadPlan::StructuredBuffer(_) => panic!("wrong transport planned"),
        }
    }

    #[test]
    fn realloc_only_on_size_change() {
        assert!(needs_realloc(None, 4));
        assert!(!needs_realloc(Some(4), 4));
        assert!(needs_realloc(Some(4), 7));
        // Zero-length tables share the one-element allocation.
        assert!(needs_realloc(None, 0));
        assert!(!needs_realloc(Some(1), 0));
        assert!(!needs_realloc(Some(1), 1));
    }

    #[test]
    fn globals_cover_the_empty_table() {
        let globals = WaterGlobals::from_waves(&[], 0.0, 40.0);
        assert_eq!(globals.wave_count, 0);
        assert_eq!(globals.max_wave_height, 0.0);
        assert_eq!(globals.max_depth, 40.0);
    }

    #[test]
    fn globals_follow_the_wave_table() {
        let waves = vec![wave(1.0), wave(3.0)];
        let globals = WaterGlobals::from_waves(&waves, 1.5, 25.0);
        assert_eq!(globals.wave_count, 2);
        assert_eq!(globals.max_wave_height, 2.0);
        assert_eq!(globals.wave_height, 1.5);
    }

    #[test]
    fn define_matches_the_transport() {
        let structured = WaveUploader::new(TransportKind::StructuredBuffer);
        match structured.shader_defines().get(USE_STRUCTURED_BUFFER) {
            Some(ShaderDefine::Bool(true)) => {}
            other => panic!("unexpected define: {:?}", other),
        }
        let fallback = WaveUploader::new(TransportKind::VectorArray);
        match fallback.shader_defines().get(USE_STRUCTURED_BUFFER) {
            Some(ShaderDefine::Bool(false)) => {}
            other => panic!("unexpected define: {:?}", other),
        }
    }

    #[test]
    fn release_without_allocation_is_a_noop() {
        let mut uploader = WaveUploader::new(TransportKind::StructuredBuffer);
        assert!(!uploader.is_allocated());
        uploader.release();
        uploader.release();
        assert!(!uploader.is_allocated());
        assert_eq!(uploader.allocations(), 0);
    }
}
