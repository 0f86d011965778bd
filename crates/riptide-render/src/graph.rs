//! Per-camera pass list with explicit injection points
//!
//! The host pipeline exposes fixed injection slots; water passes declare
//! which slot they run in and the queue orders them by slot, preserving
//! enqueue order within a slot. Each pass walks Configure → Execute →
//! Cleanup once per camera per frame.

use crate::camera::{CameraInfo, TargetDescriptor};
use crate::slots::WaterLayouts;
use crate::Result;
use glam::Mat4;

/// Injection points the host pipeline offers, in frame order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassEvent {
    /// Before opaque geometry — off-screen inputs for later passes.
    BeforeOpaques,
    /// After the skybox, before transparents.
    AfterSkybox,
    /// After post-processing — debug visualization slot.
    AfterPostProcess,
}

/// Pass identifier
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct PassId(pub usize);

/// Render pass trait - implemented by the water passes
pub trait RenderPass: Send {
    /// Unique name for this pass
    fn name(&self) -> &str;

    /// Injection point this pass runs at
    fn event(&self) -> PassEvent;

    /// Per-camera target setup. Called before execution each frame;
    /// passes reallocate their targets here only when the camera's
    /// descriptor changed.
    fn configure(&mut self, _device: &wgpu::Device, _target: &TargetDescriptor) -> Result<()> {
        Ok(())
    }

    /// Record this pass's GPU work for the current camera.
    fn execute(&mut self, ctx: &mut PassContext) -> Result<()>;

    /// Release per-camera resources. Safe to call when nothing was created.
    fn cleanup(&mut self) {}
}

/// Context for pass execution
pub struct PassContext<'a> {
    /// Command encoder for recording GPU commands
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Camera the passes are running for
    pub camera: &'a CameraInfo,
    /// Camera bind group (group 0, shared by all water pipelines)
    pub camera_bind_group: &'a wgpu::BindGroup,
    /// Standard bind group layouts for lazy pipeline builds
    pub layouts: &'a WaterLayouts,
    /// Main color target of the camera
    pub target: &'a wgpu::TextureView,
    /// Orientation of the scene's directional light, if one exists
    pub sun: Option<Mat4>,
    pub frame: u64,
}

/// Ordered pass list for one camera.
pub struct PassQueue {
    passes: Vec<Box<dyn RenderPass>>,
}

impl PassQueue {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Add a pass to the queue
    pub fn add_pass(&mut self, pass: impl RenderPass + 'static) -> PassId {
        let id = PassId(self.passes.len());
        log::debug!("Enqueued pass '{}' at {:?}", pass.name(), pass.event());
        self.passes.push(Box::new(pass));
        id
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Execution order: stable sort by injection point, preserving enqueue
    /// order within an event.
    pub fn execution_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.passes.len()).collect();
        order.sort_by_key(|&i| self.passes[i].event());
        order
    }

    /// Configure every pass for the camera's target descriptor.
    pub fn configure(&mut self, device: &wgpu::Device, target: &TargetDescriptor) {
        for pass in &mut self.passes {
            if let Err(err) = pass.configure(device, target) {
                log::warn!("pass '{}' configure skipped: {}", pass.name(), err);
            }
        }
    }

    /// Execute all passes in injection order. A failing pass skips its
    /// visual for this frame; the frame keeps rendering.
    pub fn execute(&mut self, ctx: &mut PassContext) {
        for i in self.execution_order() {
            let name = self.passes[i].name().to_string();
            log::trace!("Executing pass '{}'", name);
            if let Err(err) = self.passes[i].execute(ctx) {
                log::warn!("pass '{}' skipped this frame: {}", name, err);
            }
        }
    }

    /// Tear down per-camera resources for every pass.
    pub fn cleanup(&mut self) {
        for pass in &mut self.passes {
            pass.cleanup();
        }
    }
}

impl Default for PassQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedPass {
        name: &'static str,
        event: PassEvent,
    }

    impl RenderPass for NamedPass {
        fn name(&self) -> &str {
            self.name
        }

        fn event(&self) -> PassEvent {
            self.event
        }

        fn execute(&mut self, _ctx: &mut PassContext) -> Result<()> {
            Ok(())
        }
    }

    fn queue_of(passes: &[(&'static str, PassEvent)]) -> PassQueue {
        let mut queue = PassQueue::new();
        for &(name, event) in passes {
            queue.add_pass(NamedPass { name, event });
        }
        queue
    }

    #[test]
    fn passes_run_in_event_order() {
        let queue = queue_of(&[
            ("caustics", PassEvent::AfterSkybox),
            ("water_fx", PassEvent::BeforeOpaques),
        ]);
        assert_eq!(queue.execution_order(), vec![1, 0]);
    }

    #[test]
    fn debug_retarget_moves_caustics_last() {
        let queue = queue_of(&[
            ("caustics", PassEvent::AfterPostProcess),
            ("water_fx", PassEvent::BeforeOpaques),
            ("other", PassEvent::AfterSkybox),
        ]);
        assert_eq!(queue.execution_order(), vec![1, 2, 0]);
    }

    #[test]
    fn enqueue_order_is_preserved_within_an_event() {
        let queue = queue_of(&[
            ("a", PassEvent::AfterSkybox),
            ("b", PassEvent::AfterSkybox),
            ("c", PassEvent::AfterSkybox),
        ]);
        assert_eq!(queue.execution_order(), vec![0, 1, 2]);
    }
}
