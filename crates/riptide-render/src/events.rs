//! Begin-camera-rendering event hub
//!
//! The host pipeline fires this once per camera per frame. Observers hold a
//! `Subscription` guard; dropping it unregisters, so release happens on
//! every exit path. Registration and deregistration are symmetric and
//! idempotent.

use crate::camera::CameraInfo;
use crate::mesh::GpuMesh;
use glam::Mat4;
use std::sync::{Arc, Mutex, Weak};

/// A mesh submitted for direct drawing by the host, with its draw flags.
#[derive(Clone)]
pub struct WaterDraw {
    pub mesh: GpuMesh,
    pub transform: Mat4,
    pub cast_shadows: bool,
    pub use_light_probes: bool,
}

/// Per-camera draw sink observers push into.
#[derive(Default)]
pub struct DrawSubmission {
    pub meshes: Vec<WaterDraw>,
}

impl DrawSubmission {
    pub fn new() -> Self {
        Self { meshes: Vec::new() }
    }
}

type CameraCallback = Box<dyn FnMut(&CameraInfo, &mut DrawSubmission) + Send>;

struct EventsInner {
    next_id: u64,
    subscribers: Vec<(u64, CameraCallback)>,
}

/// The host's per-camera event, modeled as an explicit observer registry.
#[derive(Clone)]
pub struct CameraEvents {
    inner: Arc<Mutex<EventsInner>>,
}

impl CameraEvents {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventsInner {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register an observer. The returned guard unregisters on drop.
    pub fn subscribe(
        &self,
        callback: impl FnMut(&CameraInfo, &mut DrawSubmission) + Send + 'static,
    ) -> Subscription {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        log::debug!("Camera event subscriber {} registered", id);
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }

    /// Fire the event for one camera, collecting submitted draws.
    pub fn dispatch(&self, camera: &CameraInfo, submission: &mut DrawSubmission) {
        let mut inner = self.inner.lock().unwrap();
        for (_, callback) in inner.subscribers.iter_mut() {
            callback(camera, submission);
        }
    }
}

impl Default for CameraEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped registration with the camera event. Dropping unregisters; a
/// guard outliving the hub unregisters nothing.
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<EventsInner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.lock().unwrap();
            inner.subscribers.retain(|(id, _)| *id != self.id);
            log::debug!("Camera event subscriber {} unregistered", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraKind, TargetDescriptor};
    use glam::Vec3;

    fn camera() -> CameraInfo {
        CameraInfo {
            kind: CameraKind::Game,
            position: Vec3::ZERO,
            target: TargetDescriptor::new(640, 360, wgpu::TextureFormat::Rgba8UnormSrgb),
            has_pipeline_data: true,
        }
    }

    #[test]
    fn subscription_registers_and_drop_unregisters() {
        let events = CameraEvents::new();
        assert_eq!(events.subscriber_count(), 0);

        let sub = events.subscribe(|_, _| {});
        assert_eq!(events.subscriber_count(), 1);

        drop(sub);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn resubscribing_does_not_accumulate() {
        let events = CameraEvents::new();
        for _ in 0..3 {
            let sub = events.subscribe(|_, _| {});
            assert_eq!(events.subscriber_count(), 1);
            drop(sub);
        }
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn dispatch_reaches_live_subscribers_only() {
        let events = CameraEvents::new();
        let hits = Arc::new(Mutex::new(0u32));

        let counter = hits.clone();
        let sub = events.subscribe(move |_, _| {
            *counter.lock().unwrap() += 1;
        });

        let mut submission = DrawSubmission::new();
        events.dispatch(&camera(), &mut submission);
        assert_eq!(*hits.lock().unwrap(), 1);

        drop(sub);
        events.dispatch(&camera(), &mut submission);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn guard_outliving_the_hub_is_harmless() {
        let events = CameraEvents::new();
        let sub = events.subscribe(|_, _| {});
        drop(events);
        drop(sub);
    }
}
