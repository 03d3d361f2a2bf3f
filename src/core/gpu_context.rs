use std::sync::Arc;
use anyhow::{Context, Result};
use wgpu::{Adapter, Device, DeviceDescriptor, Instance, Queue, Surface};
use winit::window::Window;

/// Surface plus the adapter that can drive it, found before any scene is built
///
/// Failing to find an adapter is how the "graphics library absent" guard
/// shows up on a native host.
pub struct GpuProbe {
    pub surface: Surface<'static>,
    pub adapter: Adapter,
}

impl GpuProbe {
    /// Create a surface for the window and look for a compatible adapter
    ///
    /// Returns Ok(None) when the platform has no usable adapter.
    pub fn new(window: Arc<Window>) -> Result<Option<Self>> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create window surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }));

        match adapter {
            Ok(adapter) => {
                log::info!("Using adapter: {}", adapter.get_info().name);
                Ok(Some(Self { surface, adapter }))
            }
            Err(e) => {
                log::warn!("No compatible graphics adapter: {}", e);
                Ok(None)
            }
        }
    }
}

/// Shared device and queue, cheap to clone (Arc)
#[derive(Clone)]
pub struct GpuContext {
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Request device and queue from a probed adapter
    pub async fn new(adapter: &Adapter) -> Result<Self> {
        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Dune Backdrop Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("failed to create device")?;

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Get reference to the device
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Get reference to the queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_semantics() {
        // Creating a real context needs GPU hardware; check the Arc-backed clone exists
        fn assert_clone<T: Clone>() {}
        assert_clone::<GpuContext>();
    }
}
