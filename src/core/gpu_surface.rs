use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use wgpu::{
    Adapter, Device, DeviceDescriptor, Features, Instance, Limits, Queue, Surface,
    SurfaceConfiguration, SurfaceError, SurfaceTexture, TextureFormat, TextureView,
};
use winit::window::Window;

use crate::color::Color;
use crate::config::{resolve_sample_count, WindowSettings};
use crate::error::{AppError, Result};
use crate::traits::{DisplaySurface, SurfaceSize};

/// Display surface backed by a winit window and a wgpu swapchain
///
/// Created once on the main thread. Drawing state lives behind a mutex so the
/// surface can be shared with the display thread; in practice only the display
/// thread draws after startup.
pub struct GpuSurface {
    window: Arc<Window>,
    surface: Surface<'static>,
    device: Device,
    queue: Queue,
    format: TextureFormat,
    sample_count: u32,
    frame: Mutex<FrameState>,
}

struct FrameState {
    size: SurfaceSize,
    config: SurfaceConfiguration,
    /// Multisampled color target, resolved into the swapchain image
    msaa: Option<TextureView>,
    /// Swapchain image cleared but not yet presented
    pending: Option<SurfaceTexture>,
}

impl GpuSurface {
    /// Create the rendering context for `window`
    pub async fn new(window: Arc<Window>, settings: &WindowSettings) -> Result<Self> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| AppError::SurfaceCreation(format!("surface: {}", e)))?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let inner = window.inner_size();
        let size = SurfaceSize::new(inner.width, inner.height).unwrap_or(settings.size);
        if let Some(reason) = exceeds_texture_limit(size, device.limits().max_texture_dimension_2d) {
            return Err(AppError::SurfaceCreation(reason));
        }

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| AppError::SurfaceCreation("adapter cannot present to this window".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let format_features = adapter.get_texture_format_features(format);
        let adapter_specific = device
            .features()
            .contains(Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES);
        let sample_count = resolve_sample_count(settings.context.antialiasing_level, |count| {
            if adapter_specific {
                format_features.flags.sample_count_supported(count)
            } else {
                // WebGPU guarantees 1 and 4 only
                count == 4
            }
        });

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width(),
            height: size.height(),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let msaa = Self::create_msaa_view(&device, &config, sample_count);

        log::info!(
            "display surface ready: {}x{} {:?}, {}x MSAA (requested {})",
            size.width(),
            size.height(),
            format,
            sample_count,
            settings.context.antialiasing_level
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            format,
            sample_count,
            frame: Mutex::new(FrameState {
                size,
                config,
                msaa,
                pending: None,
            }),
        })
    }

    /// Effective multisample count after clamping to device support
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn lock_frame(&self) -> MutexGuard<'_, FrameState> {
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_value(&self, color: Color) -> wgpu::Color {
        let [r, g, b, a] = if self.format.is_srgb() {
            color.to_linear()
        } else {
            color.to_unorm()
        };
        wgpu::Color { r, g, b, a }
    }

    /// Acquire the next swapchain image.
    /// `Ok(None)` means skip this frame (timeout or swapchain rebuilt).
    fn acquire(&self, config: &SurfaceConfiguration) -> Result<Option<SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::warn!("swapchain lost or outdated, reconfiguring");
                self.surface.configure(&self.device, config);
                Ok(None)
            }
            Err(SurfaceError::Timeout) => {
                log::warn!("timed out acquiring swapchain image");
                Ok(None)
            }
            Err(err) => Err(AppError::Present(err.to_string())),
        }
    }

    fn create_msaa_view(
        device: &Device,
        config: &SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<TextureView> {
        if sample_count <= 1 {
            return None;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Target"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| AppError::SurfaceCreation(format!("no suitable adapter: {}", e)))
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        let mut requested_features = Features::empty();

        // Needed to use sample counts other than 4
        if adapter
            .features()
            .contains(Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES)
        {
            requested_features |= Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Display Surface Device"),
                required_features: requested_features,
                required_limits: Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| AppError::SurfaceCreation(format!("device request failed: {}", e)))
    }
}

/// Describe why `size` cannot back a swapchain on a device whose 2D textures
/// are capped at `max_dim` texels per side
fn exceeds_texture_limit(size: SurfaceSize, max_dim: u32) -> Option<String> {
    (size.width() > max_dim || size.height() > max_dim).then(|| {
        format!(
            "{}x{} exceeds the device limit of {}",
            size.width(),
            size.height(),
            max_dim
        )
    })
}

impl DisplaySurface for GpuSurface {
    fn size(&self) -> SurfaceSize {
        self.lock_frame().size
    }

    fn resize(&self, size: SurfaceSize) -> Result<()> {
        if let Some(reason) = exceeds_texture_limit(size, self.device.limits().max_texture_dimension_2d) {
            return Err(AppError::Present(reason));
        }

        let mut frame = self.lock_frame();
        // Swapchain images must be released before reconfiguring
        frame.pending = None;
        frame.size = size;
        frame.config.width = size.width();
        frame.config.height = size.height();
        self.surface.configure(&self.device, &frame.config);
        frame.msaa = Self::create_msaa_view(&self.device, &frame.config, self.sample_count);
        Ok(())
    }

    fn clear(&self, color: Color) -> Result<()> {
        let mut guard = self.lock_frame();
        let frame = &mut *guard;

        if frame.pending.is_none() {
            frame.pending = self.acquire(&frame.config)?;
        }
        let Some(target) = frame.pending.as_ref() else {
            return Ok(());
        };

        let view = target
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (attachment, resolve_target, store) = match frame.msaa.as_ref() {
            Some(msaa) => (msaa, Some(&view), wgpu::StoreOp::Discard),
            None => (&view, None, wgpu::StoreOp::Store),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_value(color)),
                        store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn present(&self) -> Result<bool> {
        let mut frame = self.lock_frame();
        let Some(target) = frame.pending.take() else {
            return Ok(false);
        };

        let suboptimal = target.suboptimal;
        self.window.pre_present_notify();
        target.present();

        if suboptimal {
            log::debug!("suboptimal swapchain, reconfiguring");
            self.surface.configure(&self.device, &frame.config);
        }
        Ok(true)
    }
}
