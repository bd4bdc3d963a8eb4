/// Errors that prevent the graphics context from coming up. All fatal.
#[derive(Debug, thiserror::Error)]
pub enum GpuInitError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats for this adapter")]
    UnsupportedSurface,
}

/// Surface, device and queue for one window.
///
/// Frames are rendered through a non-sRGB view of the swapchain, so shader
/// output is written as-is with no gamma encode. Colours and blends are
/// computed on gamma-space values, matching a plain RGB framebuffer.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    render_format: wgpu::TextureFormat,
}

/// Format pipelines render to for a given swapchain format.
fn render_format_for(surface_format: wgpu::TextureFormat) -> wgpu::TextureFormat {
    surface_format.remove_srgb_suffix()
}

/// Extra view formats the swapchain must allow for [`render_format_for`].
fn view_formats_for(surface_format: wgpu::TextureFormat) -> Vec<wgpu::TextureFormat> {
    let render_format = render_format_for(surface_format);
    if render_format == surface_format {
        Vec::new()
    } else {
        vec![render_format]
    }
}

/// Prefer a linear (non-sRGB) swapchain format; otherwise take the first one.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

impl GpuContext {
    /// Create a context presenting to `target`.
    ///
    /// With `vsync` set, presentation waits for vertical blank, which paces the
    /// frame loop to the display refresh rate.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuInitError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("waterscape_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        // Validation errors outside an error scope are logged, not fatal.
        device.on_uncaptured_error(Box::new(|error| {
            tracing::error!("wgpu validation error: {error}");
        }));

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format =
            pick_surface_format(&surface_caps.formats).ok_or(GpuInitError::UnsupportedSurface)?;
        let render_format = render_format_for(surface_format);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: view_formats_for(surface_format),
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let info = adapter.get_info();
        tracing::info!(
            "GPU initialized: {} ({} backend), surface {:?} rendered as {:?}, {}x{}",
            info.name,
            info.backend.to_str(),
            surface_format,
            render_format,
            config.width,
            config.height
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            render_format,
        })
    }

    /// Colour format of the views handed out by [`Self::frame_view`].
    pub fn render_format(&self) -> wgpu::TextureFormat {
        self.render_format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        tracing::debug!("surface resized to {}x{}", self.config.width, self.config.height);
    }

    /// Render target view of a swapchain image.
    pub fn frame_view(&self, frame: &wgpu::SurfaceTexture) -> wgpu::TextureView {
        frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.render_format),
            ..Default::default()
        })
    }

    /// Next swapchain image, or `None` when this frame should be skipped.
    /// A lost or outdated surface is reconfigured for the next frame.
    pub fn acquire_frame(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                None
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn srgb_swapchain_is_rendered_through_a_linear_view() {
        assert_eq!(render_format_for(TextureFormat::Bgra8UnormSrgb), TextureFormat::Bgra8Unorm);
        assert_eq!(view_formats_for(TextureFormat::Bgra8UnormSrgb), vec![TextureFormat::Bgra8Unorm]);
    }

    #[test]
    fn linear_swapchain_needs_no_extra_view_format() {
        assert_eq!(render_format_for(TextureFormat::Rgba8Unorm), TextureFormat::Rgba8Unorm);
        assert!(view_formats_for(TextureFormat::Rgba8Unorm).is_empty());
    }

    #[test]
    fn linear_surface_format_is_preferred() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Bgra8Unorm));
        assert_eq!(
            pick_surface_format(&[TextureFormat::Rgba8UnormSrgb]),
            Some(TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(pick_surface_format(&[]), None);
    }
}
