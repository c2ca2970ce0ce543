//! GPU and window context.
//!
//! [`Context`] owns the surface, device, queue, camera and pipelines for the
//! lifetime of the window. [`Viewport`] tracks the logical window size and
//! device pixel ratio and derives the drawing buffer size from them; it has
//! no GPU dependency so resize behaviour can be checked on its own.

use std::sync::Arc;

use anyhow::Context as _;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::{Camera, CameraResources, OrbitControls, Projection},
    data_structures::texture,
    pipelines::{basic::mk_solid_pipeline, wireframe::mk_wireframe_pipeline},
};

/// Upper bound for the pixel ratio used for the drawing buffer.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Logical width in CSS pixels / points.
    pub width: f64,
    /// Logical height in CSS pixels / points.
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor)
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            (self.width / self.height) as f32
        } else {
            1.0
        }
    }

    /// Device pixel ratio clamped to [`MAX_PIXEL_RATIO`].
    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Drawing buffer size: `floor(logical * pixel_ratio)` per axis.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let pr = self.pixel_ratio();
        (
            (self.width * pr).floor().max(0.0) as u32,
            (self.height * pr).floor().max(0.0) as u32,
        )
    }

    /// Replace the viewport with a new size and ratio.
    ///
    /// Returns true if anything changed. Applying the same size twice leaves
    /// the viewport exactly as applying it once.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> bool {
        let next = Self::new(width, height, device_pixel_ratio);
        let changed = *self != next;
        *self = next;
        changed
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Apply a window resize to `viewport` and `projection`.
///
/// Returns the drawing buffer size the surface should be configured with.
/// Either component may be zero for a minimised window.
pub fn apply_resize(
    viewport: &mut Viewport,
    projection: &mut Projection,
    size: PhysicalSize<u32>,
    scale_factor: f64,
) -> (u32, u32) {
    let next = Viewport::from_physical(size, scale_factor);
    viewport.resize(next.width, next.height, next.device_pixel_ratio);
    if viewport.height > 0.0 {
        projection.set_aspect(viewport.aspect());
    }
    viewport.drawing_buffer_size()
}

/// Convert one sRGB encoded channel in [0, 1] to linear light.
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Colour from a `0xRRGGBB` literal, channels kept sRGB encoded.
pub fn colour_from_hex(hex: u32) -> wgpu::Color {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f64 / 255.0;
    wgpu::Color {
        r: channel(16),
        g: channel(8),
        b: channel(0),
        a: 1.0,
    }
}

/// Clear colour for a surface of `format`.
///
/// sRGB surfaces encode on write, so the sRGB background has to be
/// linearised first to come out unchanged on screen.
pub fn clear_colour_for(background: wgpu::Color, format: wgpu::TextureFormat) -> wgpu::Color {
    if format.is_srgb() {
        wgpu::Color {
            r: srgb_to_linear(background.r),
            g: srgb_to_linear(background.g),
            b: srgb_to_linear(background.b),
            a: background.a,
        }
    } else {
        background
    }
}

#[derive(Debug)]
pub struct Pipelines {
    pub solid: wgpu::RenderPipeline,
    pub wireframe: wgpu::RenderPipeline,
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub viewport: Viewport,
    pub pipelines: Pipelines,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
        let (width, height) = viewport.drawing_buffer_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .context("cannot open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // flows move the camera in `on_init`
        let camera = Camera::new((0.0, 0.0, 5.0));
        let mut projection = Projection::new(config.width, config.height, cgmath::Deg(75.0), 0.1, 100.0);
        projection.set_aspect(viewport.aspect());
        let controller = OrbitControls::new(window.inner_size().height);
        let camera = CameraResources::new(&device, camera, controller, &projection);

        let depth_texture =
            texture::Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        let pipelines = Pipelines {
            solid: mk_solid_pipeline(&device, &config, &camera.bind_group_layout),
            wireframe: mk_wireframe_pipeline(&device, &config, &camera.bind_group_layout),
        };

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            viewport,
            pipelines,
            clear_colour: wgpu::Color::BLACK,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Set the clear colour from an sRGB background.
    pub fn set_background(&mut self, background: wgpu::Color) {
        self.clear_colour = clear_colour_for(background, self.config.format);
    }
}

/// The subset of the context handed to flow constructors.
///
/// Device and queue are reference counted, so cloning them is cheap.
#[derive(Clone, Debug)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            config: ctx.config.clone(),
            camera_bind_group_layout: ctx.camera.bind_group_layout.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_clamped() {
        let viewport = Viewport::new(100.0, 50.0, 3.0);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (200, 100));
    }

    #[test]
    fn fractional_buffer_sizes_round_down() {
        let viewport = Viewport::new(333.0, 101.0, 1.5);
        assert_eq!(viewport.drawing_buffer_size(), (499, 151));
    }

    #[test]
    fn physical_sizes_become_logical() {
        let viewport = Viewport::from_physical(PhysicalSize::new(1600, 1200), 2.0);
        assert_eq!(viewport.width, 800.0);
        assert_eq!(viewport.height, 600.0);
        assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));
    }

    #[test]
    fn resize_updates_aspect_and_buffer() {
        let mut viewport = Viewport::default();
        let mut projection = Projection::new(1, 1, cgmath::Deg(75.0), 0.1, 100.0);
        let buffer = apply_resize(&mut viewport, &mut projection, PhysicalSize::new(800, 600), 1.0);
        assert_eq!(buffer, (800, 600));
        assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn minimised_window_keeps_previous_aspect() {
        let mut viewport = Viewport::default();
        let mut projection = Projection::new(4, 3, cgmath::Deg(75.0), 0.1, 100.0);
        let buffer = apply_resize(&mut viewport, &mut projection, PhysicalSize::new(0, 0), 1.0);
        assert_eq!(buffer, (0, 0));
        assert!((projection.aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn hex_colours_linearise_for_srgb_surfaces() {
        let bg = colour_from_hex(0x40e0d0);
        assert!((bg.r - 64.0 / 255.0).abs() < 1e-9);
        let srgb = clear_colour_for(bg, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!(srgb.r < bg.r && srgb.g < bg.g);
        let unorm = clear_colour_for(bg, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(unorm, bg);
    }

    #[test]
    fn srgb_curve_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-12);
    }
}
