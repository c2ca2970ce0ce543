//! The name-card scene.
//!
//! At start the scene holds only the camera. Two assets are requested in the
//! background: the matcap texture, which is kept but not used for shading,
//! and the typeface, whose arrival builds the three text lines and the
//! floating primitives. After that every frame spins and drifts the
//! primitives and slowly turns the text.
//!
//! [`Showcase`] holds the scene logic and needs no GPU. [`ShowcaseFlow`] wraps
//! it into a [`GraphicsFlow`] that loads the assets and keeps the GPU
//! buffers in step with the scene.

pub mod animate;
pub mod config;
pub mod populate;

use std::pin::Pin;

use anyhow::Result;
use cgmath::{Deg, Point3};
use instant::Duration;
use rand::{SeedableRng, rngs::StdRng};
use winit::event::{DeviceEvent, WindowEvent};

use crate::{
    camera::{OrbitControls, Projection},
    context::{Context, InitContext, colour_from_hex},
    data_structures::{batch::GpuScene, scene_graph::Scene, texture::Texture},
    flow::{self, FlowConstructor, GraphicsFlow, Out},
    render::Render,
    resources::{self, font::Font},
};

pub use animate::{Clock, advance};
pub use config::ShowcaseConfig;
pub use populate::{Populated, populate};

/// Results of the background loads.
#[derive(Debug)]
pub enum SceneEvent {
    MatcapLoaded(Texture),
    FontLoaded(Font),
    LoadFailed { asset: String, reason: String },
}

/// Scene logic without any GPU state.
#[derive(Debug)]
pub struct Showcase {
    pub config: ShowcaseConfig,
    clock: Clock,
    rng: StdRng,
    populated: Option<Populated>,
}

impl Showcase {
    pub fn new(config: ShowcaseConfig, rng: StdRng) -> Self {
        Self {
            config,
            clock: Clock::new(),
            rng,
            populated: None,
        }
    }

    /// Set the background and insert the camera node.
    pub fn bootstrap(&self, scene: &mut Scene) {
        scene.background = colour_from_hex(self.config.background);
        scene.add_camera();
    }

    pub fn populated(&self) -> Option<&Populated> {
        self.populated.as_ref()
    }

    /// Build the scene contents from a freshly loaded font.
    ///
    /// Runs at most once: returns `Ok(false)` without touching the scene if
    /// the scene was already populated.
    pub fn on_font_loaded(&mut self, scene: &mut Scene, font: &Font) -> Result<bool> {
        if self.populated.is_some() {
            return Ok(false);
        }
        let populated = populate(scene, font, &self.config, &mut self.rng)?;
        self.populated = Some(populated);
        Ok(true)
    }

    /// Apply a finished load to the scene. Hands back the matcap if that is
    /// what arrived; failures are only logged.
    pub fn on_loaded(&mut self, scene: &mut Scene, event: SceneEvent) -> Option<Texture> {
        match event {
            SceneEvent::MatcapLoaded(texture) => {
                log::info!("matcap {} loaded", self.config.matcap_path);
                Some(texture)
            }
            SceneEvent::FontLoaded(font) => {
                match self.on_font_loaded(scene, &font) {
                    Ok(true) => log::info!("scene populated from font {}", font.family_name),
                    Ok(false) => log::warn!("font {} arrived again, ignoring it", font.family_name),
                    Err(e) => log::error!("cannot build the scene from the font: {e:#}"),
                }
                None
            }
            SceneEvent::LoadFailed { asset, reason } => {
                log::error!("failed to load {asset}: {reason}");
                None
            }
        }
    }

    /// One animation step at the clock's current time. Returns the elapsed seconds used.
    pub fn tick(&mut self, scene: &mut Scene) -> f64 {
        let elapsed = self.clock.elapsed();
        advance(scene, elapsed, &self.config.steps);
        elapsed
    }
}

pub struct ShowcaseFlow {
    showcase: Showcase,
    device: wgpu::Device,
    queue: wgpu::Queue,
    gpu: GpuScene,
    matcap: Option<Texture>,
}

impl ShowcaseFlow {
    pub fn new(ctx: InitContext, config: ShowcaseConfig) -> Self {
        Self {
            showcase: Showcase::new(config, StdRng::from_entropy()),
            device: ctx.device,
            queue: ctx.queue,
            gpu: GpuScene::new(),
            matcap: None,
        }
    }

    pub fn constructor(config: ShowcaseConfig) -> FlowConstructor<Scene, SceneEvent> {
        Box::new(
            move |ctx: InitContext| -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<Scene, SceneEvent>>>>> {
                Box::pin(async move {
                    Box::new(ShowcaseFlow::new(ctx, config)) as Box<dyn GraphicsFlow<Scene, SceneEvent>>
                })
            },
        )
    }

    fn configure_camera(&self, ctx: &mut Context) {
        let params = self.showcase.config.camera;
        ctx.camera.camera.position = params.position.into();
        ctx.camera.camera.look_at(Point3::new(0.0, 0.0, 0.0));
        ctx.projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            Deg(params.fov_degrees),
            params.near,
            params.far,
        );
        ctx.projection.set_aspect(ctx.viewport.aspect());
        ctx.camera.controller =
            OrbitControls::new(ctx.window().inner_size().height).with_damping(params.damping_factor);
    }

    fn load_matcap(&self) -> Box<dyn Future<Output = SceneEvent>> {
        let path = self.showcase.config.matcap_path.clone();
        let device = self.device.clone();
        let queue = self.queue.clone();
        Box::new(async move {
            match resources::load_texture(&path, &device, &queue, None).await {
                Ok(texture) => SceneEvent::MatcapLoaded(texture),
                Err(e) => SceneEvent::LoadFailed {
                    asset: path,
                    reason: format!("{e:#}"),
                },
            }
        })
    }

    fn load_font(&self) -> Box<dyn Future<Output = SceneEvent>> {
        Box::new(font_event(self.showcase.config.font_path.clone()))
    }
}

/// Load the typeface at `path` and wrap the outcome as a [`SceneEvent`].
pub async fn font_event(path: String) -> SceneEvent {
    match resources::load_font(&path).await {
        Ok(font) => SceneEvent::FontLoaded(font),
        Err(e) => SceneEvent::LoadFailed {
            asset: path,
            reason: format!("{e:#}"),
        },
    }
}

impl GraphicsFlow<Scene, SceneEvent> for ShowcaseFlow {
    fn on_init(&mut self, ctx: &mut Context, scene: &mut Scene) -> Out<SceneEvent> {
        self.showcase.bootstrap(scene);
        ctx.set_background(scene.background);
        self.configure_camera(ctx);
        log::info!("scene bootstrapped, loading assets");
        Out::FutEvent(vec![self.load_matcap(), self.load_font()])
    }

    fn on_update(&mut self, ctx: &Context, scene: &mut Scene, _dt: Duration) -> Out<SceneEvent> {
        self.showcase.tick(scene);
        self.gpu.write_instances(&ctx.queue, scene);
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut Scene, _: &DeviceEvent) -> Out<SceneEvent> {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut Scene, _: &WindowEvent) -> Out<SceneEvent> {
        Out::Empty
    }

    fn on_custom_events(&mut self, ctx: &Context, scene: &mut Scene, event: SceneEvent) -> Option<SceneEvent> {
        let was_populated = self.showcase.populated().is_some();
        if let Some(texture) = self.showcase.on_loaded(scene, event) {
            if self.matcap.replace(texture).is_some() {
                log::warn!("matcap arrived again, replacing the previous one");
            }
        }
        if !was_populated && self.showcase.populated().is_some() {
            self.gpu.sync_structure(&ctx.device, scene);
        }
        None
    }

    fn on_render(&self) -> Render<'_> {
        self.gpu.render()
    }
}

/// Open a window and show the scene described by `config`.
pub fn run_showcase(config: ShowcaseConfig) -> anyhow::Result<()> {
    flow::run::<Scene, SceneEvent>(vec![ShowcaseFlow::constructor(config)])
}
