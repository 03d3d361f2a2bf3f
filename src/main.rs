use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use dune_backdrop::cli::Cli;
use dune_backdrop::core::{DisplayContext, FpsCounter, GpuContext, GpuProbe, WinitSignals};
use dune_backdrop::frame::FrameIterator;
use dune_backdrop::host::WindowHost;
use dune_backdrop::renderer::Renderer;
use dune_backdrop::{SceneAnimator, SceneConfig};

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;
const FPS_WINDOW: f32 = 1.0;

struct App {
    cli: Cli,
    config: SceneConfig,
    window: Option<Arc<Window>>,
    scene: Option<SceneAnimator>,
    renderer: Option<Renderer>,
    signals: WinitSignals,
    frames: FrameIterator,
    fps: FpsCounter,
}

impl App {
    fn new(cli: Cli, config: SceneConfig) -> Self {
        let signals = WinitSignals::new(config.scroll_range, config.scroll_step);
        Self {
            cli,
            config,
            window: None,
            scene: None,
            renderer: None,
            signals,
            frames: FrameIterator::new(),
            fps: FpsCounter::new(FPS_WINDOW),
        }
    }

    /// Guards, then scene, then GPU resources. Ok(false) means setup was skipped.
    fn mount(&mut self, window: Arc<Window>) -> Result<bool> {
        let probe = GpuProbe::new(window.clone())?;
        let size = window.inner_size();

        let host = WindowHost {
            touch: self.cli.touch,
            graphics: probe.is_some(),
            mount_id: self.config.mount_id.clone(),
            size: DisplayContext::new(size.width, size.height),
        };

        let Some(scene) = SceneAnimator::mount(&host, self.config.clone()) else {
            return Ok(false);
        };
        let Some(probe) = probe else {
            return Ok(false);
        };

        let gpu = pollster::block_on(GpuContext::new(&probe.adapter))?;
        let renderer = Renderer::new(probe, gpu, &window, &scene, !self.cli.no_ui)?;

        self.signals.set_window_size(size.width, size.height);
        self.scene = Some(scene);
        self.renderer = Some(renderer);
        self.window = Some(window);
        self.frames.resync();
        Ok(true)
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(scene), Some(renderer), Some(window)) =
            (&mut self.scene, &mut self.renderer, &self.window)
        else {
            return;
        };

        let Some(frame) = self.frames.next() else {
            return;
        };
        if let Some(fps) = self.fps.tick(frame.delta) {
            log::debug!("FPS: {:.1}", fps);
        }

        scene.frame(frame.delta, &self.signals.signals());

        match renderer.render(scene, window, self.fps.fps()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::error!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Dune Backdrop")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match self.mount(window) {
            Ok(true) => {}
            Ok(false) => event_loop.exit(),
            Err(e) => {
                log::error!("Failed to set up backdrop: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        self.signals.process_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(scene) = &mut self.scene {
                    scene.resize(size.width, size.height);
                }
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.scene_config()?;
    log::info!("Starting {} backdrop (seed {})", config.variant.name(), config.seed);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
