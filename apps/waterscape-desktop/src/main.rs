use anyhow::{Context as _, Result};
use clap::Parser;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use waterscape_common::{CameraConfig, SceneConfig};
use waterscape_input::{Action, CursorTracker, HeldMoves, MoveDirection};
use waterscape_render::{Camera, FrameClock, FrameTime, FrameView};
use waterscape_render_wgpu::{GpuContext, SceneAssets, WaterRenderer};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

/// Pixels of touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 20.0;

#[derive(Parser)]
#[command(name = "waterscape-desktop", about = "Fly over animated water under a skybox")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML scene configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset root directory (overrides the config file)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("loading scene config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(root) = &self.assets {
            config.assets.root = root.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        config.validate()?;
        Ok(config)
    }
}

fn action_for_key(key: KeyCode, pressed: bool) -> Option<Action> {
    let direction = match key {
        KeyCode::KeyW => MoveDirection::Forward,
        KeyCode::KeyS => MoveDirection::Backward,
        KeyCode::KeyA => MoveDirection::Left,
        KeyCode::KeyD => MoveDirection::Right,
        KeyCode::Escape if pressed => return Some(Action::Exit),
        _ => return None,
    };
    Some(if pressed {
        Action::Move(direction)
    } else {
        Action::Stop(direction)
    })
}

fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
    }
}

/// Where look input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookSource {
    /// Relative device motion, unbounded by the window edge. Used whenever
    /// the cursor is grabbed.
    Raw,
    /// Absolute cursor positions through [`CursorTracker`].
    Cursor,
    /// Window unfocused: look input is ignored.
    Off,
}

/// Camera, clock and input state for one run.
struct AppState {
    camera: Camera,
    clock: FrameClock,
    held: HeldMoves,
    cursor: CursorTracker,
    look: LookSource,
}

impl AppState {
    fn new(camera: &CameraConfig) -> Self {
        Self {
            camera: Camera::new(camera),
            clock: FrameClock::new(),
            held: HeldMoves::new(),
            cursor: CursorTracker::new(),
            look: LookSource::Cursor,
        }
    }

    /// Apply an action. Returns `false` when the loop should stop.
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Move(direction) => self.held.press(direction),
            Action::Stop(direction) => self.held.release(direction),
            Action::Look(delta) => self.camera.process_mouse_movement(delta.x, delta.y),
            Action::Zoom(lines) => self.camera.process_mouse_scroll(lines),
            Action::Exit => return false,
        }
        true
    }

    /// The window gained focus and the cursor grab was attempted.
    fn cursor_captured(&mut self, grabbed: bool) {
        self.look = if grabbed {
            LookSource::Raw
        } else {
            LookSource::Cursor
        };
        self.cursor.reset();
    }

    /// Key releases are not delivered while unfocused, so nothing stays held.
    fn focus_lost(&mut self) {
        self.held.clear();
        self.look = LookSource::Off;
        self.cursor.reset();
    }

    fn cursor_moved(&mut self, x: f64, y: f64) -> Option<Action> {
        if self.look != LookSource::Cursor {
            return None;
        }
        let delta = self.cursor.sample(x, y);
        (delta != Vec2::ZERO).then_some(Action::Look(delta))
    }

    fn mouse_motion(&self, dx: f64, dy: f64) -> Option<Action> {
        // Device y grows downwards.
        (self.look == LookSource::Raw).then(|| Action::Look(Vec2::new(dx as f32, -dy as f32)))
    }

    fn update(&mut self, aspect_ratio: f32) -> FrameView {
        let time = self.clock.tick();
        self.advance(time, aspect_ratio)
    }

    fn advance(&mut self, time: FrameTime, aspect_ratio: f32) -> FrameView {
        self.camera.process_held_keys(&self.held, time.delta);
        FrameView::new(&self.camera, aspect_ratio, time.elapsed)
    }
}

struct Gpu {
    renderer: WaterRenderer,
    context: GpuContext,
    window: Arc<Window>,
}

struct App {
    config: SceneConfig,
    state: AppState,
    gpu: Option<Gpu>,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        let state = AppState::new(&config.camera);
        Self {
            config,
            state,
            gpu: None,
            fatal: None,
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let window_config = &self.config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.as_str())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let context = GpuContext::new(window.clone(), size.width, size.height, window_config.vsync)?;

        let assets = SceneAssets::load(&self.config.assets);
        let renderer = WaterRenderer::new(
            &context,
            &assets,
            self.config.water.clone(),
            window_config.clear_color,
        );

        Ok(Gpu {
            renderer,
            context,
            window,
        })
    }

    fn capture_cursor(&mut self) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let window = &gpu.window;
        let grabbed = match window.set_cursor_grab(CursorGrabMode::Locked) {
            Ok(()) => true,
            Err(locked) => {
                tracing::debug!("cursor lock unavailable ({locked}), confining instead");
                match window.set_cursor_grab(CursorGrabMode::Confined) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("failed to grab cursor, using cursor positions: {e}");
                        false
                    }
                }
            }
        };
        window.set_cursor_visible(false);
        self.state.cursor_captured(grabbed);
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, action: Action) {
        if !self.state.handle_action(action) {
            event_loop.exit();
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let frame = self.state.update(gpu.context.aspect_ratio());

        if let Some(output) = gpu.context.acquire_frame() {
            let view = gpu.context.frame_view(&output);
            gpu.renderer
                .render(&gpu.context.device, &gpu.context.queue, &view, &frame);
            output.present();
        }
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.capture_cursor();
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.context.resize(new_size.width, new_size.height);
                    let (width, height) = gpu.context.size();
                    gpu.renderer.resize(&gpu.context.device, width, height);
                }
            }
            WindowEvent::Focused(true) => {
                self.capture_cursor();
            }
            WindowEvent::Focused(false) => {
                self.state.focus_lost();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(action) = action_for_key(key, key_state == ElementState::Pressed) {
                    self.apply(event_loop, action);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(action) = self.state.cursor_moved(position.x, position.y) {
                    self.apply(event_loop, action);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.apply(event_loop, Action::Zoom(scroll_lines(delta)));
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if let Some(action) = self.state.mouse_motion(delta.0, delta.1) {
                self.apply(event_loop, action);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        tracing::info!(
            "shutting down after {:.1}s",
            self.state.clock.elapsed().as_secs_f32()
        );
        self.gpu = None;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("waterscape-desktop starting");

    let config = cli.scene_config()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
