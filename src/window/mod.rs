//! Window management
//!
//! Opens a winit window, owns the surface and drives a per-frame callback.

pub mod event;
pub mod frame_io;
pub mod settings;

pub use event::{Event, Key};
pub use frame_io::{FrameInput, FrameOutput, Viewport};
pub use settings::WindowSettings;

use crate::context::WgpuContext;
use crate::core::texture::DepthTexture;
use anyhow::Context as _;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

/// A window with a GPU surface.
pub struct Window {
    settings: WindowSettings,
}

impl Window {
    pub fn new(settings: WindowSettings) -> Self {
        Self { settings }
    }

    /// Run until the window closes or the callback asks to exit.
    ///
    /// `init` builds the frame state once the GPU context and surface format
    /// are known; `callback` is invoked once per redraw.
    pub fn render_loop<S, I, F>(self, init: I, callback: F) -> anyhow::Result<()>
    where
        I: FnOnce(&WgpuContext, wgpu::TextureFormat, Viewport) -> anyhow::Result<S>,
        F: FnMut(&mut S, FrameInput<'_>) -> FrameOutput,
    {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            settings: self.settings,
            init: Some(init),
            state: None,
            callback,
            graphics: None,
            events: Vec::new(),
            start_time: Instant::now(),
            last_frame_time: Instant::now(),
            error: None,
        };

        event_loop.run_app(&mut app)?;
        match app.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Graphics {
    window: Arc<winit::window::Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    /// Non-sRGB view of the surface texture.
    view_format: wgpu::TextureFormat,
    ctx: WgpuContext,
    depth_texture: DepthTexture,
}

impl Graphics {
    fn new(event_loop: &ActiveEventLoop, settings: &WindowSettings) -> anyhow::Result<Self> {
        let mut attributes = winit::window::WindowAttributes::default()
            .with_title(&settings.title)
            .with_inner_size(winit::dpi::LogicalSize::new(settings.size.0, settings.size.1))
            .with_resizable(settings.resizable)
            .with_maximized(settings.maximized);
        if settings.fullscreen {
            attributes =
                attributes.with_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
        }
        let window = Arc::new(event_loop.create_window(attributes)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let ctx = WgpuContext::new_blocking(&instance, Some(&surface))?;

        let adapter_caps = surface.get_capabilities(&ctx.adapter);
        let format = adapter_caps
            .formats
            .iter()
            .find(|format| !format.is_srgb())
            .or_else(|| adapter_caps.formats.first())
            .copied()
            .context("surface is not supported by the adapter")?;
        // shaders encode gamma themselves, so always render through a linear view
        let view_format = format.remove_srgb_suffix();
        let alpha_mode = adapter_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: settings.present_mode(),
            alpha_mode,
            view_formats: if view_format == format {
                vec![]
            } else {
                vec![view_format]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctx.device, &config);
        tracing::info!(
            "surface {}x{} {:?} (view {:?})",
            config.width,
            config.height,
            format,
            view_format
        );

        let depth_texture =
            DepthTexture::new(&ctx, config.width, config.height, Some("depth texture"));

        Ok(Self {
            window,
            surface,
            config,
            view_format,
            ctx,
            depth_texture,
        })
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.ctx.device, &self.config);
        self.depth_texture.resize(&self.ctx, width, height);
    }
}

struct App<S, I, F> {
    settings: WindowSettings,
    init: Option<I>,
    state: Option<S>,
    callback: F,
    graphics: Option<Graphics>,
    events: Vec<Event>,
    start_time: Instant,
    last_frame_time: Instant,
    error: Option<anyhow::Error>,
}

impl<S, I, F> App<S, I, F>
where
    I: FnOnce(&WgpuContext, wgpu::TextureFormat, Viewport) -> anyhow::Result<S>,
    F: FnMut(&mut S, FrameInput<'_>) -> FrameOutput,
{
    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let graphics = Graphics::new(event_loop, &self.settings)?;
        if let Some(init) = self.init.take() {
            self.state = Some(init(&graphics.ctx, graphics.view_format, graphics.viewport())?);
        }
        self.graphics = Some(graphics);
        self.start_time = Instant::now();
        self.last_frame_time = self.start_time;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(graphics), Some(state)) = (&mut self.graphics, &mut self.state) else {
            return;
        };

        let now = Instant::now();
        let elapsed_time = (now - self.start_time).as_secs_f64();
        let delta_time = (now - self.last_frame_time).as_secs_f64();
        self.last_frame_time = now;

        let surface_texture = match graphics.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                graphics
                    .surface
                    .configure(&graphics.ctx.device, &graphics.config);
                return;
            }
            Err(err) => {
                tracing::error!("surface error: {:?}", err);
                return;
            }
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(graphics.view_format),
                ..Default::default()
            });

        let input = FrameInput {
            events: std::mem::take(&mut self.events),
            elapsed_time,
            delta_time,
            viewport: graphics.viewport(),
            ctx: &graphics.ctx,
            surface_view: &view,
            depth_texture: &graphics.depth_texture,
            surface_format: graphics.view_format,
        };
        let output = (self.callback)(state, input);
        surface_texture.present();

        if output.exit {
            event_loop.exit();
        }
    }
}

impl<S, I, F> ApplicationHandler for App<S, I, F>
where
    I: FnOnce(&WgpuContext, wgpu::TextureFormat, Viewport) -> anyhow::Result<S>,
    F: FnMut(&mut S, FrameInput<'_>) -> FrameOutput,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err.context("failed to start the render loop"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(graphics) = &mut self.graphics {
                    graphics.resize(size.width, size.height);
                }
                self.events.push(Event::Resize {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let Some(key) = Key::from_winit(&event.logical_key) else {
                    return;
                };
                self.events.push(match event.state {
                    ElementState::Pressed => Event::KeyPress {
                        key,
                        handled: false,
                    },
                    ElementState::Released => Event::KeyRelease {
                        key,
                        handled: false,
                    },
                });
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &self.graphics {
            graphics.window.request_redraw();
        }
    }
}
