use umbra::renderer::LightControl;
use umbra::window::{Event, FrameInput, FrameOutput, Key, Window, WindowSettings};
use umbra::{SceneRenderer, Scene, SceneConfig, Viewport, WgpuContext};

struct Demo {
    scene: Scene,
    renderer: SceneRenderer,
    control: LightControl,
}

impl Demo {
    fn new(
        ctx: &WgpuContext,
        format: wgpu::TextureFormat,
        viewport: Viewport,
        config: SceneConfig,
    ) -> anyhow::Result<Self> {
        let shadow = config.shadow.with_encoding(ctx.preferred_depth_encoding());
        let mut scene = Scene::new(config.with_shadow(shadow), viewport);
        scene.set_error_callback(|err| {
            log::warn!("continuing without an animated model: {}", err);
        });
        let renderer = SceneRenderer::new(ctx, format, &scene)?;

        log::info!("arrows orbit the light, PageUp/PageDown move it, i/k change intensity");
        log::info!("g/h/d pick grid, hatch or dots, m cycles, o toggles the overlay, s toggles shadows");

        Ok(Self {
            scene,
            renderer,
            control: LightControl::default(),
        })
    }

    fn frame(&mut self, mut input: FrameInput<'_>) -> FrameOutput {
        for event in &input.events {
            match event {
                Event::Resize { width, height } => self.scene.resize(*width, *height),
                Event::KeyPress {
                    key: Key::Escape, ..
                } => return FrameOutput::exit(),
                _ => {}
            }
        }

        let (light, overlay) = self.scene.controls_mut();
        self.control
            .handle_events(light, overlay, &mut input.events);

        self.scene
            .update(input.delta_time as f32, input.elapsed_time as f32);
        let target = input.screen_target();
        self.renderer.render(input.ctx, &target, &mut self.scene);

        FrameOutput::new()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = SceneConfig::default();
    if let Some(path) = std::env::args_os().nth(1) {
        config = config.with_model_path(path);
    }

    let settings = WindowSettings::default().title("umbra");
    Window::new(settings).render_loop(
        move |ctx, format, viewport| Demo::new(ctx, format, viewport, config),
        |demo, input| demo.frame(input),
    )
}
