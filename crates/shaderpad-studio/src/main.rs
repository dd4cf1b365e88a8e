use anyhow::Result;
use winit::dpi::LogicalSize;

use shaderpad_engine::core::{App, AppControl, FrameCtx};
use shaderpad_engine::device::{Gpu, GpuInit};
use shaderpad_engine::logging::{init_logging, LoggingConfig};
use shaderpad_engine::render::{FullscreenPass, PassConfig};
use shaderpad_engine::uniforms::{Shared, UniformGroup, Vec2, Vec4};
use shaderpad_engine::window::{Runtime, RuntimeConfig};

const QUAD_SHADER: &str = include_str!("../shaders/quad.wgsl");

/// Single fullscreen pass fed by resolution, aspect, time and a constant color.
struct Playground {
    resolution: Shared<Vec2>,
    aspect: Shared<f32>,
    time: Shared<f32>,
    pass: Option<FullscreenPass>,
}

impl Playground {
    fn new() -> Self {
        Self {
            resolution: Shared::new(Vec2::new(1.0, 1.0)),
            aspect: Shared::new(1.0f32),
            time: Shared::new(0.0f32),
            pass: None,
        }
    }

    fn uniforms(&self) -> Result<UniformGroup> {
        let tree = UniformGroup::builder()
            .field("uResolution", self.resolution.clone())
            .field("uAspect", self.aspect.clone())
            .field("uTime", self.time.clone())
            .field("uColor", Vec4::rgba(1.0, 0.0, 0.0, 1.0))
            .build()?;
        Ok(tree)
    }
}

impl App for Playground {
    fn on_init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let tree = self.uniforms()?;
        let pass = FullscreenPass::new(&gpu.render_ctx(), QUAD_SHADER, &tree, PassConfig::default())?;

        log::info!(
            "uniform block: {} floats, offsets {:?}",
            pass.uniforms().count(),
            pass.uniforms().offsets()
        );

        self.pass = Some(pass);
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        let (w, h) = (width as f32, height as f32);
        self.resolution.update(|v| {
            v.set(w, h);
        });
        self.aspect.set(w / h);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(pass) = self.pass.as_mut() else {
            return AppControl::Continue;
        };

        let control = ctx.render(|rctx, target| pass.render(rctx, target));

        // Picked up by the next frame's upload.
        self.time.set((ctx.time.elapsed_ms / 1000.0) as f32);
        control
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "shaderpad".to_string(),
        initial_size: LogicalSize::new(1280.0, 720.0),
    };
    let gpu_init = GpuInit {
        present_mode: wgpu::PresentMode::AutoVsync,
        ..Default::default()
    };

    Runtime::run(config, gpu_init, Playground::new())
}
