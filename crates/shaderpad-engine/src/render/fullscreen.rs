use anyhow::{Context, Result};

use crate::render::{RenderCtx, RenderTarget};
use crate::uniforms::{PackedUniforms, UniformBuffer, UniformGroup};

/// Fixed parameters of a [`FullscreenPass`].
#[derive(Debug, Clone)]
pub struct PassConfig {
    /// Prefix for wgpu object labels.
    pub label: String,
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub clear_color: wgpu::Color,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            label: "shaderpad fullscreen".to_string(),
            vertex_entry: "vert_main".to_string(),
            fragment_entry: "frag_main".to_string(),
            clear_color: wgpu::Color::WHITE,
        }
    }
}

/// Draws a fullscreen quad with a single fragment shader.
///
/// The shader must declare one uniform block at `@group(0) @binding(0)` whose
/// fields follow the uniform tree's declaration order (vec3 declared as vec4,
/// nested groups padded to 16 bytes). The vertex stage is expected to emit the
/// six quad vertices from `vertex_index`.
pub struct FullscreenPass {
    config: PassConfig,
    uniforms: UniformBuffer,

    // Kept alive for the bind group and pipeline layout.
    _bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl FullscreenPass {
    pub fn new(
        ctx: &RenderCtx<'_>,
        shader_source: &str,
        uniforms: &UniformGroup,
        config: PassConfig,
    ) -> Result<Self> {
        let uniforms = UniformBuffer::new(
            ctx.device,
            &format!("{} uniforms", config.label),
            uniforms,
        )
        .context("failed to create pass uniform buffer")?;

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(format!("{} bgl", config.label).as_str()),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(uniforms.size()),
                    },
                    count: None,
                }],
            });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(format!("{} bind group", config.label).as_str()),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.buffer().as_entire_binding(),
            }],
        });

        let pipeline = create_pipeline(ctx, shader_source, &bind_group_layout, &config);

        log::debug!(
            "{}: pipeline ready ({} uniform bytes, format {:?}, {}x{})",
            config.label,
            uniforms.size(),
            ctx.surface_format,
            ctx.width,
            ctx.height
        );

        Ok(Self {
            config,
            uniforms,
            _bind_group_layout: bind_group_layout,
            bind_group,
            pipeline,
        })
    }

    /// Uploads the uniform block, then clears the target and draws the quad.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.uniforms.update(ctx.queue);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.config.label.as_str()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..6, 0..1);
    }

    /// CPU mirror of the uniform block as of the last upload.
    pub fn uniforms(&self) -> &PackedUniforms {
        self.uniforms.packed()
    }

    pub fn config(&self) -> &PassConfig {
        &self.config
    }
}

fn create_pipeline(
    ctx: &RenderCtx<'_>,
    shader_source: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
    config: &PassConfig,
) -> wgpu::RenderPipeline {
    let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(format!("{} shader", config.label).as_str()),
        source: wgpu::ShaderSource::Wgsl(shader_source.into()),
    });

    let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(format!("{} pipeline layout", config.label).as_str()),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(format!("{} pipeline", config.label).as_str()),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(config.vertex_entry.as_str()),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(config.fragment_entry.as_str()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_shader_contract() {
        let c = PassConfig::default();
        assert_eq!(c.vertex_entry, "vert_main");
        assert_eq!(c.fragment_entry, "frag_main");
        assert_eq!(c.clear_color, wgpu::Color::WHITE);
    }
}
