//! Film-grain post-process pass
//!
//! A fullscreen pass inserted after tonemapping that adds per-pixel noise
//! to every colour channel. The camera carries [`FilmGrainSettings`]; its
//! `time` field is advanced by the motion loop every frame.

use bevy::{
    asset::embedded_asset,
    core_pipeline::{
        core_3d::graph::{Core3d, Node3d},
        FullscreenShader,
    },
    ecs::query::QueryItem,
    image::BevyDefault as _,
    prelude::*,
    render::{
        extract_component::{
            ComponentUniforms, DynamicUniformIndex, ExtractComponent, ExtractComponentPlugin,
            UniformComponentPlugin,
        },
        render_graph::{
            NodeRunError, RenderGraphContext, RenderGraphExt, RenderLabel, ViewNode,
            ViewNodeRunner,
        },
        render_resource::{
            binding_types::{sampler, texture_2d, uniform_buffer},
            *,
        },
        renderer::{RenderContext, RenderDevice},
        view::ViewTarget,
        RenderApp, RenderStartup,
    },
};
use player_core::FilmGrain;

const FILM_GRAIN_SHADER_PATH: &str = "embedded://player_scene/film_grain.wgsl";

pub struct FilmGrainPlugin;

impl Plugin for FilmGrainPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "film_grain.wgsl");

        app.add_plugins((
            ExtractComponentPlugin::<FilmGrainSettings>::default(),
            UniformComponentPlugin::<FilmGrainSettings>::default(),
        ));

        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app
            .add_systems(RenderStartup, init_film_grain_pipeline)
            .add_render_graph_node::<ViewNodeRunner<FilmGrainNode>>(Core3d, FilmGrainLabel)
            .add_render_graph_edges(
                Core3d,
                (
                    Node3d::Tonemapping,
                    FilmGrainLabel,
                    Node3d::EndMainPassPostProcessing,
                ),
            );
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, RenderLabel)]
struct FilmGrainLabel;

/// Noise uniforms, one per camera
#[derive(Component, Default, Clone, Copy, ExtractComponent, ShaderType)]
pub struct FilmGrainSettings {
    pub amount: f32,
    pub time: f32,
    // WebGL2 wants uniform structs padded to 16 bytes
    pub _padding: Vec2,
}

impl From<FilmGrain> for FilmGrainSettings {
    fn from(grain: FilmGrain) -> Self {
        Self {
            amount: grain.amount,
            time: grain.time,
            _padding: Vec2::ZERO,
        }
    }
}

#[derive(Default)]
struct FilmGrainNode;

impl ViewNode for FilmGrainNode {
    type ViewQuery = (
        &'static ViewTarget,
        &'static FilmGrainSettings,
        &'static DynamicUniformIndex<FilmGrainSettings>,
    );

    fn run<'w>(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext<'w>,
        (view_target, _settings, settings_index): QueryItem<'w, '_, Self::ViewQuery>,
        world: &'w World,
    ) -> Result<(), NodeRunError> {
        let grain_pipeline = world.resource::<FilmGrainPipeline>();
        let pipeline_cache = world.resource::<PipelineCache>();

        // Still compiling
        let Some(pipeline) = pipeline_cache.get_render_pipeline(grain_pipeline.pipeline_id) else {
            return Ok(());
        };

        let settings_uniforms = world.resource::<ComponentUniforms<FilmGrainSettings>>();
        let Some(settings_binding) = settings_uniforms.uniforms().binding() else {
            return Ok(());
        };

        let post_process = view_target.post_process_write();

        let bind_group = render_context.render_device().create_bind_group(
            "film_grain_bind_group",
            &grain_pipeline.layout,
            &BindGroupEntries::sequential((
                post_process.source,
                &grain_pipeline.sampler,
                settings_binding.clone(),
            )),
        );

        let mut render_pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
            label: Some("film_grain_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: post_process.destination,
                depth_slice: None,
                resolve_target: None,
                ops: Operations::default(),
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_render_pipeline(pipeline);
        render_pass.set_bind_group(0, &bind_group, &[settings_index.index()]);
        render_pass.draw(0..3, 0..1);

        Ok(())
    }
}

#[derive(Resource)]
struct FilmGrainPipeline {
    layout: BindGroupLayout,
    sampler: Sampler,
    pipeline_id: CachedRenderPipelineId,
}

fn init_film_grain_pipeline(
    mut commands: Commands,
    render_device: Res<RenderDevice>,
    asset_server: Res<AssetServer>,
    fullscreen_shader: Res<FullscreenShader>,
    pipeline_cache: Res<PipelineCache>,
) {
    let layout = render_device.create_bind_group_layout(
        "film_grain_bind_group_layout",
        &BindGroupLayoutEntries::sequential(
            ShaderStages::FRAGMENT,
            (
                texture_2d(TextureSampleType::Float { filterable: true }),
                sampler(SamplerBindingType::Filtering),
                uniform_buffer::<FilmGrainSettings>(true),
            ),
        ),
    );

    let sampler = render_device.create_sampler(&SamplerDescriptor::default());
    let shader = asset_server.load(FILM_GRAIN_SHADER_PATH);

    let pipeline_id = pipeline_cache.queue_render_pipeline(RenderPipelineDescriptor {
        label: Some("film_grain_pipeline".into()),
        layout: vec![layout.clone()],
        vertex: fullscreen_shader.to_vertex_state(),
        fragment: Some(FragmentState {
            shader,
            targets: vec![Some(ColorTargetState {
                format: TextureFormat::bevy_default(),
                blend: None,
                write_mask: ColorWrites::ALL,
            })],
            ..default()
        }),
        ..default()
    });

    commands.insert_resource(FilmGrainPipeline {
        layout,
        sampler,
        pipeline_id,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_core() {
        let settings = FilmGrainSettings::from(FilmGrain::default());
        assert!((settings.amount - 0.085).abs() < 1e-6);
        assert_eq!(settings.time, 0.0);
    }

    #[test]
    fn test_uniform_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<FilmGrainSettings>(), 16);
    }
}
