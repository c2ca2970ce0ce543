use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{self, Vertex},
        texture::Texture,
    },
    pipelines::basic::{mk_normal_pipeline_layout, mk_render_pipeline, normal_shader},
};

/// Triangle edges drawn as a line list, coloured like the solid pipeline.
///
/// Expects the wireframe index buffer of a
/// [`GpuGeometry`](crate::data_structures::model::GpuGeometry); lines have
/// no facing so nothing is culled.
pub fn mk_wireframe_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = mk_normal_pipeline_layout(device, camera_bind_group_layout);
    mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        &[model::ModelVertex::desc(), InstanceRaw::desc()],
        normal_shader(),
        wgpu::PrimitiveTopology::LineList,
        None,
    )
}
