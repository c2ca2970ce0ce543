//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn with the [`Render`] enum. The engine
//! walks every flow's render tree once per frame, sorts the draws by pipeline
//! and then issues all solid draws followed by all wireframe draws, so each
//! pipeline is bound at most once per pass.

use crate::{
    context::Context,
    data_structures::{batch::InstanceBatch, model::{DrawGeometry, GpuGeometry}},
};

/// One instanced draw: a shared geometry plus the buffer of its instances.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub geometry: &'a GpuGeometry,
    pub amount: usize,
}

/// Specifies how a flow's objects should be rendered.
///
/// - `None` renders nothing
/// - `Solid` renders filled triangles
/// - `Wireframe` renders triangle edges as lines
/// - `Composed` renders each of its children
pub enum Render<'a> {
    None,
    Solid(Instanced<'a>),
    Wireframe(Instanced<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn sort_into(self, solids: &mut Vec<Instanced<'a>>, wires: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Solid(instanced) => solids.push(instanced),
            Render::Wireframe(instanced) => wires.push(instanced),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.sort_into(solids, wires)),
            Render::None => (),
        }
    }
}

impl<'a> Render<'a> {
    /// Draw `batch` with the pipeline its material asks for.
    pub fn from_batch(batch: &'a InstanceBatch, geometry: &'a GpuGeometry) -> Self {
        let instanced = Instanced {
            instance: &batch.instance_buffer,
            geometry,
            amount: batch.len(),
        };
        if batch.wireframe {
            Render::Wireframe(instanced)
        } else {
            Render::Solid(instanced)
        }
    }
}

/// Record the collected draws into `render_pass`.
pub(crate) fn draw_sorted(
    ctx: &Context,
    render_pass: &mut wgpu::RenderPass<'_>,
    solids: Vec<Instanced<'_>>,
    wires: Vec<Instanced<'_>>,
) {
    if !solids.is_empty() {
        render_pass.set_pipeline(&ctx.pipelines.solid);
        for instanced in solids {
            if instanced.amount == 0 {
                log::warn!("you attempted to render something with zero instances");
                continue;
            }
            render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
            render_pass.draw_geometry_instanced(
                instanced.geometry,
                0..instanced.amount as u32,
                &ctx.camera.bind_group,
            );
        }
    }

    if !wires.is_empty() {
        render_pass.set_pipeline(&ctx.pipelines.wireframe);
        for instanced in wires {
            if instanced.amount == 0 {
                log::warn!("you attempted to render something with zero instances");
                continue;
            }
            render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
            render_pass.draw_wireframe_instanced(
                instanced.geometry,
                0..instanced.amount as u32,
                &ctx.camera.bind_group,
            );
        }
    }
}
