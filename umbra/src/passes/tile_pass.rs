use std::marker::PhantomData;
use std::mem;
use std::ops::Range;

use bytemuck::Pod;
use derivative::Derivative;
use log::debug;

use crate::{BindGroup, BindGroupBuilder, Bindable};

/// Full-screen fragment pass rendering one tile's worth of data.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct TilePass<P> {
    label: String,
    bind_group: BindGroup,

    #[derivative(Debug = "ignore")]
    pipeline: wgpu::RenderPipeline,

    _params: PhantomData<P>,
}

impl<P> TilePass<P>
where
    P: Pod,
{
    pub fn builder<'a>(label: impl ToString) -> TilePassBuilder<'a, P> {
        let label = label.to_string();

        TilePassBuilder {
            bind_group: BindGroup::builder(format!("{label}_bg0")),
            label,
            _params: PhantomData,
        }
    }

    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        params: P,
    ) {
        let label = format!("umbra_{}_pass", self.label);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.bind_group.get(), &[]);

        if mem::size_of::<P>() > 0 {
            pass.set_push_constants(
                wgpu::ShaderStages::FRAGMENT,
                0,
                bytemuck::bytes_of(&params),
            );
        }

        pass.draw(0..3, 0..1);
    }
}

pub struct TilePassBuilder<'a, P> {
    label: String,
    bind_group: BindGroupBuilder<'a>,
    _params: PhantomData<P>,
}

impl<'a, P> TilePassBuilder<'a, P>
where
    P: Pod,
{
    pub fn bind<const N: usize>(mut self, items: [&'a dyn Bindable; N]) -> Self {
        for item in items {
            self.bind_group = self.bind_group.add(item);
        }

        self
    }

    pub fn build(
        self,
        device: &wgpu::Device,
        vertex: &(wgpu::ShaderModule, &'static str),
        fragment: &(wgpu::ShaderModule, &'static str),
        format: wgpu::TextureFormat,
    ) -> TilePass<P> {
        debug!(
            "Initializing pass: {}:{}; format={:?}",
            self.label, fragment.1, format
        );

        let bind_group = self.bind_group.build(device);

        let push_constant_ranges = if mem::size_of::<P>() > 0 {
            vec![wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::FRAGMENT,
                range: Range {
                    start: 0,
                    end: mem::size_of::<P>() as u32,
                },
            }]
        } else {
            vec![]
        };

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("umbra_{}_pipeline_layout", self.label)),
                bind_group_layouts: &[bind_group.layout()],
                push_constant_ranges: &push_constant_ranges,
            });

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("umbra_{}_pipeline", self.label)),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex.0,
                    entry_point: vertex.1,
                    buffers: &[],
                },
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.0,
                    entry_point: fragment.1,
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            });

        TilePass {
            label: self.label,
            bind_group,
            pipeline,
            _params: PhantomData,
        }
    }
}
