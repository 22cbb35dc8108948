use derivative::Derivative;

/// Render target holding one tile's worth of precomputed data, optionally
/// split into layers.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Texture {
    #[derivative(Debug = "ignore")]
    tex: wgpu::Texture,

    #[derivative(Debug = "ignore")]
    view: wgpu::TextureView,

    #[derivative(Debug = "ignore")]
    layer_views: Vec<wgpu::TextureView>,

    size: u32,
    layers: u32,
    format: wgpu::TextureFormat,
}

impl Texture {
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: u32,
        layers: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let label = label.as_ref();

        log::debug!(
            "Allocating texture `{label}`; size={size}, layers={layers}, \
             format={format:?}"
        );

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label}_tex")),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view_dimension = if layers > 1 {
            wgpu::TextureViewDimension::D2Array
        } else {
            wgpu::TextureViewDimension::D2
        };

        let view = tex.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}_view")),
            dimension: Some(view_dimension),
            ..Default::default()
        });

        let layer_views = (0..layers)
            .map(|layer| {
                tex.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("{label}_view_{layer}")),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        Self {
            tex,
            view,
            layer_views,
            size,
            layers,
            format,
        }
    }

    pub fn tex(&self) -> &wgpu::Texture {
        &self.tex
    }

    /// View over all layers; `D2Array` when there's more than one.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn layer_view(&self, layer: u32) -> Option<&wgpu::TextureView> {
        self.layer_views.get(layer as usize)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Whether this texture can be reused for a target of given shape.
    pub fn fits(
        &self,
        size: u32,
        layers: u32,
        format: wgpu::TextureFormat,
    ) -> bool {
        self.size == size && self.layers == layers && self.format == format
    }
}
