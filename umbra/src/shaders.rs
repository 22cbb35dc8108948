use derivative::Derivative;

macro_rules! shaders {
    ([ $( $name:ident, )* ]) => {
        #[derive(Derivative)]
        #[derivative(Debug)]
        pub struct Shaders {
            $(
                #[derivative(Debug = "ignore")]
                pub $name: (wgpu::ShaderModule, &'static str),
            )*
        }

        impl Shaders {
            pub fn new(device: &wgpu::Device) -> Self {
                log::info!("Initializing shaders");

                Self {
                    $(
                        $name: (
                            device.create_shader_module(wgpu::include_spirv!(
                                env!(concat!(
                                    "umbra_shaders::",
                                    stringify!($name),
                                    ".path"
                                ))
                            )),
                            env!(concat!(
                                "umbra_shaders::",
                                stringify!($name),
                                ".entry_point"
                            )),
                        ),
                    )*
                }
            }
        }
    };
}

shaders!([daylight, fullscreen, gradient, horizon, shadow,]);
