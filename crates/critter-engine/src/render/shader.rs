use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::SetupError;
use crate::paint::Color;

use super::mesh::position_layout;

/// Entry point expected in the vertex stage.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Entry point expected in the fragment stage.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Attribute slot carrying vertex positions.
pub const POSITION_SLOT: u32 = 0;

/// Source text for the two stages of a program.
#[derive(Debug, Copy, Clone)]
pub struct ProgramSource<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl ProgramSource<'static> {
    /// The fixed pass-through vertex stage and tinted fragment stage.
    pub const fn builtin() -> Self {
        Self {
            vertex: include_str!("shaders/mesh.vert.wgsl"),
            fragment: include_str!("shaders/mesh.frag.wgsl"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }

    fn naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    fn entry(self) -> &'static str {
        match self {
            Stage::Vertex => VERTEX_ENTRY,
            Stage::Fragment => FRAGMENT_ENTRY,
        }
    }
}

/// Parses and validates one stage. Diagnostics carry source spans.
fn compile_stage(stage: Stage, src: &str) -> Result<naga::Module, SetupError> {
    let module = naga::front::wgsl::parse_str(src)
        .map_err(|e| SetupError::shader(stage.name(), e.emit_to_string(src)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| SetupError::shader(stage.name(), e.emit_to_string(src)))?;

    let has_entry = module
        .entry_points
        .iter()
        .any(|ep| ep.name == stage.entry() && ep.stage == stage.naga());
    if !has_entry {
        return Err(SetupError::shader(
            stage.name(),
            format!("missing @{} entry point `{}`", stage.name(), stage.entry()),
        ));
    }

    Ok(module)
}

fn entry_point(module: &naga::Module, stage: Stage) -> Option<&naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == stage.entry() && ep.stage == stage.naga())
}

/// `@location` slots carried by a binding with their types, expanding struct members.
fn locations(
    module: &naga::Module,
    binding: Option<&naga::Binding>,
    ty: naga::Handle<naga::Type>,
) -> Vec<(u32, naga::Handle<naga::Type>)> {
    match binding {
        Some(naga::Binding::Location { location, .. }) => vec![(*location, ty)],
        Some(_) => Vec::new(),
        None => match &module.types[ty].inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|m| match &m.binding {
                    Some(naga::Binding::Location { location, .. }) => Some((*location, m.ty)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
    }
}

fn input_locations(
    module: &naga::Module,
    ep: &naga::EntryPoint,
) -> Vec<(u32, naga::Handle<naga::Type>)> {
    ep.function
        .arguments
        .iter()
        .flat_map(|arg| locations(module, arg.binding.as_ref(), arg.ty))
        .collect()
}

fn output_locations(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<u32> {
    ep.function
        .result
        .as_ref()
        .map(|r| locations(module, r.binding.as_ref(), r.ty))
        .unwrap_or_default()
        .into_iter()
        .map(|(location, _)| location)
        .collect()
}

/// `Float32x3` vertex data feeds `f32` scalars and vectors only.
fn accepts_float_attribute(module: &naga::Module, ty: naga::Handle<naga::Type>) -> bool {
    match &module.types[ty].inner {
        naga::TypeInner::Scalar(scalar) | naga::TypeInner::Vector { scalar, .. } => {
            *scalar == naga::Scalar::F32
        }
        _ => false,
    }
}

/// Checks the vertex inputs against the single position buffer layout.
fn check_vertex_inputs(module: &naga::Module, ep: &naga::EntryPoint) -> Result<(), SetupError> {
    let inputs = input_locations(module, ep);

    if !inputs.iter().any(|(location, _)| *location == POSITION_SLOT) {
        return Err(SetupError::shader(
            "link",
            format!("vertex stage does not read attribute @location({POSITION_SLOT})"),
        ));
    }

    for (location, ty) in inputs {
        if location != POSITION_SLOT {
            return Err(SetupError::shader(
                "link",
                format!("vertex attribute @location({location}) has no vertex buffer"),
            ));
        }
        if !accepts_float_attribute(module, ty) {
            return Err(SetupError::shader(
                "link",
                format!("vertex attribute @location({location}) is not an f32 scalar or vector"),
            ));
        }
    }

    Ok(())
}

/// The tint uniform at `@group(0) @binding(0)` is the only resource, and only
/// the fragment stage may declare it.
fn check_resources(module: &naga::Module, stage: Stage) -> Result<(), SetupError> {
    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };
        let is_tint = binding.group == 0
            && binding.binding == 0
            && matches!(var.space, naga::AddressSpace::Uniform);
        if !is_tint {
            return Err(SetupError::shader(
                "link",
                format!(
                    "{} stage declares unsupported resource at @group({}) @binding({})",
                    stage.name(),
                    binding.group,
                    binding.binding
                ),
            ));
        }
        if stage != Stage::Fragment {
            return Err(SetupError::shader(
                "link",
                format!("tint uniform is not visible to the {} stage", stage.name()),
            ));
        }
    }
    Ok(())
}

/// Compiles both stages and checks that they link into a usable program.
///
/// Linking requires: the vertex stage reads only the position attribute, as
/// `f32` data; every fragment input is written by the vertex stage; the only
/// resource is the tint uniform, used from the fragment stage.
pub fn check_program(source: &ProgramSource<'_>) -> Result<(), SetupError> {
    let vertex = compile_stage(Stage::Vertex, source.vertex)?;
    let fragment = compile_stage(Stage::Fragment, source.fragment)?;

    let link_err = |detail: String| SetupError::shader("link", detail);

    let vs = entry_point(&vertex, Stage::Vertex);
    let fs = entry_point(&fragment, Stage::Fragment);
    let (Some(vs), Some(fs)) = (vs, fs) else {
        return Err(link_err("entry points missing after compilation".to_string()));
    };

    check_vertex_inputs(&vertex, vs)?;

    let produced = output_locations(&vertex, vs);
    for (location, _) in input_locations(&fragment, fs) {
        if !produced.contains(&location) {
            return Err(link_err(format!(
                "fragment input @location({location}) is not written by the vertex stage"
            )));
        }
    }

    check_resources(&vertex, Stage::Vertex)?;
    check_resources(&fragment, Stage::Fragment)?;

    Ok(())
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TintUniform {
    color: [f32; 4],
}

/// A linked two-stage program plus its tint uniform.
///
/// Immutable after creation apart from the uniform value.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    tint_ubo: wgpu::Buffer,
    format: wgpu::TextureFormat,
}

impl ShaderProgram {
    /// Compiles, links and uploads a program targeting `surface_format`.
    pub fn build(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        source: &ProgramSource<'_>,
    ) -> Result<Self, SetupError> {
        check_program(source)?;

        // Anything naga accepts but the device still rejects lands here
        // instead of the uncaptured-error handler.
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("critter vertex stage"),
            source: wgpu::ShaderSource::Wgsl(source.vertex.into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("critter fragment stage"),
            source: wgpu::ShaderSource::Wgsl(source.fragment.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("critter tint bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<TintUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("critter program layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("critter program"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[position_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
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
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(SetupError::shader("link", err.to_string()));
        }

        // Stage modules are only needed until the pipeline exists.
        drop(vertex_module);
        drop(fragment_module);

        let tint_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("critter tint ubo"),
            contents: bytemuck::bytes_of(&TintUniform {
                color: Color::ORANGE.to_array(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("critter tint bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: tint_ubo.as_entire_binding(),
            }],
        });

        log::debug!("shader program linked for {surface_format:?}");

        Ok(Self {
            pipeline,
            bind_group,
            tint_ubo,
            format: surface_format,
        })
    }

    /// Target format the pipeline was built for.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Writes the `tint` uniform; takes effect for draws submitted afterwards.
    pub fn set_tint(&self, queue: &wgpu::Queue, color: Color) {
        let u = TintUniform {
            color: color.clamped().to_array(),
        };
        queue.write_buffer(&self.tint_ubo, 0, bytemuck::bytes_of(&u));
    }

    /// Binds the pipeline and its uniforms on `rpass`.
    pub(crate) fn bind(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupErrorKind;

    const FRAGMENT_WITH_INPUT: &str = r#"
        @fragment
        fn fs_main(@location(1) shade: vec4<f32>) -> @location(0) vec4<f32> {
            return shade;
        }
    "#;

    #[test]
    fn builtin_program_links() {
        check_program(&ProgramSource::builtin()).unwrap();
    }

    #[test]
    fn vertex_syntax_error_is_reported_per_stage() {
        let src = ProgramSource {
            vertex: "@vertex fn vs_main( -> {",
            fragment: ProgramSource::builtin().fragment,
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.kind, SetupErrorKind::ShaderBuildFailed);
        assert_eq!(err.subsystem, "shader:vertex");
        assert!(!err.detail.is_empty());
    }

    #[test]
    fn fragment_type_error_is_reported_per_stage() {
        let src = ProgramSource {
            vertex: ProgramSource::builtin().vertex,
            fragment: "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }",
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.subsystem, "shader:fragment");
    }

    #[test]
    fn missing_entry_point_fails() {
        let src = ProgramSource {
            vertex: "@vertex fn main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> { return vec4<f32>(p, 1.0); }",
            fragment: ProgramSource::builtin().fragment,
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.subsystem, "shader:vertex");
        assert!(err.detail.contains("vs_main"));
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let src = ProgramSource {
            vertex: ProgramSource::builtin().vertex,
            fragment: FRAGMENT_WITH_INPUT,
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.subsystem, "shader:link");
        assert!(err.detail.contains("@location(1)"));
    }

    #[test]
    fn vertex_stage_must_read_position_slot() {
        let src = ProgramSource {
            vertex: "@vertex fn vs_main(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> { return vec4<f32>(0.0, 0.0, 0.0, 1.0); }",
            fragment: ProgramSource::builtin().fragment,
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.subsystem, "shader:link");
    }

    #[test]
    fn struct_outputs_satisfy_fragment_inputs() {
        let vertex = r#"
            struct VsOut {
                @builtin(position) clip: vec4<f32>,
                @location(1) shade: vec4<f32>,
            };

            @vertex
            fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
                var out: VsOut;
                out.clip = vec4<f32>(position, 1.0);
                out.shade = vec4<f32>(1.0, 1.0, 1.0, 1.0);
                return out;
            }
        "#;
        let src = ProgramSource {
            vertex,
            fragment: FRAGMENT_WITH_INPUT,
        };
        check_program(&src).unwrap();
    }

    #[test]
    fn foreign_resource_binding_fails_to_link() {
        let fragment = r#"
            @group(1) @binding(3) var<uniform> other: vec4<f32>;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return other;
            }
        "#;
        let src = ProgramSource {
            vertex: ProgramSource::builtin().vertex,
            fragment,
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.subsystem, "shader:link");
        assert!(err.detail.contains("@group(1)"));
    }

    #[test]
    fn extra_vertex_attribute_fails_to_link() {
        let vertex = r#"
            @vertex
            fn vs_main(
                @location(0) position: vec3<f32>,
                @location(1) offset: vec3<f32>,
            ) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position + offset, 1.0);
            }
        "#;
        let src = ProgramSource {
            vertex,
            fragment: ProgramSource::builtin().fragment,
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.subsystem, "shader:link");
        assert!(err.detail.contains("@location(1)"));
    }

    #[test]
    fn integer_position_fails_to_link() {
        let vertex = r#"
            @vertex
            fn vs_main(@location(0) position: vec4<u32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position);
            }
        "#;
        let src = ProgramSource {
            vertex,
            fragment: ProgramSource::builtin().fragment,
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.subsystem, "shader:link");
        assert!(err.detail.contains("f32"));
    }

    #[test]
    fn narrower_float_position_links() {
        let vertex = r#"
            @vertex
            fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position, 0.0, 1.0);
            }
        "#;
        let src = ProgramSource {
            vertex,
            fragment: ProgramSource::builtin().fragment,
        };
        check_program(&src).unwrap();
    }

    #[test]
    fn tint_in_vertex_stage_fails_to_link() {
        let vertex = r#"
            struct Tint {
                color: vec4<f32>,
            };

            @group(0) @binding(0) var<uniform> tint: Tint;

            @vertex
            fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position * tint.color.x, 1.0);
            }
        "#;
        let src = ProgramSource {
            vertex,
            fragment: ProgramSource::builtin().fragment,
        };
        let err = check_program(&src).unwrap_err();
        assert_eq!(err.subsystem, "shader:link");
        assert!(err.detail.contains("vertex stage"));
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn device_rejection_is_a_shader_error() {
        let (device, _queue) = crate::render::test_device().expect("no GPU adapter available");
        // Passes the CPU checks, but the pipeline's 16-byte uniform binding is too
        // small for this declaration.
        let fragment = r#"
            struct Wide {
                color: vec4<f32>,
                extra: vec4<f32>,
            };

            @group(0) @binding(0) var<uniform> tint: Wide;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return tint.color + tint.extra;
            }
        "#;
        let src = ProgramSource {
            vertex: ProgramSource::builtin().vertex,
            fragment,
        };
        let err = match ShaderProgram::build(&device, wgpu::TextureFormat::Rgba8UnormSrgb, &src) {
            Ok(_) => panic!("oversized uniform should be rejected"),
            Err(err) => err,
        };
        assert_eq!(err.kind, SetupErrorKind::ShaderBuildFailed);
        assert_eq!(err.subsystem, "shader:link");
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn builtin_program_builds_on_device() {
        let (device, _queue) = crate::render::test_device().expect("no GPU adapter available");
        let program = ShaderProgram::build(
            &device,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            &ProgramSource::builtin(),
        )
        .unwrap();
        assert_eq!(program.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
    }
}
