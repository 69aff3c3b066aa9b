use bytemuck::{Pod, Zeroable};
use cubegrid_common::Rgba;
use cubegrid_render::{
    MODEL_UNIFORM, MeshHandle, PROJECTION_UNIFORM, ProgramHandle, ProgramSource, RenderBackend,
    RenderError, ShaderStage, VIEW_UNIFORM, Vertex,
};
use glam::Mat4;
use wgpu::util::DeviceExt;

/// Byte stride between per-draw model matrices. Matches the default
/// `min_uniform_buffer_offset_alignment`.
const MODEL_SLOT_SIZE: u64 = 256;

/// Most indexed draws one frame can record.
pub const MAX_DRAWS_PER_FRAME: usize = 64;

const MATRIX_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Uniform names the pipeline layout can bind.
const KNOWN_UNIFORMS: [&str; 3] = [MODEL_UNIFORM, VIEW_UNIFORM, PROJECTION_UNIFORM];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

struct Program {
    pipeline: wgpu::RenderPipeline,
    uniforms: Vec<&'static str>,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct DrawCommand {
    program: usize,
    mesh: usize,
    model_slot: u32,
    index_count: u32,
}

fn declared_uniforms(vertex_source: &str) -> Vec<&'static str> {
    KNOWN_UNIFORMS
        .iter()
        .copied()
        .filter(|name| vertex_source.contains(name))
        .collect()
}

/// Lay out model matrices one per `MODEL_SLOT_SIZE` slot.
fn pack_model_slots(models: &[Mat4]) -> Vec<u8> {
    let mut bytes = vec![0u8; models.len() * MODEL_SLOT_SIZE as usize];
    for (slot, model) in bytes.chunks_exact_mut(MODEL_SLOT_SIZE as usize).zip(models) {
        let cols = model.to_cols_array_2d();
        slot[..MATRIX_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&cols));
    }
    bytes
}

fn to_wgpu_color(color: Rgba) -> wgpu::Color {
    let [r, g, b, a] = color.0;
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: f64::from(a),
    }
}

/// wgpu implementation of [`RenderBackend`].
///
/// Calls between `clear` and [`WgpuBackend::render_to`] are recorded and
/// replayed in a single render pass. The backend owns the device and queue;
/// callers borrow them for surface and overlay work.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    pipeline_layout: wgpu::PipelineLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    programs: Vec<Program>,
    meshes: Vec<GpuMesh>,
    // Current frame
    clear_color: wgpu::Color,
    current: Option<ProgramHandle>,
    frame: FrameUniforms,
    model: Mat4,
    models: Vec<Mat4>,
    draws: Vec<DrawCommand>,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform_buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("model_uniform_buffer"),
            size: MAX_DRAWS_PER_FRAME as u64 * MODEL_SLOT_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(MATRIX_SIZE),
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model_bind_group"),
            layout: &model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MATRIX_SIZE),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let depth_texture = Self::create_depth_texture(&device, width, height);

        Self {
            device,
            queue,
            surface_format,
            pipeline_layout,
            frame_buffer,
            frame_bind_group,
            model_buffer,
            model_bind_group,
            depth_texture,
            programs: Vec::new(),
            meshes: Vec::new(),
            clear_color: wgpu::Color::WHITE,
            current: None,
            frame: FrameUniforms::default(),
            model: Mat4::IDENTITY,
            models: Vec::new(),
            draws: Vec::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(&self.device, width, height);
    }

    /// Submit the recorded frame into `target` and reset the recording.
    pub fn render_to(&mut self, target: &wgpu::TextureView) {
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&self.frame));
        if !self.models.is_empty() {
            self.queue
                .write_buffer(&self.model_buffer, 0, &pack_model_slots(&self.models));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cube_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for draw in &self.draws {
                let program = &self.programs[draw.program];
                let mesh = &self.meshes[draw.mesh];
                let offset = draw.model_slot * MODEL_SLOT_SIZE as u32;
                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(1, &self.model_bind_group, &[offset]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.draws.clear();
        self.models.clear();
    }

    fn program(&self, handle: ProgramHandle) -> Result<&Program, RenderError> {
        self.programs
            .get(handle.0 as usize)
            .ok_or(RenderError::UnknownProgram(handle))
    }

    fn compile_stage(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<wgpu::ShaderModule, RenderError> {
        if source.trim().is_empty() {
            return Err(RenderError::ShaderCompile {
                stage,
                log: "empty shader source".into(),
            });
        }
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "cube_vertex_shader",
                    ShaderStage::Fragment => "cube_fragment_shader",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(RenderError::ShaderCompile {
                stage,
                log: err.to_string(),
            }),
            None => Ok(module),
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl RenderBackend for WgpuBackend {
    fn compile_and_link(&mut self, source: &ProgramSource<'_>) -> Result<ProgramHandle, RenderError> {
        let vertex = self.compile_stage(ShaderStage::Vertex, source.vertex)?;
        let fragment = self.compile_stage(ShaderStage::Fragment, source.fragment)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("cube_pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x4,
                        ],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::ProgramLink(err.to_string()));
        }

        let handle = ProgramHandle(self.programs.len() as u32);
        let uniforms = declared_uniforms(source.vertex);
        tracing::debug!(program = handle.0, ?uniforms, "program linked");
        self.programs.push(Program { pipeline, uniforms });
        Ok(handle)
    }

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<MeshHandle, RenderError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(RenderError::Backend("cannot upload an empty mesh".into()));
        }
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cube_vertex_buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        // Index buffers must be a multiple of 4 bytes.
        let mut padded = indices.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cube_index_buffer"),
                contents: bytemuck::cast_slice(&padded),
                usage: wgpu::BufferUsages::INDEX,
            });
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        });
        Ok(handle)
    }

    fn clear(&mut self, color: Rgba) -> Result<(), RenderError> {
        self.clear_color = to_wgpu_color(color);
        self.draws.clear();
        self.models.clear();
        Ok(())
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), RenderError> {
        self.program(program)?;
        self.current = Some(program);
        Ok(())
    }

    fn set_uniform_mat4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        matrix: &Mat4,
    ) -> Result<(), RenderError> {
        if !self.program(program)?.uniforms.iter().any(|u| *u == name) {
            return Err(RenderError::UniformNotFound { name: name.into() });
        }
        match name {
            MODEL_UNIFORM => self.model = *matrix,
            VIEW_UNIFORM => self.frame.view = matrix.to_cols_array_2d(),
            PROJECTION_UNIFORM => self.frame.projection = matrix.to_cols_array_2d(),
            _ => return Err(RenderError::UniformNotFound { name: name.into() }),
        }
        Ok(())
    }

    fn bind_and_draw_indexed(&mut self, mesh: MeshHandle, index_count: u32) -> Result<(), RenderError> {
        let program = self.current.ok_or(RenderError::NoProgramBound)?;
        let available = self
            .meshes
            .get(mesh.0 as usize)
            .ok_or(RenderError::UnknownMesh(mesh))?
            .index_count;
        if index_count > available {
            return Err(RenderError::IndexCountOutOfRange {
                requested: index_count,
                available,
            });
        }
        if self.draws.len() >= MAX_DRAWS_PER_FRAME {
            return Err(RenderError::Backend(format!(
                "more than {MAX_DRAWS_PER_FRAME} draws in one frame"
            )));
        }
        let model_slot = self.models.len() as u32;
        self.models.push(self.model);
        self.draws.push(DrawCommand {
            program: program.0 as usize,
            mesh: mesh.0 as usize,
            model_slot,
            index_count,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::CUBE_VERTEX_SHADER;

    #[test]
    fn cube_shader_declares_all_known_uniforms() {
        assert_eq!(declared_uniforms(CUBE_VERTEX_SHADER), KNOWN_UNIFORMS.to_vec());
        assert!(declared_uniforms("fn vs_main() {}").is_empty());
    }

    #[test]
    fn model_slots_are_aligned() {
        let a = Mat4::from_translation(glam::Vec3::X);
        let b = Mat4::from_rotation_z(1.0);
        let bytes = pack_model_slots(&[a, b]);
        assert_eq!(bytes.len(), 2 * MODEL_SLOT_SIZE as usize);

        let second = &bytes[MODEL_SLOT_SIZE as usize..][..MATRIX_SIZE as usize];
        let cols: [[f32; 4]; 4] = bytemuck::pod_read_unaligned(second);
        assert_eq!(Mat4::from_cols_array_2d(&cols), b);
        assert!(bytes[MATRIX_SIZE as usize..MODEL_SLOT_SIZE as usize]
            .iter()
            .all(|&x| x == 0));
    }

    #[test]
    fn slot_budget_covers_the_cube() {
        assert!(MAX_DRAWS_PER_FRAME >= 27);
    }

    #[test]
    fn white_clear_converts() {
        let c = to_wgpu_color(Rgba::WHITE);
        assert_eq!((c.r, c.g, c.b, c.a), (1.0, 1.0, 1.0, 1.0));
    }
}
