//! Per-frame command queue, sort, and pass execution.
//!
//! Depth normalization uses nearest/farthest fields owned by the pipeline
//! instance rather than process-global statics — a deliberate fix noted in
//! the design ledger, since a global would corrupt sorting the moment two
//! pipelines (e.g. a main view and an offscreen render-to-texture pass)
//! run concurrently.

use cgmath::Matrix4;
use uuid::Uuid;

use crate::core::config::EngineConfig;
use crate::core::error::{RenderError, RenderResult};
use crate::gpu::backend::GraphicsBackend;
use crate::render::command::{view_space_depth, DrawCommand, PassFlags};
use crate::resource::{ResourceCache, ResourcePayload};
use crate::scene::component::Camera;
use crate::uniform::value::UniformValue;

/// Per-camera frame statistics, useful for profiling overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub commands_submitted: usize,
    pub commands_drawn: usize,
    pub draw_calls: usize,
}

/// Owns the command queue for one frame and the running depth bounds used
/// to normalize sort-key depth.
pub struct RenderPipeline {
    config: EngineConfig,
    queue: Vec<DrawCommand>,
    nearest: f32,
    farthest: f32,
    stats: FrameStats,
}

impl RenderPipeline {
    /// Builds a pipeline with the given engine configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            queue: Vec::new(),
            nearest: f32::INFINITY,
            farthest: 0.0,
            stats: FrameStats::default(),
        }
    }

    /// Clears the queue and resets depth tracking, starting a new frame.
    pub fn begin_frame(&mut self) {
        self.queue.clear();
        self.nearest = f32::INFINITY;
        self.farthest = 0.0;
        self.stats = FrameStats::default();
    }

    /// Queues `command`, folding its raw view-space depth under
    /// `view_matrix` into this frame's running `[nearest, farthest]`
    /// bounds. The depth itself isn't final yet — call
    /// [`RenderPipeline::sort`] once every command for the frame has been
    /// submitted.
    pub fn submit(&mut self, command: DrawCommand, view_matrix: Matrix4<f32>) {
        let depth = view_space_depth(view_matrix, command.world_bounds().center());
        self.nearest = self.nearest.min(depth);
        self.farthest = self.farthest.max(depth);
        self.stats.commands_submitted += 1;
        self.queue.push(command);
    }

    /// Recomputes every queued command's sort key against this frame's
    /// final depth bounds, then stably sorts the queue by sort key — a
    /// stable sort so commands with identical keys keep submission order.
    pub fn sort(&mut self, view_matrix: Matrix4<f32>) {
        let nearest = self.nearest;
        let farthest = self.farthest;
        for command in self.queue.iter_mut() {
            let shader_id = shader_sort_id(command);
            let material_id = material_sort_id(command);
            command.pre_sort(view_matrix, nearest, farthest, 0, command.render_layer(), material_id, shader_id);
        }
        self.queue
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    /// Runs every queued command whose pass flags include `pass` against
    /// `backend`: binds the shader, queues and flushes its per-command
    /// uniform writes, binds the material's diffuse texture if it has one,
    /// and issues its draw call against `resources`.
    pub fn execute(
        &mut self,
        pass: PassFlags,
        camera: &Camera,
        backend: &mut dyn GraphicsBackend,
        resources: &mut ResourceCache,
    ) -> RenderResult<usize> {
        backend.set_viewport(
            camera.viewport.x,
            camera.viewport.y,
            camera.viewport.width,
            camera.viewport.height,
        );

        let mut drawn = 0;
        for command in &self.queue {
            if !command.pass_flags().contains(pass) {
                continue;
            }
            let shader_uuid = if pass == PassFlags::MAIN {
                command.main_shader()
            } else {
                command.prepass_shader().unwrap_or(command.main_shader())
            };

            let mesh_uuid = match command.renderable().mesh {
                Some(mesh) => mesh,
                None => continue,
            };

            let uniforms = if pass == PassFlags::MAIN {
                command.main_uniforms()
            } else {
                command.prepass_uniforms()
            };

            draw_one(
                resources,
                backend,
                shader_uuid,
                mesh_uuid,
                command.renderable().material,
                uniforms,
                command.renderable().settings.instance_count,
            )?;
            drawn += 1;
        }
        self.stats.commands_drawn += drawn;
        self.stats.draw_calls += drawn;
        Ok(drawn)
    }

    /// Statistics for the frame built up so far.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Queued commands, in current (possibly sorted) order.
    pub fn queue(&self) -> &[DrawCommand] {
        &self.queue
    }

    /// The eviction budget this pipeline's resource cache should honor,
    /// from the shared engine configuration.
    pub fn eviction_budget_bytes(&self) -> u64 {
        self.config.eviction_budget_bytes
    }
}

fn shader_sort_id(command: &DrawCommand) -> u16 {
    // Truncating a UUID's first two bytes into a sort bucket is a stable,
    // cheap stand-in for a backend-assigned shader slot index; it doesn't
    // need to be collision-free, only consistent for a given program.
    let bytes = command.main_shader().as_bytes();
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn material_sort_id(command: &DrawCommand) -> u16 {
    // Same truncation trick as `shader_sort_id`, but keyed off the
    // renderable's material so commands that share a shader still group by
    // material. Materialless renderables (screen-space passes) fall back to
    // 0, same sort bucket as any other command with no material assigned.
    match command.renderable().material {
        Some(material) => {
            let bytes = material.as_bytes();
            u16::from_le_bytes([bytes[0], bytes[1]])
        }
        None => 0,
    }
}

fn draw_one(
    resources: &mut ResourceCache,
    backend: &mut dyn GraphicsBackend,
    shader_uuid: Uuid,
    mesh_uuid: Uuid,
    material_uuid: Option<Uuid>,
    uniforms: &[(String, UniformValue)],
    instance_count: u32,
) -> RenderResult<()> {
    let mut uniforms = uniforms.to_vec();
    if let Some(material_uuid) = material_uuid {
        if let Some(texture_unit) = bind_material(resources, backend, material_uuid)? {
            uniforms.push(("uDiffuseTexture".to_string(), UniformValue::Int(texture_unit as i32)));
        }
    }

    match resources.payload_mut(shader_uuid) {
        Some(ResourcePayload::ShaderProgram(program)) => {
            // `ignore_mismatch`: per-command overrides and the material's
            // texture unit aren't guaranteed to be declared by every shader
            // a command might draw with.
            for (name, value) in uniforms {
                program.set_uniform_value(&name, value, true)?;
            }
            program.bind(backend)?;
        }
        Some(_) => return Err(RenderError::invariant("command shader uuid does not name a shader program")),
        None => return Err(RenderError::NotFound(format!("shader {shader_uuid} not loaded"))),
    }

    match resources.payload(mesh_uuid) {
        Some(ResourcePayload::Mesh(mesh)) => mesh.vertex_array().draw(backend, instance_count),
        Some(_) => Err(RenderError::invariant("command mesh uuid does not name a mesh")),
        None => Err(RenderError::NotFound(format!("mesh {mesh_uuid} not loaded"))),
    }
}

/// Binds the material's diffuse texture to unit 0, if it has one, returning
/// the unit it was bound to so the caller can point the shader's sampler
/// uniform at it.
fn bind_material(
    resources: &mut ResourceCache,
    backend: &mut dyn GraphicsBackend,
    material_uuid: Uuid,
) -> RenderResult<Option<u32>> {
    let diffuse_texture = match resources.payload(material_uuid) {
        Some(ResourcePayload::Material(material)) => material.diffuse_texture,
        Some(_) => return Err(RenderError::invariant("command material uuid does not name a material")),
        None => return Err(RenderError::NotFound(format!("material {material_uuid} not loaded"))),
    };

    let Some(texture_uuid) = diffuse_texture else {
        return Ok(None);
    };
    match resources.payload(texture_uuid) {
        Some(ResourcePayload::Texture(texture)) => {
            texture.bind(backend, 0)?;
            Ok(Some(0))
        }
        Some(_) => Err(RenderError::invariant("material diffuse texture uuid does not name a texture")),
        None => Err(RenderError::NotFound(format!("texture {texture_uuid} not loaded"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::{Aabb, Vec3};
    use crate::render::command::NO_SCENE_OBJECT;
    use crate::render::renderable::{RenderSettings, Renderable};
    use cgmath::SquareMatrix;

    fn command_at(z: f32) -> DrawCommand {
        DrawCommand::new(
            Renderable::screen_space(RenderSettings::default()),
            Uuid::nil(),
            Uuid::nil(),
            0,
            NO_SCENE_OBJECT,
            Aabb::new(Vec3::new(-0.1, -0.1, z - 0.1), Vec3::new(0.1, 0.1, z + 0.1)),
        )
    }

    #[test]
    fn sort_orders_opaque_commands_nearest_first() {
        // An identity view matrix makes view-space z equal world-space z,
        // so commands placed along z sort in z order.
        let view_matrix = Matrix4::identity();
        let mut pipeline = RenderPipeline::new(EngineConfig::default());
        pipeline.begin_frame();
        pipeline.submit(command_at(10.0), view_matrix);
        pipeline.submit(command_at(1.0), view_matrix);
        pipeline.submit(command_at(5.0), view_matrix);
        pipeline.sort(view_matrix);

        let depths: Vec<f32> = pipeline.queue().iter().map(|c| c.depth()).collect();
        assert_eq!(depths, vec![1.0, 5.0, 10.0]);
    }

    #[test]
    fn begin_frame_clears_queue_and_stats() {
        let mut pipeline = RenderPipeline::new(EngineConfig::default());
        pipeline.submit(command_at(1.0), Matrix4::identity());
        pipeline.begin_frame();
        assert!(pipeline.queue().is_empty());
        assert_eq!(pipeline.stats(), FrameStats::default());
    }
}
