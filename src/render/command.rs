//! Draw commands: one renderable instance queued for a frame, carrying its
//! own uniform overrides and the sort key computed just before drawing.

use bitflags::bitflags;
use cgmath::{InnerSpace, Matrix, Matrix4, Vector4};
use uuid::Uuid;

use crate::core::math::Aabb;
use crate::render::renderable::Renderable;
use crate::render::sort_key::{SortKey, SortKeyFields};
use crate::scene::layer::RenderLayerId;
use crate::uniform::value::UniformValue;

bitflags! {
    /// Which passes a command participates in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PassFlags: u8 {
        /// The main color pass.
        const MAIN = 1 << 0;
        /// The depth pre-pass.
        const DEPTH_PREPASS = 1 << 1;
        /// A shadow-casting pass.
        const SHADOW = 1 << 2;
    }
}

/// No scene object backs this command (e.g. a full-screen post-process
/// pass or a procedurally generated debug shape).
pub const NO_SCENE_OBJECT: i32 = -1;
/// This command exists but must never be returned by a picking query
/// (e.g. a UI overlay drawn in world space).
pub const NON_PICKABLE: i32 = -2;

/// One queued draw: what to draw, with which shaders, from which camera,
/// carrying whatever per-instance uniform overrides this instance needs.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    renderable: Renderable,
    main_shader: Uuid,
    prepass_shader: Option<Uuid>,
    camera: Uuid,
    main_uniforms: Vec<(String, UniformValue)>,
    prepass_uniforms: Vec<(String, UniformValue)>,
    render_layer: RenderLayerId,
    scene_object_id: i32,
    world_bounds: Aabb,
    depth: f32,
    pass_flags: PassFlags,
    sort_key: Option<SortKey>,
}

impl DrawCommand {
    /// Builds a command. `world_bounds` should already reflect the
    /// renderable's current world-space extent; the pipeline caches it
    /// here so later passes don't have to re-walk the scene graph.
    pub fn new(
        renderable: Renderable,
        main_shader: Uuid,
        camera: Uuid,
        render_layer: RenderLayerId,
        scene_object_id: i32,
        world_bounds: Aabb,
    ) -> Self {
        Self {
            renderable,
            main_shader,
            prepass_shader: None,
            camera,
            main_uniforms: Vec::new(),
            prepass_uniforms: Vec::new(),
            render_layer,
            scene_object_id,
            world_bounds,
            depth: 0.0,
            pass_flags: PassFlags::MAIN,
            sort_key: None,
        }
    }

    /// Attaches a depth (or shadow) pre-pass shader and enables the
    /// matching pass flag.
    pub fn with_prepass_shader(mut self, shader: Uuid, flags: PassFlags) -> Self {
        self.prepass_shader = Some(shader);
        self.pass_flags |= flags;
        self
    }

    /// Queues a uniform write applied to the main-pass shader before this
    /// command draws.
    pub fn add_uniform(&mut self, name: impl Into<String>, value: UniformValue) {
        self.main_uniforms.push((name.into(), value));
    }

    /// Queues a uniform write applied to the pre-pass shader, if any.
    pub fn add_prepass_uniform(&mut self, name: impl Into<String>, value: UniformValue) {
        self.prepass_uniforms.push((name.into(), value));
    }

    pub fn renderable(&self) -> &Renderable {
        &self.renderable
    }

    pub fn main_shader(&self) -> Uuid {
        self.main_shader
    }

    pub fn prepass_shader(&self) -> Option<Uuid> {
        self.prepass_shader
    }

    pub fn camera(&self) -> Uuid {
        self.camera
    }

    pub fn main_uniforms(&self) -> &[(String, UniformValue)] {
        &self.main_uniforms
    }

    pub fn prepass_uniforms(&self) -> &[(String, UniformValue)] {
        &self.prepass_uniforms
    }

    pub fn render_layer(&self) -> RenderLayerId {
        self.render_layer
    }

    pub fn scene_object_id(&self) -> i32 {
        self.scene_object_id
    }

    pub fn world_bounds(&self) -> Aabb {
        self.world_bounds
    }

    pub fn pass_flags(&self) -> PassFlags {
        self.pass_flags
    }

    /// The sort key computed by the last [`DrawCommand::pre_sort`] call.
    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    /// Computes and caches this command's view-space depth under
    /// `view_matrix`, normalized against the pipeline's running
    /// `[nearest, farthest]` tracking for the current frame, then packs the
    /// final sort key.
    ///
    /// Called once per command per frame, after every command has been
    /// queued and the pipeline has observed every command's raw depth —
    /// see [`crate::render::pipeline::RenderPipeline::sort`].
    pub fn pre_sort(
        &mut self,
        view_matrix: Matrix4<f32>,
        nearest: f32,
        farthest: f32,
        viewport_index: u8,
        layer_order_index: u16,
        material_id: u16,
        shader_id: u16,
    ) {
        let depth = view_space_depth(view_matrix, self.world_bounds.center());
        self.depth = depth;
        let span = (farthest - nearest).max(f32::EPSILON);
        let normalized_depth = ((depth - nearest) / span).clamp(0.0, 1.0);

        self.sort_key = Some(SortKey::build(SortKeyFields {
            transparency: self.renderable.settings.transparency,
            viewport_index,
            layer_order_index,
            material_id,
            shader_id,
            normalized_depth,
        }));
    }

    /// The raw view-space depth computed by the last `pre_sort` call.
    pub fn depth(&self) -> f32 {
        self.depth
    }
}

/// The view-space z of a world-space point: the dot product of the view
/// matrix's third row with the homogeneous point. Monotone in true
/// camera-relative depth, unlike Euclidean distance from the camera's
/// position, which can't distinguish in-front-of-camera from behind it.
pub(crate) fn view_space_depth(view_matrix: Matrix4<f32>, world_point: crate::core::math::Vec3) -> f32 {
    let row = view_matrix.row(2);
    let point = Vector4::new(world_point.x, world_point.y, world_point.z, 1.0);
    row.dot(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vec3;
    use crate::render::renderable::RenderSettings;

    fn command() -> DrawCommand {
        DrawCommand::new(
            Renderable::screen_space(RenderSettings::default()),
            Uuid::nil(),
            Uuid::nil(),
            0,
            NO_SCENE_OBJECT,
            Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
        )
    }

    #[test]
    fn pre_sort_computes_view_space_depth() {
        let mut cmd = command();
        let view_matrix = Matrix4::from_translation(Vec3::new(0.0, 0.0, 5.0).into());
        cmd.pre_sort(view_matrix, 0.0, 10.0, 0, 0, 0, 0);
        assert_eq!(cmd.depth(), 5.0);
        assert!(cmd.sort_key().is_some());
    }

    #[test]
    fn with_prepass_shader_sets_flag() {
        let cmd = command().with_prepass_shader(Uuid::nil(), PassFlags::DEPTH_PREPASS);
        assert!(cmd.pass_flags().contains(PassFlags::DEPTH_PREPASS));
        assert!(cmd.pass_flags().contains(PassFlags::MAIN));
    }

    #[test]
    fn add_uniform_appends_in_order() {
        let mut cmd = command();
        cmd.add_uniform("uColor", UniformValue::Float(1.0));
        cmd.add_uniform("uShininess", UniformValue::Float(2.0));
        assert_eq!(cmd.main_uniforms()[0].0, "uColor");
        assert_eq!(cmd.main_uniforms()[1].0, "uShininess");
    }
}
