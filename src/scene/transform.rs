//! The transform graph: translation/rotation/scale components with cached
//! local and world matrices, propagated through a parent/child hierarchy
//! with three inheritance modes.

use cgmath::{Matrix3, Rotation3, SquareMatrix, Transform};

use crate::core::handle::{Handle, HandleAllocator};
use crate::core::math::{Matrix4, Quaternion, Vec3};

/// Marker type for [`TransformRef`].
#[derive(Debug)]
pub struct TransformMarker;
/// A handle into a [`TransformGraph`].
pub type TransformRef = Handle<TransformMarker>;

/// How a node's world matrix is derived from its parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritanceMode {
    /// `world = parent.world * local`.
    #[default]
    InheritAll,
    /// Only the parent's translation is inherited; rotation/scale are not.
    InheritTranslationOnly,
    /// The parent contributes only a translated origin; this node's own
    /// rotation and scale otherwise apply as if unparented.
    PreserveOrientation,
}

struct TransformNode {
    translation: Vec3,
    rotation: Quaternion<f32>,
    scale: Vec3,
    inheritance: InheritanceMode,
    local_matrix: Matrix4<f32>,
    world_matrix: Matrix4<f32>,
    parent: Option<TransformRef>,
    children: Vec<TransformRef>,
}

impl TransformNode {
    fn identity() -> Self {
        Self {
            translation: Vec3::zero(),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vec3::one(),
            inheritance: InheritanceMode::default(),
            local_matrix: Matrix4::identity(),
            world_matrix: Matrix4::identity(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An arena of transform nodes. Handles are generation-counted, so a stale
/// [`TransformRef`] from a destroyed node is never silently reused.
#[derive(Default)]
pub struct TransformGraph {
    allocator: HandleAllocator<TransformMarker>,
    nodes: Vec<Option<TransformNode>>,
}

impl TransformGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new node, optionally parented to `parent`.
    pub fn create(&mut self, parent: Option<TransformRef>) -> TransformRef {
        let handle = self.allocator.allocate();
        let index = handle.index() as usize;
        if index >= self.nodes.len() {
            self.nodes.resize_with(index + 1, || None);
        }
        let mut node = TransformNode::identity();
        node.parent = parent;
        self.nodes[index] = Some(node);
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(handle);
        }
        self.compute_world_at(handle);
        handle
    }

    /// Destroys `handle` and every descendant.
    pub fn destroy(&mut self, handle: TransformRef) {
        let children = self.node(handle).children.clone();
        for child in children {
            self.destroy(child);
        }
        if let Some(parent) = self.node(handle).parent {
            self.node_mut(parent).children.retain(|&c| c != handle);
        }
        self.nodes[handle.index() as usize] = None;
        self.allocator.deallocate(handle);
    }

    fn node(&self, handle: TransformRef) -> &TransformNode {
        self.nodes[handle.index() as usize]
            .as_ref()
            .expect("stale TransformRef used against TransformGraph")
    }

    fn node_mut(&mut self, handle: TransformRef) -> &mut TransformNode {
        self.nodes[handle.index() as usize]
            .as_mut()
            .expect("stale TransformRef used against TransformGraph")
    }

    /// Local translation.
    pub fn translation(&self, handle: TransformRef) -> Vec3 {
        self.node(handle).translation
    }

    /// Local rotation.
    pub fn rotation(&self, handle: TransformRef) -> Quaternion<f32> {
        self.node(handle).rotation
    }

    /// Local scale.
    pub fn scale(&self, handle: TransformRef) -> Vec3 {
        self.node(handle).scale
    }

    /// The cached local 4x4 matrix.
    pub fn local_matrix(&self, handle: TransformRef) -> Matrix4<f32> {
        self.node(handle).local_matrix
    }

    /// The cached world 4x4 matrix, valid as of the last
    /// [`TransformGraph::compute_world_matrix`] call that reached this node.
    pub fn world_matrix(&self, handle: TransformRef) -> Matrix4<f32> {
        self.node(handle).world_matrix
    }

    /// This node's parent, if any.
    pub fn parent(&self, handle: TransformRef) -> Option<TransformRef> {
        self.node(handle).parent
    }

    /// This node's children, in creation order.
    pub fn children(&self, handle: TransformRef) -> &[TransformRef] {
        &self.node(handle).children
    }

    /// Sets the inheritance mode used when propagating this node's world
    /// matrix from its parent.
    pub fn set_inheritance_mode(&mut self, handle: TransformRef, mode: InheritanceMode) {
        self.node_mut(handle).inheritance = mode;
        self.compute_world_at(handle);
    }

    /// Sets local translation and recomputes this node's and every
    /// descendant's world matrix.
    pub fn set_translation(&mut self, handle: TransformRef, translation: Vec3) {
        let node = self.node_mut(handle);
        node.translation = translation;
        node.local_matrix = build_local_matrix(node.translation, node.rotation, node.scale);
        self.compute_world_at(handle);
    }

    /// Sets local rotation and recomputes this node's and every descendant's
    /// world matrix.
    pub fn set_rotation(&mut self, handle: TransformRef, rotation: Quaternion<f32>) {
        let node = self.node_mut(handle);
        node.rotation = rotation;
        node.local_matrix = build_local_matrix(node.translation, node.rotation, node.scale);
        self.compute_world_at(handle);
    }

    /// Sets local scale and recomputes this node's and every descendant's
    /// world matrix.
    pub fn set_scale(&mut self, handle: TransformRef, scale: Vec3) {
        let node = self.node_mut(handle);
        node.scale = scale;
        node.local_matrix = build_local_matrix(node.translation, node.rotation, node.scale);
        self.compute_world_at(handle);
    }

    /// Sets this node's *world*-space position by solving for the local
    /// translation that produces it, given the parent's current world
    /// matrix. With no parent, equivalent to [`TransformGraph::set_translation`].
    pub fn set_world_position(&mut self, handle: TransformRef, world_position: Vec3) {
        match self.node(handle).parent {
            None => self.set_translation(handle, world_position),
            Some(parent) => {
                let parent_world = self.node(parent).world_matrix;
                let inverse = parent_world.invert().unwrap_or_else(Matrix4::identity);
                let local_point = inverse.transform_point(world_position.into());
                self.set_translation(handle, Vec3::new(local_point.x, local_point.y, local_point.z));
            }
        }
    }

    /// Left-multiplies the local rotation by a rotation of `angle_radians`
    /// about `axis`.
    pub fn rotate_about_axis(&mut self, handle: TransformRef, axis: Vec3, angle_radians: f32) {
        let delta = Quaternion::from_axis_angle(axis.normalize().into(), cgmath::Rad(angle_radians));
        let node = self.node_mut(handle);
        node.rotation = delta * node.rotation;
        node.local_matrix = build_local_matrix(node.translation, node.rotation, node.scale);
        self.compute_world_at(handle);
    }

    /// Extracts translation/rotation/scale from an arbitrary matrix and
    /// stores them as this node's local components. Does **not** recompute
    /// world matrices — call [`TransformGraph::compute_world_matrix`]
    /// explicitly once all decomposition for the frame is done.
    pub fn decompose(&mut self, handle: TransformRef, matrix: Matrix4<f32>) {
        let col0 = Vec3::new(matrix.x.x, matrix.x.y, matrix.x.z);
        let col1 = Vec3::new(matrix.y.x, matrix.y.y, matrix.y.z);
        let col2 = Vec3::new(matrix.z.x, matrix.z.y, matrix.z.z);
        let translation = Vec3::new(matrix.w.x, matrix.w.y, matrix.w.z);
        let scale = Vec3::new(col0.length(), col1.length(), col2.length());

        let unscale = |v: Vec3, s: f32| if s.abs() > f32::EPSILON { v / s } else { v };
        let rotation_matrix = Matrix3::from_cols(
            unscale(col0, scale.x).into(),
            unscale(col1, scale.y).into(),
            unscale(col2, scale.z).into(),
        );

        let node = self.node_mut(handle);
        node.translation = translation;
        node.scale = scale;
        node.rotation = Quaternion::from(rotation_matrix);
        node.local_matrix = build_local_matrix(node.translation, node.rotation, node.scale);
    }

    /// Recomputes `handle`'s world matrix from its parent (or as its own
    /// local matrix if it's a root) and recurses into every descendant in
    /// depth-first order.
    pub fn compute_world_matrix(&mut self, handle: TransformRef) {
        self.compute_world_at(handle);
    }

    fn compute_world_at(&mut self, handle: TransformRef) {
        let node = self.node(handle);
        let local = node.local_matrix;
        let inheritance = node.inheritance;
        let parent = node.parent;

        let world = match parent {
            None => local,
            Some(parent) => {
                let parent_world = self.node(parent).world_matrix;
                match inheritance {
                    InheritanceMode::InheritAll => parent_world * local,
                    InheritanceMode::InheritTranslationOnly => {
                        let t = Vec3::new(parent_world.w.x, parent_world.w.y, parent_world.w.z);
                        Matrix4::from_translation(t.into()) * local
                    }
                    InheritanceMode::PreserveOrientation => {
                        let node = self.node(handle);
                        let translated = parent_world * Matrix4::from_translation(node.translation.into());
                        let origin = Vec3::new(translated.w.x, translated.w.y, translated.w.z);
                        Matrix4::from_translation(origin.into())
                            * Matrix4::from(node.rotation)
                            * Matrix4::from_nonuniform_scale(node.scale.x, node.scale.y, node.scale.z)
                    }
                }
            }
        };

        self.node_mut(handle).world_matrix = world;

        let children = self.node(handle).children.clone();
        for child in children {
            self.compute_world_at(child);
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    /// `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.allocator.is_empty()
    }
}

fn build_local_matrix(translation: Vec3, rotation: Quaternion<f32>, scale: Vec3) -> Matrix4<f32> {
    Matrix4::from_translation(translation.into()) * Matrix4::from(rotation) * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_world_matrix_equals_local_matrix() {
        let mut graph = TransformGraph::new();
        let root = graph.create(None);
        graph.set_translation(root, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(graph.world_matrix(root), graph.local_matrix(root));
    }

    #[test]
    fn child_inherits_parent_translation_under_inherit_all() {
        let mut graph = TransformGraph::new();
        let parent = graph.create(None);
        graph.set_translation(parent, Vec3::new(10.0, 0.0, 0.0));
        let child = graph.create(Some(parent));
        graph.set_translation(child, Vec3::new(0.0, 1.0, 0.0));

        let world = graph.world_matrix(child);
        assert_eq!(Vec3::new(world.w.x, world.w.y, world.w.z), Vec3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn moving_parent_cascades_to_child_world_matrix() {
        let mut graph = TransformGraph::new();
        let parent = graph.create(None);
        let child = graph.create(Some(parent));
        graph.set_translation(parent, Vec3::new(5.0, 0.0, 0.0));

        let world = graph.world_matrix(child);
        assert_eq!(Vec3::new(world.w.x, world.w.y, world.w.z), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn set_world_position_round_trips_through_parent_offset() {
        let mut graph = TransformGraph::new();
        let parent = graph.create(None);
        graph.set_translation(parent, Vec3::new(10.0, 0.0, 0.0));
        let child = graph.create(Some(parent));

        graph.set_world_position(child, Vec3::new(12.0, 3.0, 0.0));
        let world = graph.world_matrix(child);
        assert_eq!(Vec3::new(world.w.x, world.w.y, world.w.z), Vec3::new(12.0, 3.0, 0.0));
    }

    #[test]
    fn destroying_a_node_destroys_its_descendants() {
        let mut graph = TransformGraph::new();
        let parent = graph.create(None);
        let child = graph.create(Some(parent));
        graph.destroy(parent);
        assert!(!graph.allocator.is_alive(child));
    }

    #[test]
    fn decompose_does_not_touch_world_matrix_until_recompute() {
        let mut graph = TransformGraph::new();
        let node = graph.create(None);
        let before = graph.world_matrix(node);
        graph.decompose(node, Matrix4::from_translation(Vec3::new(7.0, 0.0, 0.0).into()));
        assert_eq!(graph.world_matrix(node), before);
        graph.compute_world_matrix(node);
        let world = graph.world_matrix(node);
        assert_eq!(Vec3::new(world.w.x, world.w.y, world.w.z), Vec3::new(7.0, 0.0, 0.0));
    }
}
