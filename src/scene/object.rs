//! Scene objects: a free-list-recycled id, a transform, a per-type component
//! array, and the cached world-bounds aggregate.

use std::collections::HashMap;

use crate::core::math::Aabb;
use crate::scene::component::{Component, ComponentType};
use crate::scene::layer::RenderLayerSet;
use crate::scene::transform::{InheritanceMode, TransformGraph, TransformRef};

/// Recycles plain `u32` ids without generation checks — unlike
/// [`crate::core::handle::Handle`],
/// reused scene-object ids are not distinguishable from their predecessor
/// by the id alone. Callers that need staleness detection should check
/// [`SceneGraph::contains`] before trusting a held id.
#[derive(Debug, Default)]
struct SceneObjectIdAllocator {
    next: u32,
    free: Vec<u32>,
}

impl SceneObjectIdAllocator {
    fn allocate(&mut self) -> u32 {
        self.free.pop().unwrap_or_else(|| {
            let id = self.next;
            self.next += 1;
            id
        })
    }

    fn release(&mut self, id: u32) {
        self.free.push(id);
    }
}

/// One node in the scene graph.
pub struct SceneObject {
    id: u32,
    name: String,
    transform: TransformRef,
    components: Vec<Option<Component>>,
    world_bounds: Aabb,
    render_layers: RenderLayerSet,
    parent: Option<u32>,
    children: Vec<u32>,
}

impl SceneObject {
    fn new(id: u32, name: String, transform: TransformRef, parent: Option<u32>) -> Self {
        Self {
            id,
            name,
            transform,
            components: (0..ComponentType::COUNT).map(|_| None).collect(),
            world_bounds: Aabb::EMPTY,
            render_layers: RenderLayerSet::new(),
            parent,
            children: Vec::new(),
        }
    }

    /// This object's id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The transform graph node backing this object's placement.
    pub fn transform(&self) -> TransformRef {
        self.transform
    }

    /// The cached world-space bounds, last computed by
    /// [`SceneGraph::recompute_world_bounds`].
    pub fn world_bounds(&self) -> Aabb {
        self.world_bounds
    }

    /// Layers this object belongs to, for camera gating.
    pub fn render_layers(&self) -> &RenderLayerSet {
        &self.render_layers
    }

    /// This object's parent id, if any.
    pub fn parent(&self) -> Option<u32> {
        self.parent
    }

    /// This object's children, in creation order.
    pub fn children(&self) -> &[u32] {
        &self.children
    }

    /// The component installed in `slot`, if any.
    pub fn component(&self, slot: ComponentType) -> Option<&Component> {
        self.components[slot as usize].as_ref()
    }

    /// Every installed component.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter_map(|c| c.as_ref())
    }
}

/// The scene graph: owns a [`TransformGraph`] and every [`SceneObject`],
/// keyed by a free-list-recycled id.
pub struct SceneGraph {
    transforms: TransformGraph,
    objects: HashMap<u32, SceneObject>,
    ids: SceneObjectIdAllocator,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// An empty scene graph.
    pub fn new() -> Self {
        Self {
            transforms: TransformGraph::new(),
            objects: HashMap::new(),
            ids: SceneObjectIdAllocator::default(),
        }
    }

    /// Direct access to the backing transform graph, e.g. to set
    /// translation/rotation/scale on an object's transform.
    pub fn transforms(&self) -> &TransformGraph {
        &self.transforms
    }

    /// Mutable access to the backing transform graph.
    pub fn transforms_mut(&mut self) -> &mut TransformGraph {
        &mut self.transforms
    }

    /// Creates a new object named `name`, optionally parented to `parent`.
    /// Returns `None` if `parent` does not exist.
    pub fn create(&mut self, name: impl Into<String>, parent: Option<u32>) -> Option<u32> {
        let parent_transform = match parent {
            Some(parent_id) => Some(self.objects.get(&parent_id)?.transform),
            None => None,
        };
        let id = self.ids.allocate();
        let transform = self.transforms.create(parent_transform);
        self.objects
            .insert(id, SceneObject::new(id, name.into(), transform, parent));
        if let Some(parent_id) = parent {
            self.objects.get_mut(&parent_id).unwrap().children.push(id);
        }
        Some(id)
    }

    /// `true` if `id` currently names a live object.
    pub fn contains(&self, id: u32) -> bool {
        self.objects.contains_key(&id)
    }

    /// Looks up an object by id.
    pub fn get(&self, id: u32) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Destroys `id` and every descendant, releasing their ids and
    /// transform nodes for reuse.
    pub fn destroy(&mut self, id: u32) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        let children = object.children.clone();
        let parent = object.parent;
        let transform = object.transform;

        for child in children {
            self.destroy(child);
        }
        if let Some(parent_id) = parent {
            if let Some(parent) = self.objects.get_mut(&parent_id) {
                parent.children.retain(|&c| c != id);
            }
        }
        self.transforms.destroy(transform);
        self.objects.remove(&id);
        self.ids.release(id);
    }

    /// Sets the inheritance mode of `id`'s transform node. No-op if `id`
    /// does not exist.
    pub fn set_inheritance_mode(&mut self, id: u32, mode: InheritanceMode) {
        if let Some(object) = self.objects.get(&id) {
            self.transforms.set_inheritance_mode(object.transform, mode);
        }
    }

    /// Installs (or replaces) a component in `id`'s matching slot.
    pub fn set_component(&mut self, id: u32, component: Component) {
        if let Some(object) = self.objects.get_mut(&id) {
            let slot = component.component_type() as usize;
            object.components[slot] = Some(component);
        }
        self.recompute_world_bounds(id);
    }

    /// Removes whatever component occupies `slot` on `id`, if any.
    pub fn remove_component(&mut self, id: u32, slot: ComponentType) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.components[slot as usize] = None;
        }
        self.recompute_world_bounds(id);
    }

    /// Adds `layer` to `id`'s render-layer set.
    pub fn add_render_layer(&mut self, id: u32, layer: u16) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.render_layers.insert(layer);
        }
    }

    /// Removes `layer` from `id`'s render-layer set.
    pub fn remove_render_layer(&mut self, id: u32, layer: u16) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.render_layers.remove(layer);
        }
    }

    /// Recomputes `id`'s world-space bounds by unioning every component's
    /// object-space bounds, transformed by the object's current world
    /// matrix. Callers should invoke this after changing a component's
    /// bounds-contributing data, and after [`TransformGraph::compute_world_matrix`]
    /// runs for the frame.
    pub fn recompute_world_bounds(&mut self, id: u32) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        let world_matrix = self.transforms.world_matrix(object.transform);
        let mut bounds = Aabb::EMPTY;
        for component in object.components() {
            if let Some(local) = component.object_bounds() {
                bounds = bounds.union(&local.transform(&world_matrix));
            }
        }
        self.objects.get_mut(&id).unwrap().world_bounds = bounds;
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// `true` if the scene graph has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vec3;
    use crate::scene::component::ModelComponent;
    use uuid::Uuid;

    #[test]
    fn create_links_parent_and_child() {
        let mut scene = SceneGraph::new();
        let parent = scene.create("parent", None).unwrap();
        let child = scene.create("child", Some(parent)).unwrap();
        assert_eq!(scene.get(parent).unwrap().children(), &[child]);
        assert_eq!(scene.get(child).unwrap().parent(), Some(parent));
    }

    #[test]
    fn create_under_missing_parent_fails() {
        let mut scene = SceneGraph::new();
        assert!(scene.create("orphan", Some(999)).is_none());
    }

    #[test]
    fn destroy_releases_id_for_reuse() {
        let mut scene = SceneGraph::new();
        let a = scene.create("a", None).unwrap();
        scene.destroy(a);
        let b = scene.create("b", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn destroy_removes_descendants() {
        let mut scene = SceneGraph::new();
        let parent = scene.create("parent", None).unwrap();
        let child = scene.create("child", Some(parent)).unwrap();
        scene.destroy(parent);
        assert!(!scene.contains(child));
    }

    #[test]
    fn world_bounds_reflect_translated_model_component() {
        let mut scene = SceneGraph::new();
        let object = scene.create("object", None).unwrap();
        let transform = scene.get(object).unwrap().transform();
        scene.transforms_mut().set_translation(transform, Vec3::new(10.0, 0.0, 0.0));

        scene.set_component(
            object,
            Component::Model(ModelComponent {
                model: Uuid::nil(),
                object_bounds: Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
            }),
        );

        let bounds = scene.get(object).unwrap().world_bounds();
        assert_eq!(bounds.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn removing_component_clears_its_bounds_contribution() {
        let mut scene = SceneGraph::new();
        let object = scene.create("object", None).unwrap();
        scene.set_component(
            object,
            Component::Model(ModelComponent {
                model: Uuid::nil(),
                object_bounds: Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
            }),
        );
        scene.remove_component(object, ComponentType::Model);
        assert_eq!(scene.get(object).unwrap().world_bounds(), Aabb::EMPTY);
    }

    #[test]
    fn render_layers_add_and_remove() {
        let mut scene = SceneGraph::new();
        let object = scene.create("object", None).unwrap();
        scene.add_render_layer(object, 3);
        assert!(scene.get(object).unwrap().render_layers().contains(3));
        scene.remove_render_layer(object, 3);
        assert!(!scene.get(object).unwrap().render_layers().contains(3));
    }
}
