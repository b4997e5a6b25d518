//! Resource handles: the identity, lifecycle flags, and parent/child
//! composition shared by every loaded resource.

use bitflags::bitflags;
use uuid::Uuid;

bitflags! {
    /// Behavior flags recorded once at handle creation and rarely changed
    /// afterward.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResourceBehavior: u16 {
        /// Eligible for LRU eviction under budget pressure.
        const REMOVABLE = 1 << 0;
        /// Owned by a parent handle; destroyed when the parent is.
        const CHILD = 1 << 1;
        /// Has at least one child handle.
        const PARENT = 1 << 2;
        /// Created at runtime (e.g. a procedural mesh), not loaded from a path.
        const RUNTIME_GENERATED = 1 << 3;
        /// Never evicted, regardless of the eviction budget.
        const CORE = 1 << 4;
        /// Has no on-disk representation; saving the scene must not reference it by path.
        const UNSAVED = 1 << 5;
        /// Hidden from resource-browser style listings.
        const HIDDEN = 1 << 6;
        /// Serialized as embedded JSON rather than referenced by a payload file.
        const USES_JSON = 1 << 7;
    }
}

bitflags! {
    /// Status flags tracking a handle's load lifecycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResourceStatus: u8 {
        /// The payload has finished loading and post-construction has run.
        const CONSTRUCTED = 1 << 0;
        /// A load is in flight (or has at least started once).
        const LOADING = 1 << 1;
    }
}

/// The kind of payload a handle owns, independent of whether it's currently loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Drawable geometry.
    Mesh,
    /// Bone hierarchy for skeletal animation.
    Skeleton,
    /// A mesh + material + skeleton composition.
    Model,
    /// A skeletal animation clip.
    Animation,
    /// Surface shading parameters + texture references.
    Material,
    /// A single 2D/array/MSAA texture.
    Texture,
    /// A six-face cubemap.
    Cubemap,
    /// A linked shader program.
    ShaderProgram,
    /// An audio clip.
    Audio,
    /// An embedded scripting behavior.
    PythonScript,
}

/// A typed, UUID-identified slot in the resource cache.
///
/// A handle's UUID and display name are fixed at creation; everything else
/// (status, parent/children) mutates as the resource moves through its
/// lifecycle.
#[derive(Debug)]
pub struct ResourceHandle {
    uuid: Uuid,
    name: String,
    kind: ResourceKind,
    behavior: ResourceBehavior,
    status: ResourceStatus,
    parent: Option<Uuid>,
    children: Vec<Uuid>,
    load_failure: Option<String>,
}

impl ResourceHandle {
    /// Creates a new, not-yet-loading handle.
    pub fn new(kind: ResourceKind, name: impl Into<String>, behavior: ResourceBehavior) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            kind,
            behavior,
            status: ResourceStatus::empty(),
            parent: None,
            children: Vec::new(),
            load_failure: None,
        }
    }

    /// Stable identity, assigned once at construction.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Display name, used by `get_by_name` lookups.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of payload this handle owns.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Behavior flags.
    pub fn behavior(&self) -> ResourceBehavior {
        self.behavior
    }

    /// Status flags.
    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    /// `true` once the payload has been constructed.
    pub fn is_constructed(&self) -> bool {
        self.status.contains(ResourceStatus::CONSTRUCTED)
    }

    /// `true` if a load has ever been started for this handle.
    pub fn has_started_loading(&self) -> bool {
        self.status.contains(ResourceStatus::LOADING)
    }

    /// Marks a load as started. Must be called before [`ResourceHandle::mark_constructed`].
    pub fn mark_loading(&mut self) {
        self.status.insert(ResourceStatus::LOADING);
        self.load_failure = None;
    }

    /// Marks the payload as fully constructed. Only valid once
    /// [`ResourceHandle::mark_loading`] has been called at least once.
    pub fn mark_constructed(&mut self) {
        debug_assert!(
            self.status.contains(ResourceStatus::LOADING),
            "constructed set before loading was ever started"
        );
        self.status.insert(ResourceStatus::CONSTRUCTED);
    }

    /// Records a load failure: clears `LOADING` without setting `CONSTRUCTED`.
    pub fn mark_load_failed(&mut self, reason: impl Into<String>) {
        self.status.remove(ResourceStatus::LOADING);
        self.status.remove(ResourceStatus::CONSTRUCTED);
        self.load_failure = Some(reason.into());
    }

    /// The most recent load failure reason, if any.
    pub fn load_failure(&self) -> Option<&str> {
        self.load_failure.as_deref()
    }

    /// This handle's parent, if it's a child handle.
    pub fn parent(&self) -> Option<Uuid> {
        self.parent
    }

    /// This handle's children, in the order they were added.
    pub fn children(&self) -> &[Uuid] {
        &self.children
    }

    /// Registers `child_uuid` as a child of this handle, setting the
    /// `PARENT` flag. The child's own `parent`/`CHILD` bookkeeping is the
    /// caller's responsibility (typically done by the cache, which can see
    /// both handles).
    pub fn add_child(&mut self, child_uuid: Uuid) {
        self.behavior.insert(ResourceBehavior::PARENT);
        self.children.push(child_uuid);
    }

    /// Records `parent_uuid` as this handle's parent, setting the `CHILD` flag.
    pub fn set_parent(&mut self, parent_uuid: Uuid) {
        self.behavior.insert(ResourceBehavior::CHILD);
        self.parent = Some(parent_uuid);
    }

    /// `true` if this handle may be evicted under budget pressure.
    pub fn is_evictable(&self) -> bool {
        self.behavior.contains(ResourceBehavior::REMOVABLE) && !self.behavior.contains(ResourceBehavior::CORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructed_requires_loading_first() {
        let mut handle = ResourceHandle::new(ResourceKind::Texture, "brick", ResourceBehavior::REMOVABLE);
        assert!(!handle.has_started_loading());
        handle.mark_loading();
        handle.mark_constructed();
        assert!(handle.is_constructed());
    }

    #[test]
    fn load_failure_clears_constructed_and_loading() {
        let mut handle = ResourceHandle::new(ResourceKind::Mesh, "broken", ResourceBehavior::REMOVABLE);
        handle.mark_loading();
        handle.mark_constructed();
        handle.mark_load_failed("file not found");
        assert!(!handle.is_constructed());
        assert!(!handle.has_started_loading());
        assert_eq!(handle.load_failure(), Some("file not found"));
    }

    #[test]
    fn core_handles_are_never_evictable() {
        let handle = ResourceHandle::new(
            ResourceKind::ShaderProgram,
            "unlit",
            ResourceBehavior::REMOVABLE | ResourceBehavior::CORE,
        );
        assert!(!handle.is_evictable());
    }

    #[test]
    fn adding_a_child_sets_parent_flag() {
        let mut parent = ResourceHandle::new(ResourceKind::Model, "tree", ResourceBehavior::REMOVABLE);
        let child_uuid = Uuid::new_v4();
        parent.add_child(child_uuid);
        assert!(parent.behavior().contains(ResourceBehavior::PARENT));
        assert_eq!(parent.children(), [child_uuid]);
    }
}
