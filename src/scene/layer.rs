//! Render layers: named sort-order buckets that gate which scene objects a
//! camera draws and sub-order the sort key.

use std::collections::HashSet;

/// A render layer's stable identifier.
pub type RenderLayerId = u16;

/// The debug-draw layer: rendered last, after every other layer.
pub const DEBUG_RENDER_LAYER: RenderLayerId = 100;

/// A named render layer with the sort-order index used to sub-order draw
/// commands that share every other sort-key bucket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderLayer {
    /// Stable identifier, referenced by scene objects and cameras.
    pub id: RenderLayerId,
    /// Display name.
    pub name: String,
    /// Position in sort order; lower sorts first.
    pub sort_order_index: u16,
}

impl RenderLayer {
    /// Builds a render layer.
    pub fn new(id: RenderLayerId, name: impl Into<String>, sort_order_index: u16) -> Self {
        Self {
            id,
            name: name.into(),
            sort_order_index,
        }
    }

    /// The built-in debug layer, sorted after every ordinary layer.
    pub fn debug() -> Self {
        Self::new(DEBUG_RENDER_LAYER, "Debug", u16::MAX)
    }
}

/// A set of render-layer memberships, used both by scene objects (which
/// layers they belong to) and cameras (which layers they render).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderLayerSet(HashSet<RenderLayerId>);

impl RenderLayerSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set containing exactly `ids`.
    pub fn from_ids(ids: impl IntoIterator<Item = RenderLayerId>) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Adds `id` to the set.
    pub fn insert(&mut self, id: RenderLayerId) {
        self.0.insert(id);
    }

    /// Removes `id` from the set.
    pub fn remove(&mut self, id: RenderLayerId) {
        self.0.remove(&id);
    }

    /// `true` if `id` is a member.
    pub fn contains(&self, id: RenderLayerId) -> bool {
        self.0.contains(&id)
    }

    /// `true` if `self` and `other` share at least one layer.
    pub fn intersects(&self, other: &RenderLayerSet) -> bool {
        self.0.iter().any(|id| other.0.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_sets_do_not_intersect() {
        let a = RenderLayerSet::from_ids([1, 2]);
        let b = RenderLayerSet::from_ids([3, 4]);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn shared_layer_intersects() {
        let a = RenderLayerSet::from_ids([1, 2]);
        let b = RenderLayerSet::from_ids([2, 3]);
        assert!(a.intersects(&b));
    }

    #[test]
    fn debug_layer_sorts_last() {
        assert_eq!(RenderLayer::debug().sort_order_index, u16::MAX);
    }
}
