//! Generation-counted handles shared by the GPU resource layer and the
//! resource cache.
//!
//! Every handle pairs a slot index with a generation counter so that reusing
//! a freed slot can never alias a handle still held by a caller (the ABA
//! problem for array-backed allocators).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A type-safe, generation-counted handle to a `T`-tagged slot.
#[repr(C)]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// The sentinel handle representing "no resource".
    pub const INVALID: Self = Self {
        index: u32::MAX,
        generation: 0,
        _marker: PhantomData,
    };

    /// Builds a handle directly from its components. Normally only called
    /// by a [`HandleAllocator`].
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index in backing storage.
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation counter of the slot this handle was issued for.
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// `true` unless this is the `INVALID` sentinel. Does not check liveness
    /// against an allocator — use `HandleAllocator::is_alive` for that.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        !(self.index == u32::MAX && self.generation == 0)
    }
}

impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}

impl<T> Default for Handle<T> {
    #[inline]
    fn default() -> Self {
        Self::INVALID
    }
}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}
impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Handle({}:{})", self.index, self.generation)
        } else {
            write!(f, "Handle(INVALID)")
        }
    }
}

/// Allocates and recycles [`Handle<T>`] slots with generation counting.
pub struct HandleAllocator<T> {
    generations: Vec<u32>,
    free_list: Vec<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> HandleAllocator<T> {
    /// Creates an empty allocator.
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocates a handle, reusing a freed slot when one is available.
    pub fn allocate(&mut self) -> Handle<T> {
        if let Some(index) = self.free_list.pop() {
            let generation = self.generations[index as usize];
            Handle::new(index, generation)
        } else {
            let index = self.generations.len();
            assert!(index < u32::MAX as usize, "HandleAllocator exhausted");
            self.generations.push(1);
            Handle::new(index as u32, 1)
        }
    }

    /// Invalidates a handle's slot, bumping its generation and returning it
    /// to the free list. Returns `false` if the handle was already stale.
    pub fn deallocate(&mut self, handle: Handle<T>) -> bool {
        if !self.is_alive(handle) {
            return false;
        }
        let index = handle.index() as usize;
        let next = self.generations[index].wrapping_add(1);
        self.generations[index] = if next == 0 { 1 } else { next };
        self.free_list.push(handle.index());
        true
    }

    /// `true` if `handle`'s generation matches the slot's current generation.
    #[inline]
    pub fn is_alive(&self, handle: Handle<T>) -> bool {
        handle.is_valid()
            && (handle.index() as usize) < self.generations.len()
            && self.generations[handle.index() as usize] == handle.generation()
    }

    /// Number of currently live handles.
    pub fn len(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    /// `true` if no handles are currently live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HandleAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Texture;

    #[test]
    fn allocate_returns_increasing_indices() {
        let mut alloc: HandleAllocator<Texture> = HandleAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn deallocate_invalidates_old_handle_on_reuse() {
        let mut alloc: HandleAllocator<Texture> = HandleAllocator::new();
        let a = alloc.allocate();
        assert!(alloc.deallocate(a));
        assert!(!alloc.is_alive(a));

        let c = alloc.allocate();
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert!(alloc.is_alive(c));
    }

    #[test]
    fn invalid_handle_is_never_alive() {
        let alloc: HandleAllocator<Texture> = HandleAllocator::new();
        assert!(!alloc.is_alive(Handle::INVALID));
    }
}
