//! The resource cache: a UUID/name/path-indexed registry of handles, an
//! async load queue, recursive post-construction, and budget-driven LRU
//! eviction.
//!
//! Loading is split across two phases: [`ResourceLoader::decode`]
//! runs off the graphics thread (on a spawned thread unless `serial` is
//! requested) and produces backend-independent CPU data; the resulting
//! [`DecodedPayload`] sits in a pending queue until [`ResourceCache::drain_post_construction`]
//! is called from the graphics thread, which is the only place a
//! [`GraphicsBackend`] call is allowed to happen.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc;

use bitflags::bitflags;
use uuid::Uuid;

use crate::core::config::EngineConfig;
use crate::core::error::{RenderError, RenderResult};
use crate::core::event::{EventChannel, EventSubscription, ResourceLoadFailed, ResourceLoaded};
use crate::core::math::Vec3;
use crate::gpu::backend::{GraphicsBackend, ShaderStageSources};
use crate::gpu::texture::Texture;
use crate::gpu::types::{BufferUsage, PrimitiveMode, TextureFormat, TextureTarget};
use crate::mesh::Mesh;
use crate::resource::handle::{ResourceBehavior, ResourceHandle, ResourceKind};
use crate::resource::payload::{Animation, AudioClip, Material, Model, PythonScript, ResourcePayload, Skeleton};
use crate::shader::ShaderProgram;

bitflags! {
    /// Flags accepted by [`ResourceCache::remove`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RemoveFlags: u8 {
        /// Delete the handle even if it's flagged `core`.
        const FORCE = 1 << 0;
    }
}

bitflags! {
    /// Flags accepted by [`ResourceCache::unload`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UnloadFlags: u8 {
        /// Remove the handle itself, not just its payload.
        const DELETE_HANDLE = 1 << 0;
    }
}

/// Backend-independent data a [`ResourceLoader`] hands off to the graphics
/// thread for the GPU-touching half of construction.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum DecodedPayload {
    Skeleton(Skeleton),
    Model(Model),
    Animation(Animation),
    Material(Material),
    Audio(AudioClip),
    PythonScript(PythonScript),
    MeshData {
        usage: BufferUsage,
        primitive: PrimitiveMode,
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        tex_coords: Option<Vec<[f32; 2]>>,
        indices: Option<Vec<u32>>,
    },
    TextureData {
        target: TextureTarget,
        format: TextureFormat,
        width: u32,
        height: u32,
        pixels: Option<Vec<u8>>,
    },
    ShaderProgramData {
        stages: ShaderStageSources,
    },
}

/// Decodes a resource's CPU-side data. Implementations must not touch a
/// [`GraphicsBackend`] — that half of construction happens in
/// [`ResourceCache::drain_post_construction`] once the decoded result comes
/// back off the pending queue.
pub trait ResourceLoader: Send + 'static {
    /// Produces the decoded payload, or a failure reason.
    fn decode(&self) -> RenderResult<DecodedPayload>;
}

struct Entry {
    handle: ResourceHandle,
    payload: Option<ResourcePayload>,
}

struct PendingLoad {
    uuid: Uuid,
    result: RenderResult<DecodedPayload>,
}

/// Central registry of resource handles and their payloads.
pub struct ResourceCache {
    config: EngineConfig,
    entries: HashMap<Uuid, Entry>,
    path_index: HashMap<(ResourceKind, String), Uuid>,
    name_index: HashMap<(String, ResourceKind), Uuid>,
    mru: VecDeque<Uuid>,
    pending_tx: mpsc::Sender<PendingLoad>,
    pending_rx: mpsc::Receiver<PendingLoad>,
    loaded_events: EventChannel<ResourceLoaded>,
    load_failed_events: EventChannel<ResourceLoadFailed>,
}

impl ResourceCache {
    /// Creates an empty cache governed by `config`.
    pub fn new(config: EngineConfig) -> Self {
        let (pending_tx, pending_rx) = mpsc::channel();
        Self {
            config,
            entries: HashMap::new(),
            path_index: HashMap::new(),
            name_index: HashMap::new(),
            mru: VecDeque::new(),
            pending_tx,
            pending_rx,
            loaded_events: EventChannel::new(),
            load_failed_events: EventChannel::new(),
        }
    }

    /// Subscribes to `resource_loaded` events.
    pub fn subscribe_loaded(&mut self) -> EventSubscription<ResourceLoaded> {
        self.loaded_events.subscribe()
    }

    /// Subscribes to `resource_load_failed` events.
    pub fn subscribe_load_failed(&mut self) -> EventSubscription<ResourceLoadFailed> {
        self.load_failed_events.subscribe()
    }

    /// Looks up or creates a handle for `(kind, path)`. Idempotent for
    /// non-runtime-generated resources: a second call with the same kind and
    /// path returns the same handle without constructing a new one.
    pub fn get_or_create(&mut self, kind: ResourceKind, path: &str, behavior: ResourceBehavior) -> Uuid {
        if !behavior.contains(ResourceBehavior::RUNTIME_GENERATED) {
            if let Some(&uuid) = self.path_index.get(&(kind, path.to_string())) {
                return uuid;
            }
        }
        let handle = ResourceHandle::new(kind, path, behavior);
        let uuid = handle.uuid();
        self.name_index.insert((path.to_string(), kind), uuid);
        if !behavior.contains(ResourceBehavior::RUNTIME_GENERATED) {
            self.path_index.insert((kind, path.to_string()), uuid);
        }
        self.entries.insert(uuid, Entry { handle, payload: None });
        uuid
    }

    /// Registers an already-built handle. Fails if its UUID is already
    /// present.
    pub fn insert(&mut self, handle: ResourceHandle) -> RenderResult<Uuid> {
        let uuid = handle.uuid();
        if self.entries.contains_key(&uuid) {
            return Err(RenderError::invariant(format!("duplicate resource uuid {uuid}")));
        }
        self.name_index.insert((handle.name().to_string(), handle.kind()), uuid);
        self.entries.insert(uuid, Entry { handle, payload: None });
        Ok(uuid)
    }

    /// Looks up a handle by UUID.
    pub fn get(&self, uuid: Uuid) -> Option<&ResourceHandle> {
        self.entries.get(&uuid).map(|entry| &entry.handle)
    }

    /// Looks up a handle by display name and kind.
    pub fn get_by_name(&self, name: &str, kind: ResourceKind) -> Option<&ResourceHandle> {
        let uuid = self.name_index.get(&(name.to_string(), kind))?;
        self.get(*uuid)
    }

    /// The constructed payload for `uuid`, if loaded.
    pub fn payload(&self, uuid: Uuid) -> Option<&ResourcePayload> {
        self.entries.get(&uuid)?.payload.as_ref()
    }

    /// Mutable access to the constructed payload for `uuid`, if loaded. Used
    /// by the draw path to queue per-command uniform writes on a shader
    /// program just before it binds.
    pub fn payload_mut(&mut self, uuid: Uuid) -> Option<&mut ResourcePayload> {
        self.entries.get_mut(&uuid)?.payload.as_mut()
    }

    /// Triggers a load for `uuid`. Marks the handle `loading`, then either
    /// runs `loader.decode()` inline (`serial = true`) or on a spawned
    /// thread, feeding the result into the pending queue either way.
    pub fn load(&mut self, uuid: Uuid, serial: bool, loader: impl ResourceLoader) -> RenderResult<()> {
        let entry = self
            .entries
            .get_mut(&uuid)
            .ok_or_else(|| RenderError::NotFound(uuid.to_string()))?;
        entry.handle.mark_loading();

        if serial {
            let result = loader.decode();
            let _ = self.pending_tx.send(PendingLoad { uuid, result });
        } else {
            let tx = self.pending_tx.clone();
            std::thread::spawn(move || {
                let result = loader.decode();
                let _ = tx.send(PendingLoad { uuid, result });
            });
        }
        Ok(())
    }

    /// Drains every decoded load waiting on the pending queue, finishes
    /// graphics-thread construction, recursively post-constructs children,
    /// and publishes `resource_loaded`/`resource_load_failed`.
    pub fn drain_post_construction(&mut self, backend: &mut dyn GraphicsBackend) {
        let pending: Vec<PendingLoad> = self.pending_rx.try_iter().collect();
        for item in pending {
            match item.result {
                Ok(decoded) => match finish_construction(decoded, backend) {
                    Ok(mut payload) => {
                        if let Err(err) = payload.post_construction(backend) {
                            self.fail(item.uuid, err.to_string());
                            continue;
                        }
                        if let Some(entry) = self.entries.get_mut(&item.uuid) {
                            entry.handle.mark_constructed();
                            entry.payload = Some(payload);
                        }
                        self.post_construct_children(item.uuid, backend);
                        self.loaded_events.publish(ResourceLoaded(item.uuid));
                    }
                    Err(err) => self.fail(item.uuid, err.to_string()),
                },
                Err(err) => self.fail(item.uuid, err.to_string()),
            }
        }
    }

    fn post_construct_children(&mut self, uuid: Uuid, backend: &mut dyn GraphicsBackend) {
        let children = self.entries.get(&uuid).map(|e| e.handle.children().to_vec()).unwrap_or_default();
        for child in children {
            if let Some(entry) = self.entries.get_mut(&child) {
                if let Some(payload) = entry.payload.as_mut() {
                    let _ = payload.post_construction(backend);
                }
            }
            self.post_construct_children(child, backend);
        }
    }

    fn fail(&mut self, uuid: Uuid, reason: String) {
        if let Some(entry) = self.entries.get_mut(&uuid) {
            entry.handle.mark_load_failed(reason.clone());
        }
        self.load_failed_events.publish(ResourceLoadFailed { uuid, reason });
    }

    /// Drops `uuid`'s payload without necessarily removing the handle.
    pub fn unload(&mut self, uuid: Uuid, flags: UnloadFlags) {
        if flags.contains(UnloadFlags::DELETE_HANDLE) {
            self.remove(uuid, RemoveFlags::empty()).ok();
            return;
        }
        if let Some(entry) = self.entries.get_mut(&uuid) {
            entry.payload = None;
        }
    }

    /// Removes a handle entirely. Refuses `core` handles unless `FORCE` is set.
    pub fn remove(&mut self, uuid: Uuid, flags: RemoveFlags) -> RenderResult<()> {
        let Some(entry) = self.entries.get(&uuid) else {
            return Ok(());
        };
        if entry.handle.behavior().contains(ResourceBehavior::CORE) && !flags.contains(RemoveFlags::FORCE) {
            return Err(RenderError::invariant(format!("refusing to remove core resource {uuid}")));
        }
        self.mru.retain(|&candidate| candidate != uuid);
        if let Some(entry) = self.entries.remove(&uuid) {
            let kind = entry.handle.kind();
            let name = entry.handle.name().to_string();
            self.name_index.remove(&(name.clone(), kind));
            self.path_index.remove(&(kind, name));
        }
        Ok(())
    }

    /// Marks `uuid` as most recently used, for LRU eviction.
    pub fn touch(&mut self, uuid: Uuid) {
        self.mru.retain(|&candidate| candidate != uuid);
        self.mru.push_front(uuid);
    }

    /// Evicts the least-recently-used removable, non-core payload until
    /// `used_estimate` falls at or below the configured budget. Returns the
    /// UUIDs evicted. Eviction removes the payload but keeps the handle, so
    /// a later `get` can trigger a reload.
    pub fn evict_to_budget(&mut self, used_estimate_bytes: u64) -> Vec<Uuid> {
        let mut evicted = Vec::new();
        if used_estimate_bytes <= self.config.eviction_budget_bytes {
            return evicted;
        }
        let mut remaining = used_estimate_bytes;
        let candidates: Vec<Uuid> = self.mru.iter().rev().copied().collect();
        for uuid in candidates {
            if remaining <= self.config.eviction_budget_bytes {
                break;
            }
            let Some(entry) = self.entries.get(&uuid) else { continue };
            if !entry.handle.is_evictable() || entry.payload.is_none() {
                continue;
            }
            self.entries.get_mut(&uuid).unwrap().payload = None;
            self.mru.retain(|&candidate| candidate != uuid);
            evicted.push(uuid);
            remaining = remaining.saturating_sub(1);
        }
        evicted
    }

    /// Number of handles currently registered (loaded or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no handles are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn finish_construction(decoded: DecodedPayload, backend: &mut dyn GraphicsBackend) -> RenderResult<ResourcePayload> {
    Ok(match decoded {
        DecodedPayload::Skeleton(skeleton) => ResourcePayload::Skeleton(skeleton),
        DecodedPayload::Model(model) => ResourcePayload::Model(model),
        DecodedPayload::Animation(animation) => ResourcePayload::Animation(animation),
        DecodedPayload::Material(material) => ResourcePayload::Material(material),
        DecodedPayload::Audio(audio) => ResourcePayload::Audio(audio),
        DecodedPayload::PythonScript(script) => ResourcePayload::PythonScript(script),
        DecodedPayload::MeshData {
            usage,
            primitive,
            positions,
            normals,
            tex_coords,
            indices,
        } => {
            let mesh = Mesh::new(
                backend,
                usage,
                primitive,
                &positions,
                normals.as_deref(),
                tex_coords.as_deref(),
                indices.as_deref(),
            )?;
            ResourcePayload::Mesh(mesh)
        }
        DecodedPayload::TextureData {
            target,
            format,
            width,
            height,
            pixels,
        } => {
            let texture = Texture::new(backend, target, format, width, height, pixels.as_deref())?;
            if target == TextureTarget::Cubemap || target == TextureTarget::CubemapArray {
                ResourcePayload::Cubemap(texture)
            } else {
                ResourcePayload::Texture(texture)
            }
        }
        DecodedPayload::ShaderProgramData { stages } => {
            let program = ShaderProgram::new(backend, &stages)?;
            ResourcePayload::ShaderProgram(program)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::backend::{BackendCapabilities, ShaderStageSources};
    use crate::gpu::types::*;
    use crate::core::handle::Handle;

    struct NullBackend;
    impl GraphicsBackend for NullBackend {
        fn capabilities(&self) -> BackendCapabilities {
            BackendCapabilities::default()
        }
        fn clear(&mut self, _color: crate::core::math::Color, _clear_depth: bool) {}
        fn set_viewport(&mut self, _x: i32, _y: i32, _w: u32, _h: u32) {}
        fn create_buffer(&mut self, _ty: BufferType, _usage: BufferUsage, _data: &[u8]) -> RenderResult<BufferHandle> {
            Ok(Handle::new(0, 1))
        }
        fn update_buffer(&mut self, _handle: BufferHandle, _offset: usize, _data: &[u8]) -> RenderResult<()> {
            Ok(())
        }
        fn destroy_buffer(&mut self, _handle: BufferHandle) -> bool {
            true
        }
        fn create_vao(
            &mut self,
            _attributes: &[(VertexAttributeSlot, BufferHandle)],
            _index_buffer: Option<BufferHandle>,
        ) -> RenderResult<VaoHandle> {
            Ok(Handle::new(0, 1))
        }
        fn destroy_vao(&mut self, _handle: VaoHandle) -> bool {
            true
        }
        fn create_texture(
            &mut self,
            _target: TextureTarget,
            _format: TextureFormat,
            _width: u32,
            _height: u32,
            _data: Option<&[u8]>,
        ) -> RenderResult<TextureHandle> {
            Ok(Handle::new(0, 1))
        }
        fn bind_texture(&mut self, _handle: TextureHandle, _unit: u32) -> RenderResult<()> {
            Ok(())
        }
        fn destroy_texture(&mut self, _handle: TextureHandle) -> bool {
            true
        }
        fn create_framebuffer(
            &mut self,
            _color_attachments: &[TextureHandle],
            _depth_stencil: Option<TextureHandle>,
        ) -> RenderResult<FramebufferHandle> {
            Ok(Handle::new(0, 1))
        }
        fn bind_framebuffer(&mut self, _handle: Option<FramebufferHandle>) -> RenderResult<()> {
            Ok(())
        }
        fn blit_framebuffer(&mut self, _src: FramebufferHandle, _dst: FramebufferHandle, _w: u32, _h: u32) -> RenderResult<()> {
            Ok(())
        }
        fn destroy_framebuffer(&mut self, _handle: FramebufferHandle) -> bool {
            true
        }
        fn create_shader_program(&mut self, _stages: &ShaderStageSources) -> RenderResult<ShaderHandle> {
            Ok(Handle::new(0, 1))
        }
        fn bind_shader_program(&mut self, _handle: ShaderHandle) -> RenderResult<()> {
            Ok(())
        }
        fn uniform_location(&self, _program: ShaderHandle, _name: &str) -> Option<i32> {
            None
        }
        fn bind_uniform_block(&mut self, _program: ShaderHandle, _block_name: &str, _binding: u32) -> RenderResult<()> {
            Ok(())
        }
        fn bind_uniform_buffer(&mut self, _binding: u32, _buffer: BufferHandle) -> RenderResult<()> {
            Ok(())
        }
        fn destroy_shader_program(&mut self, _handle: ShaderHandle) -> bool {
            true
        }
        fn draw_indexed(&mut self, _vao: VaoHandle, _index_count: u32, _instance_count: u32, _primitive: PrimitiveMode) -> RenderResult<()> {
            Ok(())
        }
    }

    struct FixedMaterialLoader;
    impl ResourceLoader for FixedMaterialLoader {
        fn decode(&self) -> RenderResult<DecodedPayload> {
            Ok(DecodedPayload::Material(Material::default()))
        }
    }

    struct FailingLoader;
    impl ResourceLoader for FailingLoader {
        fn decode(&self) -> RenderResult<DecodedPayload> {
            Err(RenderError::NotFound("missing.mat".into()))
        }
    }

    #[test]
    fn get_or_create_is_idempotent_by_path() {
        let mut cache = ResourceCache::new(EngineConfig::default());
        let a = cache.get_or_create(ResourceKind::Material, "materials/brick.mat", ResourceBehavior::REMOVABLE);
        let b = cache.get_or_create(ResourceKind::Material, "materials/brick.mat", ResourceBehavior::REMOVABLE);
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn serial_load_constructs_and_fires_loaded_event() {
        let mut cache = ResourceCache::new(EngineConfig::default());
        let uuid = cache.get_or_create(ResourceKind::Material, "materials/brick.mat", ResourceBehavior::REMOVABLE);
        let subscription = cache.subscribe_loaded();
        cache.load(uuid, true, FixedMaterialLoader).unwrap();
        let mut backend = NullBackend;
        cache.drain_post_construction(&mut backend);
        assert!(cache.get(uuid).unwrap().is_constructed());
        assert!(matches!(cache.payload(uuid), Some(ResourcePayload::Material(_))));
        assert_eq!(subscription.drain(), vec![ResourceLoaded(uuid)]);
    }

    #[test]
    fn failed_decode_marks_handle_failed_not_constructed() {
        let mut cache = ResourceCache::new(EngineConfig::default());
        let uuid = cache.get_or_create(ResourceKind::Material, "materials/broken.mat", ResourceBehavior::REMOVABLE);
        cache.load(uuid, true, FailingLoader).unwrap();
        let mut backend = NullBackend;
        cache.drain_post_construction(&mut backend);
        let handle = cache.get(uuid).unwrap();
        assert!(!handle.is_constructed());
        assert!(handle.load_failure().is_some());
    }

    #[test]
    fn core_handles_refuse_removal_without_force() {
        let mut cache = ResourceCache::new(EngineConfig::default());
        let uuid = cache.get_or_create(
            ResourceKind::ShaderProgram,
            "shaders/unlit",
            ResourceBehavior::REMOVABLE | ResourceBehavior::CORE,
        );
        assert!(cache.remove(uuid, RemoveFlags::empty()).is_err());
        assert!(cache.remove(uuid, RemoveFlags::FORCE).is_ok());
        assert!(cache.get(uuid).is_none());
    }

    #[test]
    fn touch_then_evict_drops_least_recently_used_first() {
        let mut cache = ResourceCache::new(EngineConfig::default());
        let old = cache.get_or_create(ResourceKind::Material, "old.mat", ResourceBehavior::REMOVABLE);
        let fresh = cache.get_or_create(ResourceKind::Material, "fresh.mat", ResourceBehavior::REMOVABLE);
        cache.load(old, true, FixedMaterialLoader).unwrap();
        cache.load(fresh, true, FixedMaterialLoader).unwrap();
        let mut backend = NullBackend;
        cache.drain_post_construction(&mut backend);
        cache.touch(old);
        cache.touch(fresh);
        let evicted = cache.evict_to_budget(cache.config.eviction_budget_bytes + 2);
        assert_eq!(evicted, vec![old]);
        assert!(cache.payload(old).is_none());
        assert!(cache.payload(fresh).is_some());
    }
}
