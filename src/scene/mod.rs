//! The scene graph: transforms, components, and the objects that carry
//! them.

pub mod component;
pub mod layer;
pub mod object;
pub mod transform;

pub use component::{
    AudioListenerComponent, AudioSourceComponent, BoneAnimationComponent, Camera,
    CanvasComponent, CatchAllComponent, CharacterControllerComponent, Component, ComponentType,
    CubemapComponent, Light, LightKind, ListenerComponent, ModelComponent, RigidBodyComponent,
    ScriptBehaviorComponent, ShaderPresetComponent, Viewport,
};
pub use layer::{RenderLayer, RenderLayerId, RenderLayerSet, DEBUG_RENDER_LAYER};
pub use object::{SceneGraph, SceneObject};
pub use transform::{InheritanceMode, TransformGraph, TransformRef};
