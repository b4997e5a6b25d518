//! Component data attached to scene objects. Camera and light carry real
//! render-facing fields; everything else is a thin handle into a system this
//! crate does not implement (physics, audio, scripting) that still needs a
//! seat at the table for bounds aggregation and debug drawing.

use uuid::Uuid;

use crate::core::math::{Aabb, Color, Matrix4, Vec3};
use crate::scene::layer::RenderLayerSet;

/// Discriminant for [`Component`], also used to index a scene object's
/// per-type component slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum ComponentType {
    Camera = 0,
    Light = 1,
    Model = 2,
    Canvas = 3,
    AudioSource = 4,
    AudioListener = 5,
    CharacterController = 6,
    RigidBody = 7,
    BoneAnimation = 8,
    ShaderPreset = 9,
    Cubemap = 10,
    ScriptBehavior = 11,
    Listener = 12,
    CatchAll = 13,
}

impl ComponentType {
    /// Number of distinct component types, i.e. the component slot count.
    pub const COUNT: usize = 14;

    /// Every variant, in slot-index order.
    pub const ALL: [ComponentType; ComponentType::COUNT] = [
        ComponentType::Camera,
        ComponentType::Light,
        ComponentType::Model,
        ComponentType::Canvas,
        ComponentType::AudioSource,
        ComponentType::AudioListener,
        ComponentType::CharacterController,
        ComponentType::RigidBody,
        ComponentType::BoneAnimation,
        ComponentType::ShaderPreset,
        ComponentType::Cubemap,
        ComponentType::ScriptBehavior,
        ComponentType::Listener,
        ComponentType::CatchAll,
    ];
}

/// A rectangular viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// View/projection state for one camera, plus the layer gate it draws.
///
/// Drops the position/target/up/yaw-pitch-roll bookkeeping (that belongs to
/// whatever owns the transform this camera is attached to) and keeps only
/// what the render pipeline consumes directly.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    pub view_matrix: Matrix4<f32>,
    pub projection_matrix: Matrix4<f32>,
    pub viewport: Viewport,
    pub near: f32,
    pub far: f32,
    pub rendered_layers: RenderLayerSetHandle,
}

/// `Camera` needs an owned [`RenderLayerSet`], but that type isn't `Copy`
/// (it wraps a `HashSet`). Wrap it so `Camera` can stay cheap to pass
/// around for everything except the layer mask itself.
pub type RenderLayerSetHandle = std::sync::Arc<RenderLayerSet>;

impl Camera {
    /// Builds a camera that renders every layer in `rendered_layers`.
    pub fn new(
        view_matrix: Matrix4<f32>,
        projection_matrix: Matrix4<f32>,
        viewport: Viewport,
        near: f32,
        far: f32,
        rendered_layers: RenderLayerSet,
    ) -> Self {
        Self {
            view_matrix,
            projection_matrix,
            viewport,
            near,
            far,
            rendered_layers: std::sync::Arc::new(rendered_layers),
        }
    }

    /// Combined view-projection matrix, as consumed by per-frame uniform
    /// uploads.
    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix * self.view_matrix
    }
}

/// The kind of light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// A light source: color/intensity/range/spot-angle, a Kelvin-temperature
/// convenience constructor, and `casts_shadows` for the shadow pre-pass.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
    pub spot_angle_radians: f32,
    pub casts_shadows: bool,
}

impl Light {
    /// A directional light (e.g. sunlight); `range`/`spot_angle` are unused.
    pub fn directional(color: Color, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity,
            range: f32::INFINITY,
            spot_angle_radians: 0.0,
            casts_shadows: false,
        }
    }

    /// A point light with a falloff `range`.
    pub fn point(color: Color, intensity: f32, range: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            intensity,
            range,
            spot_angle_radians: 0.0,
            casts_shadows: false,
        }
    }

    /// A spot light with a falloff `range` and a cone half-angle.
    pub fn spot(color: Color, intensity: f32, range: f32, spot_angle_radians: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            color,
            intensity,
            range,
            spot_angle_radians,
            casts_shadows: false,
        }
    }

    /// Converts a color temperature in Kelvin to an approximate RGB color.
    pub fn color_from_temperature(kelvin: f32) -> Color {
        let temp = (kelvin / 100.0).clamp(10.0, 400.0);
        let red = if temp <= 66.0 {
            1.0
        } else {
            (1.292_936_2 * (temp - 60.0).powf(-0.133_204_76)).clamp(0.0, 1.0)
        };
        let green = if temp <= 66.0 {
            (0.390_081_58 * temp.ln() - 0.631_841_4).clamp(0.0, 1.0)
        } else {
            (1.129_890_86 * (temp - 60.0).powf(-0.075_514_846)).clamp(0.0, 1.0)
        };
        let blue = if temp >= 66.0 {
            1.0
        } else if temp <= 19.0 {
            0.0
        } else {
            (0.543_206_77 * (temp - 10.0).ln() - 1.196_254_1).clamp(0.0, 1.0)
        };
        Color::new(red, green, blue, 1.0)
    }
}

/// A mesh instance: the resource cache entries it draws with and a cached
/// object-space bounds used for world-bounds aggregation without touching
/// the resource cache on every frame.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ModelComponent {
    pub model: Uuid,
    pub object_bounds: Aabb,
}

/// A 2D UI surface, sized in pixels, drawn in its own pass ahead of debug
/// draw. We do not implement UI layout; this is only the render hook.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct CanvasComponent {
    pub width: u32,
    pub height: u32,
}

/// A reference to an audio clip resource. Playback state lives outside this
/// crate; we only keep enough to let a scene file round-trip.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct AudioSourceComponent {
    pub clip: Uuid,
    pub looping: bool,
    pub gain: f32,
}

/// Marks a scene object as the active audio listener. Zero-sized: placement
/// comes from the object's transform.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct AudioListenerComponent;

/// The render-relevant surface of a character controller: the capsule shape
/// used by [`crate::debug_draw::draw_character_controller`] and by bounds
/// aggregation. Collision response itself is out of scope.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct CharacterControllerComponent {
    pub radius: f32,
    pub height: f32,
}

impl CharacterControllerComponent {
    /// Object-space bounds of the capsule, centered on the transform origin.
    pub fn object_bounds(&self) -> Aabb {
        let half = Vec3::new(self.radius, self.height * 0.5 + self.radius, self.radius);
        Aabb::new(Vec3::zero() - half, Vec3::zero() + half)
    }
}

/// A rigid body's render-relevant surface: an optional collider bounds
/// override, used when the attached model's mesh bounds don't match the
/// physics collider. `None` means "use the model's bounds".
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct RigidBodyComponent {
    pub collider_bounds: Option<Aabb>,
}

/// Playback cursor into an animation resource.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BoneAnimationComponent {
    pub animation: Uuid,
    pub current_time_seconds: f32,
    pub playing: bool,
}

/// Attaches a named shader program override to whatever this object draws
/// with, ahead of its model's own material shader.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ShaderPresetComponent {
    pub shader_program: Uuid,
}

/// A skybox/environment-map reference.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct CubemapComponent {
    pub cubemap: Uuid,
}

/// A reference to an embedded script resource. Execution is out of scope;
/// this is only the handle a host runtime would look up.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ScriptBehaviorComponent {
    pub script: Uuid,
}

/// A generic event listener marker, distinct from the audio listener.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct ListenerComponent;

/// Arbitrary component data this crate doesn't know the shape of. Scene
/// deserialization routes unrecognized component kinds here instead of
/// discarding them, so round-tripping a scene file never loses data.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CatchAllComponent {
    pub type_name: String,
    pub data: Vec<u8>,
}

/// One component attached to a scene object, tagged by [`ComponentType`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Component {
    Camera(Camera),
    Light(Light),
    Model(ModelComponent),
    Canvas(CanvasComponent),
    AudioSource(AudioSourceComponent),
    AudioListener(AudioListenerComponent),
    CharacterController(CharacterControllerComponent),
    RigidBody(RigidBodyComponent),
    BoneAnimation(BoneAnimationComponent),
    ShaderPreset(ShaderPresetComponent),
    Cubemap(CubemapComponent),
    ScriptBehavior(ScriptBehaviorComponent),
    Listener(ListenerComponent),
    CatchAll(CatchAllComponent),
}

impl Component {
    /// The slot this component occupies on its owning scene object.
    pub fn component_type(&self) -> ComponentType {
        match self {
            Component::Camera(_) => ComponentType::Camera,
            Component::Light(_) => ComponentType::Light,
            Component::Model(_) => ComponentType::Model,
            Component::Canvas(_) => ComponentType::Canvas,
            Component::AudioSource(_) => ComponentType::AudioSource,
            Component::AudioListener(_) => ComponentType::AudioListener,
            Component::CharacterController(_) => ComponentType::CharacterController,
            Component::RigidBody(_) => ComponentType::RigidBody,
            Component::BoneAnimation(_) => ComponentType::BoneAnimation,
            Component::ShaderPreset(_) => ComponentType::ShaderPreset,
            Component::Cubemap(_) => ComponentType::Cubemap,
            Component::ScriptBehavior(_) => ComponentType::ScriptBehavior,
            Component::Listener(_) => ComponentType::Listener,
            Component::CatchAll(_) => ComponentType::CatchAll,
        }
    }

    /// Object-space bounds this component contributes to its scene object's
    /// world-bounds aggregate, if any.
    pub fn object_bounds(&self) -> Option<Aabb> {
        match self {
            Component::Model(model) => Some(model.object_bounds),
            Component::CharacterController(controller) => Some(controller.object_bounds()),
            Component::RigidBody(body) => body.collider_bounds,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_type_matches_variant() {
        let light = Component::Light(Light::point(Color::WHITE, 1.0, 10.0));
        assert_eq!(light.component_type(), ComponentType::Light);
    }

    #[test]
    fn warm_temperature_biases_red() {
        let warm = Light::color_from_temperature(2000.0);
        let cool = Light::color_from_temperature(9000.0);
        assert!(warm.r >= cool.r);
        assert!(warm.b <= cool.b);
    }

    #[test]
    fn character_controller_bounds_are_centered_on_origin() {
        let controller = CharacterControllerComponent {
            radius: 0.5,
            height: 1.8,
        };
        let bounds = controller.object_bounds();
        assert_eq!(bounds.center(), Vec3::zero());
    }

    #[test]
    fn camera_view_projection_is_projection_times_view() {
        let camera = Camera::new(
            Matrix4::from_translation(Vec3::new(1.0, 0.0, 0.0).into()),
            Matrix4::from_translation(Vec3::new(0.0, 2.0, 0.0).into()),
            Viewport {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            },
            0.1,
            1000.0,
            RenderLayerSet::new(),
        );
        assert_eq!(
            camera.view_projection_matrix(),
            camera.projection_matrix * camera.view_matrix
        );
    }
}
