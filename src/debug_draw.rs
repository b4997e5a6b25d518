//! Immediate-mode debug geometry: boxes, frustums, lines, coordinate axes,
//! and character-controller capsules, all tagged to the dedicated debug
//! render layer and drawn last.

use uuid::Uuid;

use crate::core::math::{Aabb, Color, Vec3};
use crate::render::command::{DrawCommand, NON_PICKABLE};
use crate::render::renderable::{RenderSettings, Renderable, TransparencyMode};
use crate::scene::component::CharacterControllerComponent;
use crate::scene::layer::DEBUG_RENDER_LAYER;
use crate::uniform::value::UniformValue;

/// A line segment, the primitive every other debug shape in this module
/// decomposes into before queuing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

/// Builds the debug-layer line commands for an axis-aligned box.
pub fn draw_box(bounds: Aabb, color: Color) -> Vec<DebugLine> {
    let Aabb { min, max } = bounds;
    let corners = [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ];
    draw_box_like(corners, color)
}

/// Builds the 12 edges of a view frustum given its 8 corners in
/// near-then-far, bottom-left/bottom-right/top-right/top-left order —
/// the same winding [`draw_box`] uses, so the two share an edge table.
pub fn draw_frustum(corners: [Vec3; 8], color: Color) -> Vec<DebugLine> {
    draw_box_like(corners, color)
}

fn draw_box_like(corners: [Vec3; 8], color: Color) -> Vec<DebugLine> {
    let edges: [(usize, usize); 12] = [
        (0, 1), (1, 2), (2, 3), (3, 0),
        (4, 5), (5, 6), (6, 7), (7, 4),
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];
    edges
        .iter()
        .map(|&(a, b)| DebugLine {
            start: corners[a],
            end: corners[b],
            color,
        })
        .collect()
}

/// A single line segment.
pub fn draw_line(start: Vec3, end: Vec3, color: Color) -> DebugLine {
    DebugLine { start, end, color }
}

/// The three axis segments (red X, green Y, blue Z) of a coordinate
/// triad at `origin`, each `length` units long.
pub fn draw_coordinate_axes(origin: Vec3, length: f32) -> [DebugLine; 3] {
    [
        DebugLine {
            start: origin,
            end: origin + Vec3::new(length, 0.0, 0.0),
            color: Color::new(1.0, 0.0, 0.0, 1.0),
        },
        DebugLine {
            start: origin,
            end: origin + Vec3::new(0.0, length, 0.0),
            color: Color::new(0.0, 1.0, 0.0, 1.0),
        },
        DebugLine {
            start: origin,
            end: origin + Vec3::new(0.0, 0.0, length),
            color: Color::new(0.0, 0.0, 1.0, 1.0),
        },
    ]
}

/// Approximates a character controller's capsule as a box for debug
/// drawing (a faithful capsule would need curved segments this
/// line-list-only module doesn't support).
pub fn draw_character_controller(origin: Vec3, controller: &CharacterControllerComponent, color: Color) -> Vec<DebugLine> {
    let bounds = controller.object_bounds();
    draw_box(
        Aabb::new(bounds.min + origin, bounds.max + origin),
        color,
    )
}

/// Wraps a batch of [`DebugLine`]s into one screen-space-free draw command
/// on the debug render layer, using a line-list mesh and shader the caller
/// has already loaded into the resource cache. Debug commands never carry
/// a scene-object id, since debug geometry isn't pickable.
pub fn queue_debug_lines(mesh: Uuid, shader: Uuid, camera: Uuid, lines: &[DebugLine], bounds: Aabb) -> DrawCommand {
    let settings = RenderSettings {
        transparency: TransparencyMode::Opaque,
        depth_write: false,
        primitive: crate::gpu::types::PrimitiveMode::Lines,
        ..RenderSettings::default()
    };
    let renderable = Renderable {
        mesh: Some(mesh),
        material: None,
        settings,
    };

    let mut command = DrawCommand::new(renderable, shader, camera, DEBUG_RENDER_LAYER, NON_PICKABLE, bounds);
    if let Some(line) = lines.first() {
        let c = line.color;
        command.add_uniform("uColor", UniformValue::Vec4(crate::core::math::Vec4::new(c.r, c.g, c.b, c.a)));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_twelve_edges() {
        let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(draw_box(bounds, Color::WHITE).len(), 12);
    }

    #[test]
    fn coordinate_axes_are_red_green_blue() {
        let axes = draw_coordinate_axes(Vec3::zero(), 1.0);
        assert_eq!(axes[0].color, Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(axes[1].color, Color::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(axes[2].color, Color::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn debug_commands_are_non_pickable_and_on_the_debug_layer() {
        let command = queue_debug_lines(
            Uuid::nil(),
            Uuid::nil(),
            Uuid::nil(),
            &[draw_line(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), Color::WHITE)],
            Aabb::EMPTY,
        );
        assert_eq!(command.scene_object_id(), NON_PICKABLE);
        assert_eq!(command.render_layer(), DEBUG_RENDER_LAYER);
    }
}
