use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use bevy::window::PrimaryWindow;
use constants::poses::HIGHLIGHT_EMISSIVE;

use crate::engine::assets::part_registry::PartRegistry;
use crate::engine::camera::view_camera::CameraRig;
use crate::engine::capture::CaptureState;
use crate::tools::animation::PartAnimationRequest;
use crate::tools::ray::ray_hits_part;

/// Current selection, scoped to the active view mode. Parts are referenced
/// by registry identifier only.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    #[default]
    Idle,
    Single(String),
    Multi(Vec<String>),
}

/// Highlight/animation side effects of one selection transition. The caller
/// applies these against the registry; the state machine itself never touches
/// a material.
#[derive(Debug, Default, PartialEq)]
pub struct SelectionDelta {
    pub highlight: Vec<String>,
    pub unhighlight: Vec<String>,
    pub animate: Vec<String>,
}

impl SelectionState {
    pub fn members(&self) -> &[String] {
        match self {
            SelectionState::Idle => &[],
            SelectionState::Single(id) => std::slice::from_ref(id),
            SelectionState::Multi(ids) => ids,
        }
    }

    /// Advances the state machine for one pointer event. `hit` is the nearest
    /// eligible part under the pointer, `additive` whether the multi-select
    /// modifier was held.
    pub fn click(&mut self, hit: Option<&str>, additive: bool) -> SelectionDelta {
        let mut delta = SelectionDelta::default();

        if !additive {
            match hit {
                Some(part) => {
                    delta.unhighlight = self
                        .members()
                        .iter()
                        .filter(|id| id.as_str() != part)
                        .cloned()
                        .collect();
                    delta.highlight.push(part.to_string());
                    *self = SelectionState::Single(part.to_string());
                }
                None => {
                    delta.unhighlight = self.members().to_vec();
                    *self = SelectionState::Idle;
                }
            }
            return delta;
        }

        // Modifier held: build or shrink a multi-selection. A miss is a no-op
        // so stray clicks never discard an assembled set.
        let Some(part) = hit else { return delta };

        match self {
            SelectionState::Idle => {
                delta.highlight.push(part.to_string());
                *self = SelectionState::Single(part.to_string());
            }
            SelectionState::Single(current) => {
                if current == part {
                    delta.unhighlight.push(part.to_string());
                    *self = SelectionState::Idle;
                } else {
                    let pair = vec![current.clone(), part.to_string()];
                    delta.highlight = pair.clone();
                    delta.animate = pair.clone();
                    *self = SelectionState::Multi(pair);
                }
            }
            SelectionState::Multi(ids) => {
                if let Some(index) = ids.iter().position(|id| id == part) {
                    ids.remove(index);
                    delta.unhighlight.push(part.to_string());
                    if ids.is_empty() {
                        *self = SelectionState::Idle;
                    }
                } else {
                    ids.push(part.to_string());
                    delta.highlight.push(part.to_string());
                    delta.animate.push(part.to_string());
                }
            }
        }
        delta
    }

    /// Drops the whole selection, e.g. when the view mode changes.
    pub fn clear(&mut self) -> SelectionDelta {
        let delta = SelectionDelta {
            unhighlight: self.members().to_vec(),
            ..default()
        };
        *self = SelectionState::Idle;
        delta
    }

    /// Fixed auto-selection used when entering the Chassis view. Highlights
    /// without animating; chassis parts do not animate.
    pub fn auto_single(&mut self, part: &str) -> SelectionDelta {
        let mut delta = self.clear();
        delta.highlight.push(part.to_string());
        *self = SelectionState::Single(part.to_string());
        delta
    }
}

/// Toggles the emissive overlay marking a selected part. The overlay is the
/// only thing touched; base color stays whatever the color applier set.
pub fn set_highlight(
    materials: &mut Assets<StandardMaterial>,
    handle: &Handle<StandardMaterial>,
    on: bool,
) {
    if let Some(material) = materials.get_mut(handle) {
        material.emissive = if on {
            LinearRgba::rgb(
                HIGHLIGHT_EMISSIVE[0],
                HIGHLIGHT_EMISSIVE[1],
                HIGHLIGHT_EMISSIVE[2],
            )
        } else {
            LinearRgba::BLACK
        };
    }
}

/// Applies a transition's side effects: highlight toggles on the parts'
/// materials and one-shot animation requests for parts joining a multi-set.
pub fn apply_selection_delta(
    delta: &SelectionDelta,
    registry: &PartRegistry,
    materials: &mut Assets<StandardMaterial>,
    animations: &mut EventWriter<PartAnimationRequest>,
) {
    for id in &delta.unhighlight {
        if let Some(record) = registry.get(id) {
            set_highlight(materials, &record.material, false);
        }
    }
    for id in &delta.highlight {
        if let Some(record) = registry.get(id) {
            set_highlight(materials, &record.material, true);
        }
    }
    for id in &delta.animate {
        animations.write(PartAnimationRequest { part: id.clone() });
    }
}

/// Pointer selection over the render surface. Only the Buttons and Knobs
/// views hit-test; Normal and Chassis ignore clicks here.
pub fn pointer_select(
    buttons: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    q_parts: Query<(&GlobalTransform, &Aabb)>,
    rig: Res<CameraRig>,
    capture: Res<CaptureState>,
    registry: Res<PartRegistry>,
    mut selection: ResMut<SelectionState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut animations: EventWriter<PartAnimationRequest>,
) {
    if !buttons.just_pressed(MouseButton::Left) || !capture.is_idle() {
        return;
    }
    let Some(role) = rig.mode.hit_role() else {
        return;
    };

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok((cam_xf, camera)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_xf, cursor_pos) else {
        return;
    };
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    // Nearest hit among the role-eligible parts only.
    let mut best: Option<(&str, f32)> = None;
    for id in registry.role_members(role) {
        let Some(record) = registry.get(id) else {
            continue;
        };
        let Ok((xf, aabb)) = q_parts.get(record.entity) else {
            continue;
        };
        if let Some(t) = ray_hits_part(origin, dir, xf, aabb) {
            if t > 0.0 && best.is_none_or(|(_, best_t)| t < best_t) {
                best = Some((id.as_str(), t));
            }
        }
    }

    let additive = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    let delta = selection.click(best.map(|(id, _)| id), additive);
    apply_selection_delta(&delta, &registry, &mut materials, &mut animations);
}

// Deselect all on Escape key press
pub fn deselect_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    rig: Res<CameraRig>,
    registry: Res<PartRegistry>,
    mut selection: ResMut<SelectionState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut animations: EventWriter<PartAnimationRequest>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) || rig.mode.hit_role().is_none() {
        return;
    }
    let delta = selection.clear();
    apply_selection_delta(&delta, &registry, &mut materials, &mut animations);
}
