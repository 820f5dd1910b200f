use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::poses::{
    CameraPoseDef, INSPECTION_POSE, NORMAL_POSE, PANEL_SHIFT_X, VIEW_TRANSITION_SECS,
};
use serde::{Deserialize, Serialize};

use crate::engine::assets::part_registry::{PartRegistry, PartRole};
use crate::engine::capture::CaptureState;
use crate::tools::animation::PartAnimationRequest;
use crate::tools::selection::{SelectionState, apply_selection_delta};

/// Active editing context. Drives both the camera pose and which role set is
/// eligible for hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Normal,
    Chassis,
    Buttons,
    Knobs,
}

impl ViewMode {
    /// Role set a pointer click may hit in this view. Normal and Chassis do
    /// not hit-test; Chassis shows a fixed auto-selection instead.
    pub fn hit_role(&self) -> Option<PartRole> {
        match self {
            ViewMode::Buttons => Some(PartRole::Button),
            ViewMode::Knobs => Some(PartRole::Knob),
            ViewMode::Normal | ViewMode::Chassis => None,
        }
    }

    pub fn pose(&self) -> &'static CameraPoseDef {
        match self {
            ViewMode::Normal => &NORMAL_POSE,
            _ => &INSPECTION_POSE,
        }
    }
}

/// Request to switch the active view, from the host page or a debug key.
#[derive(Event, Debug)]
pub struct ViewChangeRequest {
    pub mode: ViewMode,
}

struct ViewTransition {
    from_position: Vec3,
    from_target: Vec3,
    to_position: Vec3,
    to_target: Vec3,
    elapsed: f32,
    duration: f32,
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Live camera state. The pose is continuous: a transition may be superseded
/// mid-flight by a new request, which restarts from wherever the camera
/// currently is rather than from the previous canonical pose.
#[derive(Resource)]
pub struct CameraRig {
    pub mode: ViewMode,
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub orbit_enabled: bool,
    /// Horizontal compensation for the host page's side panel; zero in
    /// Normal, the full shift elsewhere, never interpolated.
    pub panel_shift: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub radius: f32,
    transition: Option<ViewTransition>,
}

impl Default for CameraRig {
    fn default() -> Self {
        let mut rig = Self {
            mode: ViewMode::Normal,
            position: NORMAL_POSE.position,
            target: NORMAL_POSE.target,
            fov_degrees: NORMAL_POSE.fov_degrees,
            orbit_enabled: NORMAL_POSE.orbit,
            panel_shift: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            radius: 1.0,
            transition: None,
        };
        rig.sync_orbit_from_pose();
        rig
    }
}

impl CameraRig {
    /// Starts the transition toward `mode`'s canonical pose. The orbit flag,
    /// field of view and panel shift change immediately; position and target
    /// interpolate from the live pose.
    pub fn request_view(&mut self, mode: ViewMode) {
        let pose = mode.pose();
        self.transition = Some(ViewTransition {
            from_position: self.position,
            from_target: self.target,
            to_position: pose.position,
            to_target: pose.target,
            elapsed: 0.0,
            duration: VIEW_TRANSITION_SECS,
        });
        self.orbit_enabled = pose.orbit;
        self.fov_degrees = pose.fov_degrees;
        self.panel_shift = if mode == ViewMode::Normal {
            0.0
        } else {
            PANEL_SHIFT_X
        };
        self.mode = mode;
    }

    pub fn transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Advances the active transition by one frame's wall-clock delta. The
    /// render-loop driver is the only caller.
    pub fn tick(&mut self, dt: f32) {
        let Some(transition) = &mut self.transition else {
            return;
        };
        transition.elapsed += dt;
        let progress = (transition.elapsed / transition.duration).min(1.0);
        let eased = ease_out_cubic(progress);
        self.position = transition.from_position.lerp(transition.to_position, eased);
        self.target = transition.from_target.lerp(transition.to_target, eased);
        if progress >= 1.0 {
            self.position = transition.to_position;
            self.target = transition.to_target;
            self.transition = None;
            // Hand control to the orbit rig without snapping.
            self.sync_orbit_from_pose();
        }
    }

    /// Re-derives yaw/pitch/radius from the live position and target.
    pub fn sync_orbit_from_pose(&mut self) {
        let offset = self.position - self.target;
        self.radius = offset.length().max(0.001);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (-offset.y / self.radius).clamp(-1.0, 1.0).asin();
    }

    /// Recomputes the live position from the orbit parameters.
    pub fn apply_orbit(&mut self) {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        self.position = self.target + rotation * Vec3::new(0.0, 0.0, self.radius);
    }

    /// World transform for the render camera, panel shift included.
    pub fn camera_transform(&self) -> Transform {
        let shift = Vec3::X * self.panel_shift;
        Transform::from_translation(self.position + shift).looking_at(self.target + shift, Vec3::Y)
    }
}

/// Applies view-change requests: camera transition, selection reset, and the
/// Chassis auto-selection.
pub fn handle_view_requests(
    mut events: EventReader<ViewChangeRequest>,
    mut rig: ResMut<CameraRig>,
    mut selection: ResMut<SelectionState>,
    registry: Res<PartRegistry>,
    capture: Res<CaptureState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut animations: EventWriter<PartAnimationRequest>,
) {
    for event in events.read() {
        if !capture.is_idle() {
            warn!("view change dropped: capture in flight");
            continue;
        }
        if event.mode == rig.mode {
            continue;
        }
        rig.request_view(event.mode);

        let delta = if event.mode == ViewMode::Chassis {
            match registry.chassis_part() {
                Some(id) => {
                    let id = id.to_string();
                    selection.auto_single(&id)
                }
                None => {
                    warn!("chassis view entered with no chassis part");
                    selection.clear()
                }
            }
        } else {
            selection.clear()
        };
        apply_selection_delta(&delta, &registry, &mut materials, &mut animations);

        info!("view changed to {:?}", event.mode);
    }
}

/// Orbit navigation for the Normal view: left-drag orbits, scroll dollies.
/// Inactive while a transition or capture owns the camera.
pub fn orbit_controller(
    mut rig: ResMut<CameraRig>,
    capture: Res<CaptureState>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let motion: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    if !rig.orbit_enabled || rig.transitioning() || !capture.is_idle() {
        return;
    }

    if buttons.pressed(MouseButton::Left) && motion != Vec2::ZERO {
        let yaw_sens = 0.0050;
        let pitch_sens = 0.0040;
        rig.yaw -= motion.x * yaw_sens;
        rig.pitch = (rig.pitch - motion.y * pitch_sens).clamp(-1.45, -0.05);
        rig.apply_orbit();
    }

    if scroll_accum.abs() > f32::EPSILON {
        rig.radius = (rig.radius * (1.0 - scroll_accum * 0.08)).clamp(2.0, 14.0);
        rig.apply_orbit();
    }
}

/// Copies the rig onto the render camera once per frame. Skipped while a
/// capture temporarily owns the camera transform.
pub fn drive_camera(
    time: Res<Time>,
    mut rig: ResMut<CameraRig>,
    capture: Res<CaptureState>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<Camera3d>>,
) {
    if !capture.is_idle() {
        return;
    }
    rig.tick(time.delta_secs());
    let Ok((mut transform, mut projection)) = cameras.single_mut() else {
        return;
    };
    *transform = rig.camera_transform();
    if let Projection::Perspective(perspective) = projection.as_mut() {
        perspective.fov = rig.fov_degrees.to_radians();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn easing_starts_at_zero_and_ends_at_one() {
        assert!(ease_out_cubic(0.0).abs() < EPS);
        assert!((ease_out_cubic(1.0) - 1.0).abs() < EPS);
        assert!(ease_out_cubic(0.3) < ease_out_cubic(0.6));
    }

    #[test]
    fn transition_converges_exactly_on_the_canonical_pose() {
        let mut rig = CameraRig::default();
        rig.position = Vec3::new(9.0, 1.0, -3.0);
        rig.target = Vec3::new(0.5, 0.5, 0.5);

        rig.request_view(ViewMode::Buttons);
        for _ in 0..5 {
            rig.tick(0.3);
        }

        assert!(!rig.transitioning());
        assert!(rig.position.distance(INSPECTION_POSE.position) < EPS);
        assert!(rig.target.distance(INSPECTION_POSE.target) < EPS);
    }

    #[test]
    fn superseding_request_restarts_from_the_live_pose() {
        let mut rig = CameraRig::default();
        rig.request_view(ViewMode::Buttons);
        rig.tick(0.4);
        let live = rig.position;

        rig.request_view(ViewMode::Normal);
        rig.tick(0.016);

        // Continuity: one frame in, the camera is still near where it was.
        assert!(rig.position.distance(live) < 0.5);
        assert!(rig.transitioning());

        for _ in 0..10 {
            rig.tick(0.2);
        }
        assert!(rig.position.distance(NORMAL_POSE.position) < EPS);
    }

    #[test]
    fn orbit_flag_and_panel_shift_change_immediately() {
        let mut rig = CameraRig::default();
        assert!(rig.orbit_enabled);
        assert_eq!(rig.panel_shift, 0.0);

        rig.request_view(ViewMode::Knobs);
        assert!(rig.transitioning());
        assert!(!rig.orbit_enabled);
        assert_eq!(rig.panel_shift, PANEL_SHIFT_X);
        assert_eq!(rig.fov_degrees, INSPECTION_POSE.fov_degrees);

        rig.request_view(ViewMode::Normal);
        assert!(rig.orbit_enabled);
        assert_eq!(rig.panel_shift, 0.0);
    }

    #[test]
    fn orbit_parameters_round_trip_through_the_pose() {
        let mut rig = CameraRig::default();
        rig.position = Vec3::new(3.0, 2.5, 4.0);
        rig.target = Vec3::new(0.0, 0.5, 0.0);
        rig.sync_orbit_from_pose();

        let before = rig.position;
        rig.apply_orbit();
        assert!(rig.position.distance(before) < 1e-3);
    }

    #[test]
    fn hit_roles_follow_the_view() {
        assert_eq!(ViewMode::Buttons.hit_role(), Some(PartRole::Button));
        assert_eq!(ViewMode::Knobs.hit_role(), Some(PartRole::Knob));
        assert_eq!(ViewMode::Normal.hit_role(), None);
        assert_eq!(ViewMode::Chassis.hit_role(), None);
    }
}
