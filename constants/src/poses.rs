use bevy::prelude::*;

/// A canonical camera configuration the view controller interpolates toward.
pub struct CameraPoseDef {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub orbit: bool,
}

/// Free-orbit overview pose used by the Normal view.
pub const NORMAL_POSE: CameraPoseDef = CameraPoseDef {
    position: Vec3::new(0.0, 2.4, 6.8),
    target: Vec3::new(0.0, 0.5, 0.0),
    fov_degrees: 50.0,
    orbit: true,
};

/// Top-down inspection pose shared by the Chassis, Buttons and Knobs views.
pub const INSPECTION_POSE: CameraPoseDef = CameraPoseDef {
    position: Vec3::new(0.0, 4.2, 2.2),
    target: Vec3::new(0.0, 0.3, 0.0),
    fov_degrees: 45.0,
    orbit: false,
};

/// Fixed pose used for the checkout capture, with a narrowed field of view.
pub const PRODUCT_POSE: CameraPoseDef = CameraPoseDef {
    position: Vec3::new(2.6, 2.0, 4.8),
    target: Vec3::new(0.0, 0.4, 0.0),
    fov_degrees: 30.0,
    orbit: false,
};

pub const VIEW_TRANSITION_SECS: f32 = 1.2;

/// Delay between posing for capture and reading the frame back, so pending
/// material updates reach the GPU first.
pub const CAPTURE_SETTLE_SECS: f32 = 0.12;

/// Horizontal shift compensating the host page's side panel, applied whole
/// whenever the view leaves or re-enters Normal.
pub const PANEL_SHIFT_X: f32 = 0.65;

/// Emissive tint marking selected parts. Added on top of the base color and
/// removed on deselect, never written into the base color itself.
pub const HIGHLIGHT_EMISSIVE: [f32; 3] = [0.30, 0.26, 0.06];
