//! View-mode camera rig for the configurator.
//!
//! Holds the live camera pose, runs time-boxed transitions between the
//! canonical poses, and provides orbit navigation in the Normal view.

/// Camera rig resource, view-mode state machine and controller systems.
pub mod view_camera;
