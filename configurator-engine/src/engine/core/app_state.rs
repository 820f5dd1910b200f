use bevy::prelude::*;

/// Application lifecycle. Interaction systems only run in `Ready`; a failed
/// asset load parks the app in `LoadFailed` with an empty registry and no
/// automatic retry.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Ready,
    LoadFailed,
}
