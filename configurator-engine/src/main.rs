use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::PresentMode;

mod engine;
mod rpc;
mod tools;

use engine::assets::controller_asset::{
    ControllerAsset, bind_animation_graph, classify_controller_parts, watch_controller_load,
};
use engine::assets::part_registry::{ChosenColors, PartRegistry};
use engine::camera::view_camera::{
    CameraRig, ViewChangeRequest, ViewMode, drive_camera, handle_view_requests, orbit_controller,
};
use engine::capture::{
    CaptureFinished, CaptureRequest, CaptureState, begin_capture, finish_capture,
    tick_capture_settle,
};
use engine::core::app_state::AppState;
use rpc::host_bridge::HostBridgePlugin;
use tools::animation::{ClipLibrary, PartAnimationRequest, play_part_animations};
use tools::color::{ApplyColorRequest, handle_apply_color};
use tools::selection::{SelectionState, deselect_on_escape, pointer_select};

const CONTROLLER_ASSET_PATH: &'static str = "models/controller.glb";

fn main() {
    let mut app = create_app();

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}

fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(HostBridgePlugin);

    app.init_state::<AppState>()
        .init_resource::<PartRegistry>()
        .init_resource::<ChosenColors>()
        .init_resource::<SelectionState>()
        .init_resource::<CameraRig>()
        .init_resource::<CaptureState>()
        .init_resource::<ClipLibrary>()
        .add_event::<ViewChangeRequest>()
        .add_event::<ApplyColorRequest>()
        .add_event::<CaptureRequest>()
        .add_event::<CaptureFinished>()
        .add_event::<PartAnimationRequest>()
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (watch_controller_load, classify_controller_parts)
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            Update,
            (
                bind_animation_graph,
                pointer_select,
                deselect_on_escape,
                handle_apply_color,
                play_part_animations,
                (handle_view_requests, orbit_controller, drive_camera).chain(),
                (begin_capture, tick_capture_settle, finish_capture).chain(),
                handle_debug_keyboard_shortcuts,
            )
                .run_if(in_state(AppState::Ready)),
        );

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

/// Spawns the camera and lighting and kicks off the controller load.
fn setup(mut commands: Commands, asset_server: Res<AssetServer>, rig: Res<CameraRig>) {
    commands.spawn((
        Camera3d::default(),
        rig.camera_transform(),
        Projection::Perspective(PerspectiveProjection {
            fov: rig.fov_degrees.to_radians(),
            ..default()
        }),
    ));

    spawn_lighting(&mut commands);

    commands.insert_resource(ControllerAsset::new(
        asset_server.load(CONTROLLER_ASSET_PATH),
    ));
    info!("loading controller asset from {CONTROLLER_ASSET_PATH}");
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 220.0,
        ..default()
    });
}

/// View-mode and finalize shortcuts for native debug builds; the host page
/// drives these over the bridge in production.
#[cfg(not(target_arch = "wasm32"))]
fn handle_debug_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut view_events: EventWriter<ViewChangeRequest>,
    mut capture_events: EventWriter<CaptureRequest>,
) {
    for (key, mode) in [
        (KeyCode::Digit1, ViewMode::Normal),
        (KeyCode::Digit2, ViewMode::Chassis),
        (KeyCode::Digit3, ViewMode::Buttons),
        (KeyCode::Digit4, ViewMode::Knobs),
    ] {
        if keyboard.just_pressed(key) {
            view_events.write(ViewChangeRequest { mode });
        }
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        capture_events.write(CaptureRequest);
    }
}

/// Placeholder for WASM builds, where all control arrives via the bridge.
#[cfg(target_arch = "wasm32")]
fn handle_debug_keyboard_shortcuts() {}
