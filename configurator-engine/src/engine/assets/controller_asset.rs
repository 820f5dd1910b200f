use bevy::animation::graph::{AnimationGraph, AnimationGraphHandle};
use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::engine::assets::part_registry::{ChosenColors, PartRegistry};
use crate::engine::classify::{NamedPart, classify_parts};
use crate::engine::core::app_state::AppState;
use crate::rpc::host_bridge::HostBridge;
use crate::tools::animation::ClipLibrary;

/// Handle and load-progress flags for the controller glTF.
#[derive(Resource)]
pub struct ControllerAsset {
    pub gltf: Handle<Gltf>,
    pub scene_spawned: bool,
    pub classified: bool,
}

impl ControllerAsset {
    pub fn new(gltf: Handle<Gltf>) -> Self {
        Self {
            gltf,
            scene_spawned: false,
            classified: false,
        }
    }
}

/// Marker for the spawned controller scene root.
#[derive(Component)]
pub struct ControllerSceneRoot;

/// Spawns the controller scene once the glTF lands, and parks the app in
/// `LoadFailed` if it never does.
pub fn watch_controller_load(
    mut controller: ResMut<ControllerAsset>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if controller.scene_spawned {
        return;
    }

    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(&controller.gltf) {
        error!("controller asset failed to load: {err}");
        next_state.set(AppState::LoadFailed);
        return;
    }

    let Some(gltf) = gltfs.get(&controller.gltf) else {
        return;
    };
    let Some(scene) = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
    else {
        error!("controller asset contains no scene");
        next_state.set(AppState::LoadFailed);
        return;
    };

    commands.spawn((SceneRoot(scene), ControllerSceneRoot));
    controller.scene_spawned = true;
    info!("controller scene spawned");
}

/// Runs the one-shot classification pass as soon as the spawned scene's mesh
/// parts are queryable, then emits the initial config snapshot and opens the
/// app for interaction.
pub fn classify_controller_parts(
    mut controller: ResMut<ControllerAsset>,
    mut registry: ResMut<PartRegistry>,
    mut chosen: ResMut<ChosenColors>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut bridge: ResMut<HostBridge>,
    parts: Query<(Entity, &MeshMaterial3d<StandardMaterial>)>,
    names: Query<&Name>,
    parents: Query<&ChildOf>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if !controller.scene_spawned || controller.classified {
        return;
    }

    let mut named_parts = Vec::new();
    for (entity, material) in &parts {
        let Some(name) = part_identifier(entity, &names, &parents) else {
            continue;
        };
        named_parts.push(NamedPart {
            entity,
            name,
            material: material.0.clone(),
        });
    }
    if named_parts.is_empty() {
        // Scene instance still materializing; try again next frame.
        return;
    }

    let assignments = classify_parts(named_parts, &mut materials, &mut registry, &mut chosen);
    for assignment in assignments {
        commands
            .entity(assignment.entity)
            .insert(MeshMaterial3d(assignment.material));
    }

    bridge.push_config(&chosen);
    controller.classified = true;
    next_state.set(AppState::Ready);
}

/// Identifier for a mesh entity: its own name, or the nearest named
/// ancestor. glTF primitives may spawn as unnamed children of their node.
fn part_identifier(
    entity: Entity,
    names: &Query<&Name>,
    parents: &Query<&ChildOf>,
) -> Option<String> {
    let mut current = entity;
    loop {
        if let Ok(name) = names.get(current) {
            return Some(name.as_str().to_string());
        }
        current = parents.get(current).ok()?.parent();
    }
}

/// Builds the animation graph from the glTF's named clips and attaches it to
/// the scene's animation player, once.
pub fn bind_animation_graph(
    mut library: ResMut<ClipLibrary>,
    controller: Res<ControllerAsset>,
    gltfs: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    players: Query<Entity, Added<AnimationPlayer>>,
    mut commands: Commands,
) {
    if library.player.is_some() {
        return;
    }
    let Some(player_entity) = players.iter().next() else {
        return;
    };
    let Some(gltf) = gltfs.get(&controller.gltf) else {
        return;
    };

    let mut graph = AnimationGraph::new();
    let mut clip_count = 0;
    for (name, clip) in &gltf.named_animations {
        let node = graph.add_clip(clip.clone(), 1.0, graph.root);
        library.register(name.to_string(), node);
        clip_count += 1;
    }
    commands
        .entity(player_entity)
        .insert(AnimationGraphHandle(graphs.add(graph)));
    library.player = Some(player_entity);
    info!("bound {clip_count} animation clips");
}
