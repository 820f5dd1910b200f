use bevy::prelude::*;
use constants::palette::{BUTTON_PALETTE, CHASSIS_PALETTE, KNOB_PALETTE, PaletteEntry, color_of};
use thiserror::Error;

use crate::engine::assets::part_registry::{ChosenColors, PartRegistry, PartRole};
use crate::rpc::host_bridge::{HostBridge, HostNotification};
use crate::tools::selection::{SelectionDelta, SelectionState, set_highlight};

/// Palette-swatch pick arriving from the host page.
#[derive(Event, Debug)]
pub struct ApplyColorRequest {
    pub name: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ApplyColorError {
    #[error("no part is selected")]
    InvalidSelection,
    #[error("color {name:?} is not in the {role:?} palette")]
    UnknownColor { name: String, role: PartRole },
}

fn palette_for(role: PartRole) -> &'static [PaletteEntry] {
    match role {
        PartRole::Chassis => CHASSIS_PALETTE,
        PartRole::Button => BUTTON_PALETTE,
        PartRole::Knob => KNOB_PALETTE,
        PartRole::Decorative => &[],
    }
}

/// Applies the named palette color to the current selection and records it
/// in the chosen-color config.
///
/// Multi-selections are consumed: every member is recolored, highlights come
/// off and the selection returns to Idle. A single selection stays selected.
/// Nothing is mutated on error. The active view mode is never touched.
pub fn apply_color(
    name: &str,
    selection: &mut SelectionState,
    registry: &PartRegistry,
    chosen: &mut ChosenColors,
    materials: &mut Assets<StandardMaterial>,
) -> Result<SelectionDelta, ApplyColorError> {
    let members = selection.members().to_vec();
    if members.is_empty() {
        return Err(ApplyColorError::InvalidSelection);
    }

    // Resolve every member before the first write, so a bad name leaves the
    // whole selection untouched.
    let mut resolved = Vec::with_capacity(members.len());
    for id in &members {
        let Some(record) = registry.get(id) else {
            continue;
        };
        let color = color_of(palette_for(record.role), name).ok_or_else(|| {
            ApplyColorError::UnknownColor {
                name: name.to_string(),
                role: record.role,
            }
        })?;
        resolved.push((record, color));
    }

    for (record, color) in &resolved {
        if let Some(material) = materials.get_mut(&record.material) {
            material.base_color = *color;
        }
        match record.role {
            PartRole::Chassis => chosen.chassis = name.to_string(),
            PartRole::Button => {
                chosen.buttons.insert(record.name.clone(), name.to_string());
            }
            PartRole::Knob => {
                chosen.knobs.insert(record.name.clone(), name.to_string());
            }
            PartRole::Decorative => {}
        }
    }

    let mut delta = SelectionDelta::default();
    if matches!(selection, SelectionState::Multi(_)) {
        delta.unhighlight = members;
        *selection = SelectionState::Idle;
    }
    Ok(delta)
}

/// Applies the color and emits the refreshed config snapshot in one step;
/// the snapshot goes out on every mutation, never on failure.
pub fn apply_and_sync(
    name: &str,
    selection: &mut SelectionState,
    registry: &PartRegistry,
    chosen: &mut ChosenColors,
    materials: &mut Assets<StandardMaterial>,
    bridge: &mut HostBridge,
) -> Result<SelectionDelta, ApplyColorError> {
    let delta = apply_color(name, selection, registry, chosen, materials)?;
    bridge.push_config(chosen);
    Ok(delta)
}

pub fn handle_apply_color(
    mut events: EventReader<ApplyColorRequest>,
    mut selection: ResMut<SelectionState>,
    registry: Res<PartRegistry>,
    mut chosen: ResMut<ChosenColors>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut bridge: ResMut<HostBridge>,
) {
    for event in events.read() {
        match apply_and_sync(
            &event.name,
            &mut selection,
            &registry,
            &mut chosen,
            &mut materials,
            &mut bridge,
        ) {
            Ok(delta) => {
                for id in &delta.unhighlight {
                    if let Some(record) = registry.get(id) {
                        set_highlight(&mut materials, &record.material, false);
                    }
                }
            }
            Err(err @ ApplyColorError::InvalidSelection) => {
                warn!("apply {:?}: {err}", event.name);
                bridge.notify(HostNotification::InvalidSelection {
                    reason: err.to_string(),
                });
            }
            Err(err) => warn!("apply {:?}: {err}", event.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::part_registry::PartRecord;
    use std::collections::BTreeMap;

    struct Fixture {
        registry: PartRegistry,
        chosen: ChosenColors,
        materials: Assets<StandardMaterial>,
    }

    fn fixture() -> Fixture {
        let mut materials = Assets::<StandardMaterial>::default();
        let mut registry = PartRegistry::default();
        let mut chosen = ChosenColors::default();

        for (name, role, default) in [
            ("CubeChasis_01", PartRole::Chassis, "neutral gray"),
            ("Boton_A", PartRole::Button, "black"),
            ("Boton_B", PartRole::Button, "black"),
            ("Knob_1", PartRole::Knob, "pink"),
        ] {
            registry.insert(PartRecord {
                name: name.to_string(),
                role,
                entity: Entity::PLACEHOLDER,
                material: materials.add(StandardMaterial::default()),
            });
            match role {
                PartRole::Chassis => chosen.chassis = default.to_string(),
                PartRole::Button => {
                    chosen.buttons.insert(name.to_string(), default.to_string());
                }
                PartRole::Knob => {
                    chosen.knobs.insert(name.to_string(), default.to_string());
                }
                PartRole::Decorative => {}
            }
        }
        Fixture {
            registry,
            chosen,
            materials,
        }
    }

    #[test]
    fn idle_selection_is_rejected_without_mutation() {
        let mut fx = fixture();
        let before = fx.chosen.clone();
        let mut selection = SelectionState::Idle;

        let result = apply_color(
            "Rojo",
            &mut selection,
            &fx.registry,
            &mut fx.chosen,
            &mut fx.materials,
        );

        assert_eq!(result.unwrap_err(), ApplyColorError::InvalidSelection);
        assert_eq!(fx.chosen, before);
        assert_eq!(selection, SelectionState::Idle);
    }

    #[test]
    fn single_apply_recolors_one_part_and_keeps_the_selection() {
        let mut fx = fixture();
        let mut selection = SelectionState::Single("Boton_A".to_string());

        let delta = apply_color(
            "Rojo",
            &mut selection,
            &fx.registry,
            &mut fx.chosen,
            &mut fx.materials,
        )
        .unwrap();

        assert_eq!(selection, SelectionState::Single("Boton_A".to_string()));
        assert!(delta.unhighlight.is_empty());
        assert_eq!(fx.chosen.buttons.get("Boton_A").unwrap(), "Rojo");
        assert_eq!(fx.chosen.buttons.get("Boton_B").unwrap(), "black");

        let record = fx.registry.get("Boton_A").unwrap();
        let expected = color_of(BUTTON_PALETTE, "Rojo").unwrap();
        assert_eq!(
            fx.materials.get(&record.material).unwrap().base_color,
            expected
        );
    }

    #[test]
    fn multi_apply_lands_on_idle_with_no_highlights_left() {
        let mut fx = fixture();
        let members = vec!["Boton_A".to_string(), "Boton_B".to_string()];
        let mut selection = SelectionState::Multi(members.clone());

        // Simulate the highlights the selection put on.
        for id in &members {
            let record = fx.registry.get(id).unwrap();
            set_highlight(&mut fx.materials, &record.material.clone(), true);
        }

        let delta = apply_color(
            "Verde",
            &mut selection,
            &fx.registry,
            &mut fx.chosen,
            &mut fx.materials,
        )
        .unwrap();

        assert_eq!(selection, SelectionState::Idle);
        assert_eq!(delta.unhighlight, members);
        for id in &members {
            assert_eq!(fx.chosen.buttons.get(id).unwrap(), "Verde");
            let record = fx.registry.get(id).unwrap();
            set_highlight(&mut fx.materials, &record.material.clone(), false);
            let material = fx.materials.get(&record.material).unwrap();
            assert_eq!(material.emissive, LinearRgba::BLACK);
        }
    }

    #[test]
    fn chassis_apply_writes_the_scalar_entry() {
        let mut fx = fixture();
        let mut selection = SelectionState::Single("CubeChasis_01".to_string());

        apply_color(
            "Azul",
            &mut selection,
            &fx.registry,
            &mut fx.chosen,
            &mut fx.materials,
        )
        .unwrap();

        assert_eq!(fx.chosen.chassis, "Azul");
        assert!(fx.chosen.buttons.values().all(|name| name == "black"));
    }

    #[test]
    fn unknown_color_leaves_everything_untouched() {
        let mut fx = fixture();
        let before = fx.chosen.clone();
        let mut selection = SelectionState::Single("Knob_1".to_string());

        let result = apply_color(
            "Chartreuse",
            &mut selection,
            &fx.registry,
            &mut fx.chosen,
            &mut fx.materials,
        );

        assert!(matches!(
            result,
            Err(ApplyColorError::UnknownColor { role: PartRole::Knob, .. })
        ));
        assert_eq!(fx.chosen, before);
        assert_eq!(selection, SelectionState::Single("Knob_1".to_string()));
    }

    #[test]
    fn every_apply_emits_one_full_snapshot_in_order() {
        let mut fx = fixture();
        let mut bridge = HostBridge::default();

        let mut selection = SelectionState::Single("Boton_A".to_string());
        apply_and_sync(
            "Rojo",
            &mut selection,
            &fx.registry,
            &mut fx.chosen,
            &mut fx.materials,
            &mut bridge,
        )
        .unwrap();

        let mut selection = SelectionState::Single("CubeChasis_01".to_string());
        apply_and_sync(
            "Azul",
            &mut selection,
            &fx.registry,
            &mut fx.chosen,
            &mut fx.materials,
            &mut bridge,
        )
        .unwrap();

        let pending = bridge.pending();
        assert_eq!(pending.len(), 2);
        let expected = HostNotification::ConfigUpdate {
            chassis: "Azul".to_string(),
            buttons: BTreeMap::from([
                ("Boton_A".to_string(), "Rojo".to_string()),
                ("Boton_B".to_string(), "black".to_string()),
            ]),
            knobs: BTreeMap::from([("Knob_1".to_string(), "pink".to_string())]),
        };
        assert_eq!(pending[1], expected);
    }
}
