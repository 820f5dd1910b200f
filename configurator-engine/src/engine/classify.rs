//! One-shot part classification for a freshly spawned controller scene.
//!
//! Part roles are assigned by naming convention: the identifier markers in
//! `constants::markers` are matched case-insensitively, first match wins, in
//! a fixed priority order. Knob-marked parts split on their authored baseline
//! luminance: dark knobs become selectable, light ones are decorative caps.
//! A second pass then flattens buttons and ring trim onto one shared dark
//! baseline, overriding the per-role default colors applied moments earlier.
//! The recorded color names keep the pass-one values; only the material is
//! overridden. Simplifying this into a single pass changes the shipped visual
//! baseline, so both passes are kept as authored.

use bevy::prelude::*;
use constants::markers::{
    BUTTON_MARKER, CHASSIS_MARKER, KNOB_DARK_LUMINANCE_MAX, KNOB_MARKER, LOGO_MARKER, RING_MARKER,
};
use constants::palette::{
    BUTTON_DEFAULT, BUTTON_FINISH, BUTTON_PALETTE, CHASSIS_DEFAULT, CHASSIS_FINISH,
    CHASSIS_PALETTE, DARK_BASELINE_RGB, KNOB_DEFAULT, KNOB_FINISH, KNOB_PALETTE, color_of,
};

use super::assets::part_registry::{ChosenColors, PartRecord, PartRegistry, PartRole};

/// Outcome of the naming-convention match for a single identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartClass {
    /// Branding overlay; gets alpha-masked transparency when textured.
    Logo,
    Chassis,
    Button,
    /// Dark knob body, selectable and recolorable.
    Knob,
    /// Light knob cap, painted flat white and left out of the registry.
    KnobCap,
    /// No marker matched; left untouched.
    Plain,
}

/// Pure classification rule: identifier plus authored baseline luminance.
/// Case-insensitive substring match, first match wins.
pub fn classify_identifier(name: &str, baseline_luminance: f32) -> PartClass {
    let lower = name.to_lowercase();
    if lower.contains(LOGO_MARKER) {
        return PartClass::Logo;
    }
    if lower.contains(CHASSIS_MARKER) {
        return PartClass::Chassis;
    }
    if lower.contains(BUTTON_MARKER) {
        return PartClass::Button;
    }
    if lower.contains(KNOB_MARKER) {
        return if baseline_luminance < KNOB_DARK_LUMINANCE_MAX {
            PartClass::Knob
        } else {
            PartClass::KnobCap
        };
    }
    PartClass::Plain
}

/// Average of the sRGB channel values of a part's authored base color.
pub fn baseline_luminance(color: &Color) -> f32 {
    let srgba = color.to_srgba();
    (srgba.red + srgba.green + srgba.blue) / 3.0
}

/// One named part of the flat scene traversal, before classification.
pub struct NamedPart {
    pub entity: Entity,
    pub name: String,
    pub material: Handle<StandardMaterial>,
}

/// A part whose material handle was replaced during classification; the
/// caller re-attaches the new handle to the entity.
pub struct MaterialAssignment {
    pub entity: Entity,
    pub material: Handle<StandardMaterial>,
}

/// Classify the scene's named parts in one pass, populating the registry and
/// the chosen-color record and restyling each part's material. Never
/// re-invoked for the lifetime of an asset.
pub fn classify_parts(
    parts: Vec<NamedPart>,
    materials: &mut Assets<StandardMaterial>,
    registry: &mut PartRegistry,
    chosen: &mut ChosenColors,
) -> Vec<MaterialAssignment> {
    let mut assignments = Vec::new();
    // (identifier, handle) pairs the normalization pass re-visits.
    let mut styled: Vec<(String, Handle<StandardMaterial>)> = Vec::new();

    for part in parts {
        let source = materials
            .get(&part.material)
            .cloned()
            .unwrap_or_default();
        let luminance = baseline_luminance(&source.base_color);
        let mut material = source;

        let role = match classify_identifier(&part.name, luminance) {
            PartClass::Logo => {
                if material.base_color_texture.is_some() {
                    material.alpha_mode = AlphaMode::Mask(0.5);
                } else {
                    continue;
                }
                PartRole::Decorative
            }
            PartClass::Chassis => {
                if let Some(color) = color_of(CHASSIS_PALETTE, CHASSIS_DEFAULT) {
                    material.base_color = color;
                }
                material.metallic = CHASSIS_FINISH.metallic;
                material.perceptual_roughness = CHASSIS_FINISH.roughness;
                chosen.chassis = CHASSIS_DEFAULT.to_string();
                PartRole::Chassis
            }
            PartClass::Button => {
                if let Some(color) = color_of(BUTTON_PALETTE, BUTTON_DEFAULT) {
                    material.base_color = color;
                }
                material.metallic = BUTTON_FINISH.metallic;
                material.perceptual_roughness = BUTTON_FINISH.roughness;
                chosen
                    .buttons
                    .insert(part.name.clone(), BUTTON_DEFAULT.to_string());
                PartRole::Button
            }
            PartClass::Knob => {
                if let Some(color) = color_of(KNOB_PALETTE, KNOB_DEFAULT) {
                    material.base_color = color;
                }
                material.metallic = KNOB_FINISH.metallic;
                material.perceptual_roughness = KNOB_FINISH.roughness;
                chosen
                    .knobs
                    .insert(part.name.clone(), KNOB_DEFAULT.to_string());
                PartRole::Knob
            }
            PartClass::KnobCap => {
                material.base_color = Color::WHITE;
                PartRole::Decorative
            }
            PartClass::Plain => {
                if !part.name.to_lowercase().contains(RING_MARKER) {
                    continue;
                }
                PartRole::Decorative
            }
        };

        let handle = materials.add(material);
        styled.push((part.name.clone(), handle.clone()));
        if matches!(role, PartRole::Chassis | PartRole::Button | PartRole::Knob) {
            registry.insert(PartRecord {
                name: part.name.clone(),
                role,
                entity: part.entity,
                material: handle.clone(),
            });
        }
        assignments.push(MaterialAssignment {
            entity: part.entity,
            material: handle,
        });
    }

    // Normalization pass: buttons and ring trim share one dark baseline,
    // overriding the per-role defaults set above. Runs after the whole
    // traversal so it wins regardless of part order.
    let dark = Color::srgb(
        DARK_BASELINE_RGB[0],
        DARK_BASELINE_RGB[1],
        DARK_BASELINE_RGB[2],
    );
    for (name, handle) in &styled {
        let is_button = registry.role_of(name) == Some(PartRole::Button);
        let is_ring = name.to_lowercase().contains(RING_MARKER);
        if !is_button && !is_ring {
            continue;
        }
        if let Some(material) = materials.get_mut(handle) {
            material.base_color = dark;
        }
    }

    info!(
        "classified {} parts ({} buttons, {} knobs)",
        registry.len(),
        chosen.buttons.len(),
        chosen.knobs.len()
    );

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(
        materials: &mut Assets<StandardMaterial>,
        name: &str,
        base: Color,
    ) -> NamedPart {
        NamedPart {
            entity: Entity::PLACEHOLDER,
            name: name.to_string(),
            material: materials.add(StandardMaterial {
                base_color: base,
                ..default()
            }),
        }
    }

    fn classify(names_and_colors: &[(&str, Color)]) -> (PartRegistry, ChosenColors, Assets<StandardMaterial>, Vec<MaterialAssignment>) {
        let mut materials = Assets::<StandardMaterial>::default();
        let parts = names_and_colors
            .iter()
            .map(|(name, base)| part(&mut materials, name, *base))
            .collect();
        let mut registry = PartRegistry::default();
        let mut chosen = ChosenColors::default();
        let assignments = classify_parts(parts, &mut materials, &mut registry, &mut chosen);
        (registry, chosen, materials, assignments)
    }

    fn dark() -> Color {
        Color::srgb(0.1, 0.1, 0.1)
    }

    fn light() -> Color {
        Color::srgb(0.9, 0.9, 0.9)
    }

    #[test]
    fn marker_priority_first_match_wins() {
        assert_eq!(classify_identifier("Logo_Boton", 0.1), PartClass::Logo);
        assert_eq!(classify_identifier("CubeChasis_01", 0.5), PartClass::Chassis);
        assert_eq!(classify_identifier("BOTON_A", 0.9), PartClass::Button);
        assert_eq!(classify_identifier("Knob_1", 0.2), PartClass::Knob);
        assert_eq!(classify_identifier("Knob_2", 0.8), PartClass::KnobCap);
        assert_eq!(classify_identifier("Plate_7", 0.2), PartClass::Plain);
    }

    #[test]
    fn example_controller_classification() {
        let (registry, chosen, _, _) = classify(&[
            ("CubeChasis_01", Color::srgb(0.5, 0.5, 0.5)),
            ("Boton_A", dark()),
            ("Boton_B", dark()),
            ("Knob_1", dark()),
            ("Knob_2", light()),
        ]);

        assert_eq!(registry.role_members(PartRole::Chassis).len(), 1);
        assert_eq!(registry.role_members(PartRole::Button).len(), 2);
        assert_eq!(registry.role_members(PartRole::Knob), ["Knob_1"]);

        assert_eq!(chosen.chassis, "neutral gray");
        assert_eq!(chosen.buttons.get("Boton_A").unwrap(), "black");
        assert_eq!(chosen.buttons.get("Boton_B").unwrap(), "black");
        assert_eq!(chosen.knobs.get("Knob_1").unwrap(), "pink");
        assert!(!chosen.knobs.contains_key("Knob_2"));
    }

    #[test]
    fn buttons_and_rings_end_on_the_dark_baseline() {
        let (registry, chosen, materials, assignments) = classify(&[
            ("Boton_A", Color::srgb(0.3, 0.3, 0.3)),
            ("Ring_Trim_1", Color::srgb(0.6, 0.6, 0.6)),
        ]);

        let dark = Color::srgb(
            DARK_BASELINE_RGB[0],
            DARK_BASELINE_RGB[1],
            DARK_BASELINE_RGB[2],
        );
        let button = registry.get("Boton_A").unwrap();
        assert_eq!(materials.get(&button.material).unwrap().base_color, dark);
        // The record keeps the pass-one name even though the value went dark.
        assert_eq!(chosen.buttons.get("Boton_A").unwrap(), "black");

        // Rings stay decorative (no registry entry) but share the baseline.
        assert!(registry.get("Ring_Trim_1").is_none());
        assert_eq!(
            materials.get(&assignments[1].material).unwrap().base_color,
            dark
        );
    }

    #[test]
    fn light_knob_becomes_a_white_cap_outside_the_registry() {
        let (registry, chosen, materials, assignments) = classify(&[("Knob_2", light())]);

        assert!(registry.is_empty());
        assert!(chosen.knobs.is_empty());
        assert_eq!(assignments.len(), 1);
        assert_eq!(
            materials.get(&assignments[0].material).unwrap().base_color,
            Color::WHITE
        );
    }

    #[test]
    fn unmarked_parts_are_left_alone() {
        let (registry, chosen, _, assignments) = classify(&[("Plate_7", dark())]);

        assert!(registry.is_empty());
        assert!(chosen.buttons.is_empty());
        assert!(assignments.is_empty());
    }
}
