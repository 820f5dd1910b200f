use bevy::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Fixed category assigned to a part at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartRole {
    Chassis,
    Button,
    Knob,
    Decorative,
}

/// Registry-owned handle to one renderable part of the controller.
///
/// The material handle is the part's own clone, so recoloring it never
/// bleeds into siblings that shared a glTF material.
#[derive(Debug, Clone)]
pub struct PartRecord {
    pub name: String,
    pub role: PartRole,
    pub entity: Entity,
    pub material: Handle<StandardMaterial>,
}

/// Identifier-keyed registry of classified parts.
///
/// The registry is the sole owner of part handles; selection and color state
/// hold identifiers only, so their logic runs without any rendering context.
/// Per-role identifier lists preserve insertion (traversal) order.
#[derive(Resource, Default)]
pub struct PartRegistry {
    parts: HashMap<String, PartRecord>,
    by_role: HashMap<PartRole, Vec<String>>,
}

impl PartRegistry {
    pub fn insert(&mut self, record: PartRecord) {
        self.by_role
            .entry(record.role)
            .or_default()
            .push(record.name.clone());
        self.parts.insert(record.name.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<&PartRecord> {
        self.parts.get(id)
    }

    pub fn role_of(&self, id: &str) -> Option<PartRole> {
        self.parts.get(id).map(|record| record.role)
    }

    pub fn role_members(&self, role: PartRole) -> &[String] {
        self.by_role.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First chassis part in traversal order. Asset authoring guarantees
    /// exactly one; zero or several is not checked here.
    pub fn chassis_part(&self) -> Option<&str> {
        self.role_members(PartRole::Chassis)
            .first()
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }
}

/// The externally-synced record of applied colors, by color name.
///
/// `BTreeMap` keeps the emitted JSON deterministically ordered.
#[derive(Resource, Debug, Default, Clone, Serialize, PartialEq)]
pub struct ChosenColors {
    pub chassis: String,
    pub buttons: BTreeMap<String, String>,
    pub knobs: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, role: PartRole) -> PartRecord {
        PartRecord {
            name: name.to_string(),
            role,
            entity: Entity::PLACEHOLDER,
            material: Handle::default(),
        }
    }

    #[test]
    fn role_members_keep_insertion_order() {
        let mut registry = PartRegistry::default();
        registry.insert(record("Boton_B", PartRole::Button));
        registry.insert(record("Boton_A", PartRole::Button));
        registry.insert(record("Knob_1", PartRole::Knob));

        assert_eq!(registry.role_members(PartRole::Button), ["Boton_B", "Boton_A"]);
        assert_eq!(registry.role_members(PartRole::Knob), ["Knob_1"]);
        assert!(registry.role_members(PartRole::Chassis).is_empty());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn parts_carry_one_role() {
        let mut registry = PartRegistry::default();
        registry.insert(record("CubeChasis_01", PartRole::Chassis));

        assert_eq!(registry.role_of("CubeChasis_01"), Some(PartRole::Chassis));
        assert_eq!(registry.chassis_part(), Some("CubeChasis_01"));
        assert_eq!(registry.role_of("Boton_A"), None);
    }
}
