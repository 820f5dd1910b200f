/// Controller glTF loading, scene spawning and animation-graph binding.
pub mod controller_asset;

/// Identifier-keyed part records and the chosen-color configuration.
pub mod part_registry;
