use bevy::animation::graph::AnimationNodeIndex;
use bevy::prelude::*;

/// One-shot clip trigger for a part joining a multi-selection.
#[derive(Event, Debug)]
pub struct PartAnimationRequest {
    pub part: String,
}

/// Named glTF clips resolved to animation-graph nodes at load time.
#[derive(Resource, Default)]
pub struct ClipLibrary {
    clips: Vec<(String, AnimationNodeIndex)>,
    /// Scene entity carrying the `AnimationPlayer`.
    pub player: Option<Entity>,
}

impl ClipLibrary {
    pub fn register(&mut self, name: String, node: AnimationNodeIndex) {
        self.clips.push((name, node));
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Case-insensitive lookup of the part's identifier within the clip
    /// names. No match is an expected outcome, not an error.
    pub fn find_clip(&self, part: &str) -> Option<AnimationNodeIndex> {
        let needle = part.to_lowercase();
        self.clips
            .iter()
            .find(|(name, _)| name.to_lowercase().contains(&needle))
            .map(|(_, node)| *node)
    }
}

/// Starts the matching clip for each requested part. Clips restart from the
/// beginning, play once, and run to completion independently of selection
/// and camera state; concurrent clips are fine.
pub fn play_part_animations(
    mut events: EventReader<PartAnimationRequest>,
    library: Res<ClipLibrary>,
    mut players: Query<&mut AnimationPlayer>,
) {
    for event in events.read() {
        let Some(node) = library.find_clip(&event.part) else {
            continue;
        };
        let Some(player_entity) = library.player else {
            continue;
        };
        if let Ok(mut player) = players.get_mut(player_entity) {
            player.start(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_a_case_insensitive_substring_match() {
        let mut library = ClipLibrary::default();
        library.register("Boton_AAction".to_string(), AnimationNodeIndex::new(1));
        library.register("KNOB_1_spin".to_string(), AnimationNodeIndex::new(2));

        assert_eq!(
            library.find_clip("boton_a"),
            Some(AnimationNodeIndex::new(1))
        );
        assert_eq!(
            library.find_clip("Knob_1"),
            Some(AnimationNodeIndex::new(2))
        );
    }

    #[test]
    fn missing_clip_is_a_silent_none() {
        let mut library = ClipLibrary::default();
        library.register("Boton_AAction".to_string(), AnimationNodeIndex::new(1));

        assert_eq!(library.find_clip("CubeChasis_01"), None);
    }
}
