/// Identifier substrings used to classify controller parts, matched
/// case-insensitively. Asset authoring follows the original model's naming,
/// hence the mixed-language markers.
pub const LOGO_MARKER: &str = "logo";
pub const CHASSIS_MARKER: &str = "chasis";
pub const BUTTON_MARKER: &str = "boton";
pub const KNOB_MARKER: &str = "knob";

/// Ring trim around knobs shares the dark baseline with buttons.
pub const RING_MARKER: &str = "ring";

/// Knob-marked parts at or above this baseline luminance are treated as
/// decorative caps and painted flat white instead of entering the registry.
pub const KNOB_DARK_LUMINANCE_MAX: f32 = 0.5;
