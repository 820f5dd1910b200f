use bevy::prelude::*;

pub struct PaletteEntry {
    pub name: &'static str,
    pub rgb: [f32; 3],
}

/// Surface finish applied alongside a role's default color.
pub struct Finish {
    pub metallic: f32,
    pub roughness: f32,
}

/// Selectable chassis colors. The first entry is the classification default.
pub const CHASSIS_PALETTE: &[PaletteEntry] = &[
    PaletteEntry {
        name: "neutral gray",
        rgb: [0.43, 0.43, 0.46],
    },
    PaletteEntry {
        name: "Azul",
        rgb: [0.10, 0.22, 0.62],
    },
    PaletteEntry {
        name: "Rojo",
        rgb: [0.68, 0.08, 0.10],
    },
    PaletteEntry {
        name: "Verde",
        rgb: [0.09, 0.42, 0.18],
    },
    PaletteEntry {
        name: "Negro",
        rgb: [0.04, 0.04, 0.05],
    },
    PaletteEntry {
        name: "Blanco",
        rgb: [0.92, 0.92, 0.90],
    },
];

/// Selectable button colors. The first entry is the classification default.
pub const BUTTON_PALETTE: &[PaletteEntry] = &[
    PaletteEntry {
        name: "black",
        rgb: [0.08, 0.08, 0.09],
    },
    PaletteEntry {
        name: "Rojo",
        rgb: [0.78, 0.10, 0.12],
    },
    PaletteEntry {
        name: "Azul",
        rgb: [0.12, 0.30, 0.75],
    },
    PaletteEntry {
        name: "Verde",
        rgb: [0.12, 0.55, 0.22],
    },
    PaletteEntry {
        name: "Amarillo",
        rgb: [0.88, 0.75, 0.10],
    },
    PaletteEntry {
        name: "Blanco",
        rgb: [0.90, 0.90, 0.88],
    },
];

/// Selectable knob colors. The first entry is the classification default.
pub const KNOB_PALETTE: &[PaletteEntry] = &[
    PaletteEntry {
        name: "pink",
        rgb: [0.90, 0.35, 0.55],
    },
    PaletteEntry {
        name: "Rojo",
        rgb: [0.78, 0.10, 0.12],
    },
    PaletteEntry {
        name: "Azul",
        rgb: [0.12, 0.30, 0.75],
    },
    PaletteEntry {
        name: "Naranja",
        rgb: [0.88, 0.42, 0.08],
    },
    PaletteEntry {
        name: "Negro",
        rgb: [0.05, 0.05, 0.06],
    },
    PaletteEntry {
        name: "Blanco",
        rgb: [0.90, 0.90, 0.88],
    },
];

pub const CHASSIS_DEFAULT: &str = "neutral gray";
pub const BUTTON_DEFAULT: &str = "black";
pub const KNOB_DEFAULT: &str = "pink";

/// Shared baseline forced onto buttons and ring trim after classification.
pub const DARK_BASELINE_RGB: [f32; 3] = [0.02, 0.02, 0.025];

pub const CHASSIS_FINISH: Finish = Finish {
    metallic: 0.85,
    roughness: 0.25,
};

pub const BUTTON_FINISH: Finish = Finish {
    metallic: 0.50,
    roughness: 0.45,
};

pub const KNOB_FINISH: Finish = Finish {
    metallic: 0.0,
    roughness: 0.90,
};

pub fn color_of(palette: &[PaletteEntry], name: &str) -> Option<Color> {
    palette
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| Color::srgb(entry.rgb[0], entry.rgb[1], entry.rgb[2]))
}
