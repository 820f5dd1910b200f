//! Interactive customization tools for the controller configurator.
//!
//! Selection and recoloring are driven by two input surfaces: pointer clicks
//! over the render canvas (selection) and discrete picks arriving from the
//! host page (palette colors, view modes, finalize). Tool state lives in
//! resources keyed by part identifiers; renderable objects are only reached
//! through the part registry.

/// One-shot glTF clip playback for parts joining a multi-selection.
pub mod animation;

/// Palette application onto the current selection.
pub mod color;

/// Ray intersection helper for part picking.
pub mod ray;

/// Pointer-driven single/multi selection state machine.
pub mod selection;
