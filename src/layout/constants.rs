//! Shared constants for the layout engine (all in drawing units).

// ── Staff geometry defaults ─────────────────────────────────────────
pub const DEFAULT_STAFF_TOP: f64 = 50.0;
pub const DEFAULT_STAFF_LINE_SPACING: f64 = 12.0; // distance between staff lines
pub const DEFAULT_TAB_TOP: f64 = 130.0;
pub const DEFAULT_TAB_LINE_SPACING: f64 = 10.0;
pub const DEFAULT_STEM_LENGTH: f64 = 30.0;
pub const DEFAULT_STRING_COUNT: usize = 6;
pub const STAFF_LINE_COUNT: usize = 5;

// ── Horizontal defaults ─────────────────────────────────────────────
pub const DEFAULT_MARGIN_LEFT: f64 = 80.0;
pub const DEFAULT_MEASURE_WIDTH: f64 = 240.0;

// ── System grid defaults ────────────────────────────────────────────
pub const DEFAULT_MARGIN_TOP: f64 = 20.0;
pub const DEFAULT_MEASURES_PER_SYSTEM: usize = 3;
pub const DEFAULT_SYSTEM_PADDING_BOTTOM: f64 = 40.0;

// ── Beams ───────────────────────────────────────────────────────────
pub(super) const BEAM_LEVEL_SPACING: f64 = 6.0; // vertical gap between beam levels
pub(super) const BEAM_STUB_LENGTH: f64 = 10.0; // partial beam on a lone member

// ── Tuplet brackets ─────────────────────────────────────────────────
pub(super) const TUPLET_BRACKET_PADDING: f64 = 8.0;
pub(super) const TUPLET_BRACKET_RISE: f64 = 46.0; // above the highest note of the run
pub(super) const MIN_TUPLET_BRACKET_RUN: usize = 2;
