//! Layout engine. Converts an ordered rhythm sequence into renderable
//! layout records.
//!
//! The engine computes its own tick positions from the symbolic durations
//! (running sum in input order), places every event on the staff and the
//! tab, and derives beams and tuplet brackets. The result is recomputed in
//! full on every call; nothing is patched incrementally.

pub mod constants;
pub mod grid;
pub mod staff;
mod beams;
mod tuplets;

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::duration::{measure_ticks, ticks_per_beat, Onset};
use crate::error::{EngineError, Result};
use crate::model::{Clef, RhythmEvent, TicksPerWhole, TimeSignature};
use crate::tab::TabNote;
use constants::*;
use staff::StaffGeometry;

// ═══════════════════════════════════════════════════════════════════════
// Layout structures
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
    Down,
}

/// Meter, resolution and drawing geometry for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub time_signature: TimeSignature,
    pub ticks_per_whole: TicksPerWhole,
    pub clef: Clef,
    /// X of tick 0
    pub x_start: f64,
    /// Width of one nominal measure; x grows linearly with ticks
    pub measure_width: f64,
    pub staff_top: f64,
    pub staff_line_spacing: f64,
    pub tab_top: f64,
    pub tab_line_spacing: f64,
    pub stem_length: f64,
    /// Tab lines drawn; string indices are clamped to this
    pub string_count: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            time_signature: TimeSignature::default(),
            ticks_per_whole: TicksPerWhole::default(),
            clef: Clef::Treble,
            x_start: DEFAULT_MARGIN_LEFT,
            measure_width: DEFAULT_MEASURE_WIDTH,
            staff_top: DEFAULT_STAFF_TOP,
            staff_line_spacing: DEFAULT_STAFF_LINE_SPACING,
            tab_top: DEFAULT_TAB_TOP,
            tab_line_spacing: DEFAULT_TAB_LINE_SPACING,
            stem_length: DEFAULT_STEM_LENGTH,
            string_count: DEFAULT_STRING_COUNT,
        }
    }
}

/// Derived, read-only projection of one rhythm event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEvent {
    pub id: String,
    pub is_rest: bool,
    pub start_tick: u32,
    pub duration_ticks: u32,
    /// Beat the event starts in, from its exact onset; counts across barlines
    pub beat_index: u64,
    pub x: f64,
    pub staff_y: f64,
    pub tab_y: f64,
    pub stem_direction: StemDirection,
    pub stem_length: f64,
    /// 0–3, from the base duration
    pub flags: u8,
    /// Member of a beam group of two or more; flags are drawn as beams
    pub beamed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuplet_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fret: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamSegment {
    pub level: u8,
    pub x_start: f64,
    pub x_end: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamGroup {
    pub id: String,
    pub event_ids: Vec<String>,
    pub segments: Vec<BeamSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TupletBracket {
    pub id: String,
    pub start_x: f64,
    pub end_x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub events: Vec<LayoutEvent>,
    pub beam_groups: Vec<BeamGroup>,
    pub tuplet_brackets: Vec<TupletBracket>,
    pub measure_ticks: u32,
    pub ticks_per_beat: u32,
    pub total_ticks: u32,
}

impl LayoutResult {
    /// Notes of this layout with their start ticks, for tab mapping.
    pub fn tab_notes(&self) -> Vec<TabNote> {
        self.events
            .iter()
            .filter_map(|e| {
                e.pitch.map(|pitch| TabNote {
                    id: e.id.clone(),
                    pitch,
                    start_tick: e.start_tick,
                })
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Compute the full layout of a rhythm sequence.
///
/// Fails on invalid configuration (time signature, beat finer than a tick)
/// and on sequences whose ticks do not fit in a `u32`. Sequences that
/// overflow the nominal measure are laid out as is.
pub fn compute_layout(events: &[RhythmEvent], options: &LayoutOptions) -> Result<LayoutResult> {
    let measure_ticks = measure_ticks(options.time_signature, options.ticks_per_whole)?;
    let ticks_per_beat = ticks_per_beat(options.time_signature, options.ticks_per_whole)?;
    let staff = StaffGeometry::from_options(options);

    let mut cumulative_ticks: u32 = 0;
    let mut onset = Onset::zero();
    let mut layout_events: Vec<LayoutEvent> = Vec::with_capacity(events.len());

    for (index, event) in events.iter().enumerate() {
        let rhythm = event.rhythm();
        let duration_ticks = rhythm.ticks(options.ticks_per_whole)?;
        let start_tick = cumulative_ticks;
        cumulative_ticks = cumulative_ticks
            .checked_add(duration_ticks)
            .ok_or(EngineError::PositionOverflow(index))?;

        let beat_index = onset
            .beat_index(options.time_signature)
            .ok_or(EngineError::PositionOverflow(index))?;
        onset = onset
            .advance(rhythm.effective())
            .ok_or(EngineError::PositionOverflow(index))?;

        let x = options.x_start
            + f64::from(start_tick) / f64::from(measure_ticks) * options.measure_width;

        let (staff_y, tab_y, pitch, string, fret) = match event {
            RhythmEvent::Note(note) => {
                let tab_y = note.string.map_or_else(|| staff.tab_middle_y(), |s| staff.tab_y(s));
                (staff.pitch_to_y(note.pitch), tab_y, Some(note.pitch), note.string, note.fret)
            }
            RhythmEvent::Rest(_) => (staff.rest_y(), staff.tab_middle_y(), None, None, None),
        };

        layout_events.push(LayoutEvent {
            id: event.id().to_string(),
            is_rest: event.is_rest(),
            start_tick,
            duration_ticks,
            beat_index,
            x,
            staff_y,
            tab_y,
            stem_direction: staff.stem_direction(staff_y),
            stem_length: options.stem_length,
            flags: rhythm.flags(),
            beamed: false,
            tuplet_label: rhythm.tuplet_label(),
            pitch,
            string,
            fret,
        });
    }

    let beam_groups = beams::compute_beam_groups(&layout_events);
    let beamed_ids: HashSet<&str> = beam_groups
        .iter()
        .flat_map(|g| g.event_ids.iter().map(String::as_str))
        .collect();
    for event in &mut layout_events {
        event.beamed = beamed_ids.contains(event.id.as_str());
    }

    let tuplet_brackets = tuplets::build_tuplet_brackets(&layout_events);

    debug!(
        "layout: {} events, {} ticks, {} beam groups, {} tuplet brackets",
        layout_events.len(),
        cumulative_ticks,
        beam_groups.len(),
        tuplet_brackets.len()
    );

    Ok(LayoutResult {
        events: layout_events,
        beam_groups,
        tuplet_brackets,
        measure_ticks,
        ticks_per_beat,
        total_ticks: cumulative_ticks,
    })
}

/// Serialize a LayoutResult to JSON.
pub fn layout_to_json(layout: &LayoutResult) -> String {
    serde_json::to_string(layout).unwrap_or_else(|_| "{}".to_string())
}
