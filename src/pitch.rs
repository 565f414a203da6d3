//! Pitch ↔ diatonic staff-step conversion.
//!
//! A staff step is one line-or-space on the staff: every letter name is
//! one step, accidentals do not move the notehead. Steps are counted from
//! C-1 (MIDI 0), so `staff_step = octave × 7 + letter_index`.

use serde::{Deserialize, Serialize};

use crate::model::Clef;

const NATURAL_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
const DIATONIC_FROM_PITCH_CLASS: [i32; 12] = [0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 5, 6];

/// Highest MIDI pitch.
pub const MAX_MIDI: i32 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Sharp,
    Flat,
}

impl Accidental {
    pub fn semitones(self) -> i32 {
        match self {
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }
}

/// Where a MIDI pitch sits on the staff. Black keys are spelled as sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchInfo {
    pub midi: u8,
    pub staff_step: i32,
    pub accidental: Option<Accidental>,
}

pub fn midi_to_pitch_info(midi: u8) -> PitchInfo {
    let midi_i = i32::from(midi);
    let pitch_class = midi_i.rem_euclid(12);
    let diatonic = DIATONIC_FROM_PITCH_CLASS[pitch_class as usize];
    let natural = NATURAL_SEMITONES[diatonic as usize];
    let accidental = if pitch_class > natural {
        Some(Accidental::Sharp)
    } else {
        None
    };
    let octave = midi_i.div_euclid(12) - 1;

    PitchInfo {
        midi,
        staff_step: octave * 7 + diatonic,
        accidental,
    }
}

/// Natural (white-key) MIDI pitch at an absolute staff step.
/// May fall outside 0..=127 for steps off the MIDI range.
pub fn staff_step_to_midi(staff_step: i32) -> i32 {
    let octave = staff_step.div_euclid(7);
    let diatonic = staff_step.rem_euclid(7);
    (octave + 1) * 12 + NATURAL_SEMITONES[diatonic as usize]
}

/// Staff steps measured from a clef's bottom line (bottom line = 0,
/// first space = 1, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffPositioning {
    reference_step: i32,
}

impl StaffPositioning {
    pub fn for_clef(clef: Clef) -> Self {
        Self::from_bottom_line(clef.bottom_line_midi())
    }

    pub fn from_bottom_line(bottom_line_midi: u8) -> Self {
        Self {
            reference_step: midi_to_pitch_info(bottom_line_midi).staff_step,
        }
    }

    pub fn pitch_to_staff_step(&self, midi: u8) -> i32 {
        midi_to_pitch_info(midi).staff_step - self.reference_step
    }

    /// Natural pitch at a relative staff step.
    pub fn staff_step_to_pitch(&self, step: i32) -> i32 {
        staff_step_to_midi(step + self.reference_step)
    }
}
