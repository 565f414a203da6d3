//! Vertical placement: staff Y from pitch, tab Y from string, stems.

use crate::model::Clef;
use crate::pitch::{midi_to_pitch_info, Accidental, StaffPositioning, MAX_MIDI};

use super::constants::STAFF_LINE_COUNT;
use super::{LayoutOptions, StemDirection};

/// Staff and tab geometry for one clef, in drawing units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaffGeometry {
    staff_top: f64,
    line_spacing: f64,
    tab_top: f64,
    tab_line_spacing: f64,
    string_count: usize,
    positioning: StaffPositioning,
}

impl StaffGeometry {
    pub fn new(
        clef: Clef,
        staff_top: f64,
        line_spacing: f64,
        tab_top: f64,
        tab_line_spacing: f64,
        string_count: usize,
    ) -> Self {
        Self {
            staff_top,
            line_spacing,
            tab_top,
            tab_line_spacing,
            string_count,
            positioning: StaffPositioning::for_clef(clef),
        }
    }

    pub fn from_options(options: &LayoutOptions) -> Self {
        Self::new(
            options.clef,
            options.staff_top,
            options.staff_line_spacing,
            options.tab_top,
            options.tab_line_spacing,
            options.string_count,
        )
    }

    pub fn bottom_line_y(&self) -> f64 {
        self.staff_top + self.line_spacing * (STAFF_LINE_COUNT - 1) as f64
    }

    pub fn middle_line_y(&self) -> f64 {
        self.staff_top + self.line_spacing * 2.0
    }

    fn step_height(&self) -> f64 {
        self.line_spacing / 2.0
    }

    /// Y of a notehead. Each diatonic step is half a line spacing.
    pub fn pitch_to_y(&self, midi: u8) -> f64 {
        let step = self.positioning.pitch_to_staff_step(midi);
        self.bottom_line_y() - step as f64 * self.step_height()
    }

    /// Natural pitch on the line or space nearest to `y`.
    pub fn y_to_pitch(&self, y: f64) -> u8 {
        self.y_to_pitch_with(y, None)
    }

    /// Pitch at `y` with an accidental applied.
    pub fn y_to_pitch_with(&self, y: f64, accidental: Option<Accidental>) -> u8 {
        let step = ((self.bottom_line_y() - y) / self.step_height()).round() as i32;
        let natural = self.positioning.staff_step_to_pitch(step);
        let midi = natural + accidental.map_or(0, Accidental::semitones);
        midi.clamp(0, MAX_MIDI) as u8
    }

    pub fn rest_y(&self) -> f64 {
        self.middle_line_y()
    }

    /// Low notes (on or below the middle line) stem up, high notes down.
    pub fn stem_direction(&self, staff_y: f64) -> StemDirection {
        if staff_y < self.middle_line_y() {
            StemDirection::Down
        } else {
            StemDirection::Up
        }
    }

    /// Y of a tab line. Out-of-range strings are clamped to the last line.
    pub fn tab_y(&self, string_index: usize) -> f64 {
        let clamped = string_index.min(self.string_count.saturating_sub(1));
        self.tab_top + clamped as f64 * self.tab_line_spacing
    }

    /// Middle of the tab staff, used for rests and unassigned notes.
    pub fn tab_middle_y(&self) -> f64 {
        self.tab_top + self.string_count.saturating_sub(1) as f64 / 2.0 * self.tab_line_spacing
    }
}

/// Accidental needed to turn the notehead's natural back into `midi`.
pub fn accidental_for(midi: u8) -> Option<Accidental> {
    midi_to_pitch_info(midi).accidental
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(clef: Clef) -> StaffGeometry {
        StaffGeometry::from_options(&LayoutOptions {
            clef,
            ..LayoutOptions::default()
        })
    }

    #[test]
    fn bottom_line_pitches() {
        let treble = geometry(Clef::Treble);
        assert_eq!(treble.pitch_to_y(64), treble.bottom_line_y());
        assert_eq!(treble.pitch_to_y(71), treble.middle_line_y()); // B4
        let bass = geometry(Clef::Bass);
        assert_eq!(bass.pitch_to_y(43), bass.bottom_line_y());
        assert_eq!(bass.pitch_to_y(50), bass.middle_line_y()); // D3
    }

    #[test]
    fn higher_pitches_sit_higher() {
        let g = geometry(Clef::Treble);
        assert!(g.pitch_to_y(72) < g.pitch_to_y(64));
        // C5 is a third space: 5 steps above E4
        assert_eq!(g.pitch_to_y(72), g.bottom_line_y() - 5.0 * 6.0);
        // sharps share the natural's position
        assert_eq!(g.pitch_to_y(66), g.pitch_to_y(65));
    }

    #[test]
    fn natural_pitches_round_trip() {
        for clef in [Clef::Treble, Clef::Bass] {
            let g = geometry(clef);
            for midi in (0..=127u8).filter(|m| accidental_for(*m).is_none()) {
                assert_eq!(g.y_to_pitch(g.pitch_to_y(midi)), midi, "{clef:?} {midi}");
            }
        }
    }

    #[test]
    fn every_pitch_round_trips_with_its_accidental() {
        for clef in [Clef::Treble, Clef::Bass] {
            let g = geometry(clef);
            for midi in 0..=127u8 {
                let y = g.pitch_to_y(midi);
                assert_eq!(g.y_to_pitch_with(y, accidental_for(midi)), midi, "{clef:?} {midi}");
            }
        }
    }

    #[test]
    fn y_between_positions_snaps() {
        let g = geometry(Clef::Treble);
        let e4 = g.pitch_to_y(64);
        assert_eq!(g.y_to_pitch(e4 + 2.0), 64);
        assert_eq!(g.y_to_pitch(e4 - 4.0), 65);
    }

    #[test]
    fn stems_follow_the_middle_line() {
        let g = geometry(Clef::Treble);
        assert_eq!(g.stem_direction(g.pitch_to_y(64)), StemDirection::Up);
        assert_eq!(g.stem_direction(g.pitch_to_y(71)), StemDirection::Up);
        assert_eq!(g.stem_direction(g.pitch_to_y(72)), StemDirection::Down);
    }

    #[test]
    fn tab_lines_clamp_to_string_count() {
        let g = geometry(Clef::Treble);
        assert_eq!(g.tab_y(0), 130.0);
        assert_eq!(g.tab_y(5), 180.0);
        assert_eq!(g.tab_y(9), 180.0);
        assert_eq!(g.tab_middle_y(), 155.0);
    }
}
