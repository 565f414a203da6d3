//! Fretboard mapping: places pitches on strings and frets.
//!
//! Staff notation is the source of truth; tab positions are derived from
//! pitches and the instrument's tuning. The caller owns a [`TabContext`]
//! that remembers where the hand was, so consecutive notes and chords
//! stay close together on the neck.

pub mod instruments;
mod mapper;

use serde::{Deserialize, Serialize};

pub use instruments::{instrument_by_id, instruments};
pub use mapper::{map_chord_to_tab, map_events_to_tab_positions, map_note_to_tab};

/// String and fret for one note. String 0 is the highest-sounding string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabPosition {
    pub string_index: usize,
    pub fret: u8,
}

/// Where the fretting hand sits. Fractional after a chord, which moves
/// the hand to the centroid of its positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandPosition {
    pub string_index: f64,
    pub fret: f64,
}

impl HandPosition {
    pub fn at(position: TabPosition) -> Self {
        Self {
            string_index: position.string_index as f64,
            fret: f64::from(position.fret),
        }
    }

    /// Average string and fret, `None` for no positions.
    pub fn centroid(positions: impl IntoIterator<Item = TabPosition>) -> Option<Self> {
        let (count, strings, frets) = positions
            .into_iter()
            .fold((0usize, 0.0, 0.0), |(n, s, f), p| {
                (n + 1, s + p.string_index as f64, f + f64::from(p.fret))
            });
        if count == 0 {
            return None;
        }
        Some(Self {
            string_index: strings / count as f64,
            fret: frets / count as f64,
        })
    }
}

/// Positional memory carried through one passage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabContext {
    pub main_position: Option<HandPosition>,
}

impl TabContext {
    /// Forget the hand position before an unrelated passage.
    pub fn reset(&mut self) {
        self.main_position = None;
    }
}

/// A note to place: its id, pitch and onset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabNote {
    pub id: String,
    pub pitch: u8,
    #[serde(default)]
    pub start_tick: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_averages_positions() {
        let positions = [
            TabPosition { string_index: 0, fret: 3 },
            TabPosition { string_index: 1, fret: 5 },
            TabPosition { string_index: 2, fret: 4 },
        ];
        let hand = HandPosition::centroid(positions).unwrap();
        assert_eq!(hand, HandPosition { string_index: 1.0, fret: 4.0 });
        assert!(HandPosition::centroid(Vec::new()).is_none());
    }

    #[test]
    fn tab_notes_deserialize_camel_case() {
        let note: TabNote = serde_json::from_str(r#"{"id": "n1", "pitch": 60, "startTick": 480}"#).unwrap();
        assert_eq!(note.start_tick, 480);
        let position = serde_json::to_string(&TabPosition { string_index: 2, fret: 5 }).unwrap();
        assert_eq!(position, r#"{"stringIndex":2,"fret":5}"#);
    }
}
