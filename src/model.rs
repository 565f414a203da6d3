//! Data model for rhythm events, time signatures and instruments.
//!
//! These structures are the plain-data records exchanged with the
//! surrounding editor: the score model hands us events and instrument
//! definitions, and we hand back layout records and tab positions.

use std::fmt;
use std::str::FromStr;

use num_rational::Ratio;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A duration as a multiple of a whole note. Always in lowest terms.
pub type Fraction = Ratio<u32>;

/// Default resolution of the editor (ticks per whole note).
pub const DEFAULT_TICKS_PER_WHOLE: u32 = 1024;

// ═══════════════════════════════════════════════════════════════════════
// Durations
// ═══════════════════════════════════════════════════════════════════════

/// Undotted, non-tupleted note value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseDuration {
    #[serde(rename = "1/1")]
    Whole,
    #[serde(rename = "1/2")]
    Half,
    #[serde(rename = "1/4")]
    Quarter,
    #[serde(rename = "1/8")]
    Eighth,
    #[serde(rename = "1/16")]
    Sixteenth,
    #[serde(rename = "1/32")]
    ThirtySecond,
}

impl BaseDuration {
    pub const ALL: [BaseDuration; 6] = [
        BaseDuration::Whole,
        BaseDuration::Half,
        BaseDuration::Quarter,
        BaseDuration::Eighth,
        BaseDuration::Sixteenth,
        BaseDuration::ThirtySecond,
    ];

    /// Denominator of the note value as a fraction of a whole note.
    pub fn denominator(self) -> u32 {
        match self {
            BaseDuration::Whole => 1,
            BaseDuration::Half => 2,
            BaseDuration::Quarter => 4,
            BaseDuration::Eighth => 8,
            BaseDuration::Sixteenth => 16,
            BaseDuration::ThirtySecond => 32,
        }
    }

    /// Token used by the editor UI and the JSON boundary (`"1/8"`).
    pub fn token(self) -> &'static str {
        match self {
            BaseDuration::Whole => "1/1",
            BaseDuration::Half => "1/2",
            BaseDuration::Quarter => "1/4",
            BaseDuration::Eighth => "1/8",
            BaseDuration::Sixteenth => "1/16",
            BaseDuration::ThirtySecond => "1/32",
        }
    }
}

impl fmt::Display for BaseDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for BaseDuration {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        BaseDuration::ALL
            .iter()
            .copied()
            .find(|d| d.token() == token)
            .ok_or_else(|| EngineError::UnknownDuration(s.to_string()))
    }
}

/// `n` notes in the time of `in_time_of` notes of the same value.
///
/// Both terms lie in `1..=MAX_TUPLET_TERM`; this is checked on
/// construction and when deserializing, so the duration arithmetic never
/// divides by zero and every tupleted duration stays a small fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TupletSpec", into = "TupletSpec")]
pub struct Tuplet {
    n: u32,
    in_time_of: u32,
}

/// Largest `n` or `in_time_of` a tuplet may use.
pub const MAX_TUPLET_TERM: u32 = 64;

impl Tuplet {
    pub const TRIPLET: Tuplet = Tuplet { n: 3, in_time_of: 2 };
    pub const QUINTUPLET: Tuplet = Tuplet { n: 5, in_time_of: 4 };
    pub const SEXTUPLET: Tuplet = Tuplet { n: 6, in_time_of: 4 };
    pub const SEPTUPLET: Tuplet = Tuplet { n: 7, in_time_of: 4 };

    pub fn new(n: u32, in_time_of: u32) -> Result<Self> {
        let valid = 1..=MAX_TUPLET_TERM;
        if !valid.contains(&n) || !valid.contains(&in_time_of) {
            return Err(EngineError::InvalidTuplet { n, in_time_of });
        }
        Ok(Self { n, in_time_of })
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn in_time_of(&self) -> u32 {
        self.in_time_of
    }

    /// Duration multiplier `in_time_of / n`.
    pub fn factor(&self) -> Fraction {
        Fraction::new(self.in_time_of, self.n)
    }

    /// Display label, e.g. `"3:2"`.
    pub fn label(&self) -> String {
        format!("{}:{}", self.n, self.in_time_of)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TupletSpec {
    n: u32,
    in_time_of: u32,
}

impl TryFrom<TupletSpec> for Tuplet {
    type Error = EngineError;

    fn try_from(spec: TupletSpec) -> Result<Self> {
        Tuplet::new(spec.n, spec.in_time_of)
    }
}

impl From<Tuplet> for TupletSpec {
    fn from(t: Tuplet) -> Self {
        Self {
            n: t.n,
            in_time_of: t.in_time_of,
        }
    }
}

/// Symbolic duration of one event: base value, dot and optional tuplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rhythm {
    #[serde(rename = "baseDuration")]
    pub base: BaseDuration,
    #[serde(default)]
    pub dotted: bool,
    #[serde(default)]
    pub tuplet: Option<Tuplet>,
}

impl Rhythm {
    pub fn new(base: BaseDuration) -> Self {
        Self {
            base,
            dotted: false,
            tuplet: None,
        }
    }

    pub fn dotted(mut self) -> Self {
        self.dotted = true;
        self
    }

    pub fn with_tuplet(mut self, tuplet: Tuplet) -> Self {
        self.tuplet = Some(tuplet);
        self
    }

    pub fn tuplet_label(&self) -> Option<String> {
        self.tuplet.map(|t| t.label())
    }
}

impl From<BaseDuration> for Rhythm {
    fn from(base: BaseDuration) -> Self {
        Rhythm::new(base)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Resolution and meter
// ═══════════════════════════════════════════════════════════════════════

/// Ticks per whole note. Fixed per score; always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct TicksPerWhole(u32);

impl TicksPerWhole {
    pub fn new(ticks: i64) -> Result<Self> {
        if ticks <= 0 || ticks > u32::MAX as i64 {
            return Err(EngineError::InvalidResolution(ticks));
        }
        Ok(Self(ticks as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for TicksPerWhole {
    fn default() -> Self {
        Self(DEFAULT_TICKS_PER_WHOLE)
    }
}

impl TryFrom<i64> for TicksPerWhole {
    type Error = EngineError;

    fn try_from(ticks: i64) -> Result<Self> {
        TicksPerWhole::new(ticks)
    }
}

impl From<TicksPerWhole> for u32 {
    fn from(t: TicksPerWhole) -> Self {
        t.0
    }
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: u32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_unit: u32,
}

impl TimeSignature {
    pub fn new(beats: u32, beat_unit: u32) -> Self {
        Self { beats, beat_unit }
    }

    pub fn validate(&self) -> Result<()> {
        if self.beats == 0 || self.beat_unit == 0 {
            return Err(EngineError::InvalidTimeSignature {
                beats: self.beats,
                beat_unit: self.beat_unit,
            });
        }
        Ok(())
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// Clef of a staff. Only the two clefs the editor offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
}

impl Clef {
    /// MIDI pitch sitting on the bottom staff line.
    pub fn bottom_line_midi(self) -> u8 {
        match self {
            Clef::Treble => 64, // E4
            Clef::Bass => 43,   // G2
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

/// A note as placed in the rhythm sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub id: String,
    /// MIDI pitch
    pub pitch: u8,
    #[serde(flatten)]
    pub rhythm: Rhythm,
    /// Tab string index, when the note already has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fret: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestEvent {
    pub id: String,
    #[serde(flatten)]
    pub rhythm: Rhythm,
}

/// One entry of the rhythm sequence. Order in the sequence is temporal
/// order; ticks are derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RhythmEvent {
    Note(NoteEvent),
    Rest(RestEvent),
}

impl RhythmEvent {
    pub fn note(id: impl Into<String>, pitch: u8, rhythm: impl Into<Rhythm>) -> Self {
        RhythmEvent::Note(NoteEvent {
            id: id.into(),
            pitch,
            rhythm: rhythm.into(),
            string: None,
            fret: None,
        })
    }

    /// A note that already carries its string/fret assignment.
    pub fn tab_note(
        id: impl Into<String>,
        pitch: u8,
        rhythm: impl Into<Rhythm>,
        string: usize,
        fret: u8,
    ) -> Self {
        RhythmEvent::Note(NoteEvent {
            id: id.into(),
            pitch,
            rhythm: rhythm.into(),
            string: Some(string),
            fret: Some(fret),
        })
    }

    pub fn rest(id: impl Into<String>, rhythm: impl Into<Rhythm>) -> Self {
        RhythmEvent::Rest(RestEvent {
            id: id.into(),
            rhythm: rhythm.into(),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            RhythmEvent::Note(n) => &n.id,
            RhythmEvent::Rest(r) => &r.id,
        }
    }

    pub fn rhythm(&self) -> &Rhythm {
        match self {
            RhythmEvent::Note(n) => &n.rhythm,
            RhythmEvent::Rest(r) => &r.rhythm,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, RhythmEvent::Rest(_))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Instruments
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentCategory {
    Generic,
    Guitar,
    Bass,
    Ukulele,
}

/// An instrument and its open-string tuning.
///
/// `strings[0]` is the highest-sounding string (the top tab line,
/// "string 1" in guitar terms); indices increase toward the lowest
/// string. `None` means the instrument has no fretboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDefinition {
    pub id: String,
    pub name: String,
    pub category: InstrumentCategory,
    pub clef: Clef,
    pub strings: Option<Vec<u8>>,
}

impl InstrumentDefinition {
    /// Open-string pitches, empty when there is no fretboard.
    pub fn open_strings(&self) -> &[u8] {
        self.strings.as_deref().unwrap_or(&[])
    }

    pub fn string_count(&self) -> usize {
        self.open_strings().len()
    }

    pub fn has_fretboard(&self) -> bool {
        self.string_count() > 0
    }
}
