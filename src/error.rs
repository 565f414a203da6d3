//! Error types for the rhythm and fretboard engine.
//!
//! Only configuration mistakes are errors. An unplayable pitch or an
//! over-constrained chord is a normal outcome and is reported through
//! `Option` / missing map entries instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A duration token outside `1/1 .. 1/32`.
    #[error("Unknown base duration '{0}'")]
    UnknownDuration(String),

    /// Ticks per whole note must be a positive integer.
    #[error("Invalid ticks per whole note: {0} (must be > 0)")]
    InvalidResolution(i64),

    #[error("Invalid tuplet {n}:{in_time_of} (both terms must be in 1..=64)")]
    InvalidTuplet { n: u32, in_time_of: u32 },

    #[error("Invalid time signature {beats}/{beat_unit}")]
    InvalidTimeSignature { beats: u32, beat_unit: u32 },

    /// The beat unit is finer than the tick resolution can express.
    #[error("Beat unit 1/{beat_unit} is shorter than one tick at {ticks_per_whole} ticks per whole note")]
    BeatTooShort { ticks_per_whole: u32, beat_unit: u32 },

    /// A duration or position does not fit in a `u32` tick count.
    #[error("{0} ticks exceed the tick range")]
    TickOverflow(u64),

    /// The running position of the sequence overflows at this event index.
    #[error("Sequence position overflows at event {0}")]
    PositionOverflow(usize),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
