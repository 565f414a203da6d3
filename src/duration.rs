//! Duration arithmetic: symbolic durations to exact fractions and ticks.
//!
//! All multiplication happens on reduced fractions; the only rounding is
//! the final conversion to ticks, so dotted tuplets never drift.

use num_rational::Ratio;

use crate::error::{EngineError, Result};
use crate::model::{BaseDuration, Fraction, Rhythm, TicksPerWhole, TimeSignature, Tuplet};

/// Multiplier applied by a single augmentation dot.
const DOT_FACTOR: (u32, u32) = (3, 2);

/// Tuplets offered by the editor's duration palette.
pub const TUPLET_PRESETS: [Tuplet; 4] = [
    Tuplet::TRIPLET,
    Tuplet::QUINTUPLET,
    Tuplet::SEXTUPLET,
    Tuplet::SEPTUPLET,
];

pub fn parse_duration(base: BaseDuration) -> Fraction {
    Fraction::new(1, base.denominator())
}

/// `base × 3/2 (if dotted) × in_time_of/n (if tupleted)`, in lowest terms.
pub fn effective_duration(base: BaseDuration, dotted: bool, tuplet: Option<Tuplet>) -> Fraction {
    let mut fraction = parse_duration(base);
    if dotted {
        fraction *= Fraction::new(DOT_FACTOR.0, DOT_FACTOR.1);
    }
    if let Some(t) = tuplet {
        fraction *= t.factor();
    }
    fraction
}

/// Exact tick count of a duration, rounded once (half away from zero).
///
/// Fails with [`EngineError::TickOverflow`] when the count does not fit
/// in a `u32`.
pub fn duration_to_ticks(
    base: BaseDuration,
    dotted: bool,
    tuplet: Option<Tuplet>,
    ticks_per_whole: TicksPerWhole,
) -> Result<u32> {
    let effective = effective_duration(base, dotted, tuplet);
    fraction_to_ticks(effective, ticks_per_whole)
}

fn fraction_to_ticks(fraction: Fraction, ticks_per_whole: TicksPerWhole) -> Result<u32> {
    let exact = Ratio::new(
        u64::from(*fraction.numer()) * u64::from(ticks_per_whole.get()),
        u64::from(*fraction.denom()),
    );
    let ticks = exact.round().to_integer();
    u32::try_from(ticks).map_err(|_| EngineError::TickOverflow(ticks))
}

/// Exact start of an event in whole notes since the start of the sequence.
///
/// Tick positions are a running sum of rounded durations and drift at
/// resolutions the tuplet does not divide (three triplet eighths at 1024
/// end on tick 255, not 256). Beat membership is taken from this exact
/// position instead. Arithmetic is checked; `None` means overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Onset(Ratio<u128>);

impl Onset {
    pub fn zero() -> Self {
        Self(Ratio::from_integer(0))
    }

    pub fn whole_notes(&self) -> Ratio<u128> {
        self.0
    }

    /// Position after a duration starting here.
    pub fn advance(self, duration: Fraction) -> Option<Onset> {
        let (a, b) = (*self.0.numer(), *self.0.denom());
        let (c, d) = (u128::from(*duration.numer()), u128::from(*duration.denom()));
        let numer = a.checked_mul(d)?.checked_add(c.checked_mul(b)?)?;
        let denom = b.checked_mul(d)?;
        Some(Onset(Ratio::new(numer, denom)))
    }

    /// Index of the beat this position falls in, counting from 0 across
    /// barlines.
    pub fn beat_index(&self, time_signature: TimeSignature) -> Option<u64> {
        let scaled = self.0.numer().checked_mul(u128::from(time_signature.beat_unit))?;
        u64::try_from(scaled / self.0.denom()).ok()
    }
}

impl Default for Onset {
    fn default() -> Self {
        Self::zero()
    }
}

/// Human-readable duration, e.g. `"1/8 · dotted · 3:2"`. Display only.
pub fn format_duration_label(base: BaseDuration, dotted: bool, tuplet: Option<Tuplet>) -> String {
    let mut parts = vec![base.token().to_string()];
    if dotted {
        parts.push("dotted".to_string());
    }
    if let Some(t) = tuplet {
        parts.push(t.label());
    }
    parts.join(" · ")
}

/// Number of flags drawn on an unbeamed stem. Depends on the base value
/// only; dots and tuplets do not change it.
pub fn flag_count(base: BaseDuration) -> u8 {
    match base {
        BaseDuration::Whole | BaseDuration::Half | BaseDuration::Quarter => 0,
        BaseDuration::Eighth => 1,
        BaseDuration::Sixteenth => 2,
        BaseDuration::ThirtySecond => 3,
    }
}

/// Nominal length of one measure in ticks.
pub fn measure_ticks(time_signature: TimeSignature, ticks_per_whole: TicksPerWhole) -> Result<u32> {
    time_signature.validate()?;
    let fraction = Fraction::new(time_signature.beats, time_signature.beat_unit);
    fraction_to_ticks(fraction, ticks_per_whole)
}

/// Length of one beat (one `beat_unit` note) in ticks. Never zero.
pub fn ticks_per_beat(time_signature: TimeSignature, ticks_per_whole: TicksPerWhole) -> Result<u32> {
    time_signature.validate()?;
    let ticks = fraction_to_ticks(Fraction::new(1, time_signature.beat_unit), ticks_per_whole)?;
    if ticks == 0 {
        return Err(EngineError::BeatTooShort {
            ticks_per_whole: ticks_per_whole.get(),
            beat_unit: time_signature.beat_unit,
        });
    }
    Ok(ticks)
}

impl Rhythm {
    pub fn effective(&self) -> Fraction {
        effective_duration(self.base, self.dotted, self.tuplet)
    }

    pub fn ticks(&self, ticks_per_whole: TicksPerWhole) -> Result<u32> {
        duration_to_ticks(self.base, self.dotted, self.tuplet, ticks_per_whole)
    }

    pub fn flags(&self) -> u8 {
        flag_count(self.base)
    }

    pub fn label(&self) -> String {
        format_duration_label(self.base, self.dotted, self.tuplet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_TICKS_PER_WHOLE;

    fn tpw(ticks: i64) -> TicksPerWhole {
        TicksPerWhole::new(ticks).unwrap()
    }

    #[test]
    fn base_fractions() {
        assert_eq!(parse_duration(BaseDuration::Quarter), Fraction::new(1, 4));
        assert_eq!(parse_duration(BaseDuration::Whole), Fraction::new(1, 1));
        assert_eq!(parse_duration(BaseDuration::ThirtySecond), Fraction::new(1, 32));
    }

    #[test]
    fn effective_duration_is_reduced() {
        // 1/8 × 3/2 = 3/16
        let dotted_eighth = effective_duration(BaseDuration::Eighth, true, None);
        assert_eq!((*dotted_eighth.numer(), *dotted_eighth.denom()), (3, 16));

        // 1/8 × 2/3 = 1/12
        let triplet_eighth = effective_duration(BaseDuration::Eighth, false, Some(Tuplet::TRIPLET));
        assert_eq!((*triplet_eighth.numer(), *triplet_eighth.denom()), (1, 12));

        // 1/4 × 3/2 × 2/3 = 1/4
        let dotted_triplet_quarter =
            effective_duration(BaseDuration::Quarter, true, Some(Tuplet::TRIPLET));
        assert_eq!((*dotted_triplet_quarter.numer(), *dotted_triplet_quarter.denom()), (1, 4));
    }

    #[test]
    fn ticks_at_default_resolution() {
        let r = tpw(DEFAULT_TICKS_PER_WHOLE as i64);
        assert_eq!(duration_to_ticks(BaseDuration::Quarter, false, None, r).unwrap(), 256);
        assert_eq!(duration_to_ticks(BaseDuration::Eighth, true, None, r).unwrap(), 192);
        assert_eq!(duration_to_ticks(BaseDuration::Whole, true, None, r).unwrap(), 1536);
        // 1024 / 12 = 85.33 → 85
        assert_eq!(duration_to_ticks(BaseDuration::Eighth, false, Some(Tuplet::TRIPLET), r).unwrap(), 85);
        // 1024 × 3/16 × 2/3 = 128
        assert_eq!(duration_to_ticks(BaseDuration::Eighth, true, Some(Tuplet::TRIPLET), r).unwrap(), 128);
    }

    #[test]
    fn ticks_round_half_away_from_zero() {
        // 1/32 of 48 = 1.5 → 2
        assert_eq!(duration_to_ticks(BaseDuration::ThirtySecond, false, None, tpw(48)).unwrap(), 2);
        // 1/16 of 24 = 1.5 → 2
        assert_eq!(duration_to_ticks(BaseDuration::Sixteenth, false, None, tpw(24)).unwrap(), 2);
    }

    #[test]
    fn quintuplets_are_exact_at_fine_resolution() {
        let r = tpw(1920);
        let quintuplet = duration_to_ticks(BaseDuration::Sixteenth, false, Some(Tuplet::QUINTUPLET), r).unwrap();
        assert_eq!(quintuplet, 96);
        assert_eq!(quintuplet * 5, duration_to_ticks(BaseDuration::Quarter, false, None, r).unwrap());
    }

    #[test]
    fn oversized_durations_are_errors() {
        let huge = tpw(i64::from(u32::MAX));
        let longest = Tuplet::new(1, 64).unwrap();
        assert!(matches!(
            duration_to_ticks(BaseDuration::Whole, true, Some(longest), huge),
            Err(EngineError::TickOverflow(t)) if t > u64::from(u32::MAX)
        ));
        assert_eq!(duration_to_ticks(BaseDuration::Whole, false, None, huge).unwrap(), u32::MAX);
    }

    #[test]
    fn onsets_stay_exact_where_ticks_drift() {
        let triplet = effective_duration(BaseDuration::Eighth, false, Some(Tuplet::TRIPLET));
        let mut onset = Onset::zero();
        let mut ticks = 0;
        for _ in 0..3 {
            onset = onset.advance(triplet).unwrap();
            ticks += duration_to_ticks(BaseDuration::Eighth, false, Some(Tuplet::TRIPLET), tpw(1024)).unwrap();
        }
        assert_eq!(ticks, 255);
        assert_eq!(onset.whole_notes(), Ratio::new(1, 4));
        assert_eq!(onset.beat_index(TimeSignature::new(4, 4)), Some(1));
        assert_eq!(onset.beat_index(TimeSignature::new(2, 2)), Some(0));
        assert_eq!(onset.beat_index(TimeSignature::new(6, 8)), Some(2));
    }

    #[test]
    fn labels() {
        assert_eq!(format_duration_label(BaseDuration::Quarter, false, None), "1/4");
        assert_eq!(
            format_duration_label(BaseDuration::Eighth, true, Some(Tuplet::TRIPLET)),
            "1/8 · dotted · 3:2"
        );
        assert_eq!(Rhythm::new(BaseDuration::Sixteenth).with_tuplet(Tuplet::QUINTUPLET).label(), "1/16 · 5:4");
    }

    #[test]
    fn flags_ignore_dots_and_tuplets() {
        assert_eq!(flag_count(BaseDuration::Whole), 0);
        assert_eq!(flag_count(BaseDuration::Half), 0);
        assert_eq!(flag_count(BaseDuration::Quarter), 0);
        assert_eq!(flag_count(BaseDuration::Eighth), 1);
        assert_eq!(flag_count(BaseDuration::Sixteenth), 2);
        assert_eq!(flag_count(BaseDuration::ThirtySecond), 3);
        let r = Rhythm::new(BaseDuration::Sixteenth).dotted().with_tuplet(Tuplet::TRIPLET);
        assert_eq!(r.flags(), 2);
    }

    #[test]
    fn measure_and_beat_lengths() {
        let r = tpw(1024);
        assert_eq!(measure_ticks(TimeSignature::new(4, 4), r).unwrap(), 1024);
        assert_eq!(measure_ticks(TimeSignature::new(3, 4), r).unwrap(), 768);
        assert_eq!(measure_ticks(TimeSignature::new(6, 8), r).unwrap(), 768);
        assert_eq!(ticks_per_beat(TimeSignature::new(6, 8), r).unwrap(), 128);
        assert_eq!(ticks_per_beat(TimeSignature::new(2, 2), r).unwrap(), 512);
    }

    #[test]
    fn invalid_meters_are_rejected() {
        let r = tpw(1024);
        assert!(matches!(
            measure_ticks(TimeSignature::new(4, 0), r),
            Err(EngineError::InvalidTimeSignature { beats: 4, beat_unit: 0 })
        ));
        assert!(matches!(
            ticks_per_beat(TimeSignature::new(0, 4), r),
            Err(EngineError::InvalidTimeSignature { .. })
        ));
        assert!(matches!(
            ticks_per_beat(TimeSignature::new(4, 64), tpw(16)),
            Err(EngineError::BeatTooShort { ticks_per_whole: 16, beat_unit: 64 })
        ));
    }

    #[test]
    fn every_preset_is_non_negative_and_consistent() {
        let r = tpw(1920);
        for base in BaseDuration::ALL {
            for dotted in [false, true] {
                for tuplet in std::iter::once(None).chain(TUPLET_PRESETS.iter().copied().map(Some)) {
                    let ticks = duration_to_ticks(base, dotted, tuplet, r).unwrap();
                    let f = effective_duration(base, dotted, tuplet);
                    let expected = (f64::from(*f.numer()) / f64::from(*f.denom()) * 1920.0).round() as u32;
                    assert_eq!(ticks, expected, "{}", format_duration_label(base, dotted, tuplet));
                }
            }
        }
    }
}
