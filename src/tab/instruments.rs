//! Built-in instrument catalogue.

use crate::model::{Clef, InstrumentCategory, InstrumentDefinition};

pub const GENERIC_ID: &str = "generic";
pub const GUITAR_STANDARD_ID: &str = "guitar-standard";
pub const BASS_STANDARD_ID: &str = "bass-standard";
pub const UKULELE_STANDARD_ID: &str = "ukulele-standard";

// ── Open-string tunings, highest string first ──
const GUITAR_STANDARD: [u8; 6] = [64, 59, 55, 50, 45, 40]; // E4 B3 G3 D3 A2 E2
const BASS_STANDARD: [u8; 4] = [43, 38, 33, 28]; // G2 D2 A1 E1
const UKULELE_STANDARD: [u8; 4] = [69, 64, 60, 67]; // A4 E4 C4 G4 (re-entrant)

fn definition(
    id: &str,
    name: &str,
    category: InstrumentCategory,
    clef: Clef,
    strings: Option<&[u8]>,
) -> InstrumentDefinition {
    InstrumentDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category,
        clef,
        strings: strings.map(<[u8]>::to_vec),
    }
}

/// Every instrument the editor offers, generic first.
pub fn instruments() -> Vec<InstrumentDefinition> {
    vec![
        definition(GENERIC_ID, "Generic", InstrumentCategory::Generic, Clef::Treble, None),
        definition(
            GUITAR_STANDARD_ID,
            "Guitar (standard)",
            InstrumentCategory::Guitar,
            Clef::Treble,
            Some(&GUITAR_STANDARD),
        ),
        definition(
            BASS_STANDARD_ID,
            "Bass (standard)",
            InstrumentCategory::Bass,
            Clef::Bass,
            Some(&BASS_STANDARD),
        ),
        definition(
            UKULELE_STANDARD_ID,
            "Ukulele (standard)",
            InstrumentCategory::Ukulele,
            Clef::Treble,
            Some(&UKULELE_STANDARD),
        ),
    ]
}

/// Look up an instrument; unknown or missing ids give the generic one.
pub fn instrument_by_id(id: Option<&str>) -> InstrumentDefinition {
    let mut all = instruments();
    let index = id
        .and_then(|id| all.iter().position(|i| i.id == id))
        .unwrap_or(0);
    all.swap_remove(index)
}
