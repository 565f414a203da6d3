//! Pitch → string/fret mapping under simple ergonomic costs.
//!
//! Every candidate position is scored by fret height, distance from the
//! middle strings, an edge-string penalty and, when a previous hand
//! position is known, how far the hand has to move. Chords search all
//! string-disjoint combinations of the best few candidates per note.

use std::collections::BTreeMap;

use log::{debug, trace, warn};

use crate::model::InstrumentDefinition;

use super::{HandPosition, TabContext, TabNote, TabPosition};

// ── Candidate scoring ──
const MAX_FRET: i32 = 24;
const CENTER_DISTANCE_WEIGHT: f64 = 0.35;
const EDGE_STRING_PENALTY: f64 = 0.4;
const CONTINUITY_FRET_WEIGHT: f64 = 0.7;
const CONTINUITY_STRING_WEIGHT: f64 = 0.5;

// ── Chord search ──
const CHORD_CANDIDATES_PER_NOTE: usize = 4;
const COMFORTABLE_SPAN: u8 = 5;
const SPAN_WEIGHT: f64 = 1.25;
const WIDE_SPAN_WEIGHT: f64 = 3.0;
const MOVEMENT_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    position: TabPosition,
    score: f64,
}

/// All playable positions of `pitch`, best first.
fn candidates(pitch: u8, open_strings: &[u8], context: &TabContext) -> Vec<Candidate> {
    let count = open_strings.len();
    let mid = count.saturating_sub(1) as f64 / 2.0;

    let mut found: Vec<Candidate> = open_strings
        .iter()
        .enumerate()
        .filter_map(|(string_index, &open)| {
            let fret = i32::from(pitch) - i32::from(open);
            if !(0..=MAX_FRET).contains(&fret) {
                return None;
            }
            let position = TabPosition {
                string_index,
                fret: fret as u8,
            };
            Some(Candidate {
                position,
                score: score(position, count, mid, context),
            })
        })
        .collect();

    found.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then(a.position.fret.cmp(&b.position.fret))
            .then(a.position.string_index.cmp(&b.position.string_index))
    });
    found
}

fn score(position: TabPosition, string_count: usize, mid: f64, context: &TabContext) -> f64 {
    let index = position.string_index as f64;
    let fret = f64::from(position.fret);

    let mut score = fret + (index - mid).abs() * CENTER_DISTANCE_WEIGHT;
    if position.string_index == 0 || position.string_index + 1 == string_count {
        score += EDGE_STRING_PENALTY;
    }
    if let Some(hand) = context.main_position {
        score += (fret - hand.fret).abs() * CONTINUITY_FRET_WEIGHT
            + (index - hand.string_index).abs() * CONTINUITY_STRING_WEIGHT;
    }
    score
}

// ═══════════════════════════════════════════════════════════════════════
// Single notes
// ═══════════════════════════════════════════════════════════════════════

/// Best position for one note, or `None` when the instrument has no
/// fretboard or the pitch is out of range. Moves the hand on success.
pub fn map_note_to_tab(
    pitch: u8,
    instrument: &InstrumentDefinition,
    context: &mut TabContext,
) -> Option<TabPosition> {
    let best = candidates(pitch, instrument.open_strings(), context)
        .into_iter()
        .next()?;
    trace!(
        "note {} -> string {} fret {} (score {:.3})",
        pitch,
        best.position.string_index,
        best.position.fret,
        best.score
    );
    context.main_position = Some(HandPosition::at(best.position));
    Some(best.position)
}

// ═══════════════════════════════════════════════════════════════════════
// Chords
// ═══════════════════════════════════════════════════════════════════════

/// Positions for notes sounding together, one string each.
///
/// Notes out of the instrument's range are set aside first. When more
/// playable notes remain than the instrument has strings, the lowest are
/// left out. Notes that cannot be placed are absent from the result.
pub fn map_chord_to_tab(
    notes: &[TabNote],
    instrument: &InstrumentDefinition,
    context: &mut TabContext,
) -> BTreeMap<String, TabPosition> {
    let open_strings = instrument.open_strings();
    if open_strings.is_empty() || notes.is_empty() {
        return BTreeMap::new();
    }

    let in_range: Vec<(&TabNote, Vec<Candidate>)> = notes
        .iter()
        .filter_map(|note| {
            let mut found = candidates(note.pitch, open_strings, context);
            if found.is_empty() {
                debug!("chord note {} (pitch {}) is out of range", note.id, note.pitch);
                return None;
            }
            found.truncate(CHORD_CANDIDATES_PER_NOTE);
            Some((note, found))
        })
        .collect();
    let per_note = keep_highest(in_range, open_strings.len());

    let mut search = ChordSearch::new(&per_note, context.main_position, open_strings.len());
    search.run();
    let chosen: Vec<(&TabNote, TabPosition)> = match search.best {
        Some((cost, assignment)) => {
            trace!("chord search: {} leaves, best cost {:.3}", search.leaves, cost);
            per_note
                .iter()
                .zip(assignment)
                .map(|((note, _), c)| (*note, c.position))
                .collect()
        }
        None => {
            warn!(
                "no string-disjoint assignment for {} chord notes, assigning greedily",
                per_note.len()
            );
            greedy_assignment(&per_note, open_strings.len())
        }
    };

    if let Some(centroid) = HandPosition::centroid(chosen.iter().map(|(_, p)| *p)) {
        context.main_position = Some(centroid);
    }

    debug!("chord of {} notes mapped to {} positions", notes.len(), chosen.len());
    chosen
        .into_iter()
        .map(|(note, position)| (note.id.clone(), position))
        .collect()
}

/// The `limit` highest-pitched entries, in input order.
fn keep_highest<'n>(
    entries: Vec<(&'n TabNote, Vec<Candidate>)>,
    limit: usize,
) -> Vec<(&'n TabNote, Vec<Candidate>)> {
    if entries.len() <= limit {
        return entries;
    }

    let mut by_pitch: Vec<usize> = (0..entries.len()).collect();
    by_pitch.sort_by(|&a, &b| entries[b].0.pitch.cmp(&entries[a].0.pitch));
    let mut keep = vec![false; entries.len()];
    for &i in &by_pitch[..limit] {
        keep[i] = true;
    }

    let dropped: Vec<&str> = by_pitch[limit..].iter().map(|&i| entries[i].0.id.as_str()).collect();
    warn!(
        "chord has {} playable notes for {} strings, dropping lowest: {:?}",
        entries.len(),
        limit,
        dropped
    );
    entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, kept)| kept.then_some(entry))
        .collect()
}

fn span_penalty(span: u8) -> f64 {
    if span <= COMFORTABLE_SPAN {
        f64::from(span) * SPAN_WEIGHT
    } else {
        f64::from(span - COMFORTABLE_SPAN) * WIDE_SPAN_WEIGHT
            + f64::from(COMFORTABLE_SPAN) * SPAN_WEIGHT
    }
}

/// Depth-first search over each note's candidates, never reusing a string.
struct ChordSearch<'a> {
    per_note: &'a [(&'a TabNote, Vec<Candidate>)],
    hand: Option<HandPosition>,
    used_strings: Vec<bool>,
    current: Vec<Candidate>,
    best: Option<(f64, Vec<Candidate>)>,
    leaves: usize,
}

impl<'a> ChordSearch<'a> {
    fn new(
        per_note: &'a [(&'a TabNote, Vec<Candidate>)],
        hand: Option<HandPosition>,
        string_count: usize,
    ) -> Self {
        Self {
            per_note,
            hand,
            used_strings: vec![false; string_count],
            current: Vec::with_capacity(per_note.len()),
            best: None,
            leaves: 0,
        }
    }

    fn run(&mut self) {
        if !self.per_note.is_empty() {
            self.descend(0);
        }
    }

    fn descend(&mut self, depth: usize) {
        if depth == self.per_note.len() {
            self.leaves += 1;
            let cost = self.cost();
            // strict: the first assignment found wins ties
            if self.best.as_ref().map_or(true, |(best, _)| cost < *best) {
                self.best = Some((cost, self.current.clone()));
            }
            return;
        }

        let per_note = self.per_note;
        for candidate in &per_note[depth].1 {
            let string = candidate.position.string_index;
            if self.used_strings[string] {
                continue;
            }
            self.used_strings[string] = true;
            self.current.push(*candidate);
            self.descend(depth + 1);
            self.current.pop();
            self.used_strings[string] = false;
        }
    }

    fn cost(&self) -> f64 {
        let scores: f64 = self.current.iter().map(|c| c.score).sum();
        let frets = self.current.iter().map(|c| c.position.fret);
        let span = frets.clone().max().unwrap_or(0) - frets.clone().min().unwrap_or(0);
        let movement = match self.hand {
            Some(hand) => {
                let total: f64 = frets.map(f64::from).sum();
                let average = total / self.current.len() as f64;
                (average - hand.fret).abs() * MOVEMENT_WEIGHT
            }
            None => 0.0,
        };
        scores + span_penalty(span) + movement
    }
}

/// Each note in input order takes its best candidate on a free string.
fn greedy_assignment<'a>(
    per_note: &[(&'a TabNote, Vec<Candidate>)],
    string_count: usize,
) -> Vec<(&'a TabNote, TabPosition)> {
    let mut used_strings = vec![false; string_count];
    per_note
        .iter()
        .filter_map(|(note, found)| {
            let free = found.iter().find(|c| !used_strings[c.position.string_index]);
            match free {
                Some(c) => {
                    used_strings[c.position.string_index] = true;
                    Some((*note, c.position))
                }
                None => {
                    debug!("chord note {} has no free string", note.id);
                    None
                }
            }
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Sequences
// ═══════════════════════════════════════════════════════════════════════

/// Map a whole passage. Notes sharing a start tick are a chord; groups
/// are processed in tick order through one shared hand position.
pub fn map_events_to_tab_positions(
    notes: &[TabNote],
    instrument: &InstrumentDefinition,
) -> BTreeMap<String, TabPosition> {
    let mut positions = BTreeMap::new();
    if !instrument.has_fretboard() {
        return positions;
    }

    let mut by_tick: BTreeMap<u32, Vec<TabNote>> = BTreeMap::new();
    for note in notes {
        by_tick.entry(note.start_tick).or_default().push(note.clone());
    }

    let mut context = TabContext::default();
    for group in by_tick.values() {
        match group.as_slice() {
            [single] => {
                if let Some(position) = map_note_to_tab(single.pitch, instrument, &mut context) {
                    positions.insert(single.id.clone(), position);
                }
            }
            chord => positions.extend(map_chord_to_tab(chord, instrument, &mut context)),
        }
    }

    debug!(
        "mapped {} of {} notes in {} onsets on {}",
        positions.len(),
        notes.len(),
        by_tick.len(),
        instrument.id
    );
    positions
}
