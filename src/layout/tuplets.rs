//! Tuplet brackets over runs of events with the same tuplet label.

use super::constants::{MIN_TUPLET_BRACKET_RUN, TUPLET_BRACKET_PADDING, TUPLET_BRACKET_RISE};
use super::{LayoutEvent, TupletBracket};

/// One bracket per maximal run of adjacent events sharing a label.
/// Shorter runs keep the label inline on the event only.
pub(super) fn build_tuplet_brackets(events: &[LayoutEvent]) -> Vec<TupletBracket> {
    let mut brackets = Vec::new();
    let mut run_start = 0;

    while run_start < events.len() {
        let Some(label) = events[run_start].tuplet_label.as_deref() else {
            run_start += 1;
            continue;
        };
        let run_end = events[run_start..]
            .iter()
            .position(|e| e.tuplet_label.as_deref() != Some(label))
            .map_or(events.len(), |offset| run_start + offset);

        let run = &events[run_start..run_end];
        if run.len() >= MIN_TUPLET_BRACKET_RUN {
            brackets.push(bracket_for(run, label));
        }
        run_start = run_end;
    }

    brackets
}

fn bracket_for(run: &[LayoutEvent], label: &str) -> TupletBracket {
    let first = &run[0];
    let last = &run[run.len() - 1];
    let highest = run.iter().map(|e| e.staff_y).fold(f64::INFINITY, f64::min);

    TupletBracket {
        id: format!("tuplet-{}-{}", label, first.id),
        start_x: first.x - TUPLET_BRACKET_PADDING,
        end_x: last.x + TUPLET_BRACKET_PADDING,
        y: highest - TUPLET_BRACKET_RISE,
        label: label.to_string(),
    }
}
