//! Beam grouping: which flagged notes share beams, and the beam segments
//! for every flag level.

use super::constants::{BEAM_LEVEL_SPACING, BEAM_STUB_LENGTH};
use super::{BeamGroup, BeamSegment, LayoutEvent, StemDirection};

/// Group consecutive flagged notes that start in the same beat and carry
/// the same tuplet label (or none).
///
/// Rests, zero-flag events, beat boundaries and tuplet boundaries end a
/// group. Groups of one are not beams; those notes keep their own flags.
pub(super) fn compute_beam_groups(events: &[LayoutEvent]) -> Vec<BeamGroup> {
    let mut groups: Vec<BeamGroup> = Vec::new();
    let mut current_group: Vec<&LayoutEvent> = Vec::new();

    for event in events {
        if event.is_rest || event.flags == 0 {
            flush_group(&mut current_group, &mut groups);
            continue;
        }

        if let Some(last) = current_group.last() {
            if last.beat_index != event.beat_index || last.tuplet_label != event.tuplet_label {
                flush_group(&mut current_group, &mut groups);
            }
        }
        current_group.push(event);
    }
    flush_group(&mut current_group, &mut groups);

    groups
}

fn flush_group(current_group: &mut Vec<&LayoutEvent>, groups: &mut Vec<BeamGroup>) {
    if current_group.len() >= 2 {
        groups.push(build_group(current_group));
    }
    current_group.clear();
}

fn build_group(members: &[&LayoutEvent]) -> BeamGroup {
    let max_flags = members.iter().map(|e| e.flags).max().unwrap_or(0);
    let mut segments = Vec::new();

    for level in 1..=max_flags {
        let mut run_start: Option<usize> = None;
        for (i, event) in members.iter().enumerate() {
            if event.flags >= level {
                run_start.get_or_insert(i);
            } else if let Some(start) = run_start.take() {
                segments.push(beam_segment(members, start, i, level));
            }
        }
        if let Some(start) = run_start {
            segments.push(beam_segment(members, start, members.len(), level));
        }
    }

    BeamGroup {
        id: format!("beam-{}", members[0].id),
        event_ids: members.iter().map(|e| e.id.clone()).collect(),
        segments,
    }
}

/// Segment over `members[start..end]` at `level`. A run of one becomes a
/// stub pointing into the group.
fn beam_segment(members: &[&LayoutEvent], start: usize, end: usize, level: u8) -> BeamSegment {
    let run = &members[start..end];
    let first = run[0];
    let last = run[run.len() - 1];
    let level_offset = f64::from(level - 1) * BEAM_LEVEL_SPACING;

    // Primary beam at the stem tip of the outermost note; deeper levels
    // stack toward the noteheads.
    let y = match first.stem_direction {
        StemDirection::Up => {
            let highest = run.iter().map(|e| e.staff_y).fold(f64::INFINITY, f64::min);
            highest - first.stem_length + level_offset
        }
        StemDirection::Down => {
            let lowest = run.iter().map(|e| e.staff_y).fold(f64::NEG_INFINITY, f64::max);
            lowest + first.stem_length - level_offset
        }
    };

    let x_end = if run.len() == 1 {
        if end == members.len() {
            first.x - BEAM_STUB_LENGTH
        } else {
            first.x + BEAM_STUB_LENGTH
        }
    } else {
        last.x
    };

    BeamSegment {
        level,
        x_start: first.x,
        x_end,
        y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: &str, beat_index: u64, flags: u8, x: f64) -> LayoutEvent {
        LayoutEvent {
            id: id.to_string(),
            is_rest: false,
            start_tick: 0,
            duration_ticks: 0,
            beat_index,
            x,
            staff_y: 98.0,
            tab_y: 130.0,
            stem_direction: StemDirection::Up,
            stem_length: 30.0,
            flags,
            beamed: false,
            tuplet_label: None,
            pitch: Some(64),
            string: None,
            fret: None,
        }
    }

    #[test]
    fn beat_boundary_splits_groups() {
        let events = vec![
            ev("a", 0, 1, 0.0),
            ev("b", 0, 1, 10.0),
            ev("c", 1, 1, 20.0),
            ev("d", 1, 1, 30.0),
        ];
        let groups = compute_beam_groups(&events);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].event_ids, vec!["a", "b"]);
        assert_eq!(groups[1].event_ids, vec!["c", "d"]);
    }

    #[test]
    fn zero_flag_event_breaks_group() {
        let events = vec![ev("a", 0, 1, 0.0), ev("q", 0, 0, 10.0), ev("b", 0, 1, 20.0)];
        assert!(compute_beam_groups(&events).is_empty());
    }

    #[test]
    fn tuplet_boundary_splits_groups_within_a_beat() {
        let triplet = |id: &str, x: f64| LayoutEvent {
            tuplet_label: Some("3:2".to_string()),
            ..ev(id, 0, 1, x)
        };
        let events = vec![
            triplet("t1", 0.0),
            triplet("t2", 10.0),
            triplet("t3", 20.0),
            ev("p1", 0, 1, 30.0),
            ev("p2", 0, 1, 40.0),
        ];
        let groups = compute_beam_groups(&events);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].event_ids, vec!["t1", "t2", "t3"]);
        assert_eq!(groups[1].event_ids, vec!["p1", "p2"]);
    }

    #[test]
    fn mixed_levels_emit_stub_into_the_group() {
        // dotted eighth + sixteenth: level 1 spans both, level 2 is a stub
        // on the sixteenth pointing back toward the eighth
        let events = vec![ev("e", 0, 1, 0.0), ev("s", 0, 2, 40.0)];
        let groups = compute_beam_groups(&events);
        assert_eq!(groups.len(), 1);
        let segs = &groups[0].segments;
        assert_eq!(segs.len(), 2);
        assert_eq!((segs[0].level, segs[0].x_start, segs[0].x_end), (1, 0.0, 40.0));
        assert_eq!((segs[1].level, segs[1].x_start, segs[1].x_end), (2, 40.0, 30.0));
        assert_eq!(segs[0].y, 98.0 - 30.0);
        assert_eq!(segs[1].y, 98.0 - 30.0 + BEAM_LEVEL_SPACING);
    }

    #[test]
    fn leading_stub_points_right() {
        let events = vec![ev("s", 0, 2, 0.0), ev("e", 0, 1, 20.0)];
        let groups = compute_beam_groups(&events);
        let stub = groups[0].segments.iter().find(|s| s.level == 2).unwrap();
        assert_eq!((stub.x_start, stub.x_end), (0.0, BEAM_STUB_LENGTH));
    }

    #[test]
    fn level_runs_split_where_flags_drop() {
        // 16th 16th 8th 16th 16th within one long beat
        let events = vec![
            ev("a", 0, 2, 0.0),
            ev("b", 0, 2, 10.0),
            ev("c", 0, 1, 20.0),
            ev("d", 0, 2, 30.0),
            ev("e", 0, 2, 40.0),
        ];
        let groups = compute_beam_groups(&events);
        assert_eq!(groups.len(), 1);
        let level2: Vec<(f64, f64)> = groups[0]
            .segments
            .iter()
            .filter(|s| s.level == 2)
            .map(|s| (s.x_start, s.x_end))
            .collect();
        assert_eq!(level2, vec![(0.0, 10.0), (30.0, 40.0)]);
    }
}
