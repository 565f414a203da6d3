//! tabscore: rhythm, layout and fretboard engine for a staff + tab editor.
//!
//! Staff notation is the source of truth. The engine turns symbolic
//! durations into ticks, lays out a rhythm sequence (positions, stems,
//! beams, tuplet brackets) and derives guitar-style tablature from the
//! pitches.
//!
//! # Example
//! ```
//! use tabscore::{compute_layout, BaseDuration, LayoutOptions, RhythmEvent};
//!
//! let events: Vec<RhythmEvent> = (0..4)
//!     .map(|i| RhythmEvent::note(format!("n{i}"), 64, BaseDuration::Eighth))
//!     .collect();
//! let layout = compute_layout(&events, &LayoutOptions::default()).unwrap();
//! assert_eq!(layout.beam_groups.len(), 2);
//! ```

pub mod duration;
pub mod error;
pub mod layout;
pub mod model;
pub mod pitch;
pub mod quantize;
pub mod tab;

use std::collections::BTreeMap;

use serde::Deserialize;

pub use duration::{duration_to_ticks, effective_duration, flag_count, format_duration_label};
pub use error::{EngineError, Result};
pub use layout::{compute_layout, layout_to_json, LayoutOptions, LayoutResult};
pub use model::*;
pub use quantize::quantize_tick;
pub use tab::{
    instrument_by_id, map_chord_to_tab, map_events_to_tab_positions, map_note_to_tab, TabContext,
    TabNote, TabPosition,
};

// ═══════════════════════════════════════════════════════════════════════
// JSON boundary
// ═══════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct LayoutRequest {
    events: Vec<RhythmEvent>,
    #[serde(default)]
    options: LayoutOptions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabRequest {
    #[serde(default)]
    instrument_id: Option<String>,
    notes: Vec<TabNote>,
}

/// Lay out a sequence given as `{"events": [...], "options": {...}}`.
/// `options` may be partial or absent; missing fields take their defaults.
pub fn compute_layout_json(request: &str) -> Result<String> {
    let request: LayoutRequest = serde_json::from_str(request)?;
    let layout = compute_layout(&request.events, &request.options)?;
    Ok(serde_json::to_string(&layout)?)
}

/// Map notes to tab positions, given as
/// `{"instrumentId": "...", "notes": [{"id", "pitch", "startTick"}]}`.
/// Returns an object keyed by note id; unplayable notes are absent.
pub fn map_tab_json(request: &str) -> Result<String> {
    let request: TabRequest = serde_json::from_str(request)?;
    let instrument = instrument_by_id(request.instrument_id.as_deref());
    let positions: BTreeMap<String, TabPosition> =
        map_events_to_tab_positions(&request.notes, &instrument);
    Ok(serde_json::to_string(&positions)?)
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI for host applications embedding the static library
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Read a request string, run `f` on it and hand back an owned C string.
///
/// # Safety
/// `request` must be null or a valid null-terminated C string.
unsafe fn call_json(request: *const c_char, f: fn(&str) -> Result<String>) -> *mut c_char {
    if request.is_null() {
        return std::ptr::null_mut();
    }
    let c_str = unsafe { CStr::from_ptr(request) };
    let request = match c_str.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    match f(request) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(e) => {
            log::warn!("tabscore request failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Lay out a JSON request (see [`compute_layout_json`]) and return the
/// layout as JSON. Returns null on error.
/// The caller must free the returned string with `tabscore_free_string`.
///
/// # Safety
/// `request` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn tabscore_compute_layout(request: *const c_char) -> *mut c_char {
    unsafe { call_json(request, compute_layout_json) }
}

/// Map a JSON request (see [`map_tab_json`]) to tab positions.
/// Returns null on error.
/// The caller must free the returned string with `tabscore_free_string`.
///
/// # Safety
/// `request` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn tabscore_map_tab(request: *const c_char) -> *mut c_char {
    unsafe { call_json(request, map_tab_json) }
}

/// Free a string returned by the tabscore C functions.
///
/// # Safety
/// `ptr` must have been returned by a tabscore function, or be null.
#[no_mangle]
pub unsafe extern "C" fn tabscore_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
