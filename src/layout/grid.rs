//! Score grid: how measures are laid out in systems, and the mapping
//! between ticks/pitches and page coordinates.
//!
//! Every system holds the same number of equal-width measures; a tick's
//! x-position is linear within its measure.

use serde::{Deserialize, Serialize};

use crate::duration::measure_ticks;
use crate::error::Result;
use crate::model::{Clef, TicksPerWhole, TimeSignature};

use super::constants::*;
use super::staff::StaffGeometry;

/// Page geometry of the system grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub staff_top: f64,
    pub staff_line_spacing: f64,
    pub tab_top: f64,
    pub tab_line_spacing: f64,
    pub measure_width: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    /// Measures per system; 0 is treated as 1
    pub measures_per_system: usize,
    pub system_padding_bottom: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            staff_top: DEFAULT_STAFF_TOP,
            staff_line_spacing: DEFAULT_STAFF_LINE_SPACING,
            tab_top: DEFAULT_TAB_TOP,
            tab_line_spacing: DEFAULT_TAB_LINE_SPACING,
            measure_width: DEFAULT_MEASURE_WIDTH,
            margin_left: DEFAULT_MARGIN_LEFT,
            margin_top: DEFAULT_MARGIN_TOP,
            measures_per_system: DEFAULT_MEASURES_PER_SYSTEM,
            system_padding_bottom: DEFAULT_SYSTEM_PADDING_BOTTOM,
        }
    }
}

/// A barline position within a system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureBar {
    pub x: f64,
    pub system_index: usize,
    pub measure_index: usize,
}

#[derive(Debug, Clone)]
pub struct ScoreGrid {
    config: GridConfig,
    ticks_per_measure: u32,
    measures_per_system: usize,
    show_tab: bool,
    string_count: usize,
    staff: StaffGeometry,
}

impl ScoreGrid {
    pub fn new(
        config: GridConfig,
        time_signature: TimeSignature,
        ticks_per_whole: TicksPerWhole,
        clef: Clef,
        show_tab: bool,
        string_count: usize,
    ) -> Result<Self> {
        let ticks_per_measure = measure_ticks(time_signature, ticks_per_whole)?;
        let staff = StaffGeometry::new(
            clef,
            config.staff_top,
            config.staff_line_spacing,
            config.tab_top,
            config.tab_line_spacing,
            string_count,
        );
        Ok(Self {
            config,
            ticks_per_measure: ticks_per_measure.max(1),
            measures_per_system: config.measures_per_system.max(1),
            show_tab: show_tab && string_count > 0,
            string_count,
            staff,
        })
    }

    pub fn ticks_per_measure(&self) -> u32 {
        self.ticks_per_measure
    }

    pub fn system_height(&self) -> f64 {
        let c = &self.config;
        if self.show_tab {
            let tab_height = self.string_count.saturating_sub(1) as f64 * c.tab_line_spacing;
            c.tab_top + tab_height + c.system_padding_bottom
        } else {
            self.staff.bottom_line_y() + c.system_padding_bottom
        }
    }

    pub fn system_top(&self, system_index: usize) -> f64 {
        self.config.margin_top + system_index as f64 * self.system_height()
    }

    pub fn system_index_for_measure(&self, measure_index: usize) -> usize {
        measure_index / self.measures_per_system
    }

    pub fn system_index_for_tick(&self, tick: u32) -> usize {
        self.system_index_for_measure((tick / self.ticks_per_measure) as usize)
    }

    pub fn tick_to_x(&self, tick: u32) -> f64 {
        let measure_index = tick / self.ticks_per_measure;
        let offset = tick - measure_index * self.ticks_per_measure;
        let measure_in_system = measure_index as usize % self.measures_per_system;
        self.config.margin_left
            + measure_in_system as f64 * self.config.measure_width
            + f64::from(offset) / f64::from(self.ticks_per_measure) * self.config.measure_width
    }

    /// Inverse of [`tick_to_x`](Self::tick_to_x) for a given system.
    /// Positions left of the first measure clamp to its start.
    pub fn x_to_tick(&self, x: f64, system_index: usize) -> u32 {
        let width = self.config.measure_width;
        let relative_x = x - self.config.margin_left;
        let measure_in_system = (relative_x / width).floor().max(0.0);
        let offset_x = relative_x - measure_in_system * width;
        let measure_index = (system_index * self.measures_per_system) as f64 + measure_in_system;
        let tpm = f64::from(self.ticks_per_measure);
        (offset_x / width * tpm + measure_index * tpm).round().max(0.0) as u32
    }

    pub fn pitch_to_y(&self, midi: u8, tick: u32) -> f64 {
        self.system_top(self.system_index_for_tick(tick)) + self.staff.pitch_to_y(midi)
    }

    pub fn y_to_pitch(&self, y: f64, system_index: usize) -> u8 {
        self.staff.y_to_pitch(y - self.system_top(system_index))
    }

    pub fn staff_line_positions(&self, system_index: usize) -> Vec<f64> {
        let top = self.system_top(system_index) + self.config.staff_top;
        (0..STAFF_LINE_COUNT)
            .map(|i| top + i as f64 * self.config.staff_line_spacing)
            .collect()
    }

    /// Empty when the tab is hidden or the instrument has no strings.
    pub fn tab_line_positions(&self, system_index: usize) -> Vec<f64> {
        if !self.show_tab {
            return Vec::new();
        }
        let top = self.system_top(system_index);
        (0..self.string_count).map(|i| top + self.staff.tab_y(i)).collect()
    }

    /// Barlines of a system, including the closing one.
    pub fn measure_bars(&self, system_index: usize) -> Vec<MeasureBar> {
        (0..=self.measures_per_system)
            .map(|i| MeasureBar {
                x: self.config.margin_left + i as f64 * self.config.measure_width,
                system_index,
                measure_index: system_index * self.measures_per_system + i,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(show_tab: bool) -> ScoreGrid {
        ScoreGrid::new(
            GridConfig::default(),
            TimeSignature::new(4, 4),
            TicksPerWhole::new(1024).unwrap(),
            Clef::Treble,
            show_tab,
            6,
        )
        .unwrap()
    }

    #[test]
    fn ticks_map_across_measures_and_systems() {
        let g = grid(false);
        assert_eq!(g.ticks_per_measure(), 1024);
        assert_eq!(g.tick_to_x(0), 80.0);
        assert_eq!(g.tick_to_x(512), 80.0 + 120.0);
        assert_eq!(g.tick_to_x(1024), 80.0 + 240.0);
        // fourth measure wraps to the next system
        assert_eq!(g.tick_to_x(3 * 1024), 80.0);
        assert_eq!(g.system_index_for_tick(3 * 1024), 1);
    }

    #[test]
    fn x_to_tick_inverts_tick_to_x() {
        let g = grid(false);
        for tick in [0, 256, 700, 1024, 2500, 3 * 1024 + 128] {
            let system = g.system_index_for_tick(tick);
            assert_eq!(g.x_to_tick(g.tick_to_x(tick), system), tick);
        }
        assert_eq!(g.x_to_tick(0.0, 0), 0);
    }

    #[test]
    fn system_height_depends_on_tab() {
        assert_eq!(grid(false).system_height(), 50.0 + 48.0 + 40.0);
        assert_eq!(grid(true).system_height(), 130.0 + 50.0 + 40.0);
        assert_eq!(grid(true).system_top(2), 20.0 + 2.0 * 220.0);
    }

    #[test]
    fn pitch_y_follows_the_system() {
        let g = grid(false);
        let y0 = g.pitch_to_y(64, 0);
        let y1 = g.pitch_to_y(64, 3 * 1024);
        assert_eq!(y1 - y0, g.system_height());
        assert_eq!(g.y_to_pitch(y1, 1), 64);
        assert_eq!(g.y_to_pitch(g.pitch_to_y(72, 0), 0), 72);
    }

    #[test]
    fn line_positions_and_bars() {
        let g = grid(true);
        assert_eq!(g.staff_line_positions(0), vec![70.0, 82.0, 94.0, 106.0, 118.0]);
        assert_eq!(g.tab_line_positions(0).len(), 6);
        assert!(grid(false).tab_line_positions(0).is_empty());
        let bars = g.measure_bars(1);
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].measure_index, 3);
        assert_eq!(bars[3].x, 80.0 + 3.0 * 240.0);
    }
}
