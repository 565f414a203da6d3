//! Snapping tick positions to a rhythmic grid.

/// How a position exactly halfway between two grid lines is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieRounding {
    /// Toward the later grid line.
    HalfUp,
    /// Toward the grid line with an even index.
    HalfEven,
}

/// Tie policy used by [`quantize_tick`].
pub const QUANTIZE_TIE_ROUNDING: TieRounding = TieRounding::HalfUp;

/// Snap `tick` to the nearest multiple of `grid`.
///
/// A non-positive grid means "no quantization" and returns `tick` as is.
pub fn quantize_tick(tick: i64, grid: i64) -> i64 {
    quantize_tick_with(tick, grid, QUANTIZE_TIE_ROUNDING)
}

pub fn quantize_tick_with(tick: i64, grid: i64, ties: TieRounding) -> i64 {
    if grid <= 0 {
        return tick;
    }
    let index = tick.div_euclid(grid);
    let twice_remainder = tick.rem_euclid(grid) * 2;
    let snapped = if twice_remainder > grid {
        index + 1
    } else if twice_remainder < grid {
        index
    } else {
        match ties {
            TieRounding::HalfUp => index + 1,
            TieRounding::HalfEven => index + index.rem_euclid(2),
        }
    };
    snapped * grid
}
