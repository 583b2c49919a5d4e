//! Line-wise slide/merge primitive and grid transforms

use super::board::{Grid, SIZE};

/// Slide a line toward index 0 and merge equal neighbours.
///
/// Non-zero values are compacted toward the front in order, then each adjacent
/// equal pair merges exactly once per pass: a tile produced by a merge cannot
/// merge again, so `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]` rather than
/// `[8, 0, 0, 0]`. The result is zero-padded back to length 4. A merge never
/// wraps: values past `u32::MAX` saturate.
///
/// # Examples
///
/// ```
/// use tilemind::game::slide_merge_line;
///
/// assert_eq!(slide_merge_line([2, 2, 2, 2]), [4, 4, 0, 0]);
/// assert_eq!(slide_merge_line([0, 2, 0, 2]), [4, 0, 0, 0]);
/// assert_eq!(slide_merge_line([2, 0, 2, 4]), [4, 4, 0, 0]);
/// ```
pub fn slide_merge_line(line: [u32; SIZE]) -> [u32; SIZE] {
    let mut compacted = [0u32; SIZE];
    let mut len = 0;
    for value in line.into_iter().filter(|&v| v != 0) {
        compacted[len] = value;
        len += 1;
    }

    let mut merged = [0u32; SIZE];
    let mut out = 0;
    let mut i = 0;
    while i < len {
        if i + 1 < len && compacted[i] == compacted[i + 1] {
            merged[out] = compacted[i].saturating_mul(2);
            i += 2;
        } else {
            merged[out] = compacted[i];
            i += 1;
        }
        out += 1;
    }
    merged
}

/// Swap rows and columns.
pub fn transpose(grid: &Grid) -> Grid {
    let mut out = [[0u32; SIZE]; SIZE];
    for (r, row) in grid.iter().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            out[c][r] = value;
        }
    }
    out
}
