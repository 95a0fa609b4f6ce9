//! Draw a QR module grid with terminal block glyphs.
//!
//! `true` in the bitmap is a dark module. Without inversion the background is
//! drawn with full blocks and modules are left blank, which reads correctly on
//! a dark terminal; `invert` swaps that for light terminals.

use std::fmt::{self, Write};

const FULL: &str = "█";
const UPPER: &str = "▀";
const LOWER: &str = "▄";
const EMPTY: &str = " ";

/// Glyph columns of quiet zone on each side.
const QUIET_COLS: usize = 2;

pub fn render(bitmap: &[Vec<bool>], invert: bool, small: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render_to(&mut out, bitmap, invert, small);
    out
}

pub fn render_to<W: Write>(out: &mut W, bitmap: &[Vec<bool>], invert: bool, small: bool) -> fmt::Result {
    let width = bitmap.first().map_or(0, Vec::len);
    if width == 0 {
        return Ok(());
    }
    if small {
        render_small(out, bitmap, width, invert)
    } else {
        render_normal(out, bitmap, width, invert)
    }
}

/// Two characters per module, one line per row.
fn render_normal<W: Write>(out: &mut W, bitmap: &[Vec<bool>], width: usize, invert: bool) -> fmt::Result {
    let (light, dark) = if invert { ("  ", "██") } else { ("██", "  ") };

    let quiet_line = light.repeat(width + QUIET_COLS * 2);
    let side = light.repeat(QUIET_COLS);

    for _ in 0..2 {
        writeln!(out, "{quiet_line}")?;
    }
    for row in bitmap {
        out.write_str(&side)?;
        for x in 0..width {
            out.write_str(if module(row, x) { dark } else { light })?;
        }
        writeln!(out, "{side}")?;
    }
    for _ in 0..2 {
        writeln!(out, "{quiet_line}")?;
    }
    Ok(())
}

/// One character per module column, two rows per line via half blocks.
fn render_small<W: Write>(out: &mut W, bitmap: &[Vec<bool>], width: usize, invert: bool) -> fmt::Result {
    let quiet = if invert { EMPTY } else { FULL };
    let quiet_line = quiet.repeat(width + QUIET_COLS * 2);
    let side = quiet.repeat(QUIET_COLS);

    writeln!(out, "{quiet_line}")?;
    for pair in bitmap.chunks(2) {
        let upper_row = &pair[0];
        let lower_row = pair.get(1);

        out.write_str(&side)?;
        for x in 0..width {
            let upper = module(upper_row, x);
            let lower = lower_row.is_some_and(|r| module(r, x));
            out.write_str(half_block(upper, lower, invert))?;
        }
        writeln!(out, "{side}")?;
    }
    writeln!(out, "{quiet_line}")
}

fn half_block(upper: bool, lower: bool, invert: bool) -> &'static str {
    // Glyphs paint the light half normally and the dark half when inverted.
    let (upper, lower) = if invert { (upper, lower) } else { (!upper, !lower) };
    match (upper, lower) {
        (true, true) => FULL,
        (true, false) => UPPER,
        (false, true) => LOWER,
        (false, false) => EMPTY,
    }
}

/// Short rows read as background.
fn module(row: &[bool], x: usize) -> bool {
    row.get(x).copied().unwrap_or(false)
}
