//! Terminal rasterizer: paints a [`DrawList`] into an ftui frame, one device
//! pixel per cell, and registers hit regions for interaction zones.
//!
//! | Command    | Cells                                          |
//! |------------|------------------------------------------------|
//! | Clear      | blank cells with the background color          |
//! | FillRect   | background fill                                |
//! | Circle     | `●` in the source color                        |
//! | Diamond    | `◆` in the source color                        |
//! | Ring       | marker glyph swapped for `◉` / `◈`             |
//! | FocusRing  | focus color behind the marker                  |
//! | Line       | `─` / `│`, sampled `·` otherwise               |
//! | Curve      | sampled `·` on blank cells                     |
//! | Badge      | member count right of the marker               |

use ftui::layout::Rect;
use ftui::render::frame::HitId;
use ftui::{Cell, Frame, PackedRgba};
use journey_core::Rgb;

use crate::overlay::InteractionZone;
use crate::render::{DrawCommand, DrawList, Point, TextAlign};

/// Base hit ID for interaction zones. Zone `i` registers
/// `HitId(ZONE_HIT_BASE + i)`.
pub const ZONE_HIT_BASE: u32 = 7_000;
/// Zones beyond this many are not registered.
pub const ZONE_HIT_CAPACITY: u32 = 1_000;

const MARKER: char = '●';
const MARKER_RING: char = '◉';
const MILESTONE: char = '◆';
const MILESTONE_RING: char = '◈';
const DOT: char = '·';

fn packed(color: Rgb) -> PackedRgba {
    PackedRgba::rgb(color.r, color.g, color.b)
}

/// Cell offset for a device coordinate, or `None` when it cannot land on
/// the grid.
fn cell_offset(v: f64) -> Option<u16> {
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let floor = v.floor().min(f64::from(u16::MAX)) as u16;
    Some(floor)
}

/// Absolute cell for a device point inside `area`.
fn cell_at(area: Rect, p: Point) -> Option<(u16, u16)> {
    let dx = cell_offset(p.x)?;
    let dy = cell_offset(p.y)?;
    (dx < area.width && dy < area.height).then(|| (area.x + dx, area.y + dy))
}

fn cell_char(frame: &Frame<'_>, col: u16, row: u16) -> Option<char> {
    frame.buffer.get(col, row).and_then(|c| c.content.as_char())
}

fn is_blank(frame: &Frame<'_>, col: u16, row: u16) -> bool {
    matches!(cell_char(frame, col, row), Some(' ') | None)
}

/// Write `ch` keeping the cell's existing background.
fn put(frame: &mut Frame<'_>, col: u16, row: u16, ch: char, fg: PackedRgba) {
    let bg = frame.buffer.get(col, row).map(|c| c.bg);
    let mut cell = Cell::from_char(ch);
    cell.fg = fg;
    if let Some(bg) = bg {
        cell.bg = bg;
    }
    frame.buffer.set_fast(col, row, cell);
}

fn fill(frame: &mut Frame<'_>, area: Rect, x: f64, y: f64, width: f64, height: f64, color: PackedRgba) {
    let (Some(x0), Some(y0)) = (cell_offset(x.max(0.0)), cell_offset(y.max(0.0))) else {
        return;
    };
    let (Some(x1), Some(y1)) = (cell_offset((x + width).max(0.0)), cell_offset((y + height).max(0.0))) else {
        return;
    };
    for row in y0..y1.min(area.height) {
        for col in x0..x1.min(area.width) {
            let mut cell = Cell::from_char(' ');
            cell.bg = color;
            frame.buffer.set_fast(area.x + col, area.y + row, cell);
        }
    }
}

fn text(frame: &mut Frame<'_>, area: Rect, at: Point, value: &str, color: PackedRgba, align: TextAlign) {
    let len = value.chars().count();
    #[allow(clippy::cast_precision_loss)]
    let start_x = match align {
        TextAlign::Left => at.x,
        TextAlign::Center => at.x - len as f64 / 2.0,
        TextAlign::Right => at.x - len as f64,
    };
    let Some(dy) = cell_offset(at.y) else {
        return;
    };
    if dy >= area.height {
        return;
    }
    for (i, ch) in value.chars().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let Some(dx) = cell_offset(start_x + i as f64) else {
            continue;
        };
        if dx >= area.width {
            break;
        }
        put(frame, area.x + dx, area.y + dy, ch, color);
    }
}

fn sample_line(frame: &mut Frame<'_>, area: Rect, from: Point, to: Point, color: PackedRgba) {
    let steps = (to.x - from.x).abs().max((to.y - from.y).abs()).ceil().max(1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = steps.min(f64::from(u16::MAX)) as u32;
    for i in 0..=n {
        let t = f64::from(i) / f64::from(n.max(1));
        let p = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
        if let Some((col, row)) = cell_at(area, p)
            && is_blank(frame, col, row)
        {
            put(frame, col, row, DOT, color);
        }
    }
}

fn line(frame: &mut Frame<'_>, area: Rect, from: Point, to: Point, color: PackedRgba) {
    let (Some(y0), Some(y1)) = (cell_offset(from.y), cell_offset(to.y)) else {
        return;
    };
    let (Some(x0), Some(x1)) = (cell_offset(from.x), cell_offset(to.x)) else {
        return;
    };
    if y0 == y1 && y0 < area.height {
        for col in x0.min(x1)..=x0.max(x1).min(area.width.saturating_sub(1)) {
            put(frame, area.x + col, area.y + y0, '─', color);
        }
    } else if x0 == x1 && x0 < area.width {
        for row in y0.min(y1)..=y0.max(y1).min(area.height.saturating_sub(1)) {
            put(frame, area.x + x0, area.y + row, '│', color);
        }
    } else {
        sample_line(frame, area, from, to, color);
    }
}

fn curve(frame: &mut Frame<'_>, area: Rect, from: Point, control: Point, to: Point, color: PackedRgba) {
    let reach = (to.x - from.x).abs() + (control.y - from.y).abs() + (control.y - to.y).abs();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (reach * 2.0).ceil().clamp(2.0, 4096.0) as u32;
    for i in 1..n {
        let t = f64::from(i) / f64::from(n);
        let u = 1.0 - t;
        let p = Point::new(
            u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
            u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
        );
        if let Some((col, row)) = cell_at(area, p)
            && is_blank(frame, col, row)
        {
            put(frame, col, row, DOT, color);
        }
    }
}

/// Paint `list` into `area`. Everything outside `area` is left untouched.
pub fn rasterize(frame: &mut Frame<'_>, area: Rect, list: &DrawList) {
    for command in &list.commands {
        match command {
            DrawCommand::Clear { color } => {
                fill(
                    frame,
                    area,
                    0.0,
                    0.0,
                    f64::from(area.width),
                    f64::from(area.height),
                    packed(*color),
                );
            }
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => fill(frame, area, *x, *y, *width, *height, packed(*color)),
            DrawCommand::Text {
                at,
                text: value,
                color,
                align,
            } => text(frame, area, *at, value, packed(*color), *align),
            DrawCommand::Circle { center, fill, .. } => {
                if let Some((col, row)) = cell_at(area, *center) {
                    put(frame, col, row, MARKER, packed(*fill));
                }
            }
            DrawCommand::Diamond { center, fill, .. } => {
                if let Some((col, row)) = cell_at(area, *center) {
                    put(frame, col, row, MILESTONE, packed(*fill));
                }
            }
            DrawCommand::Ring { center, .. } => {
                if let Some((col, row)) = cell_at(area, *center) {
                    let swapped = match cell_char(frame, col, row) {
                        Some(MARKER) => Some(MARKER_RING),
                        Some(MILESTONE) => Some(MILESTONE_RING),
                        _ => None,
                    };
                    if let (Some(ch), Some(fg)) = (swapped, frame.buffer.get(col, row).map(|c| c.fg)) {
                        put(frame, col, row, ch, fg);
                    }
                }
            }
            DrawCommand::FocusRing { center, color, .. } => {
                if let Some((col, row)) = cell_at(area, *center)
                    && let Some(cell) = frame.buffer.get_mut(col, row)
                {
                    cell.bg = packed(*color);
                }
            }
            DrawCommand::Line { from, to, color, .. } => line(frame, area, *from, *to, packed(*color)),
            DrawCommand::Curve {
                from,
                control,
                to,
                color,
                ..
            } => curve(frame, area, *from, *control, *to, packed(*color)),
            DrawCommand::Badge {
                center,
                count,
                text_color,
                ..
            } => {
                let label = if *count > 9 { "+".to_string() } else { count.to_string() };
                // One cell right of the marker, on its row.
                let at = Point::new(center.x + 1.0, center.y + 1.0);
                if let Some((col, row)) = cell_at(area, at)
                    && is_blank(frame, col, row)
                {
                    text(frame, area, at, &label, packed(*text_color), TextAlign::Left);
                }
            }
        }
    }
}

/// Register one hit region per zone, clipped to `area`.
pub fn register_zone_hits(frame: &mut Frame<'_>, area: Rect, zones: &[InteractionZone]) {
    for (i, zone) in zones.iter().enumerate() {
        let Ok(index) = u32::try_from(i) else {
            break;
        };
        if index >= ZONE_HIT_CAPACITY {
            break;
        }
        let (Some(x), Some(y)) = (cell_offset(zone.x.max(0.0)), cell_offset(zone.y.max(0.0))) else {
            continue;
        };
        let (Some(right), Some(bottom)) = (
            cell_offset((zone.x + zone.width).ceil().max(0.0)),
            cell_offset((zone.y + zone.height).ceil().max(0.0)),
        ) else {
            continue;
        };
        let right = right.min(area.width).max(x.saturating_add(1));
        let bottom = bottom.min(area.height).max(y.saturating_add(1));
        if x >= area.width || y >= area.height {
            continue;
        }
        let rect = Rect::new(area.x + x, area.y + y, right - x, bottom - y);
        frame.register_hit_region(rect, HitId::new(ZONE_HIT_BASE + index));
    }
}

/// Zone index for a hit ID from [`register_zone_hits`].
#[must_use]
pub fn zone_for_hit(id: HitId) -> Option<usize> {
    let raw = id.id();
    (ZONE_HIT_BASE..ZONE_HIT_BASE + ZONE_HIT_CAPACITY)
        .contains(&raw)
        .then(|| usize::try_from(raw - ZONE_HIT_BASE).ok())
        .flatten()
}
