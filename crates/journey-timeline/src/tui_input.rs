//! Map ftui terminal events onto [`TimelineInput`]s.
//!
//! | Input                 | Action                 |
//! |-----------------------|------------------------|
//! | `←` / `→`             | pan earlier / later    |
//! | `+` `=` / `-` `_`     | finer / coarser scale  |
//! | wheel up / down       | finer / coarser scale  |
//! | `Space`               | play / pause           |
//! | `r`                   | restart playback       |
//! | `Tab` / `Shift+Tab`   | next / previous marker |
//! | `Enter`               | activate focus         |
//! | `Esc`                 | clear focus            |
//! | mouse move            | hover                  |
//! | left click            | select                 |
//! | left drag             | scrub                  |

use ftui::layout::Rect;
use ftui::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};

use crate::engine::TimelineInput;
use crate::layout::TimelineLayout;

/// Fraction of the pannable range moved per arrow key.
pub const PAN_STEP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    origin_x: u16,
    moved: bool,
}

/// Stateful mapper; tracks the left-button drag in progress.
#[derive(Debug, Clone)]
pub struct TuiInputMapper {
    area: Rect,
    plot_left: u16,
    plot_width: u16,
    drag: Option<Drag>,
}

impl TuiInputMapper {
    #[must_use]
    pub fn new(area: Rect, plot_left: u16) -> Self {
        let plot_left = plot_left.min(area.width);
        Self {
            area,
            plot_left,
            plot_width: area.width - plot_left,
            drag: None,
        }
    }

    /// Mapper matching an engine laid out on `area` in cell units.
    #[must_use]
    pub fn from_layout(area: Rect, layout: &TimelineLayout) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let plot_left = layout.plot_left().round().clamp(0.0, f64::from(u16::MAX)) as u16;
        Self::new(area, plot_left)
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer position in surface units (cell centers).
    fn local(&self, x: u16, y: u16) -> (f64, f64) {
        (
            f64::from(x) - f64::from(self.area.x) + 0.5,
            f64::from(y) - f64::from(self.area.y) + 0.5,
        )
    }

    fn inside(&self, x: u16, y: u16) -> bool {
        x >= self.area.x
            && y >= self.area.y
            && x < self.area.x.saturating_add(self.area.width)
            && y < self.area.y.saturating_add(self.area.height)
    }

    /// Translate one event. Drags keep tracking outside the area.
    pub fn map_event(&mut self, event: &Event) -> Vec<TimelineInput> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Self::map_key(key.code).into_iter().collect(),
            Event::Mouse(mouse) => self.map_mouse(mouse.kind, mouse.x, mouse.y),
            _ => Vec::new(),
        }
    }

    fn map_key(code: KeyCode) -> Option<TimelineInput> {
        Some(match code {
            KeyCode::Left => TimelineInput::Pan(PAN_STEP),
            KeyCode::Right => TimelineInput::Pan(-PAN_STEP),
            KeyCode::Char('+' | '=') => TimelineInput::StepScale(-1),
            KeyCode::Char('-' | '_') => TimelineInput::StepScale(1),
            KeyCode::Char(' ') => TimelineInput::TogglePlay,
            KeyCode::Char('r' | 'R') => TimelineInput::Restart,
            KeyCode::Tab => TimelineInput::FocusNext,
            KeyCode::BackTab => TimelineInput::FocusPrev,
            KeyCode::Enter => TimelineInput::Activate,
            KeyCode::Escape => TimelineInput::ClearFocus,
            _ => return None,
        })
    }

    fn map_mouse(&mut self, kind: MouseEventKind, x: u16, y: u16) -> Vec<TimelineInput> {
        match kind {
            MouseEventKind::Down(MouseButton::Left) if self.inside(x, y) => {
                self.drag = Some(Drag {
                    origin_x: x,
                    moved: false,
                });
                Vec::new()
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(drag) = self.drag.as_mut() else {
                    return Vec::new();
                };
                let mut out = Vec::with_capacity(2);
                if !drag.moved {
                    drag.moved = true;
                    out.push(TimelineInput::ScrubStart);
                }
                let width = f64::from(self.plot_width.max(1));
                let delta = f64::from(x) - f64::from(drag.origin_x);
                out.push(TimelineInput::Scrub(delta / width));
                out
            }
            MouseEventKind::Up(MouseButton::Left) => match self.drag.take() {
                Some(Drag { moved: true, .. }) => vec![TimelineInput::ScrubEnd],
                Some(Drag { moved: false, .. }) => {
                    let (lx, ly) = self.local(x, y);
                    vec![TimelineInput::Click { x: lx, y: ly }]
                }
                None => Vec::new(),
            },
            MouseEventKind::Moved => {
                if self.inside(x, y) {
                    let (lx, ly) = self.local(x, y);
                    vec![TimelineInput::Hover { x: lx, y: ly }]
                } else {
                    vec![TimelineInput::HoverEnd]
                }
            }
            MouseEventKind::ScrollUp if self.inside(x, y) => vec![TimelineInput::StepScale(-1)],
            MouseEventKind::ScrollDown if self.inside(x, y) => vec![TimelineInput::StepScale(1)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftui::{KeyEvent, MouseEvent};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code))
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> Event {
        Event::Mouse(MouseEvent::new(kind, x, y))
    }

    fn mapper() -> TuiInputMapper {
        TuiInputMapper::new(Rect::new(10, 5, 60, 10), 10)
    }

    #[test]
    fn keys_map_to_actions() {
        let mut m = mapper();
        assert_eq!(m.map_event(&key(KeyCode::Left)), [TimelineInput::Pan(PAN_STEP)]);
        assert_eq!(m.map_event(&key(KeyCode::Right)), [TimelineInput::Pan(-PAN_STEP)]);
        assert_eq!(m.map_event(&key(KeyCode::Char('+'))), [TimelineInput::StepScale(-1)]);
        assert_eq!(m.map_event(&key(KeyCode::Char('-'))), [TimelineInput::StepScale(1)]);
        assert_eq!(m.map_event(&key(KeyCode::Char(' '))), [TimelineInput::TogglePlay]);
        assert_eq!(m.map_event(&key(KeyCode::Char('r'))), [TimelineInput::Restart]);
        assert_eq!(m.map_event(&key(KeyCode::Tab)), [TimelineInput::FocusNext]);
        assert_eq!(m.map_event(&key(KeyCode::BackTab)), [TimelineInput::FocusPrev]);
        assert_eq!(m.map_event(&key(KeyCode::Enter)), [TimelineInput::Activate]);
        assert_eq!(m.map_event(&key(KeyCode::Escape)), [TimelineInput::ClearFocus]);
        assert!(m.map_event(&key(KeyCode::Char('q'))).is_empty());
    }

    #[test]
    fn click_without_motion_selects() {
        let mut m = mapper();
        assert!(m.map_event(&mouse(MouseEventKind::Down(MouseButton::Left), 30, 7)).is_empty());
        assert_eq!(
            m.map_event(&mouse(MouseEventKind::Up(MouseButton::Left), 30, 7)),
            [TimelineInput::Click { x: 20.5, y: 2.5 }]
        );
        assert!(!m.is_dragging());
    }

    #[test]
    fn drag_scrubs_relative_to_origin_even_outside_area() {
        let mut m = mapper();
        m.map_event(&mouse(MouseEventKind::Down(MouseButton::Left), 30, 7));
        assert_eq!(
            m.map_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 35, 7)),
            [TimelineInput::ScrubStart, TimelineInput::Scrub(0.1)]
        );
        assert_eq!(
            m.map_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 0, 30)),
            [TimelineInput::Scrub(-0.6)]
        );
        assert_eq!(
            m.map_event(&mouse(MouseEventKind::Up(MouseButton::Left), 0, 30)),
            [TimelineInput::ScrubEnd]
        );
    }

    #[test]
    fn press_outside_area_is_ignored() {
        let mut m = mapper();
        assert!(m.map_event(&mouse(MouseEventKind::Down(MouseButton::Left), 0, 0)).is_empty());
        assert!(m.map_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 5, 0)).is_empty());
        assert!(m.map_event(&mouse(MouseEventKind::Up(MouseButton::Left), 5, 0)).is_empty());
    }

    #[test]
    fn hover_tracks_area() {
        let mut m = mapper();
        assert_eq!(
            m.map_event(&mouse(MouseEventKind::Moved, 10, 5)),
            [TimelineInput::Hover { x: 0.5, y: 0.5 }]
        );
        assert_eq!(m.map_event(&mouse(MouseEventKind::Moved, 9, 5)), [TimelineInput::HoverEnd]);
    }
}
