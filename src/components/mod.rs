pub mod call_form;
pub mod spinner;

use crossterm::event::Event;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    Frame,
};

use crate::action::Action;

pub use call_form::CallForm;

pub trait Component {
    fn handle_event(&mut self, event: &Event) -> Option<Action>;

    fn update(&mut self, action: &Action);

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool);
}

/// Rect of at most `width` x `height`, centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(20, 10, Rect::new(0, 0, 100, 50));
        assert_eq!(rect, Rect::new(40, 20, 20, 10));
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 30, 8);
        assert_eq!(centered_rect(60, 20, area), area);
    }
}
