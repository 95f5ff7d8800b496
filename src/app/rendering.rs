// Rendering - draw() method and the shell around the call form

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{App, BackendHealth};
use crate::components::call_form::FORM_WIDTH;
use crate::components::{centered_rect, Component};
use crate::config::Theme;
use crate::input::focus::FocusArea;
use crate::error::{DialerError, Result};

impl App {
    pub(super) fn draw(&mut self) -> Result<()> {
        self.call_form
            .sync(self.controller.draft(), self.controller.state());

        let call_form = &self.call_form;
        let theme = &self.theme;
        let health = &self.health;
        let backend = self.controller.backend();
        let endpoint = backend.endpoint();
        let pending = self.controller.state().is_pending();
        let focused = self.call_form.focused();

        self.terminal
            .draw(|frame| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Min(0),
                        Constraint::Length(1),
                    ])
                    .split(frame.area());

                render_header(frame, chunks[0], theme, endpoint, health);
                let form_height = call_form.height_for(FORM_WIDTH);
                let form_area = centered_rect(FORM_WIDTH, form_height, chunks[1]);
                call_form.render(frame, form_area, true);
                render_footer(frame, chunks[2], theme, pending, focused);
            })
            .map_err(|e| DialerError::Terminal(e.to_string()))?;

        Ok(())
    }
}

fn render_header(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    endpoint: &str,
    health: &BackendHealth,
) {
    let (status, color) = match health {
        BackendHealth::Checking => ("◌ checking", theme.colors.warning.to_color()),
        BackendHealth::Online => ("● online", theme.colors.success.to_color()),
        BackendHealth::Unreachable(_) => ("✕ unreachable", theme.colors.error.to_color()),
    };

    let line = Line::from(vec![
        Span::styled(
            " ridge-dialer ",
            Style::default()
                .fg(theme.colors.background.to_color())
                .bg(theme.colors.primary.to_color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(endpoint.to_string(), Style::default().fg(theme.colors.muted.to_color())),
        Span::raw(" "),
        Span::styled(status, Style::default().fg(color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn footer_hints(pending: bool, focused: FocusArea) -> &'static [(&'static str, &'static str)] {
    if pending {
        return &[("Esc", "quit")];
    }
    match focused {
        FocusArea::PhoneNumber => &[
            ("Tab", "next field"),
            ("Enter", "call"),
            ("Ctrl-U", "clear"),
            ("Ctrl-R", "recheck backend"),
            ("Esc", "quit"),
        ],
        FocusArea::WaitForAnswer => &[
            ("Tab", "next field"),
            ("Space", "toggle"),
            ("Ctrl-R", "recheck backend"),
            ("Esc", "quit"),
        ],
        FocusArea::Submit => &[
            ("Tab", "next field"),
            ("Enter", "call"),
            ("Ctrl-R", "recheck backend"),
            ("Esc", "quit"),
        ],
    }
}

fn render_footer(frame: &mut Frame, area: Rect, theme: &Theme, pending: bool, focused: FocusArea) {
    let hints = footer_hints(pending, focused);

    let key_style = Style::default()
        .fg(theme.colors.accent.to_color())
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(theme.colors.muted.to_color());

    let mut spans = vec![Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(format!(" {}  ", label), text_style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_hints_follow_focus() {
        assert_eq!(footer_hints(true, FocusArea::PhoneNumber), &[("Esc", "quit")]);
        assert!(footer_hints(false, FocusArea::PhoneNumber).contains(&("Ctrl-U", "clear")));
        assert!(footer_hints(false, FocusArea::WaitForAnswer).contains(&("Space", "toggle")));
        assert!(!footer_hints(false, FocusArea::Submit).contains(&("Space", "toggle")));
    }
}
