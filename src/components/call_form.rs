use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::action::Action;
use crate::call::{CallRequestDraft, SubmissionState};
use crate::components::spinner::Spinner;
use crate::components::Component;
use crate::config::Theme;
use crate::input::focus::{FocusArea, FocusManager};

pub const FORM_WIDTH: u16 = 56;
pub const FORM_HEIGHT: u16 = 16;
// Outer border plus every row above the banner
const FIXED_ROWS_HEIGHT: u16 = 12;

const PHONE_PLACEHOLDER: &str = "+18005551234";
const PHONE_HINT: &str = "Format: +1XXXXXXXXXX (country code required)";
const SUBMIT_LABEL: &str = "Make Call";
const PENDING_LABEL: &str = "Calling...";

/// The call request form: phone number field, "wait for answer" checkbox, submit
/// button and result banner.
///
/// Holds a snapshot of the controller's draft and state; the app refreshes it with
/// [`CallForm::sync`] before every draw. While a request is pending every control is
/// disabled.
pub struct CallForm {
    draft: CallRequestDraft,
    state: SubmissionState,
    focus: FocusManager,
    spinner: Spinner,
    theme: Theme,
}

impl CallForm {
    pub fn new(theme: Theme) -> Self {
        Self {
            draft: CallRequestDraft::default(),
            state: SubmissionState::Idle,
            focus: FocusManager::new(),
            spinner: Spinner::default(),
            theme,
        }
    }

    pub fn sync(&mut self, draft: &CallRequestDraft, state: &SubmissionState) {
        if &self.draft != draft {
            self.draft = draft.clone();
        }
        if &self.state != state {
            // Cleared after a successful call, ready for the next number
            if matches!(state.banner(), Some((true, _))) {
                self.focus.focus(FocusArea::PhoneNumber);
            }
            self.state = state.clone();
        }
        self.spinner.set_active(state.is_pending());
    }

    pub fn focused(&self) -> FocusArea {
        self.focus.current()
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_pending()
    }

    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Char('c') if ctrl => return Some(Action::Quit),
            _ => {}
        }

        if self.is_locked() {
            return None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => return Some(Action::FocusNext),
            KeyCode::BackTab | KeyCode::Up => return Some(Action::FocusPrev),
            KeyCode::Char('r') if ctrl => return Some(Action::CheckHealth),
            _ => {}
        }

        match self.focus.current() {
            FocusArea::PhoneNumber => match key.code {
                KeyCode::Enter => Some(Action::SubmitCall),
                KeyCode::Backspace => Some(Action::PhoneBackspace),
                KeyCode::Char('u') if ctrl => Some(Action::PhoneClear),
                KeyCode::Char(c) if !ctrl => Some(Action::PhoneInput(c)),
                _ => None,
            },
            FocusArea::WaitForAnswer => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(Action::ToggleWaitForAnswer),
                _ => None,
            },
            FocusArea::Submit => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(Action::SubmitCall),
                _ => None,
            },
        }
    }

    fn render_phone_field(&self, frame: &mut Frame, area: Rect) {
        let locked = self.is_locked();
        let focused = !locked && self.focus.is_focused(FocusArea::PhoneNumber);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if locked {
                self.theme.disabled_style()
            } else {
                self.theme.border_style(focused)
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text = &self.draft.phone_number;
        let width = inner.width.saturating_sub(1) as usize;
        let len = text.chars().count();

        let line = if text.is_empty() {
            Line::from(Span::styled(
                PHONE_PLACEHOLDER,
                Style::default().fg(self.theme.colors.muted.to_color()),
            ))
        } else {
            // Keep the end of long input visible
            let visible: String = text.chars().skip(len.saturating_sub(width)).collect();
            let style = if locked {
                self.theme.disabled_style()
            } else {
                Style::default().fg(self.theme.colors.foreground.to_color())
            };
            Line::from(Span::styled(visible, style))
        };
        frame.render_widget(Paragraph::new(line), inner);

        if focused && inner.width > 0 {
            let cursor_x = inner.x + len.min(width) as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn render_checkbox(&self, frame: &mut Frame, area: Rect) {
        let locked = self.is_locked();
        let focused = !locked && self.focus.is_focused(FocusArea::WaitForAnswer);
        let form = &self.theme.form;

        let marker = if self.draft.wait_for_answer {
            &form.checkbox_checked
        } else {
            &form.checkbox_unchecked
        };
        let indicator = if focused {
            self.theme.focus.focus_indicator.as_str()
        } else {
            " "
        };
        let style = if locked {
            self.theme.disabled_style()
        } else if focused {
            self.theme.title_style(true)
        } else {
            Style::default().fg(self.theme.colors.foreground.to_color())
        };

        let line = Line::from(vec![
            Span::styled(format!("{} ", indicator), self.theme.title_style(true)),
            Span::styled(format!("{} Wait for answer", marker), style),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_button(&self, frame: &mut Frame, area: Rect) {
        let locked = self.is_locked();
        let focused = !locked && self.focus.is_focused(FocusArea::Submit);
        let form = &self.theme.form;

        let (label, style) = if locked {
            (
                format!(" {} {} ", self.spinner.current_frame(), PENDING_LABEL),
                self.theme
                    .disabled_style()
                    .bg(form.button_bg.to_color())
                    .add_modifier(Modifier::DIM),
            )
        } else {
            let mut style = Style::default()
                .fg(form.button_fg.to_color())
                .bg(form.button_bg.to_color());
            if focused {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            (format!(" {} ", SUBMIT_LABEL), style)
        };

        let button = Paragraph::new(Line::from(Span::styled(label, style)))
            .alignment(Alignment::Center);
        frame.render_widget(button, area);
    }

    /// Banner text without its border, or `None` when there is no result to show
    fn banner_text(&self) -> Option<(bool, Paragraph<'_>)> {
        let (success, message) = self.state.banner()?;
        let icon = if success { "✓" } else { "✗" };
        let text = Paragraph::new(format!("{} {}", icon, message))
            .style(self.theme.banner_style(success))
            .wrap(Wrap { trim: true });
        Some((success, text))
    }

    /// Rows the bordered banner needs to show the whole message at this form width
    fn banner_height(&self, form_width: u16) -> u16 {
        // Form border, horizontal margin and banner border
        let text_width = form_width.saturating_sub(6).max(1);
        match self.banner_text() {
            Some((_, text)) => u16::try_from(text.line_count(text_width))
                .unwrap_or(u16::MAX)
                .saturating_add(2),
            None => 0,
        }
    }

    /// Height the form needs at `width`. Long backend messages grow the banner
    /// instead of being cut off.
    pub fn height_for(&self, width: u16) -> u16 {
        FORM_HEIGHT.max(FIXED_ROWS_HEIGHT.saturating_add(self.banner_height(width)))
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect) {
        let Some((success, text)) = self.banner_text() else {
            return;
        };

        let border_color = if success {
            self.theme.colors.success.to_color()
        } else {
            self.theme.colors.error.to_color()
        };

        let banner = text.block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
        frame.render_widget(banner, area);
    }
}

impl Component for CallForm {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Paste(text)
                if !self.is_locked() && self.focus.is_focused(FocusArea::PhoneNumber) =>
            {
                Some(Action::Paste(text.clone()))
            }
            _ => None,
        }
    }

    fn update(&mut self, action: &Action) {
        match action {
            Action::FocusNext => self.focus.next(),
            Action::FocusPrev => self.focus.prev(),
            Action::Tick => {
                self.spinner.tick();
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let block = Block::default()
            .title(" Make an Outbound Call ")
            .title_alignment(Alignment::Center)
            .title_style(self.theme.title_style(focused))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(1)
            .constraints([
                Constraint::Length(1), // Label
                Constraint::Length(3), // Phone field
                Constraint::Length(1), // Hint
                Constraint::Length(1), // Spacer
                Constraint::Length(1), // Checkbox
                Constraint::Length(1), // Spacer
                Constraint::Length(1), // Button
                Constraint::Length(1), // Spacer
                Constraint::Min(0),    // Result banner
            ])
            .split(inner);

        let label_style = if self.is_locked() {
            self.theme.disabled_style()
        } else {
            Style::default()
                .fg(self.theme.colors.foreground.to_color())
                .add_modifier(Modifier::BOLD)
        };
        frame.render_widget(Paragraph::new(Span::styled("Phone Number", label_style)), chunks[0]);
        self.render_phone_field(frame, chunks[1]);
        frame.render_widget(
            Paragraph::new(Span::styled(
                PHONE_HINT,
                Style::default().fg(self.theme.colors.muted.to_color()),
            )),
            chunks[2],
        );
        self.render_checkbox(frame, chunks[4]);
        self.render_button(frame, chunks[6]);
        self.render_banner(frame, chunks[8]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn render_to_string(form: &CallForm) -> String {
        let backend = TestBackend::new(FORM_WIDTH, form.height_for(FORM_WIDTH));
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| form.render(frame, frame.area(), true))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_phone_field_keys() {
        let mut form = CallForm::new(Theme::default());
        assert_eq!(form.handle_event(&key(KeyCode::Char('+'))), Some(Action::PhoneInput('+')));
        assert_eq!(form.handle_event(&key(KeyCode::Backspace)), Some(Action::PhoneBackspace));
        assert_eq!(form.handle_event(&ctrl('u')), Some(Action::PhoneClear));
        assert_eq!(form.handle_event(&key(KeyCode::Enter)), Some(Action::SubmitCall));
        assert_eq!(
            form.handle_event(&Event::Paste("+1800".to_string())),
            Some(Action::Paste("+1800".to_string()))
        );
    }

    #[test]
    fn test_focus_routing() {
        let mut form = CallForm::new(Theme::default());
        assert_eq!(form.handle_event(&key(KeyCode::Tab)), Some(Action::FocusNext));

        form.update(&Action::FocusNext);
        assert_eq!(form.focused(), FocusArea::WaitForAnswer);
        assert_eq!(
            form.handle_event(&key(KeyCode::Char(' '))),
            Some(Action::ToggleWaitForAnswer)
        );
        assert_eq!(form.handle_event(&Event::Paste("x".to_string())), None);

        form.update(&Action::FocusNext);
        assert_eq!(form.handle_event(&key(KeyCode::Enter)), Some(Action::SubmitCall));
        assert_eq!(form.handle_event(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_locked_while_pending() {
        let mut form = CallForm::new(Theme::default());
        form.sync(&CallRequestDraft::new("+18005551234", true), &SubmissionState::Pending);

        assert!(form.is_locked());
        assert_eq!(form.handle_event(&key(KeyCode::Char('1'))), None);
        assert_eq!(form.handle_event(&key(KeyCode::Enter)), None);
        assert_eq!(form.handle_event(&key(KeyCode::Tab)), None);
        assert_eq!(form.handle_event(&Event::Paste("1".to_string())), None);
        assert_eq!(form.handle_event(&key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(form.handle_event(&ctrl('c')), Some(Action::Quit));
    }

    #[test]
    fn test_long_backend_message_is_shown_whole() {
        let detail = format!(
            "Error: failed to create SIP participant: twirp error unknown: object cannot be \
             found, trunk {} lookup failed for the configured outbound route END_MARKER",
            "ST_7hQkLmNpZx"
        );
        assert!(detail.len() >= 150);

        let mut form = CallForm::new(Theme::default());
        assert_eq!(form.height_for(FORM_WIDTH), FORM_HEIGHT);

        form.sync(
            &CallRequestDraft::new("+18005551234", true),
            &SubmissionState::Settled {
                success: false,
                message: detail,
            },
        );
        assert!(form.height_for(FORM_WIDTH) > FORM_HEIGHT);

        let screen = render_to_string(&form);
        assert!(screen.contains("✗ Error: failed to create SIP participant"));
        assert!(screen.contains("END_MARKER"));
    }

    #[test]
    fn test_success_returns_focus_to_phone_field() {
        let mut form = CallForm::new(Theme::default());
        form.update(&Action::FocusNext);
        form.update(&Action::FocusNext);
        form.sync(&CallRequestDraft::new("+18005551234", true), &SubmissionState::Pending);
        assert_eq!(form.focused(), FocusArea::Submit);

        form.sync(
            &CallRequestDraft::default(),
            &SubmissionState::Settled {
                success: true,
                message: "Call placed".to_string(),
            },
        );
        assert_eq!(form.focused(), FocusArea::PhoneNumber);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut form = CallForm::new(Theme::default());
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('1'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(form.handle_event(&release), None);
    }

    #[test]
    fn test_render_idle() {
        let form = CallForm::new(Theme::default());
        let screen = render_to_string(&form);
        assert!(screen.contains("Make an Outbound Call"));
        assert!(screen.contains("Make Call"));
        assert!(screen.contains("[x] Wait for answer"));
        assert!(!screen.contains("✓"));
        assert!(!screen.contains("✗"));
    }

    #[test]
    fn test_render_pending_label() {
        let mut form = CallForm::new(Theme::default());
        form.sync(&CallRequestDraft::new("+18005551234", false), &SubmissionState::Pending);
        let screen = render_to_string(&form);
        assert!(screen.contains("Calling..."));
        assert!(!screen.contains("Make Call "));
        assert!(screen.contains("[ ] Wait for answer"));
    }

    #[test]
    fn test_render_banners() {
        let mut form = CallForm::new(Theme::default());
        form.sync(
            &CallRequestDraft::default(),
            &SubmissionState::Settled {
                success: true,
                message: "Call placed".to_string(),
            },
        );
        assert!(render_to_string(&form).contains("✓ Call placed"));

        form.sync(
            &CallRequestDraft::new("+18005551234", true),
            &SubmissionState::Settled {
                success: false,
                message: "Agent busy".to_string(),
            },
        );
        let screen = render_to_string(&form);
        assert!(screen.contains("✗ Agent busy"));
        assert!(screen.contains("+18005551234"));
    }
}
