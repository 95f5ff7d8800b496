// Action dispatch - routes UI actions into the call controller and form

use super::App;
use crate::action::Action;
use crate::call::{FormEvent, PhoneEdit};
use crate::components::Component;
use crate::error::Result;

impl App {
    /// Single exhaustive match over Action
    pub(super) fn dispatch(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => {
                self.call_form.update(&Action::Tick);
            }
            Action::FocusNext | Action::FocusPrev => {
                self.call_form.update(&action);
            }

            Action::PhoneInput(c) => self.edit_phone(PhoneEdit::Insert(c)),
            Action::PhoneBackspace => self.edit_phone(PhoneEdit::Backspace),
            Action::PhoneClear => self.edit_phone(PhoneEdit::Clear),
            Action::Paste(text) => self.edit_phone(PhoneEdit::Paste(text)),
            Action::ToggleWaitForAnswer => self.dispatch_form(FormEvent::WaitForAnswerToggled),
            Action::SubmitCall => self.dispatch_form(FormEvent::SubmitRequested),

            Action::CheckHealth => {
                self.start_health_probe();
                self.mark_dirty();
            }
        }
        Ok(())
    }

    fn edit_phone(&mut self, edit: PhoneEdit) {
        self.dispatch_form(FormEvent::PhoneNumberEdited(edit));
    }

    fn dispatch_form(&mut self, event: FormEvent) {
        self.controller.dispatch(event);
        self.mark_dirty();
    }
}
