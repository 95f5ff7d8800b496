use super::api::CallRequest;

/// In-progress call request, edited by the operator before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequestDraft {
    pub phone_number: String,
    pub wait_for_answer: bool,
}

impl Default for CallRequestDraft {
    fn default() -> Self {
        Self {
            phone_number: String::new(),
            wait_for_answer: true,
        }
    }
}

/// A single edit to the phone number field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneEdit {
    Insert(char),
    Paste(String),
    Backspace,
    Clear,
}

impl CallRequestDraft {
    pub fn new(phone_number: impl Into<String>, wait_for_answer: bool) -> Self {
        Self {
            phone_number: phone_number.into(),
            wait_for_answer,
        }
    }

    pub fn with_wait_for_answer(wait_for_answer: bool) -> Self {
        Self {
            wait_for_answer,
            ..Self::default()
        }
    }

    pub fn push_char(&mut self, c: char) {
        if !c.is_control() {
            self.phone_number.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.phone_number.pop();
    }

    /// Insert pasted text at the end of the field. Line breaks are dropped since the
    /// field is single-line.
    pub fn insert_str(&mut self, text: &str) {
        self.phone_number
            .extend(text.chars().filter(|c| *c != '\n' && *c != '\r'));
    }

    pub fn clear_phone_number(&mut self) {
        self.phone_number.clear();
    }

    pub fn toggle_wait_for_answer(&mut self) {
        self.wait_for_answer = !self.wait_for_answer;
    }

    pub fn apply(&mut self, edit: PhoneEdit) {
        match edit {
            PhoneEdit::Insert(c) => self.push_char(c),
            PhoneEdit::Paste(text) => self.insert_str(&text),
            PhoneEdit::Backspace => self.pop_char(),
            PhoneEdit::Clear => self.clear_phone_number(),
        }
    }

    /// Wire body for the call-initiation endpoint. The number is sent verbatim.
    pub fn to_request(&self) -> CallRequest {
        CallRequest {
            phone_number: self.phone_number.clone(),
            wait_for_answer: self.wait_for_answer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft() {
        let draft = CallRequestDraft::default();
        assert_eq!(draft.phone_number, "");
        assert!(draft.wait_for_answer);
    }

    #[test]
    fn test_editing() {
        let mut draft = CallRequestDraft::default();
        for c in "+1800".chars() {
            draft.apply(PhoneEdit::Insert(c));
        }
        draft.apply(PhoneEdit::Backspace);
        assert_eq!(draft.phone_number, "+180");

        draft.apply(PhoneEdit::Clear);
        assert!(draft.phone_number.is_empty());
    }

    #[test]
    fn test_control_chars_ignored() {
        let mut draft = CallRequestDraft::default();
        draft.push_char('\t');
        draft.push_char('+');
        assert_eq!(draft.phone_number, "+");
    }

    #[test]
    fn test_paste_strips_line_breaks() {
        let mut draft = CallRequestDraft::new("+1", true);
        draft.apply(PhoneEdit::Paste("800\r\n555".to_string()));
        assert_eq!(draft.phone_number, "+1800555");
    }

    #[test]
    fn test_to_request_is_verbatim() {
        let mut draft = CallRequestDraft::new(" +18005551234 ", true);
        draft.toggle_wait_for_answer();
        let request = draft.to_request();
        assert_eq!(request.phone_number, " +18005551234 ");
        assert!(!request.wait_for_answer);
    }
}
