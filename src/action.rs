#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Tick,

    FocusNext,
    FocusPrev,

    // Call form
    PhoneInput(char),
    PhoneBackspace,
    PhoneClear,
    Paste(String),
    ToggleWaitForAnswer,
    SubmitCall,

    /// Re-run the backend health probe
    CheckHealth,
}
