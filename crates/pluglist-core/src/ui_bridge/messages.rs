/// Utility functions for creating common messages
pub mod util {
    use std::time::SystemTime;

    use crate::ui_bridge::{MessageSeverity, UiMessage};

    fn message(source: &str, text: &str, severity: MessageSeverity) -> UiMessage {
        UiMessage {
            text: text.to_string(),
            severity,
            source: source.to_string(),
            timestamp: SystemTime::now(),
        }
    }

    /// Create an info message
    pub fn info(source: &str, text: &str) -> UiMessage {
        message(source, text, MessageSeverity::Info)
    }

    /// Create a warning message
    pub fn warning(source: &str, text: &str) -> UiMessage {
        message(source, text, MessageSeverity::Warning)
    }

    /// Create an error message
    pub fn error(source: &str, text: &str) -> UiMessage {
        message(source, text, MessageSeverity::Error)
    }
}
