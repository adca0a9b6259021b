use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

pub(crate) const MAX_PATH_CHARS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PromptEvent {
    Confirmed(String),
    Cancelled,
}

/// Single-line directory prompt. While open it owns keyboard input.
#[derive(Debug, Default)]
pub(crate) struct PathPrompt {
    is_open: bool,
    current_line: String,
}

impl PathPrompt {
    pub(crate) fn is_open(&self) -> bool {
        self.is_open
    }

    pub(crate) fn current_line(&self) -> &str {
        &self.current_line
    }

    /// Opens the prompt prefilled with `initial`. No-op when already open.
    pub(crate) fn open(&mut self, initial: &str) {
        if self.is_open {
            return;
        }
        self.is_open = true;
        self.current_line.clear();
        self.append_printable_text(initial);
    }

    pub(crate) fn handle_key_event(&mut self, key_event: &KeyEvent) -> Option<PromptEvent> {
        if !self.is_open || key_event.state != ElementState::Pressed {
            return None;
        }
        if let PhysicalKey::Code(code) = key_event.physical_key {
            if let Some(event) = self.handle_key_code(code) {
                return Some(event);
            }
        }
        if let Some(text) = key_event.text.as_ref() {
            self.append_printable_text(text);
        }
        None
    }

    fn handle_key_code(&mut self, key_code: KeyCode) -> Option<PromptEvent> {
        match key_code {
            KeyCode::Backspace => {
                self.current_line.pop();
                None
            }
            KeyCode::Enter | KeyCode::NumpadEnter => {
                self.is_open = false;
                let line = std::mem::take(&mut self.current_line);
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    Some(PromptEvent::Cancelled)
                } else {
                    Some(PromptEvent::Confirmed(trimmed.to_string()))
                }
            }
            KeyCode::Escape => {
                self.is_open = false;
                self.current_line.clear();
                Some(PromptEvent::Cancelled)
            }
            _ => None,
        }
    }

    fn append_printable_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            if self.current_line.chars().count() >= MAX_PATH_CHARS {
                break;
            }
            self.current_line.push(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_prefilled_and_confirms_trimmed_text() {
        let mut prompt = PathPrompt::default();
        prompt.open("/anims/");
        prompt.append_printable_text("walk  ");
        assert_eq!(prompt.current_line(), "/anims/walk  ");

        let event = prompt.handle_key_code(KeyCode::Enter);
        assert_eq!(event, Some(PromptEvent::Confirmed("/anims/walk".to_string())));
        assert!(!prompt.is_open());
        assert_eq!(prompt.current_line(), "");
    }

    #[test]
    fn escape_cancels_and_clears() {
        let mut prompt = PathPrompt::default();
        prompt.open("/anims/walk");
        assert_eq!(prompt.handle_key_code(KeyCode::Escape), Some(PromptEvent::Cancelled));
        assert!(!prompt.is_open());
        assert_eq!(prompt.current_line(), "");
    }

    #[test]
    fn empty_confirmation_is_a_cancel() {
        let mut prompt = PathPrompt::default();
        prompt.open("   ");
        assert_eq!(prompt.handle_key_code(KeyCode::Enter), Some(PromptEvent::Cancelled));
    }

    #[test]
    fn backspace_and_control_characters() {
        let mut prompt = PathPrompt::default();
        prompt.open("");
        prompt.append_printable_text("ab\u{8}\tc");
        assert_eq!(prompt.current_line(), "abc");
        assert_eq!(prompt.handle_key_code(KeyCode::Backspace), None);
        assert_eq!(prompt.current_line(), "ab");
    }

    #[test]
    fn opening_twice_keeps_the_current_text() {
        let mut prompt = PathPrompt::default();
        prompt.open("/a");
        prompt.append_printable_text("b");
        prompt.open("/other");
        assert_eq!(prompt.current_line(), "/ab");
    }

    #[test]
    fn input_is_capped() {
        let mut prompt = PathPrompt::default();
        prompt.open(&"x".repeat(MAX_PATH_CHARS + 10));
        assert_eq!(prompt.current_line().chars().count(), MAX_PATH_CHARS);
    }
}
