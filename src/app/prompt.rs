use std::path::PathBuf;

use crate::app::browser::FileBrowser;

/// Inputs this short are not treated as a media location.
pub const MIN_URI_LEN: usize = 10;

pub fn is_plausible_uri(text: &str) -> bool {
    text.chars().count() > MIN_URI_LEN
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFocus {
    Text,
    Browse,
    Open,
}

/// State of the "Open media file" dialog.
#[derive(Debug)]
pub struct OpenPrompt {
    pub text: String,
    pub focus: PromptFocus,
    pub browser: Option<FileBrowser>,
}

impl Default for OpenPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenPrompt {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            focus: PromptFocus::Text,
            browser: None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn cycle_focus(&mut self, reverse: bool) {
        self.focus = match (self.focus, reverse) {
            (PromptFocus::Text, false) => PromptFocus::Browse,
            (PromptFocus::Browse, false) => PromptFocus::Open,
            (PromptFocus::Open, false) => PromptFocus::Text,

            (PromptFocus::Text, true) => PromptFocus::Open,
            (PromptFocus::Browse, true) => PromptFocus::Text,
            (PromptFocus::Open, true) => PromptFocus::Browse,
        };
    }

    /// The text to hand to the engine, if it passes the length check.
    pub fn submission(&self) -> Option<&str> {
        is_plausible_uri(&self.text).then_some(self.text.as_str())
    }

    pub fn open_browser(&mut self, start_dir: PathBuf) {
        match FileBrowser::open(&start_dir) {
            Ok(browser) => self.browser = Some(browser),
            Err(e) => tracing::warn!("cannot browse {}: {e}", start_dir.display()),
        }
    }

    pub fn close_browser(&mut self) {
        self.browser = None;
    }

    /// Activates the browser selection; a chosen file fills the text field
    /// and closes the browser.
    pub fn activate_browser_selection(&mut self) {
        let Some(browser) = self.browser.as_mut() else {
            return;
        };

        match browser.activate() {
            Ok(Some(uri)) => {
                self.text = uri;
                self.browser = None;
                self.focus = PromptFocus::Open;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("cannot open directory: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_inputs_are_not_submitted() {
        let mut prompt = OpenPrompt::new();
        for c in "a.mp3".chars() {
            prompt.insert_char(c);
        }
        assert_eq!(prompt.submission(), None);

        prompt.text = "0123456789".to_string();
        assert_eq!(prompt.submission(), None);

        prompt.text = "/music/a.mp3".to_string();
        assert_eq!(prompt.submission(), Some("/music/a.mp3"));
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut prompt = OpenPrompt::new();
        prompt.insert_char('x');
        prompt.insert_char('y');
        prompt.backspace();
        assert_eq!(prompt.text, "x");
        prompt.backspace();
        prompt.backspace();
        assert_eq!(prompt.text, "");
    }

    #[test]
    fn focus_cycles_through_fields() {
        let mut prompt = OpenPrompt::new();
        prompt.cycle_focus(false);
        assert_eq!(prompt.focus, PromptFocus::Browse);
        prompt.cycle_focus(false);
        assert_eq!(prompt.focus, PromptFocus::Open);
        prompt.cycle_focus(false);
        assert_eq!(prompt.focus, PromptFocus::Text);
        prompt.cycle_focus(true);
        assert_eq!(prompt.focus, PromptFocus::Open);
    }

    #[test]
    fn choosing_a_file_fills_the_text_field() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("episode.mp3"), b"").unwrap();

        let mut prompt = OpenPrompt::new();
        prompt.open_browser(tmp.path().to_path_buf());
        prompt.browser.as_mut().unwrap().next();
        prompt.activate_browser_selection();

        assert!(prompt.browser.is_none());
        assert!(prompt.text.starts_with("file://"));
        assert!(prompt.text.ends_with("episode.mp3"));
        assert_eq!(prompt.focus, PromptFocus::Open);
    }
}
