//! Interactive line source backed by reedline.

use cozmonaut_application::{LineEvent, LineSource};
use reedline::{Prompt, PromptEditMode, PromptHistorySearch, Reedline, Signal};
use std::borrow::Cow;

/// Fixed prompt without indicators or right-hand segment.
#[derive(Debug, Clone)]
pub struct ConsolePrompt {
    text: String,
}

impl ConsolePrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Prompt for ConsolePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Owned(format!("(search: {}) ", history_search.term))
    }
}

/// Reads lines from the terminal.
pub struct ReedlineSource {
    editor: Reedline,
    prompt: ConsolePrompt,
}

impl ReedlineSource {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            editor: Reedline::create(),
            prompt: ConsolePrompt::new(prompt),
        }
    }
}

impl LineSource for ReedlineSource {
    fn read_line(&mut self) -> LineEvent {
        match self.editor.read_line(&self.prompt) {
            Ok(Signal::Success(line)) => LineEvent::Line(line),
            Ok(Signal::CtrlC) => LineEvent::Interrupted,
            Ok(Signal::CtrlD) => LineEvent::Eof,
            Err(e) => LineEvent::Failed(e.to_string()),
        }
    }
}
