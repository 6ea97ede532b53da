// Keyboard state for one tag input box.
//
// States: Idle (nothing highlighted) or At(i), an index into the current
// suggestion list.
//
//   Down   -> At(min(i + 1, last)), list recomputed and redisplayed
//   Up     -> At(i - 1), or Idle when stepping above the first item
//   Enter  -> At(i): commit suggestions[i]; Idle: commit the trimmed text
//   Other  -> Idle; the list is recomputed once the new text arrives
//   blur   -> Idle, list hidden after the grace delay
//
// Any change of text resets to Idle so a stale index is never applied to a
// freshly computed list.

use crate::types::Axis;
use log::debug;

use super::SuggestionEngine;

pub const DEFAULT_BLUR_GRACE_MS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Idle,
    At(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    /// Any other keystroke; the text change itself is fed through `set_text`.
    Other,
}

/// What the rendering surface has to do after an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEffect {
    Show {
        suggestions: Vec<String>,
        highlighted: Option<usize>,
    },
    Hide {
        delay_ms: u64,
    },
    Committed(String),
    Nothing,
}

#[derive(Debug, Clone)]
pub struct SuggestionInput {
    axis: Axis,
    text: String,
    suggestions: Vec<String>,
    highlight: Highlight,
    blur_grace_ms: u64,
}

impl SuggestionInput {
    pub fn new(axis: Axis) -> Self {
        Self::with_grace(axis, DEFAULT_BLUR_GRACE_MS)
    }

    pub fn with_grace(axis: Axis, blur_grace_ms: u64) -> Self {
        Self {
            axis,
            text: String::new(),
            suggestions: Vec::new(),
            highlight: Highlight::Idle,
            blur_grace_ms,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.suggestions.clear();
        self.highlight = Highlight::Idle;
    }

    /// The input's value changed.
    pub fn set_text(&mut self, text: &str, engine: &SuggestionEngine) -> InputEffect {
        self.text = text.to_string();
        self.highlight = Highlight::Idle;
        self.recompute(engine)
    }

    pub fn key(&mut self, key: Key, engine: &SuggestionEngine) -> InputEffect {
        match key {
            Key::Down => {
                if self.suggestions.is_empty() {
                    return InputEffect::Nothing;
                }
                let last = self.suggestions.len() - 1;
                let next = match self.highlight {
                    Highlight::Idle => 0,
                    Highlight::At(i) => (i + 1).min(last),
                };
                self.highlight = Highlight::At(next);
                self.recompute(engine)
            }
            Key::Up => {
                self.highlight = match self.highlight {
                    Highlight::Idle | Highlight::At(0) => Highlight::Idle,
                    Highlight::At(i) => Highlight::At(i - 1),
                };
                self.show()
            }
            Key::Enter => match self.highlight {
                Highlight::At(i) => match self.suggestions.get(i).cloned() {
                    Some(choice) => self.commit(choice),
                    None => {
                        self.highlight = Highlight::Idle;
                        InputEffect::Nothing
                    }
                },
                Highlight::Idle => {
                    let literal = self.text.trim().to_string();
                    if literal.is_empty() {
                        InputEffect::Nothing
                    } else {
                        self.commit(literal)
                    }
                }
            },
            Key::Other => {
                self.highlight = Highlight::Idle;
                InputEffect::Nothing
            }
        }
    }

    /// Pointer selection of a displayed suggestion.
    pub fn select(&mut self, choice: &str) -> InputEffect {
        self.commit(choice.to_string())
    }

    pub fn blur(&mut self) -> InputEffect {
        self.highlight = Highlight::Idle;
        InputEffect::Hide {
            delay_ms: self.blur_grace_ms,
        }
    }

    fn recompute(&mut self, engine: &SuggestionEngine) -> InputEffect {
        self.suggestions = engine.suggest(&self.text, self.axis);
        if let Highlight::At(i) = self.highlight {
            if i >= self.suggestions.len() {
                self.highlight = match self.suggestions.len() {
                    0 => Highlight::Idle,
                    n => Highlight::At(n - 1),
                };
            }
        }
        self.show()
    }

    fn show(&self) -> InputEffect {
        if self.suggestions.is_empty() {
            return InputEffect::Hide { delay_ms: 0 };
        }
        InputEffect::Show {
            suggestions: self.suggestions.clone(),
            highlighted: match self.highlight {
                Highlight::Idle => None,
                Highlight::At(i) => Some(i),
            },
        }
    }

    fn commit(&mut self, choice: String) -> InputEffect {
        debug!("Commit [{}] '{}'", self.axis, choice);
        self.reset();
        InputEffect::Committed(choice)
    }
}
