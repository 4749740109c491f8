//! In-memory conversation history. Nothing is persisted.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User      => "You",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Saved chart for assistant turns that returned one.
    pub plot: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self { Self::default() }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn { role: Role::User, text: text.into(), plot: None });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>, plot: Option<PathBuf>) {
        self.turns.push(Turn { role: Role::Assistant, text: text.into(), plot });
    }

    pub fn turns(&self) -> &[Turn] { &self.turns }

    pub fn len(&self) -> usize { self.turns.len() }

    pub fn is_empty(&self) -> bool { self.turns.is_empty() }
}
