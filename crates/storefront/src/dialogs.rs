//! Blocking confirm/alert dialogs.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

/// The two native dialogs the widget uses.
pub trait Dialogs: Send + std::fmt::Debug {
    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Show a notice.
    fn alert(&mut self, message: &str);
}

/// A dialog interaction, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    Confirm { message: String, answer: bool },
    Alert(String),
}

/// Dialogs that answer every confirmation the same way and record what was
/// shown. The transcript handle stays readable after the dialogs are boxed
/// into the application state.
#[derive(Debug, Clone)]
pub struct PresetDialogs {
    answer: bool,
    transcript: Arc<Mutex<Vec<DialogEvent>>>,
}

impl PresetDialogs {
    #[must_use]
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            transcript: Arc::default(),
        }
    }

    /// Shared handle to the recorded interactions.
    #[must_use]
    pub fn transcript(&self) -> Arc<Mutex<Vec<DialogEvent>>> {
        Arc::clone(&self.transcript)
    }

    fn record(&self, event: DialogEvent) {
        if let Ok(mut events) = self.transcript.lock() {
            events.push(event);
        }
    }
}

impl Dialogs for PresetDialogs {
    fn confirm(&mut self, message: &str) -> bool {
        self.record(DialogEvent::Confirm {
            message: message.to_string(),
            answer: self.answer,
        });
        self.answer
    }

    fn alert(&mut self, message: &str) {
        tracing::info!(message, "alert");
        self.record(DialogEvent::Alert(message.to_string()));
    }
}

/// Dialogs on the controlling terminal: prompts go to stderr and answers
/// are read from stdin. Anything but `y`/`yes` declines, as does a closed
/// stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalDialogs;

impl Dialogs for TerminalDialogs {
    fn confirm(&mut self, message: &str) -> bool {
        let mut stderr = io::stderr().lock();
        if write!(stderr, "{message} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation");
                false
            }
        }
    }

    fn alert(&mut self, message: &str) {
        let _ = writeln!(io::stderr().lock(), "{message}");
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
