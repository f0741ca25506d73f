//! Results of mutations that carry best-effort side effects.
//!
//! The primary value is the committed mutation. Side effects that may fail
//! without undoing it (notifications, media file removal) are reported next
//! to it instead of through the error channel.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SecondaryEffect {
    Notification { recipient: usize },
    MediaDeletion { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryFailure {
    #[serde(flatten)]
    pub effect: SecondaryEffect,
    pub reason: String,
}

#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub secondary: Vec<SecondaryFailure>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Outcome {
            value,
            secondary: vec![],
        }
    }

    /// Records the failure of a side effect, if any.
    pub fn absorb(&mut self, effect: Result<(), SecondaryFailure>) {
        if let Err(failure) = effect {
            self.secondary.push(failure);
        }
    }

    pub fn extend(&mut self, failures: impl IntoIterator<Item = SecondaryFailure>) {
        self.secondary.extend(failures);
    }

    pub fn is_clean(&self) -> bool {
        self.secondary.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            secondary: self.secondary,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
