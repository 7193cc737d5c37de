//! Settled task outcomes

use serde::{Deserialize, Serialize};

/// The settled result of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T, E> {
    /// The task produced a value
    Fulfilled(T),

    /// The task failed with a reason
    Rejected(E),
}

impl<T, E> Outcome<T, E> {
    /// Check if the task produced a value
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Check if the task failed
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Convert into a standard `Result`
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(reason) => Err(reason),
        }
    }

    /// Borrow the fulfilled value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// Borrow the rejection reason, if any
    pub fn reason(&self) -> Option<&E> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Fulfilled(value),
            Err(reason) => Outcome::Rejected(reason),
        }
    }
}

/// An outcome tagged with the index of the task that produced it
///
/// The index is the task's position in the submitted sequence and never
/// changes, whichever order outcomes are delivered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settled<T, E> {
    /// Position of the task in the submitted sequence
    pub index: usize,

    /// What the task settled with
    pub outcome: Outcome<T, E>,
}

impl<T, E> Settled<T, E> {
    pub fn new(index: usize, outcome: impl Into<Outcome<T, E>>) -> Self {
        Self {
            index,
            outcome: outcome.into(),
        }
    }

    /// Convert into a standard `Result`, dropping the index
    pub fn into_result(self) -> Result<T, E> {
        self.outcome.into_result()
    }
}
