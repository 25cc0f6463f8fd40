//! Observable state of an in-flight account operation.
//!
//! Each operation owns one [`OutcomeCell`]. Observers subscribe to a
//! `tokio::sync::watch` receiver and always see the latest state; reading it
//! again is harmless. The observer resets the cell to `Idle` after consuming
//! a terminal state.

use crate::account::AccountResult;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> OperationState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// `Success` or `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl<T: Clone> OperationState<T> {
    /// Terminal state for a finished operation.
    pub fn from_result(result: &AccountResult<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value.clone()),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

pub struct OutcomeCell<T> {
    tx: watch::Sender<OperationState<T>>,
}

impl<T: Clone> Default for OutcomeCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> OutcomeCell<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(OperationState::Idle);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState<T>> {
        self.tx.subscribe()
    }

    /// Snapshot of the latest state.
    pub fn latest(&self) -> OperationState<T> {
        self.tx.borrow().clone()
    }

    pub fn set_loading(&self) {
        self.tx.send_replace(OperationState::Loading);
    }

    /// Publish the terminal state for `result`.
    pub fn finish(&self, result: &AccountResult<T>) {
        self.tx.send_replace(OperationState::from_result(result));
    }

    pub fn reset(&self) {
        self.tx.send_replace(OperationState::Idle);
    }
}
