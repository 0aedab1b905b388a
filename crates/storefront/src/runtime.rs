//! Event loop that owns the application state.
//!
//! One task holds the [`AppState`] and applies commands in arrival order.
//! Follow-up commands returned by dispatch are delivered by short-lived timer
//! tasks that post back into the same channel.

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::commands::{Command, Scheduled};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("widget event loop has stopped")]
    Closed,

    #[error("widget event loop panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug)]
enum Message {
    Command(Command),
    Shutdown,
}

/// Handle to a running widget.
#[derive(Debug)]
pub struct WidgetHandle {
    tx: UnboundedSender<Message>,
    task: JoinHandle<AppState>,
}

impl WidgetHandle {
    /// Queue a command.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Closed` if the event loop is gone.
    pub fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.tx
            .send(Message::Command(command))
            .map_err(|_| RuntimeError::Closed)
    }

    /// Stop the loop after every command queued so far has run, and hand the
    /// state back. Timers still pending are dropped.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Join` if the loop task panicked.
    pub async fn shutdown(self) -> Result<AppState, RuntimeError> {
        // A closed channel means the loop already returned; the join below
        // still yields its state.
        let _ = self.tx.send(Message::Shutdown);
        Ok(self.task.await?)
    }
}

/// Move `state` into a new event-loop task.
#[must_use]
pub fn spawn(state: AppState) -> WidgetHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let weak = tx.downgrade();
    let task = tokio::spawn(run(state, rx, weak));
    WidgetHandle { tx, task }
}

async fn run(
    mut state: AppState,
    mut rx: UnboundedReceiver<Message>,
    tx: WeakUnboundedSender<Message>,
) -> AppState {
    info!("widget event loop started");

    while let Some(message) = rx.recv().await {
        match message {
            Message::Command(command) => {
                for scheduled in state.dispatch(command) {
                    schedule(&tx, scheduled);
                }
            }
            Message::Shutdown => break,
        }
    }

    info!("widget event loop stopped");
    state
}

fn schedule(tx: &WeakUnboundedSender<Message>, scheduled: Scheduled) {
    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(scheduled.after).await;
        if let Some(tx) = tx.upgrade() {
            debug!(command = scheduled.command.name(), "timer fired");
            let _ = tx.send(Message::Command(scheduled.command));
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use shop_widget_core::ProductId;

    use super::*;
    use crate::config::WidgetConfig;
    use crate::dialogs::PresetDialogs;
    use crate::dom::{Document, Mount};
    use crate::modal::ModalPhase;
    use crate::storage::MemoryStore;
    use crate::testing::sample_catalog;

    fn state() -> AppState {
        let mut state = AppState::new(
            Box::new(MemoryStore::new()),
            Document::standard(),
            Box::new(PresetDialogs::new(true)),
            &WidgetConfig::default(),
        );
        state.catalog = sample_catalog();
        state
    }

    #[tokio::test]
    async fn test_commands_apply_in_order() {
        let handle = spawn(state());
        handle.send(Command::AddToCart(ProductId::new(1))).unwrap();
        handle.send(Command::AddToCart(ProductId::new(1))).unwrap();
        handle
            .send(Command::ChangeQty {
                id: ProductId::new(1),
                delta: -1,
            })
            .unwrap();

        let state = handle.shutdown().await.unwrap();
        assert_eq!(state.cart().get(ProductId::new(1)).unwrap().qty, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_fallback_fires_without_transition() {
        let handle = spawn(state());
        handle.send(Command::OpenCart).unwrap();
        handle.send(Command::CloseCart).unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;

        let state = handle.shutdown().await.unwrap();
        assert_eq!(state.cart_modal().phase(), ModalPhase::Hidden);
        assert!(state.document().is_hidden(Mount::CartModal));
    }

    #[tokio::test(start_paused = true)]
    async fn test_modal_still_closing_before_fallback() {
        let handle = spawn(state());
        handle.send(Command::OpenCart).unwrap();
        handle.send(Command::CloseCart).unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        let state = handle.shutdown().await.unwrap();
        assert_eq!(state.cart_modal().phase(), ModalPhase::Closing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fallback_ignored_after_reopen() {
        let handle = spawn(state());
        handle.send(Command::OpenCart).unwrap();
        handle.send(Command::CloseCart).unwrap();
        handle.send(Command::OpenCart).unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;

        let state = handle.shutdown().await.unwrap();
        assert_eq!(state.cart_modal().phase(), ModalPhase::Shown);
        assert!(!state.document().is_hidden(Mount::CartModal));
    }
}
