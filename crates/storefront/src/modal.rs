//! Modal show/hide controller.
//!
//! A modal moves through `Hidden -> Opening -> Shown -> Closing -> Hidden`.
//!
//! Closing has two completion signals: the CSS transition-end event and a
//! fallback timer for when no transition runs. Both funnel into
//! [`Modal::finish_close`], which only acts on the ticket of the close that
//! is currently pending. Whichever signal arrives second, or a timer left
//! over from an earlier close, finds no matching ticket and does nothing.

use tracing::debug;

use crate::dom::{Document, Mount};

/// Class that carries the "shown" visual state.
pub const SHOWN_CLASS: &str = "show";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Hidden,
    Opening,
    Shown,
    Closing,
}

/// Identifies one call to [`Modal::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloseTicket(u64);

/// Controller for a single modal mount point.
#[derive(Debug)]
pub struct Modal {
    mount: Mount,
    phase: ModalPhase,
    previous_focus: Option<String>,
    generation: u64,
    pending_close: Option<CloseTicket>,
}

impl Modal {
    #[must_use]
    pub const fn new(mount: Mount) -> Self {
        Self {
            mount,
            phase: ModalPhase::Hidden,
            previous_focus: None,
            generation: 0,
            pending_close: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> ModalPhase {
        self.phase
    }

    #[must_use]
    pub const fn mount(&self) -> Mount {
        self.mount
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.phase, ModalPhase::Opening | ModalPhase::Shown)
    }

    /// Show the modal. Returns `false` if it was already open or the mount
    /// point is missing.
    ///
    /// Reopening while a close is pending cancels that close and keeps the
    /// focus target recorded by the first open.
    pub fn open(&mut self, doc: &mut Document) -> bool {
        if !doc.has(self.mount) || self.is_open() {
            return false;
        }

        let reopening = self.pending_close.take().is_some();
        self.phase = ModalPhase::Opening;

        doc.set_hidden(self.mount, false);
        doc.flush_layout(self.mount);
        doc.add_class(self.mount, SHOWN_CLASS);
        doc.set_body_scroll_locked(true);
        if !reopening {
            self.previous_focus = doc.active_element().map(str::to_string);
        }
        doc.add_keydown_listener(self.mount);

        self.phase = ModalPhase::Shown;
        debug!(modal = self.mount.id(), reopening, "modal opened");
        true
    }

    /// Start closing the modal. Returns the ticket both completion signals
    /// must present, or `None` if the modal was not open.
    pub fn close(&mut self, doc: &mut Document) -> Option<CloseTicket> {
        if !self.is_open() {
            return None;
        }

        self.phase = ModalPhase::Closing;
        doc.remove_class(self.mount, SHOWN_CLASS);
        doc.set_body_scroll_locked(false);

        self.generation += 1;
        let ticket = CloseTicket(self.generation);
        self.pending_close = Some(ticket);
        Some(ticket)
    }

    /// Transition-end signal: completes whatever close is pending.
    pub fn on_transition_end(&mut self, doc: &mut Document) -> bool {
        match self.pending_close {
            Some(ticket) => self.finish_close(ticket, doc),
            None => false,
        }
    }

    /// Hide the modal, restore focus and drop the escape listener.
    ///
    /// Runs at most once per ticket; returns whether it ran.
    pub fn finish_close(&mut self, ticket: CloseTicket, doc: &mut Document) -> bool {
        if self.pending_close != Some(ticket) {
            return false;
        }
        self.pending_close = None;
        self.phase = ModalPhase::Hidden;

        doc.set_hidden(self.mount, true);
        if let Some(previous) = self.previous_focus.take() {
            doc.focus(previous);
        }
        doc.remove_keydown_listener(self.mount);

        debug!(modal = self.mount.id(), "modal hidden");
        true
    }
}

/// Focus trap for Tab inside a modal.
///
/// Given the modal's focusable elements in tab order and the currently
/// focused id, returns the element to focus instead of the browser default:
/// the first element when tabbing forward off the last, the last when
/// shift-tabbing backward off the first. `None` means no wrap is needed.
#[must_use]
pub fn maintain_focus<'a>(
    focusable: &'a [String],
    active: Option<&str>,
    shift: bool,
) -> Option<&'a str> {
    let (first, last) = (focusable.first()?, focusable.last()?);

    if shift && active == Some(first.as_str()) {
        Some(last.as_str())
    } else if !shift && active == Some(last.as_str()) {
        Some(first.as_str())
    } else {
        None
    }
}
