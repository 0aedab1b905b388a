//! User actions and their dispatch.
//!
//! Every interaction the page supports is a [`Command`]. `dispatch` applies it
//! to the state synchronously and returns any follow-up commands that must
//! run later (the modal close fallback), leaving the timing to the caller.

use std::time::Duration;

use shop_widget_core::ProductId;
use tracing::debug;

use crate::dom::Mount;
use crate::error::add_breadcrumb;
use crate::modal::{CloseTicket, maintain_focus};
use crate::state::AppState;

pub const CLEAR_CART_PROMPT: &str = "Clear cart?";
pub const CHECKOUT_PROMPT: &str = "Proceed to checkout?";
pub const CHECKOUT_NOTICE: &str = "Checkout is not implemented.";

/// Keyboard key, as far as the widget cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddToCart(ProductId),
    ChangeQty { id: ProductId, delta: i64 },
    RemoveFromCart(ProductId),
    /// New search input text.
    Search(String),
    ClearSearch,
    RefreshList,
    OpenCart,
    CloseCart,
    /// Click on the modal backdrop.
    Dismiss,
    ClearCart,
    Checkout,
    KeyDown(Key),
    /// Tab pressed inside the cart modal.
    Tab { shift: bool },
    /// CSS transition on the cart modal finished.
    TransitionEnd,
    /// Fallback timer for a modal close.
    CloseTimeout(CloseTicket),
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddToCart(_) => "add_to_cart",
            Self::ChangeQty { .. } => "change_qty",
            Self::RemoveFromCart(_) => "remove_from_cart",
            Self::Search(_) => "search",
            Self::ClearSearch => "clear_search",
            Self::RefreshList => "refresh_list",
            Self::OpenCart => "open_cart",
            Self::CloseCart => "close_cart",
            Self::Dismiss => "dismiss",
            Self::ClearCart => "clear_cart",
            Self::Checkout => "checkout",
            Self::KeyDown(_) => "key_down",
            Self::Tab { .. } => "tab",
            Self::TransitionEnd => "transition_end",
            Self::CloseTimeout(_) => "close_timeout",
        }
    }

    const fn category(&self) -> &'static str {
        match self {
            Self::AddToCart(_)
            | Self::ChangeQty { .. }
            | Self::RemoveFromCart(_)
            | Self::ClearCart
            | Self::Checkout => "cart",
            Self::Search(_) | Self::ClearSearch | Self::RefreshList => "search",
            _ => "modal",
        }
    }
}

/// A command to run once `after` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled {
    pub after: Duration,
    pub command: Command,
}

impl AppState {
    /// Apply one user action.
    ///
    /// Returns the commands the caller must deliver later; today that is only
    /// the close fallback timer.
    pub fn dispatch(&mut self, command: Command) -> Vec<Scheduled> {
        debug!(command = command.name(), "dispatch");
        breadcrumb(&command);

        match command {
            Command::AddToCart(id) => {
                if self.cart.add_to_cart(id, &self.catalog) {
                    self.render_cart();
                }
            }
            Command::ChangeQty { id, delta } => {
                if self.cart.change_qty(id, delta) {
                    self.render_cart();
                }
            }
            Command::RemoveFromCart(id) => {
                if self.cart.remove_from_cart(id) {
                    self.render_cart();
                }
            }
            Command::Search(text) => {
                self.document.set_value(Mount::SearchInput, text);
                self.render_products();
            }
            Command::ClearSearch => {
                self.document.set_value(Mount::SearchInput, "");
                self.render_products();
            }
            Command::RefreshList => self.render_products(),
            Command::OpenCart => {
                self.render_cart();
                self.cart_modal.open(&mut self.document);
            }
            Command::CloseCart | Command::Dismiss => return self.close_cart(),
            Command::KeyDown(Key::Escape) => {
                if self.document.has_keydown_listener(self.cart_modal.mount()) {
                    return self.close_cart();
                }
            }
            Command::KeyDown(Key::Other(_)) => {}
            Command::Tab { shift } => self.tab(shift),
            Command::TransitionEnd => {
                self.cart_modal.on_transition_end(&mut self.document);
            }
            Command::CloseTimeout(ticket) => {
                self.cart_modal.finish_close(ticket, &mut self.document);
            }
            Command::ClearCart => {
                if self.dialogs.confirm(CLEAR_CART_PROMPT) {
                    self.cart.clear();
                    self.render_cart();
                }
            }
            Command::Checkout => {
                if self.dialogs.confirm(CHECKOUT_PROMPT) {
                    self.dialogs.alert(CHECKOUT_NOTICE);
                }
            }
        }

        Vec::new()
    }

    fn close_cart(&mut self) -> Vec<Scheduled> {
        self.cart_modal
            .close(&mut self.document)
            .map(|ticket| Scheduled {
                after: self.close_fallback,
                command: Command::CloseTimeout(ticket),
            })
            .into_iter()
            .collect()
    }

    /// Keep Tab inside the open modal; otherwise the focus simply moves on.
    fn tab(&mut self, shift: bool) {
        if !self.cart_modal.is_open() {
            return;
        }
        let focusable = self.document.focusable(self.cart_modal.mount());
        let active = self.document.active_element();

        let next = match maintain_focus(focusable, active, shift) {
            Some(wrapped) => Some(wrapped.to_string()),
            None => advance(focusable, active, shift),
        };
        if let Some(id) = next {
            self.document.focus(id);
        }
    }
}

fn breadcrumb(command: &Command) {
    let id = match command {
        Command::AddToCart(id) | Command::RemoveFromCart(id) | Command::ChangeQty { id, .. } => {
            Some(id.to_string())
        }
        _ => None,
    };
    match id.as_deref() {
        Some(id) => add_breadcrumb(
            command.category(),
            command.name(),
            Some(&[("product_id", id)]),
        ),
        None => add_breadcrumb(command.category(), command.name(), None),
    }
}

/// Default tab movement within the focus sequence.
fn advance(focusable: &[String], active: Option<&str>, shift: bool) -> Option<String> {
    let position = active.and_then(|id| focusable.iter().position(|f| f == id));
    let next = match (position, shift) {
        (Some(i), false) => i.checked_add(1),
        (Some(i), true) => i.checked_sub(1),
        (None, false) => Some(0),
        (None, true) => focusable.len().checked_sub(1),
    }?;
    focusable.get(next).cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::dialogs::{DialogEvent, PresetDialogs};
    use crate::dom::Document;
    use crate::modal::{ModalPhase, SHOWN_CLASS};
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::testing::sample_catalog;

    fn booted(answer: bool) -> (AppState, PresetDialogs) {
        let dialogs = PresetDialogs::new(answer);
        let mut state = AppState::new(
            Box::new(MemoryStore::new()),
            Document::standard(),
            Box::new(dialogs.clone()),
            &WidgetConfig::default(),
        );
        state.catalog = sample_catalog();
        state.render_products();
        state.render_cart();
        (state, dialogs)
    }

    fn id(raw: i64) -> ProductId {
        ProductId::new(raw)
    }

    fn cards(state: &AppState) -> usize {
        state
            .document()
            .inner_html(Mount::Products)
            .unwrap()
            .matches("<article class=\"card\"")
            .count()
    }

    #[test]
    fn test_add_twice_then_unknown() {
        let (mut state, _) = booted(true);
        state.dispatch(Command::AddToCart(id(2)));
        state.dispatch(Command::AddToCart(id(2)));
        state.dispatch(Command::AddToCart(id(99)));

        assert_eq!(state.cart().len(), 1);
        assert_eq!(state.cart().get(id(2)).unwrap().qty, 2);
        assert_eq!(state.document().text(Mount::CartCount), Some("2"));
        assert_eq!(state.document().text(Mount::TotalPrice), Some("5.00 €"));
    }

    #[test]
    fn test_change_qty_to_zero_removes_line() {
        let (mut state, _) = booted(true);
        state.dispatch(Command::AddToCart(id(1)));
        state.dispatch(Command::AddToCart(id(1)));
        state.dispatch(Command::ChangeQty { id: id(1), delta: -2 });

        assert!(state.cart().is_empty());
        assert!(
            state
                .document()
                .inner_html(Mount::CartItems)
                .unwrap()
                .contains("Cart is empty")
        );
    }

    #[test]
    fn test_remove_and_persist() {
        let (mut state, _) = booted(true);
        state.dispatch(Command::AddToCart(id(1)));
        state.dispatch(Command::AddToCart(id(3)));
        state.dispatch(Command::RemoveFromCart(id(1)));

        let raw = state.cart.storage().get_item("cart_v1").unwrap().unwrap();
        assert!(raw.contains("Paper Filters"));
        assert!(!raw.contains("Espresso Machine"));
    }

    #[test]
    fn test_search_clear_and_refresh() {
        let (mut state, _) = booted(true);
        assert_eq!(cards(&state), 3);

        state.dispatch(Command::Search("  COFFEE ".to_string()));
        assert_eq!(cards(&state), 1);
        assert_eq!(state.document().value(Mount::SearchInput), "  COFFEE ");

        state.dispatch(Command::RefreshList);
        assert_eq!(cards(&state), 1);

        state.dispatch(Command::Search("teapot".to_string()));
        assert!(
            state
                .document()
                .inner_html(Mount::Products)
                .unwrap()
                .contains("No products found.")
        );

        state.dispatch(Command::ClearSearch);
        assert_eq!(state.document().value(Mount::SearchInput), "");
        assert_eq!(cards(&state), 3);
    }

    #[test]
    fn test_open_close_transition_then_timeout() {
        let (mut state, _) = booted(true);
        state.document_mut().focus("openCartBtn");

        assert!(state.dispatch(Command::OpenCart).is_empty());
        assert_eq!(state.cart_modal().phase(), ModalPhase::Shown);
        assert!(state.document().has_class(Mount::CartModal, SHOWN_CLASS));

        let scheduled = state.dispatch(Command::CloseCart);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].after, Duration::from_millis(350));
        assert!(!state.document().body_scroll_locked());

        state.dispatch(Command::TransitionEnd);
        assert!(state.document().is_hidden(Mount::CartModal));
        assert_eq!(state.document().active_element(), Some("openCartBtn"));

        // The fallback still fires; it must not touch focus again.
        state.document_mut().focus("searchInput");
        state.dispatch(scheduled[0].command.clone());
        assert_eq!(state.document().active_element(), Some("searchInput"));
        assert_eq!(state.cart_modal().phase(), ModalPhase::Hidden);
    }

    #[test]
    fn test_close_by_timeout_without_transition() {
        let (mut state, _) = booted(true);
        state.document_mut().focus("openCartBtn");
        state.dispatch(Command::OpenCart);

        let scheduled = state.dispatch(Command::Dismiss);
        state.dispatch(scheduled[0].command.clone());
        assert!(state.document().is_hidden(Mount::CartModal));
        assert_eq!(state.document().active_element(), Some("openCartBtn"));

        state.dispatch(Command::TransitionEnd);
        assert_eq!(state.cart_modal().phase(), ModalPhase::Hidden);
    }

    #[test]
    fn test_escape_only_while_listening() {
        let (mut state, _) = booted(true);
        assert!(state.dispatch(Command::KeyDown(Key::Escape)).is_empty());

        state.dispatch(Command::OpenCart);
        assert!(
            state
                .dispatch(Command::KeyDown(Key::parse("Enter")))
                .is_empty()
        );
        assert_eq!(state.dispatch(Command::KeyDown(Key::Escape)).len(), 1);
        assert_eq!(state.cart_modal().phase(), ModalPhase::Closing);
    }

    #[test]
    fn test_tab_wraps_inside_modal() {
        let (mut state, _) = booted(true);
        state.dispatch(Command::AddToCart(id(2)));
        state.dispatch(Command::OpenCart);

        state.document_mut().focus("checkout");
        state.dispatch(Command::Tab { shift: false });
        assert_eq!(state.document().active_element(), Some("closeCartBtn"));

        state.dispatch(Command::Tab { shift: true });
        assert_eq!(state.document().active_element(), Some("checkout"));

        state.dispatch(Command::Tab { shift: true });
        assert_eq!(state.document().active_element(), Some("clearCart"));

        state.document_mut().focus("dec-2");
        state.dispatch(Command::Tab { shift: false });
        assert_eq!(state.document().active_element(), Some("inc-2"));
    }

    #[test]
    fn test_clear_cart_asks_first() {
        let (mut state, dialogs) = booted(false);
        state.dispatch(Command::AddToCart(id(1)));
        state.dispatch(Command::ClearCart);
        assert_eq!(state.cart().len(), 1);

        let (mut state, _) = booted(true);
        state.dispatch(Command::AddToCart(id(1)));
        state.dispatch(Command::ClearCart);
        assert!(state.cart().is_empty());
        assert_eq!(state.document().text(Mount::TotalPrice), Some("0.00 €"));

        assert_eq!(
            dialogs.transcript().lock().unwrap()[0],
            DialogEvent::Confirm {
                message: CLEAR_CART_PROMPT.to_string(),
                answer: false,
            }
        );
    }

    #[test]
    fn test_checkout_confirms_then_notifies() {
        let (mut state, dialogs) = booted(true);
        state.dispatch(Command::Checkout);
        assert_eq!(
            *dialogs.transcript().lock().unwrap(),
            vec![
                DialogEvent::Confirm {
                    message: CHECKOUT_PROMPT.to_string(),
                    answer: true,
                },
                DialogEvent::Alert(CHECKOUT_NOTICE.to_string()),
            ]
        );

        let (mut state, dialogs) = booted(false);
        state.dispatch(Command::Checkout);
        assert_eq!(dialogs.transcript().lock().unwrap().len(), 1);
    }
}
