//! In-memory document surface.
//!
//! The widget never touches a real browser DOM. Instead every renderer and
//! controller writes into a [`Document`]: a fixed set of named mount points
//! plus the bits of global page state the widget cares about (focus, body
//! scroll lock, keydown listeners).
//!
//! Every mutator is a no-op when the targeted mount point is absent, so a page
//! that leaves out e.g. the cart badge keeps working.

use std::collections::{BTreeSet, HashMap};

/// Named mount points the widget expects on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mount {
    Products,
    SearchInput,
    ClearSearch,
    RefreshList,
    CartModal,
    CartItems,
    TotalPrice,
    OpenCartBtn,
    CloseCartBtn,
    CartCount,
    ClearCart,
    Checkout,
}

impl Mount {
    /// Every mount point, in page order.
    pub const ALL: [Self; 12] = [
        Self::Products,
        Self::SearchInput,
        Self::ClearSearch,
        Self::RefreshList,
        Self::CartModal,
        Self::CartItems,
        Self::TotalPrice,
        Self::OpenCartBtn,
        Self::CloseCartBtn,
        Self::CartCount,
        Self::ClearCart,
        Self::Checkout,
    ];

    /// The element id of this mount point.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::SearchInput => "searchInput",
            Self::ClearSearch => "clearSearch",
            Self::RefreshList => "refreshList",
            Self::CartModal => "cartModal",
            Self::CartItems => "cartItems",
            Self::TotalPrice => "totalPrice",
            Self::OpenCartBtn => "openCartBtn",
            Self::CloseCartBtn => "closeCartBtn",
            Self::CartCount => "cartCount",
            Self::ClearCart => "clearCart",
            Self::Checkout => "checkout",
        }
    }
}

/// State of a single mounted element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub hidden: bool,
    pub classes: BTreeSet<String>,
    pub inner_html: String,
    pub text: String,
    pub value: String,
}

/// The page as seen by the widget.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: HashMap<Mount, Element>,
    active_element: Option<String>,
    body_scroll_locked: bool,
    keydown_listeners: BTreeSet<Mount>,
    focusable: HashMap<Mount, Vec<String>>,
    layout_flushes: u64,
}

impl Document {
    /// A page with every mount point present and the cart modal hidden.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_mounts(&Mount::ALL)
    }

    /// A page containing only `mounts`.
    #[must_use]
    pub fn with_mounts(mounts: &[Mount]) -> Self {
        let elements = mounts
            .iter()
            .map(|&mount| {
                let element = Element {
                    hidden: mount == Mount::CartModal,
                    ..Element::default()
                };
                (mount, element)
            })
            .collect();

        Self {
            elements,
            ..Self::default()
        }
    }

    /// Whether `mount` exists on the page.
    #[must_use]
    pub fn has(&self, mount: Mount) -> bool {
        self.elements.contains_key(&mount)
    }

    /// Read-only access to a mounted element.
    #[must_use]
    pub fn element(&self, mount: Mount) -> Option<&Element> {
        self.elements.get(&mount)
    }

    fn with_element(&mut self, mount: Mount, f: impl FnOnce(&mut Element)) {
        match self.elements.get_mut(&mount) {
            Some(element) => f(element),
            None => tracing::debug!(mount = mount.id(), "mount point missing, skipping update"),
        }
    }

    /// Replace the inner HTML of `mount`.
    pub fn set_inner_html(&mut self, mount: Mount, html: String) {
        self.with_element(mount, |el| el.inner_html = html);
    }

    #[must_use]
    pub fn inner_html(&self, mount: Mount) -> Option<&str> {
        self.element(mount).map(|el| el.inner_html.as_str())
    }

    /// Replace the text content of `mount`.
    pub fn set_text(&mut self, mount: Mount, text: impl Into<String>) {
        let text = text.into();
        self.with_element(mount, |el| el.text = text);
    }

    #[must_use]
    pub fn text(&self, mount: Mount) -> Option<&str> {
        self.element(mount).map(|el| el.text.as_str())
    }

    /// Set the value of an input mount.
    pub fn set_value(&mut self, mount: Mount, value: impl Into<String>) {
        let value = value.into();
        self.with_element(mount, |el| el.value = value);
    }

    /// Input value of `mount`; empty when the mount is missing.
    #[must_use]
    pub fn value(&self, mount: Mount) -> &str {
        self.element(mount).map_or("", |el| el.value.as_str())
    }

    pub fn set_hidden(&mut self, mount: Mount, hidden: bool) {
        self.with_element(mount, |el| el.hidden = hidden);
    }

    /// Whether `mount` is hidden. Missing mounts count as hidden.
    #[must_use]
    pub fn is_hidden(&self, mount: Mount) -> bool {
        self.element(mount).is_none_or(|el| el.hidden)
    }

    pub fn add_class(&mut self, mount: Mount, class: &str) {
        self.with_element(mount, |el| {
            el.classes.insert(class.to_string());
        });
    }

    pub fn remove_class(&mut self, mount: Mount, class: &str) {
        self.with_element(mount, |el| {
            el.classes.remove(class);
        });
    }

    #[must_use]
    pub fn has_class(&self, mount: Mount, class: &str) -> bool {
        self.element(mount).is_some_and(|el| el.classes.contains(class))
    }

    /// Force a synchronous layout of `mount` so the next class change animates.
    pub fn flush_layout(&mut self, mount: Mount) {
        if self.has(mount) {
            self.layout_flushes += 1;
        }
    }

    #[must_use]
    pub const fn layout_flushes(&self) -> u64 {
        self.layout_flushes
    }

    /// Move keyboard focus to the element with id `id`.
    pub fn focus(&mut self, id: impl Into<String>) {
        self.active_element = Some(id.into());
    }

    /// Id of the currently focused element, if any.
    #[must_use]
    pub fn active_element(&self) -> Option<&str> {
        self.active_element.as_deref()
    }

    pub const fn set_body_scroll_locked(&mut self, locked: bool) {
        self.body_scroll_locked = locked;
    }

    #[must_use]
    pub const fn body_scroll_locked(&self) -> bool {
        self.body_scroll_locked
    }

    /// Register a document-level keydown listener owned by `owner`.
    pub fn add_keydown_listener(&mut self, owner: Mount) {
        self.keydown_listeners.insert(owner);
    }

    /// Remove the keydown listener owned by `owner`. Removing twice is fine.
    pub fn remove_keydown_listener(&mut self, owner: Mount) {
        self.keydown_listeners.remove(&owner);
    }

    #[must_use]
    pub fn has_keydown_listener(&self, owner: Mount) -> bool {
        self.keydown_listeners.contains(&owner)
    }

    /// Record the tab order of focusable elements inside `container`.
    pub fn set_focusable(&mut self, container: Mount, ids: Vec<String>) {
        if self.has(container) {
            self.focusable.insert(container, ids);
        }
    }

    /// Focusable element ids inside `container`, in tab order.
    #[must_use]
    pub fn focusable(&self, container: Mount) -> &[String] {
        self.focusable.get(&container).map_or(&[], Vec::as_slice)
    }
}
