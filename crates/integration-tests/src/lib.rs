//! Integration tests for the shop widget.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shop-widget-integration-tests
//! ```
//!
//! Each test starts the static server on an ephemeral port over a temporary
//! static directory, then drives a widget that loads its catalog over HTTP,
//! exactly like the page does.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use shop_widget_storefront::config::WidgetConfig;
use shop_widget_storefront::dialogs::PresetDialogs;
use shop_widget_storefront::dom::Document;
use shop_widget_storefront::server::{self, CATALOG_PATH, ServerState};
use shop_widget_storefront::storage::FileStore;
use shop_widget_storefront::AppState;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

/// Catalog used by most tests.
pub const SAMPLE_CATALOG: &str = r#"[
  {"id": 1, "name": "Espresso Machine", "price": 1000, "image": "img/1.jpg"},
  {"id": 2, "name": "Coffee Beans", "price": 2.5, "image": "img/2.jpg"},
  {"id": 3, "name": "Paper Filters", "price": 2.5, "image": "img/3.jpg"}
]"#;

/// A temporary static directory.
pub struct StaticDir {
    dir: TempDir,
}

impl StaticDir {
    /// Empty static directory (no catalog file).
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create static dir"),
        }
    }

    /// Static directory with `db/products.json` set to `json`.
    #[must_use]
    pub fn with_catalog(json: &str) -> Self {
        let dir = Self::empty();
        dir.write_catalog(json);
        dir
    }

    /// Replace the catalog file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_catalog(&self, json: &str) {
        let path = self.dir.path().join(CATALOG_PATH);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create db dir");
        }
        std::fs::write(path, json).expect("Failed to write catalog");
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// The static server running on an ephemeral port. Stops when dropped.
pub struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Serve `static_dir` on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(static_dir: &Path) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let app = server::router(ServerState::new(static_dir));

        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self { addr, task }
    }

    /// Absolute URL for `path` on this server.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not form a valid URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).expect("Invalid test URL")
    }

    /// URL of the served catalog.
    #[must_use]
    pub fn catalog_url(&self) -> Url {
        self.url(&format!("/{CATALOG_PATH}"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A widget over a file-backed cart in `storage_dir`, answering every
/// confirmation with `answer`.
#[must_use]
pub fn widget(storage_dir: impl Into<PathBuf>, answer: bool) -> (AppState, PresetDialogs) {
    let dialogs = PresetDialogs::new(answer);
    let state = AppState::new(
        Box::new(FileStore::new(storage_dir)),
        Document::standard(),
        Box::new(dialogs.clone()),
        &WidgetConfig::default(),
    );
    (state, dialogs)
}
