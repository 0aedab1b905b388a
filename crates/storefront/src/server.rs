//! Static host for the widget page and its catalog.
//!
//! Serves the page shell with the product grid already rendered, the
//! catalog JSON under `/db`, and assets under `/static`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::catalog::{CatalogSource, FileCatalog};
use crate::dom::{Document, Mount};
use crate::error::{Result, report};
use crate::render;

pub const PAGE_TITLE: &str = "Shop";

/// Path of the catalog relative to the static directory.
pub const CATALOG_PATH: &str = "db/products.json";

#[derive(Debug, Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

#[derive(Debug)]
struct ServerStateInner {
    static_dir: PathBuf,
    catalog: FileCatalog,
}

impl ServerState {
    #[must_use]
    pub fn new(static_dir: impl Into<PathBuf>) -> Self {
        let static_dir = static_dir.into();
        let catalog = FileCatalog::new(static_dir.join(CATALOG_PATH));
        Self {
            inner: Arc::new(ServerStateInner {
                static_dir,
                catalog,
            }),
        }
    }

    #[must_use]
    pub fn static_dir(&self) -> &Path {
        &self.inner.static_dir
    }
}

/// Page shell.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    /// Prerendered, already-escaped grid markup.
    pub grid_html: String,
}

/// Build the router for `serve`.
pub fn router(state: ServerState) -> Router {
    let static_dir = state.static_dir().to_path_buf();

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest_service("/db", ServeDir::new(static_dir.join("db")))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Page shell with the full catalog rendered into the grid. A catalog that
/// fails to load shows the inline error, same as the widget.
#[instrument(skip(state))]
async fn index(State(state): State<ServerState>) -> Result<impl IntoResponse> {
    let mut doc = Document::with_mounts(&[Mount::Products]);

    match state.inner.catalog.load().await {
        Ok(products) => {
            render::render_products(&mut doc, &products)?;
        }
        Err(e) => {
            report(&e, "Failed to load catalog for page");
            render::render_load_error(&mut doc, &e.to_string())?;
        }
    }

    Ok(IndexTemplate {
        title: PAGE_TITLE.to_string(),
        grid_html: doc.inner_html(Mount::Products).unwrap_or_default().to_string(),
    })
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    fn static_dir(catalog: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        if let Some(json) = catalog {
            std::fs::create_dir_all(dir.path().join("db")).unwrap();
            std::fs::write(dir.path().join(CATALOG_PATH), json).unwrap();
        }
        dir
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_index_prerenders_grid() {
        let dir = static_dir(Some(
            r#"[{"id":7,"name":"Milk <Frother>","price":19.9,"image":"img/7.jpg"}]"#,
        ));
        let (status, body) = get_body(router(ServerState::new(dir.path())), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("id=\"cartModal\""));
        assert!(body.contains("Milk &lt;Frother&gt;"));
        assert!(body.contains("19.90 €"));
    }

    #[tokio::test]
    async fn test_index_with_missing_catalog_shows_error() {
        let dir = static_dir(None);
        let (status, body) = get_body(router(ServerState::new(dir.path())), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("class=\"grid-error\""));
    }

    #[tokio::test]
    async fn test_catalog_and_health_served() {
        let dir = static_dir(Some("[]"));
        let app = router(ServerState::new(dir.path()));

        let (status, body) = get_body(app.clone(), "/db/products.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");

        let (status, body) = get_body(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let (status, _) = get_body(app, "/db/missing.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
