//! Shop widget command line.
//!
//! # Usage
//!
//! ```bash
//! # Serve the page shell, catalog and assets
//! shop-widget serve
//!
//! # List products, optionally filtered by name
//! shop-widget products --query beans
//!
//! # Edit the persisted cart
//! shop-widget add 3
//! shop-widget qty 3 -1
//! shop-widget remove 3
//! shop-widget clear --yes
//!
//! # Show the cart, or "check out"
//! shop-widget cart
//! shop-widget checkout
//! ```
//!
//! Every cart command boots the widget the same way the page does: restore
//! the cart, load the catalog, reconcile, then apply the action.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shop_widget_core::{Product, ProductId};
use shop_widget_storefront::catalog::{self, AnyCatalog};
use shop_widget_storefront::cart::Cart;
use shop_widget_storefront::dialogs::{Dialogs, PresetDialogs, TerminalDialogs};
use shop_widget_storefront::dom::{Document, Mount};
use shop_widget_storefront::config::ConfigError;
use shop_widget_storefront::error::Result;
use shop_widget_storefront::server::{self, ServerState};
use shop_widget_storefront::state::CatalogStatus;
use shop_widget_storefront::storage::FileStore;
use shop_widget_storefront::{AppState, Command, WidgetConfig, runtime, search};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shop-widget")]
#[command(author, version, about = "Storefront widget: catalog, search and cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the page shell and static catalog over HTTP
    Serve,
    /// List catalog products
    Products {
        /// Case-insensitive name filter
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Add one unit of a product to the cart
    Add { id: ProductId },
    /// Change the quantity of a cart line by DELTA
    Qty {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a product from the cart
    Remove { id: ProductId },
    /// Empty the cart
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the cart
    Cart,
    /// Start checkout
    Checkout {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &WidgetConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init, so
    // failures here go straight to stderr)
    let config = match load_config(WidgetConfig::from_env) {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(io::stderr().lock(), "{e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output on stdout stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shop_widget_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    tracing::info!(catalog = %config.catalog, "Configuration loaded");

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Load configuration through `load`, lifting its error into `AppError`.
fn load_config<F>(load: F) -> Result<WidgetConfig>
where
    F: FnOnce() -> std::result::Result<WidgetConfig, ConfigError>,
{
    Ok(load()?)
}

async fn run(command: Commands, config: &WidgetConfig) -> Result<()> {
    match command {
        Commands::Serve => serve(config).await,
        Commands::Products { query } => {
            let state = apply(config, query.map(Command::Search), false).await?;
            print_products(&state)
        }
        Commands::Add { id } => {
            let state = apply(config, Some(Command::AddToCart(id)), false).await?;
            if catalog::find(state.catalog(), id).is_none() {
                tracing::warn!(product_id = %id, "no such product; cart unchanged");
            }
            print_cart(state.cart())
        }
        Commands::Qty { id, delta } => {
            let state = apply(config, Some(Command::ChangeQty { id, delta }), false).await?;
            print_cart(state.cart())
        }
        Commands::Remove { id } => {
            let state = apply(config, Some(Command::RemoveFromCart(id)), false).await?;
            print_cart(state.cart())
        }
        Commands::Clear { yes } => {
            let state = apply(config, Some(Command::ClearCart), yes).await?;
            print_cart(state.cart())
        }
        Commands::Cart => {
            let state = apply(config, None, false).await?;
            print_cart(state.cart())
        }
        Commands::Checkout { yes } => {
            apply(config, Some(Command::Checkout), yes).await?;
            Ok(())
        }
    }
}

/// Boot a widget against the configured catalog and storage, run `command`
/// through the event loop, and return the final state.
async fn apply(
    config: &WidgetConfig,
    command: Option<Command>,
    assume_yes: bool,
) -> Result<AppState> {
    let dialogs: Box<dyn Dialogs> = if assume_yes {
        Box::new(PresetDialogs::new(true))
    } else {
        Box::new(TerminalDialogs)
    };
    let mut state = AppState::new(
        Box::new(FileStore::new(&config.storage_dir)),
        Document::standard(),
        dialogs,
        config,
    );
    state
        .boot(&AnyCatalog::from_location(&config.catalog))
        .await;

    let handle = runtime::spawn(state);
    if let Some(command) = command {
        handle.send(command)?;
    }
    Ok(handle.shutdown().await?)
}

async fn serve(config: &WidgetConfig) -> Result<()> {
    let app = server::router(ServerState::new(&config.static_dir))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("shop widget listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn print_products(state: &AppState) -> Result<()> {
    let mut out = io::stdout().lock();

    if let CatalogStatus::Failed(message) = state.catalog_status() {
        writeln!(out, "Error: {message}")?;
        return Ok(());
    }

    let products: Vec<&Product> =
        search::filter(state.catalog(), state.document().value(Mount::SearchInput));
    if products.is_empty() {
        writeln!(out, "No products found.")?;
    }
    for product in products {
        writeln!(out, "{:>4}  {:<32}  {:>12}", product.id, product.name, product.price)?;
    }
    Ok(())
}

fn print_cart(cart: &Cart) -> Result<()> {
    let mut out = io::stdout().lock();

    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
    }
    for entry in cart.entries() {
        writeln!(
            out,
            "{:>4}  {:<32}  {:>3} x {:>12}  {:>12}",
            entry.product.id,
            entry.product.name,
            entry.qty,
            entry.product.price,
            entry.line_total()
        )?;
    }
    writeln!(out, "Items: {}", cart.item_count())?;
    writeln!(out, "Total: {}", cart.total())?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;
    use shop_widget_storefront::config::DEFAULT_CATALOG;
    use shop_widget_storefront::error::AppError;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_invalid_config_becomes_app_error() {
        let result = load_config(|| {
            WidgetConfig::from_lookup(|key| (key == "SHOP_PORT").then(|| "bad".to_string()))
        });
        let err = result.err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().starts_with("Config error: Invalid environment variable SHOP_PORT"));

        let config = load_config(|| WidgetConfig::from_lookup(|_| None)).unwrap();
        assert_eq!(config.catalog.to_string(), DEFAULT_CATALOG);
    }

    #[test]
    fn test_negative_delta_parses() {
        let cli = Cli::try_parse_from(["shop-widget", "qty", "3", "-2"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Qty { delta: -2, .. })
        ));
    }
}
