//! `grabit-storefront`: the Grabit marketplace web server.
//!
//! Renders shop pages with Askama, keeps users, listings, stores, ratings,
//! questions and carts in `PostgreSQL`, and writes uploads below two media
//! roots. Only the public one is served back, under `/media`. Schema changes
//! are applied with `grabit migrate`, never on startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Request, StatusCode};
use axum::{Router, middleware::from_fn, routing::get};
use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use grabit_storefront::config::GrabitConfig;
use grabit_storefront::middleware::{
    create_session_layer, csp_nonce_middleware, request_id_middleware,
    security_headers_middleware, session_key,
};
use grabit_storefront::models::product::MEDIA_URL;
use grabit_storefront::state::AppState;
use grabit_storefront::{db, routes};

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");
const DEFAULT_LOG_FILTER: &str = "grabit_storefront=info,tower_http=debug";

#[tokio::main]
async fn main() {
    let config = GrabitConfig::from_env().expect("invalid configuration");

    // Sentry has to exist before the tracing layer that forwards to it
    let _sentry = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: config.sentry_environment.clone().map(Cow::Owned),
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });
    init_tracing();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("cannot connect to PostgreSQL");
    for dir in [&config.media.root, &config.media.private_root] {
        tokio::fs::create_dir_all(dir)
            .await
            .expect("cannot create media directory");
    }

    let key = session_key(&config).expect("GRABIT_SESSION_SECRET is not a usable cookie key");
    let state = AppState::new(config.clone(), pool);
    let sessions = create_session_layer(state.pool(), state.config()).with_signed(key);

    let app = app(&config)
        .layer(sessions)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("cannot bind listen address");
    tracing::info!(%addr, media_root = %config.media.root.display(), "storefront started");

    // The rate limiter keys on the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");
}

/// Pages, health checks and file serving, before the cross-cutting layers.
fn app(config: &GrabitConfig) -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(config))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        // Never the private root: verification documents live there
        .nest_service(MEDIA_URL, ServeDir::new(&config.media.root))
        .layer(DefaultBodyLimit::max(config.media.max_upload_bytes))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Warnings and errors become Sentry events, info and debug breadcrumbs
    let sentry_layer = sentry_tracing::layer().event_filter(|metadata: &tracing::Metadata<'_>| {
        match *metadata.level() {
            tracing::Level::ERROR | tracing::Level::WARN => EventFilter::Event,
            tracing::Level::INFO | tracing::Level::DEBUG => EventFilter::Breadcrumb,
            tracing::Level::TRACE => EventFilter::Ignore,
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();
}

/// 503 while the database cannot answer a trivial query.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if let Err(e) = sqlx::query("SELECT 1").execute(state.pool()).await {
        tracing::warn!(error = %e, "database not ready");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
    tracing::info!("shutting down");
}
