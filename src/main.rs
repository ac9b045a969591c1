use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{from_fn, Next},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relieflink::{auth, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if it exists
    dotenvy::dotenv().ok();

    // Ensure critical environment variables are set
    env::var("JWT_SECRET").expect("JWT_SECRET must be set");

    // Initialize Tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "relieflink=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Relieflink platform...");

    let state = AppState::from_env().await?;

    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(
                env::var("RATE_LIMIT_PER_SECOND")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1200),
            )
            .burst_size(
                env::var("RATE_LIMIT_BURST")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(2400),
            )
            .finish()
            .expect("governor config"),
    );

    // CORS configuration (no permissive mode)
    let cors = {
        let env_mode = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let origins = env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|s| {
                        let trimmed = s.trim();
                        if trimmed.is_empty() {
                            return None;
                        }
                        match trimmed.parse::<HeaderValue>() {
                            Ok(value) => Some(value),
                            Err(_) => {
                                tracing::warn!("Ignoring invalid ALLOWED_ORIGINS entry: {}", trimmed);
                                None
                            }
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let origins = if origins.is_empty() {
            if env_mode == "production" {
                panic!("ALLOWED_ORIGINS must contain at least one valid origin in production")
            }
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        } else {
            origins
        };

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_credentials(true)
    };

    // Router Setup
    let app = Router::new()
        .route("/health", get(health_check))
        // Public platform data
        .route("/api/campaigns", get(routes::campaigns::list_campaigns))
        .route("/api/campaigns/{id}", get(routes::campaigns::get_campaign))
        .route("/api/leaderboard", get(routes::leaderboard::leaderboard))
        .route("/api/impact", get(routes::impact::impact))
        // Donation cart
        .route("/api/cart", get(routes::cart::get_cart).delete(routes::cart::clear_cart))
        .route("/api/cart/items", post(routes::cart::add_item))
        .route(
            "/api/cart/items/{id}",
            delete(routes::cart::remove_item).put(routes::cart::update_item),
        )
        // Checkout flow
        .route("/api/checkout", get(routes::checkout::status))
        .route("/api/checkout/open", post(routes::checkout::open))
        .route("/api/checkout/add", post(routes::checkout::add))
        .route("/api/checkout/proceed", post(routes::checkout::proceed))
        .route("/api/checkout/add-more", post(routes::checkout::add_more))
        .route("/api/checkout/submit", post(routes::checkout::submit))
        .route("/api/checkout/cancel", post(routes::checkout::cancel))
        // Aid requests
        .route("/api/aid-requests", post(routes::requests::create_draft))
        .route(
            "/api/aid-requests/{id}",
            get(routes::requests::get_draft).put(routes::requests::update_draft),
        )
        .route("/api/aid-requests/{id}/next", post(routes::requests::next_step))
        .route("/api/aid-requests/{id}/previous", post(routes::requests::previous_step))
        .route("/api/aid-requests/{id}/documents", post(routes::requests::upload_documents))
        .route(
            "/api/aid-requests/{id}/documents/{kind}/{index}",
            delete(routes::requests::remove_document),
        )
        .route("/api/aid-requests/{id}/submit", post(routes::requests::submit_request))
        // Account
        .route("/api/me", get(auth::me).put(auth::update_me))
        .route("/api/dashboard", get(routes::dashboard::dashboard))
        // Auth Routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .nest_service("/assets", ServeDir::new("static/assets"))
        .layer(from_fn(require_account))
        .layer(cors)
        .layer(GovernorLayer::new(governor_config))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .with_state(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}

async fn health_check() -> &'static str {
    "OK"
}

/// Paths that require a signed-in account. Everything else on the API is
/// the public marketing/cart surface.
const ACCOUNT_PATHS: [&str; 2] = ["/api/me", "/api/dashboard"];

async fn require_account(req: Request<Body>, next: Next) -> impl IntoResponse {
    let path = req.uri().path();
    let guarded = ACCOUNT_PATHS.iter().any(|prefix| path.starts_with(prefix));
    if req.method() == Method::OPTIONS || !guarded {
        return next.run(req).await;
    }

    // Check headers for token
    if let Some(token) = auth::extract_token_from_headers(req.headers()) {
        if auth::validate_token_str(&token).is_ok() {
            return next.run(req).await;
        }
    }

    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}
