//! HTTP server: blog JSON API, contact endpoint, sitemap and static files

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::contact::{ContactError, ContactForm, ContactSink, LogSink};
use crate::content::{BlogPost, BlogPostSummary, ContentResolver, MarkdownRenderer};
use crate::helpers::{absolute_url, full_url_for, post_path};
use crate::i18n;
use crate::ratelimit::{RateLimitDecision, RateLimiter};
use crate::sitemap;
use crate::Site;

/// Shared server state
pub struct AppState {
    pub config: SiteConfig,
    pub resolver: ContentResolver,
    pub renderer: Arc<MarkdownRenderer>,
    pub limiter: Arc<RateLimiter>,
    pub sink: Arc<dyn ContactSink>,
}

impl AppState {
    /// State for a site, delivering contact messages to the log
    pub fn new(site: &Site) -> Self {
        Self::with_sink(site, Arc::new(LogSink))
    }

    pub fn with_sink(site: &Site, sink: Arc<dyn ContactSink>) -> Self {
        Self {
            config: site.config.clone(),
            resolver: site.resolver(),
            renderer: Arc::new(MarkdownRenderer::new()),
            limiter: Arc::new(RateLimiter::new(site.config.rate_limit.clone())),
            sink,
        }
    }
}

/// Errors returned to API clients as JSON
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    TooManyRequests { retry_after_secs: u64 },
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::TooManyRequests { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "error": format!(
                            "Too many requests. Please try again in {} seconds.",
                            retry_after_secs
                        ),
                        "retryAfter": retry_after_secs,
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>, public_dir: &FsPath) -> Router {
    Router::new()
        .route("/", get(root_redirect))
        .route("/sitemap.xml", get(sitemap_handler))
        .route("/api/contact", post(contact_handler))
        .route("/:locale/blog", get(list_posts_handler))
        .route("/:locale/blog/:slug", get(get_post_handler))
        .route("/:locale/tags", get(list_tags_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::new(site));
    let sweeper = state.limiter.spawn_sweeper();
    let app = router(state, &site.public_dir);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.shutdown();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Client identifier for rate limiting: first forwarded address, then
/// `X-Real-IP`, then the peer address
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(forwarded) = header_value("x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty()) {
            return first.to_string();
        }
    }

    if let Some(real_ip) = header_value("x-real-ip") {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Run filesystem-bound work off the async workers
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Blocking task failed: {}", e);
        ApiError::Internal
    })
}

fn check_locale(state: &AppState, locale: &str) -> Result<(), ApiError> {
    if state.config.supports_locale(locale) {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

async fn root_redirect(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Redirect {
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    let locale = i18n::negotiate(
        accept_language,
        &state.config.locales,
        &state.config.default_locale,
    );
    Redirect::temporary(&format!("/{}", locale))
}

#[derive(Debug, Deserialize)]
struct BlogQuery {
    tag: Option<String>,
}

async fn list_posts_handler(
    State(state): State<Arc<AppState>>,
    Path(locale): Path<String>,
    Query(query): Query<BlogQuery>,
) -> Result<Json<Vec<BlogPostSummary>>, ApiError> {
    check_locale(&state, &locale)?;

    let resolver = state.resolver.clone();
    let include_drafts = state.config.render_drafts;
    let posts = blocking(move || {
        let posts = resolver.list_entries(&locale, include_drafts);
        match query.tag {
            Some(tag) => posts.into_iter().filter(|p| p.has_tag(&tag)).collect(),
            None => posts,
        }
    })
    .await?;

    Ok(Json(posts))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostResponse {
    post: BlogPost,
    html: String,
    /// locale -> URL of the same entry in that locale
    alternates: IndexMap<String, String>,
    dir: &'static str,
    og_locale: &'static str,
    image_url: Option<String>,
}

async fn get_post_handler(
    State(state): State<Arc<AppState>>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<PostResponse>, ApiError> {
    check_locale(&state, &locale)?;

    let worker_state = state.clone();
    let (post, html, available) = blocking(move || {
        let post = match worker_state.resolver.get_entry(&slug, &locale) {
            Ok(Some(post)) => post,
            Ok(None) => return Err(ApiError::NotFound),
            Err(e) => {
                tracing::error!("Failed to load blog entry: {}", e);
                return Err(ApiError::Internal);
            }
        };
        if post.draft && !worker_state.config.render_drafts {
            return Err(ApiError::NotFound);
        }

        let html = worker_state.renderer.render(&post.content).map_err(|e| {
            tracing::error!("Failed to render {}: {}", post.slug, e);
            ApiError::Internal
        })?;

        let available: Vec<String> = worker_state
            .resolver
            .available_locales(&post.slug, &worker_state.config.locales)
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok((post, html, available))
    })
    .await??;

    let alternates = available
        .iter()
        .map(|alt| (alt.clone(), full_url_for(&state.config, &post_path(alt, &post.slug))))
        .collect();
    let image_url = post
        .image
        .as_deref()
        .map(|image| absolute_url(&state.config, image));

    Ok(Json(PostResponse {
        dir: i18n::text_direction(&post.locale),
        og_locale: i18n::og_locale(&post.locale),
        post,
        html,
        alternates,
        image_url,
    }))
}

async fn list_tags_handler(
    State(state): State<Arc<AppState>>,
    Path(locale): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    check_locale(&state, &locale)?;

    let resolver = state.resolver.clone();
    let tags = blocking(move || resolver.list_tags(&locale)).await?;
    Ok(Json(tags))
}

async fn contact_handler(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    form: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let client = client_id(&headers, peer.map(|ConnectInfo(addr)| addr));

    if let RateLimitDecision::Limited { retry_after_secs } = state.limiter.check_and_record(&client)
    {
        tracing::warn!("Contact rate limit hit for {} (retry in {}s)", client, retry_after_secs);
        return Err(ApiError::TooManyRequests { retry_after_secs });
    }

    let Json(form) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let message = match form.validate(&state.config.contact) {
        Ok(message) => message,
        Err(ContactError::Spam) => {
            // look successful so bots learn nothing
            tracing::warn!("Dropped honeypot submission from {}", client);
            return Ok(Json(json!({ "success": true })));
        }
        Err(e) => return Err(ApiError::BadRequest(e.to_string())),
    };

    state.sink.deliver(&message).map_err(|e| {
        tracing::error!("Failed to deliver contact message: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(json!({ "success": true })))
}

async fn sitemap_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let worker_state = state.clone();
    let xml = blocking(move || {
        let entries = sitemap::build(
            &worker_state.config,
            &worker_state.resolver,
            chrono::Local::now(),
        );
        sitemap::render_xml(&entries)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response())
}
