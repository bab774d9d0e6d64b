use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use repository::Repository;
use tokio::sync::OnceCell;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;
use utoipauto::utoipauto;

use crate::catalog::RotationClock;
use crate::clients::storage::ImageStore;
use crate::session::SessionHub;

pub mod auth;
pub mod catalog;
mod clients;
pub mod healthz;
pub mod management;
pub mod news;
pub mod not_found;
mod response;
pub mod session;

pub use response::ApiError;

#[derive(Clone, Debug)]
pub struct ApiState {
    repo: Repository,
    images: ImageStore,
    sessions: SessionHub,
    rotation: Arc<RotationClock>,
    config: Config,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub auth: Auth,
}

#[derive(Clone, Debug)]
pub struct Auth {
    pub token_hours: i64,
}

static JWT_SECRET: OnceCell<String> = OnceCell::const_new();

pub async fn serve(
    repository: Repository,
    s3: aws_sdk_s3::Client,
    bucket: String,
    config_name: &str,
    jwt_secret: String,
) -> anyhow::Result<Router> {
    #[utoipauto(paths = "./libs/api/src")]
    #[derive(OpenApi)]
    #[openapi(
        tags(
            (name = "uninews", description = "University news portal API")
        )
    )]
    struct ApiDoc;

    info!(task = "start api serving");

    JWT_SECRET
        .set(jwt_secret)
        .map_err(|_| anyhow::anyhow!("JWT secret was already initialized"))?;

    let config = util::load_toml(config_name)?;
    let s3_url = config
        .get("aws")
        .and_then(|v| v.get("s3_url"))
        .and_then(|v| v.as_str())
        .context("failed to load aws.s3_url config")?
        .to_string();
    let rotation_millis = config
        .get("catalog")
        .and_then(|v| v.get("rotation_millis"))
        .and_then(|v| v.as_integer())
        .context("failed to load catalog.rotation_millis config")?;
    let rotation_millis = u64::try_from(rotation_millis)
        .ok()
        .filter(|&millis| millis > 0)
        .context("catalog.rotation_millis must be a positive number of milliseconds")?;
    let token_hours = config
        .get("auth")
        .and_then(|v| v.get("token_hours"))
        .and_then(|v| v.as_integer())
        .context("failed to load auth.token_hours config")?;

    // One rotation clock and one session hub per process. Views read the
    // clock; they never start their own, so timers cannot stack.
    let state = ApiState {
        repo: repository,
        images: ImageStore::new(s3, bucket, s3_url),
        sessions: SessionHub::new(16),
        rotation: Arc::new(RotationClock::start(Duration::from_millis(
            rotation_millis,
        ))),
        config: Config {
            auth: Auth { token_hours },
        },
    };

    let origins = ["http://localhost:3000".parse().unwrap()];

    // public catalog
    let catalog_router = Router::new()
        .route("/", get(catalog::get_catalog))
        .fallback(not_found::get_404)
        .with_state(state.clone());

    // public detail
    let news_router = Router::new()
        .route("/:id", get(news::get_news))
        .fallback(not_found::get_404)
        .with_state(state.clone());

    // sign-in / sign-up / sign-out / me
    let auth_router = Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/me", get(auth::me))
        .fallback(not_found::get_404)
        .with_state(state.clone());

    // management: the session gate rejects before any handler mounts
    let management_router = Router::new()
        .route(
            "/news",
            get(management::list_news).post(management::create_news),
        )
        .route(
            "/news/:id",
            put(management::update_news).delete(management::delete_news),
        )
        .route(
            "/news/:id/toggle-status",
            post(management::toggle_status),
        )
        .route_layer(middleware::from_fn(auth::require_user))
        // multi-image submissions exceed the 2MB default body limit
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        .fallback(not_found::get_404)
        .with_state(state.clone());

    // session transition notifications
    let session_router = Router::new()
        .route("/events", get(session::events))
        .with_state(state.clone());

    let router = Router::new()
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .route("/healthz", get(healthz::get_health))
        .nest("/catalog", catalog_router)
        .nest("/news", news_router)
        .nest("/auth", auth_router)
        .nest("/management", management_router)
        .nest("/session", session_router)
        .layer(CorsLayer::new().allow_origin(origins))
        .fallback(not_found::get_404);

    Ok(router)
}
