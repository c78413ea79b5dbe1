mod api;
mod error;
mod recipe;
mod search;
mod templates;
mod web;

use error::*;
use recipe::*;
use search::*;
use templates::*;

extern crate log;
extern crate mime;

use axum::{
    self,
    extract::{Json, Query, State},
    http,
    response::{self, IntoResponse},
    routing,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::{net, signal, time::Duration};
use tower_http::{services, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{OpenApi, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_RECIPES: &str = "resources/recipes_database.csv";

#[derive(Parser)]
struct Args {
    /// Recipe table to serve (falls back to $RECIPES_CSV)
    #[arg(short, long)]
    recipes: Option<PathBuf>,
    #[arg(short, long, default_value = "127.0.0.1")]
    ip: String,
    #[arg(short, long, default_value = "3000")]
    port: u16,
}

struct AppState {
    recipes: RecipeTable,
    suggestions: Vec<String>,
}

type SharedAppState = Arc<AppState>;

impl AppState {
    pub fn new(recipes: RecipeTable) -> Self {
        let suggestions = recipes.ingredient_vocabulary();
        Self {
            recipes,
            suggestions,
        }
    }
}

fn get_recipes_path(recipes: Option<&Path>) -> Cow<'_, Path> {
    if let Some(recipes) = recipes {
        recipes.into()
    } else if let Some(recipes) = std::env::var_os("RECIPES_CSV") {
        PathBuf::from(recipes).into()
    } else {
        Path::new(DEFAULT_RECIPES).into()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to create SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C (SIGINT) signal.");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal.");
        },
    }

    tracing::info!("Initiating graceful shutdown...");

    // Let in-flight searches finish.
    tokio::time::sleep(Duration::from_millis(500)).await;
    tracing::info!("Cleanup complete.");
}

async fn handler_404() -> response::Response {
    (http::StatusCode::NOT_FOUND, "404 Not Found").into_response()
}

fn app(state: SharedAppState) -> axum::Router {
    let trace_layer = trace::TraceLayer::new_for_http()
        .make_span_with(trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_response(trace::DefaultOnResponse::new().level(tracing::Level::INFO));

    let cors = tower_http::cors::CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_origin(tower_http::cors::Any);

    let (api_router, api) = OpenApiRouter::with_openapi(api::ApiDoc::openapi())
        .nest("/api/v1", api::router())
        .split_for_parts();

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone());
    let redoc_ui = Redoc::with_url("/redoc", api);
    let rapidoc_ui = RapiDoc::new("/api-docs/openapi.json").path("/rapidoc");

    axum::Router::new()
        .route("/", routing::get(web::get_index))
        .route("/search", routing::get(web::get_search))
        .route_service(
            "/style.css",
            services::ServeFile::new_with_mime("assets/static/style.css", &mime::TEXT_CSS_UTF_8),
        )
        .merge(swagger_ui)
        .merge(redoc_ui)
        .merge(rapidoc_ui)
        .merge(api_router)
        .fallback(handler_404)
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let tsf = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let tse = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recipe_finder=debug,tower_http=info".into());
    tracing_subscriber::registry().with(tsf).with(tse).init();

    log::info!("Starting...");

    let args = Args::parse();

    let recipes_path = get_recipes_path(args.recipes.as_deref());
    let recipes = read_recipes(&recipes_path)?;
    if recipes.is_empty() {
        log::warn!("no recipes in {}, every search will be empty", recipes_path.display());
    }
    log::info!(
        "loaded {} recipes from {}",
        recipes.len(),
        recipes_path.display()
    );

    let state = Arc::new(AppState::new(recipes));

    let endpoint = format!("{}:{}", args.ip, args.port);
    let listener = net::TcpListener::bind(&endpoint).await?;
    log::info!("started: listening on {}", endpoint);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = serve().await {
        eprintln!("recipe-finder: error: {}", err);
        std::process::exit(1);
    }
}
