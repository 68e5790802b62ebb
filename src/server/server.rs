use anyhow::{Context, Result};
use std::{collections::HashMap, time::Instant};

use tracing::{debug, info, warn};

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::{Any, CorsLayer};

use super::error::{ApiError, ApiResult};
use super::stubs::make_stub_routes;
use super::{log_requests, metrics, state::*, tag_matched_path, ServerConfig};
use crate::dataset::{
    self, ClusterBuckets, DataSource, DatasetError, DatasetResult, DietSummary, RecipeStatistics,
    RecipeView, Table, TopProteinEntry,
};

const SUCCESS: &str = "success";

type QueryParams = Query<HashMap<String, String>>;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct SummaryResponse {
    status: &'static str,
    total_records: usize,
    diet_types: usize,
    data: Vec<DietSummary>,
}

#[derive(Serialize)]
struct TopProteinResponse {
    status: &'static str,
    count: usize,
    data: Vec<TopProteinEntry>,
}

#[derive(Serialize)]
struct RecipesResponse {
    status: &'static str,
    count: usize,
    recipes: Vec<RecipeView>,
    statistics: RecipeStatistics,
}

#[derive(Serialize)]
struct ClustersResponse {
    status: &'static str,
    clusters_identified: usize,
    high_protein_cluster: Vec<String>,
    high_carb_cluster: Vec<String>,
    balanced_cluster: Vec<String>,
}

impl From<ClusterBuckets> for ClustersResponse {
    fn from(buckets: ClusterBuckets) -> Self {
        ClustersResponse {
            status: SUCCESS,
            clusters_identified: 3,
            high_protein_cluster: buckets.high_protein,
            high_carb_cluster: buckets.high_carb,
            balanced_cluster: buckets.balanced,
        }
    }
}

#[derive(Serialize)]
struct AllDataResponse {
    status: &'static str,
    page: usize,
    per_page: usize,
    total_records: usize,
    total_pages: usize,
    data: Vec<Map<String, Value>>,
}

/// Reads an optional positive integer query parameter.
fn positive_param(params: &HashMap<String, String>, name: &str, default: usize) -> DatasetResult<usize> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(value) if value > 0 => Ok(value as usize),
            Ok(value) => Err(DatasetError::invalid_parameter(
                name,
                format!("must be a positive integer, got {}", value),
            )),
            Err(_) => Err(DatasetError::invalid_parameter(
                name,
                format!("'{}' is not an integer", raw),
            )),
        },
    }
}

/// Fresh load of the configured source for a single request.
async fn load_table(source: &DataSource) -> DatasetResult<Table> {
    let start = Instant::now();
    let result = source.load().await;
    match &result {
        Ok(table) => {
            metrics::record_dataset_load(
                source.kind(),
                "success",
                Some(table.len()),
                start.elapsed(),
            );
        }
        Err(err) => {
            warn!("Failed to load dataset from {}: {}", source.describe(), err);
            metrics::record_dataset_load(source.kind(), err.kind(), None, start.elapsed());
        }
    }
    result
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Nutritional Insights API is running",
    })
}

async fn nutrition_summary(
    State(source): State<SharedDataSource>,
) -> ApiResult<Json<SummaryResponse>> {
    let table = load_table(&source).await?;
    let data: Vec<DietSummary> = dataset::summarize(&table)
        .iter()
        .map(DietSummary::rounded)
        .collect();
    Ok(Json(SummaryResponse {
        status: SUCCESS,
        total_records: table.len(),
        diet_types: data.len(),
        data,
    }))
}

async fn top_protein(
    State(source): State<SharedDataSource>,
    Query(params): QueryParams,
) -> ApiResult<Json<TopProteinResponse>> {
    let limit = positive_param(&params, "limit", dataset::DEFAULT_TOP_PROTEIN_LIMIT)?;
    let table = load_table(&source).await?;
    let data = dataset::top_protein(&table, limit)?;
    Ok(Json(TopProteinResponse {
        status: SUCCESS,
        count: data.len(),
        data,
    }))
}

async fn recipes(
    State(source): State<SharedDataSource>,
    Query(params): QueryParams,
) -> ApiResult<Json<RecipesResponse>> {
    let limit = positive_param(&params, "limit", dataset::DEFAULT_RECIPES_LIMIT)?;
    let diet_type = params.get("diet_type").map(String::as_str);
    let table = load_table(&source).await?;
    let (recipes, statistics) = dataset::list_recipes(&table, diet_type, limit)?;
    debug!(
        "Listing {} of {} recipes for filter {:?}",
        recipes.len(),
        statistics.total_recipes,
        diet_type
    );
    Ok(Json(RecipesResponse {
        status: SUCCESS,
        count: recipes.len(),
        recipes,
        statistics,
    }))
}

async fn clusters(State(source): State<SharedDataSource>) -> ApiResult<Json<ClustersResponse>> {
    let table = load_table(&source).await?;
    let buckets = dataset::bucket(&dataset::summarize(&table));
    Ok(Json(buckets.into()))
}

async fn all_data(
    State(source): State<SharedDataSource>,
    Query(params): QueryParams,
) -> ApiResult<Json<AllDataResponse>> {
    let page_number = positive_param(&params, "page", dataset::DEFAULT_PAGE)?;
    let per_page = positive_param(&params, "per_page", dataset::DEFAULT_PER_PAGE)?;
    let table = load_table(&source).await?;
    let page = dataset::page(&table, page_number, per_page)?;
    Ok(Json(AllDataResponse {
        status: SUCCESS,
        page: page_number,
        per_page,
        total_records: page.total_records,
        total_pages: page.total_pages,
        data: page.rows.iter().map(|row| row.to_raw_row()).collect(),
    }))
}

fn make_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

pub fn make_app(config: ServerConfig, data_source: DataSource) -> Router {
    let state = ServerState::new(config, data_source);

    let api_routes: Router<ServerState> = Router::new()
        .route("/health", get(health))
        .route("/nutrition/summary", get(nutrition_summary))
        .route("/nutrition/all", get(all_data))
        .route("/recipes", get(recipes))
        .route("/recipes/top-protein", get(top_protein))
        .route("/clusters", get(clusters))
        .merge(make_stub_routes())
        .route_layer(middleware::from_fn(tag_matched_path));

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(make_cors_layer())
        .with_state(state)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics::metrics_handler))
}

pub async fn run_server(config: ServerConfig, data_source: DataSource) -> Result<()> {
    metrics::init_metrics();

    let address = format!("{}:{}", config.host, config.port);
    let metrics_address = format!("{}:{}", config.host, config.metrics_port);
    info!("Serving dataset from {}", data_source.describe());

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    let metrics_listener = TcpListener::bind(&metrics_address)
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_address))?;

    info!("Ready to serve at {}", address);
    info!("Metrics available at {}/metrics", metrics_address);

    let app = make_app(config, data_source);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            warn!("Metrics server stopped: {}", e);
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
