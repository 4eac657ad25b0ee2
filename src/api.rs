//! REST API for the recommendation service.
//!
//! Provides HTTP endpoints for the packing station frontend.
//! Uses Axum as the web framework and supports CORS.

use std::sync::{Arc, OnceLock};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};

use crate::config::{ApiConfig, SolverConfig};
use crate::geometry::Orientation;
use crate::guidelines::{Guideline, Sensitivity, padding_per_side, resolve_guideline};
use crate::model::{ItemDimensions, ShippingBox, ValidationError, validate_weight};
use crate::optimizer::{
    BoxCandidate, CutDownSuggestion, Fit, FitOrientation, Recommendation, SolverOptions,
    find_best_packaging_solution,
};
use crate::store::{ConfigStore, Preferences};
use crate::telescoping::{TelescopingBox, TelescopingSolution};
use crate::types::Dims;

#[derive(Clone)]
pub struct ApiState {
    solver_config: SolverConfig,
    store: Arc<dyn ConfigStore>,
}

impl ApiState {
    pub fn new(solver_config: SolverConfig, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            solver_config,
            store,
        }
    }
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes of the pinned swagger-ui-dist 5.17.14 assets.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>boxfit API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Per-request overrides of the configured solver settings.
#[derive(Deserialize, Clone, Debug, Default, ToSchema)]
pub struct SolverOverrides {
    #[serde(default)]
    pub max_alternates: Option<usize>,
    #[serde(default)]
    pub allow_cut_down: Option<bool>,
    #[serde(default)]
    pub allow_telescoping: Option<bool>,
    #[serde(default)]
    pub telescoping_min_overlap: Option<f64>,
}

impl SolverOverrides {
    fn apply(&self, mut options: SolverOptions) -> SolverOptions {
        if let Some(count) = self.max_alternates {
            options.max_alternates = count;
        }
        if let Some(allow) = self.allow_cut_down {
            options.allow_cut_down = allow;
        }
        if let Some(allow) = self.allow_telescoping {
            options.allow_telescoping = allow;
        }
        if let Some(overlap) = self.telescoping_min_overlap {
            options.telescoping_min_overlap = overlap;
        }
        options
    }
}

/// Request structure for the recommendation endpoint.
///
/// `padding` wins over the padding derived from `sensitivity` and `weight`.
/// Without `boxes` the configured inventory is used.
#[derive(Deserialize, Clone, Debug, ToSchema)]
#[schema(
    example = json!({
        "item": { "length": 10.0, "width": 8.0, "height": 6.0 },
        "weight": 4.5,
        "sensitivity": "standard",
        "boxes": [
            { "id": "medium", "length": 12.0, "width": 10.0, "height": 8.0 },
            { "id": "large", "length": 16.0, "width": 12.0, "height": 10.0, "cost": 1.8 }
        ],
        "options": { "max_alternates": 2, "allow_telescoping": true }
    })
)]
pub struct RecommendRequest {
    pub item: ItemDimensions,
    #[serde(default)]
    #[schema(nullable = true)]
    pub weight: Option<f64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub sensitivity: Option<Sensitivity>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub padding: Option<f64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub boxes: Option<Vec<ShippingBox>>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub options: Option<SolverOverrides>,
}

#[derive(Debug)]
struct ValidatedRecommendRequest {
    item: ItemDimensions,
    weight: Option<f64>,
    sensitivity: Option<Sensitivity>,
    padding: Option<f64>,
    boxes: Option<Vec<ShippingBox>>,
    overrides: SolverOverrides,
}

#[derive(Debug)]
enum RecommendValidationError {
    InvalidItem(ValidationError),
    InvalidBox(ValidationError),
    InvalidPadding(ValidationError),
    InvalidWeight(ValidationError),
    InvalidOption(String),
}

impl RecommendRequest {
    fn into_validated(self) -> Result<ValidatedRecommendRequest, RecommendValidationError> {
        self.item
            .validate()
            .map_err(RecommendValidationError::InvalidItem)?;

        if let Some(weight) = self.weight {
            validate_weight(weight).map_err(RecommendValidationError::InvalidWeight)?;
        }

        if let Some(padding) = self.padding {
            if !padding.is_finite() || padding < 0.0 {
                return Err(RecommendValidationError::InvalidPadding(
                    ValidationError::InvalidPadding(format!(
                        "Padding must be non-negative, got: {}",
                        padding
                    )),
                ));
            }
        }

        if let Some(boxes) = &self.boxes {
            for b in boxes {
                b.validate().map_err(RecommendValidationError::InvalidBox)?;
            }
        }

        let overrides = self.options.unwrap_or_default();
        if let Some(overlap) = overrides.telescoping_min_overlap {
            if !overlap.is_finite() || overlap <= 0.0 {
                return Err(RecommendValidationError::InvalidOption(format!(
                    "telescoping_min_overlap must be greater than 0, got: {}",
                    overlap
                )));
            }
        }

        Ok(ValidatedRecommendRequest {
            item: self.item,
            weight: self.weight,
            sensitivity: self.sensitivity,
            padding: self.padding,
            boxes: self.boxes,
            overrides,
        })
    }
}

/// Padding per side for a request: explicit value, then the tier rule, then none.
fn resolve_padding(
    padding: Option<f64>,
    sensitivity: Option<Sensitivity>,
    weight: Option<f64>,
    preferences: &Preferences,
) -> f64 {
    match (padding, sensitivity) {
        (Some(padding), _) => padding,
        (None, Some(sensitivity)) => padding_per_side(
            sensitivity,
            weight.unwrap_or(0.0),
            preferences.basic_extra_padding,
        ),
        (None, None) => 0.0,
    }
}

/// Response of the recommendation endpoint.
#[derive(Serialize, ToSchema)]
pub struct RecommendResponse {
    pub recommendation: Recommendation,
    /// Padding per side the search used
    pub padding_per_side: f64,
    /// Packaging requirements for the item's tier and weight, when both are known
    pub guideline: Option<Guideline>,
}

#[derive(Deserialize, ToSchema)]
#[schema(example = json!({ "sensitivity": "fragile", "weight": 25.0 }))]
pub struct GuidelineRequest {
    pub sensitivity: Sensitivity,
    pub weight: f64,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn inventory_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid box inventory",
        details,
    )
}

fn parse_recommend_request(
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<ValidatedRecommendRequest, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => return Err(json_deserialize_error(err)),
    };

    match payload.into_validated() {
        Ok(validated) => Ok(validated),
        Err(RecommendValidationError::InvalidBox(err)) => Err(inventory_error(err.to_string())),
        Err(
            RecommendValidationError::InvalidItem(err)
            | RecommendValidationError::InvalidPadding(err)
            | RecommendValidationError::InvalidWeight(err),
        ) => Err(validation_error(err.to_string())),
        Err(RecommendValidationError::InvalidOption(details)) => Err(validation_error(details)),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_recommend, handle_guideline, handle_boxes),
    components(
        schemas(
            RecommendRequest,
            RecommendResponse,
            SolverOverrides,
            GuidelineRequest,
            ErrorResponse,
            ItemDimensions,
            ShippingBox,
            Dims,
            Orientation,
            Recommendation,
            BoxCandidate,
            Fit,
            FitOrientation,
            CutDownSuggestion,
            TelescopingSolution,
            TelescopingBox,
            Guideline,
            Sensitivity
        )
    ),
    tags((name = "packaging", description = "Endpoints for box recommendations"))
)]
struct ApiDoc;

/// Builds the router with all endpoints.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/recommend", post(handle_recommend))
        .route("/guideline", post(handle_guideline))
        .route("/boxes", get(handle_boxes))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server and blocks until it terminates.
pub async fn start_api_server(config: ApiConfig, state: ApiState) {
    let app = router(state);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Could not bind API server to {}: {}", addr, err);
            return;
        }
    };

    let display_host = config.display_host().to_string();
    info!(
        "Server running on http://{}:{}",
        display_host,
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("Local access: http://localhost:{}", config.port());
    }
    info!("API endpoints: POST /recommend, POST /guideline, GET /boxes");
    info!("Documentation: GET /docs, GET /docs/openapi.json");

    if let Err(err) = axum::serve(listener, app).await {
        error!("API server terminated with an error: {err}");
    }
}

/// Handler for POST /recommend.
///
/// Finds the best box for an item, a telescoping pair if nothing fits on its own,
/// or reports the space the item needs.
#[utoipa::path(
    post,
    path = "/recommend",
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Recommendation computed", body = RecommendResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid item, padding or box inventory",
            body = ErrorResponse
        )
    ),
    tag = "packaging"
)]
async fn handle_recommend(
    State(state): State<ApiState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Response {
    let request = match parse_recommend_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let preferences = state.store.preferences();
    let boxes = request.boxes.unwrap_or_else(|| state.store.boxes());
    let options = request
        .overrides
        .apply(state.solver_config.solver_options());
    let padding = resolve_padding(
        request.padding,
        request.sensitivity,
        request.weight,
        &preferences,
    );
    let guideline = match (request.sensitivity, request.weight) {
        (Some(sensitivity), Some(weight)) => resolve_guideline(
            &state.store.guidelines(),
            sensitivity,
            weight,
            preferences.basic_extra_padding,
        ),
        _ => None,
    };

    info!(
        "New recommend request: {} boxes, padding {}\" per side",
        boxes.len(),
        padding
    );

    let Some(recommendation) =
        find_best_packaging_solution(&boxes, &request.item, padding, &options)
    else {
        return validation_error("Item dimensions must all be positive");
    };

    info!("Result: {}", recommendation.method());

    let response = RecommendResponse {
        recommendation,
        padding_per_side: padding,
        guideline,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /guideline.
///
/// Returns the packaging requirements for a sensitivity tier and weight.
#[utoipa::path(
    post,
    path = "/guideline",
    request_body = GuidelineRequest,
    responses(
        (status = 200, description = "Matching guideline", body = Guideline),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid weight or no guideline for it",
            body = ErrorResponse
        )
    ),
    tag = "packaging"
)]
async fn handle_guideline(
    State(state): State<ApiState>,
    payload: Result<Json<GuidelineRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    if let Err(err) = validate_weight(request.weight) {
        return validation_error(err.to_string());
    }

    let preferences = state.store.preferences();
    match resolve_guideline(
        &state.store.guidelines(),
        request.sensitivity,
        request.weight,
        preferences.basic_extra_padding,
    ) {
        Some(guideline) => (StatusCode::OK, Json(guideline)).into_response(),
        None => validation_error(format!(
            "No {} guideline covers a weight of {} lbs",
            request.sensitivity, request.weight
        )),
    }
}

/// Handler for GET /boxes.
///
/// Lists the configured inventory, inactive boxes included.
#[utoipa::path(
    get,
    path = "/boxes",
    responses(
        (status = 200, description = "Configured box inventory", body = [ShippingBox])
    ),
    tag = "packaging"
)]
async fn handle_boxes(State(state): State<ApiState>) -> Json<Vec<ShippingBox>> {
    Json(state.store.boxes())
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
