//! HTTP handlers

use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use busnav_core::{Error as CoreError, RoutePlan};
use geo::Point;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, warn};

use crate::config::Limits;
use crate::state::AppState;

pub fn create_router(state: AppState, limits: &Limits) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/route", post(route))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(Duration::from_secs(limits.request_timeout_secs))
                .concurrency_limit(limits.concurrency_limit),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    fn to_point(self) -> Result<Point<f64>, ApiError> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(ApiError::BadRequest(format!(
                "invalid coordinate ({}, {})",
                self.lat, self.lon
            )));
        }
        Ok(Point::new(self.lon, self.lat))
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub source: Coordinate,
    pub destination: Coordinate,
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteOptions {
    #[serde(default)]
    pub geojson: bool,
}

#[derive(Debug, Serialize)]
struct RouteResponse {
    #[serde(flatten)]
    plan: RoutePlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    geojson: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    intersections: usize,
    stops: usize,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let city = state.planner.city();
    Json(HealthResponse {
        status: "ok",
        intersections: city.intersection_count(),
        stops: city.stop_count(),
    })
}

async fn route(
    State(state): State<AppState>,
    Query(options): Query<RouteOptions>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let source = request.source.to_point()?;
    let destination = request.destination.to_point()?;
    debug!(?source, ?destination, geojson = options.geojson, "route request");

    let planner = state.planner.clone();
    let response = tokio::task::spawn_blocking(move || -> Result<RouteResponse, ApiError> {
        if !options.geojson {
            let plan = planner.plan_route(source, destination)?;
            return Ok(RouteResponse {
                plan,
                geojson: None,
            });
        }

        let (plan, scene) = planner.plan_route_with_scene(source, destination)?;
        let collection = scene.to_geojson()?;
        let geojson =
            serde_json::to_value(collection).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(RouteResponse {
            plan,
            geojson: Some(geojson),
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("route task failed: {e}")))??;

    Ok(Json(response))
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ErrorResponse>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorResponse {
                error: "request timed out".to_string(),
            }),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("unhandled internal error: {err}"),
            }),
        )
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Core(CoreError),
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Core(e @ CoreError::OutOfBounds { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Core(e @ CoreError::NoPath { .. }) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Core(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use busnav_core::{CityEdge, CityGraph, CityNode, RoutingConfig};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn intersection(id: u64, lon: f64, lat: f64) -> CityNode {
        CityNode::Intersection {
            id,
            geometry: Point::new(lon, lat),
        }
    }

    fn stop(id: u64, name: &str, lon: f64) -> CityNode {
        CityNode::Stop {
            id,
            name: name.to_string(),
            geometry: Point::new(lon, 41.0002),
        }
    }

    fn app() -> Router {
        let city = CityGraph::from_parts(
            [
                intersection(1, 2.00, 41.0),
                intersection(2, 2.01, 41.0),
                intersection(9, 2.00, 41.05),
                stop(101, "Harbour", 2.00),
                stop(102, "Cathedral", 2.01),
            ],
            [
                (1, 2, CityEdge::Street { weight: 600.0 }),
                (101, 1, CityEdge::Link { weight: 60.0 }),
                (102, 2, CityEdge::Link { weight: 60.0 }),
                (
                    101,
                    102,
                    CityEdge::TransitLine {
                        weight: 60.0,
                        lines: BTreeSet::from(["7".to_string()]),
                    },
                ),
            ],
        )
        .unwrap();
        create_router(
            AppState::new(city, RoutingConfig::default()),
            &Limits::default(),
        )
    }

    async fn post_route(uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn trip(to_lat: f64, to_lon: f64) -> Value {
        json!({
            "source": { "lat": 41.0, "lon": 2.00 },
            "destination": { "lat": to_lat, "lon": to_lon },
        })
    }

    #[tokio::test]
    async fn health_reports_graph_size() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": "ok", "intersections": 3, "stops": 2 }));
    }

    #[tokio::test]
    async fn route_returns_plan() {
        let (status, body) = post_route("/route", trip(41.0, 2.01)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["node_sequence"], json!([1, 101, 102, 2]));
        assert_eq!(body["total_minutes"], json!(3));
        assert_eq!(
            body["instructions"],
            json!([
                { "type": "board", "stop": 101, "line": "7", "transfer": false },
                { "type": "arrive", "stop": 102 },
            ])
        );
        assert_eq!(body["text"][0], json!("Walk to the bus stop Harbour, and take bus 7."));
        assert!(body.get("geojson").is_none());
    }

    #[tokio::test]
    async fn route_can_include_geojson() {
        let (status, body) = post_route("/route?geojson=true", trip(41.0, 2.01)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["geojson"]["type"], json!("FeatureCollection"));
        assert_eq!(body["node_sequence"], json!([1, 101, 102, 2]));
        assert!(!body["geojson"]["features"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_destination_is_not_found() {
        let (status, body) = post_route("/route", trip(41.05, 2.00)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("No path"));
    }

    #[tokio::test]
    async fn far_destination_is_unprocessable() {
        let (status, _) = post_route("/route", trip(45.0, 2.0)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn invalid_latitude_is_bad_request() {
        let (status, _) = post_route("/route", trip(123.0, 2.0)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
