//! HTTP front end for the tile service.
//!
//! Routes:
//! - `GET /tile?site=KTLX&x=10&y=12&z=5`
//! - `GET /tile/:site/:z/:x/:y`
//! - `GET /health`
//!
//! Tile responses follow the service's response contract unchanged. A
//! successful response carries `X-Sendfile` and an empty body; the proxy in
//! front of this server streams the file. Requests the extractors cannot
//! decode (duplicate query keys, non-UTF-8 path segments) get the same empty
//! 400 as any other invalid tile request.

use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::{debug, warn};

use radartiles::response::TileResponse;
use radartiles::service::TileService;
use radartiles::tile::TileRequest;

/// Query parameters of `/tile`.
///
/// Missing parameters become empty strings and fail validation with a 400.
#[derive(Debug, Default, Deserialize)]
pub struct TileQuery {
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub x: String,
    #[serde(default)]
    pub y: String,
    #[serde(default)]
    pub z: String,
}

/// Build the router for `service`.
pub fn router(service: Arc<TileService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tile", get(tile_by_query))
        .route("/tile/:site/:z/:x/:y", get(tile_by_path))
        .with_state(service)
}

async fn health(State(service): State<Arc<TileService>>) -> impl IntoResponse {
    format!("ok in_flight={}\n", service.coordinator().in_flight_count())
}

async fn tile_by_query(
    State(service): State<Arc<TileService>>,
    query: Result<Query<TileQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            debug!(error = %rejection, "Undecodable tile query");
            return to_http(TileResponse::invalid_request());
        }
    };
    let request = TileRequest::new(query.site, query.x, query.y, query.z);
    to_http(service.handle(&request).await)
}

async fn tile_by_path(
    State(service): State<Arc<TileService>>,
    params: Result<Path<(String, String, String, String)>, PathRejection>,
) -> Response {
    let (site, z, x, y) = match params {
        Ok(Path(params)) => params,
        Err(rejection) => {
            debug!(error = %rejection, "Undecodable tile path");
            return to_http(TileResponse::invalid_request());
        }
    };
    let request = TileRequest::new(site, x, y, z);
    to_http(service.handle(&request).await)
}

/// Convert a tile response into an HTTP response.
///
/// A header value that cannot be sent (e.g. a tile path with control
/// characters) turns the response into a 500: a 200 without its
/// `X-Sendfile` directive would be an empty tile.
pub fn to_http(response: TileResponse) -> Response {
    let mut headers = Vec::with_capacity(response.headers.len());
    for (name, value) in &response.headers {
        match HeaderValue::from_str(value) {
            Ok(value) => headers.push((*name, value)),
            Err(e) => {
                warn!(header = *name, value = %value, error = %e, "Unrepresentable response header");
                return (StatusCode::INTERNAL_SERVER_ERROR, DIAG_BAD_HEADER).into_response();
            }
        }
    }

    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut http = (status, response.body).into_response();
    for (name, value) in headers {
        http.headers_mut().insert(name, value);
    }

    http
}

/// Body of the 500 sent when a response header cannot be encoded.
const DIAG_BAD_HEADER: &str = "response header cannot be encoded";
