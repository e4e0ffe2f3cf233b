/*
 * Threat Lookup Proxy
 * Copyright (C) 2025 EliteHosting
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::core::LookupService;
use crate::core::categories::CATEGORIES;
use crate::core::error::LookupError;
use crate::log_debug;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct CategoryEntry {
    code: u32,
    name: &'static str,
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody { error: self.public_message() })).into_response()
    }
}

pub fn router(service: Arc<LookupService>) -> Router {
    Router::new()
        .route("/api/lookup", get(missing_ip))
        .route("/api/lookup/", get(missing_ip))
        .route("/api/lookup/:ip", get(lookup_ip))
        .route("/api/categories", get(list_categories))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

pub async fn run_web_server(service: Arc<LookupService>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(service)).await?;
    Ok(())
}

// GET /api/lookup/:ip
async fn lookup_ip(State(service): State<Arc<LookupService>>, Path(ip): Path<String>) -> Response {
    log_debug!("Lookup request for {:?}", ip);
    match service.lookup(&ip).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn missing_ip() -> Response {
    LookupError::MissingIp.into_response()
}

async fn list_categories() -> Json<Vec<CategoryEntry>> {
    Json(
        CATEGORIES
            .iter()
            .map(|&(code, name)| CategoryEntry { code, name })
            .collect(),
    )
}

async fn health() -> &'static str {
    "OK"
}
