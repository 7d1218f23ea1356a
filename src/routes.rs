//! The check-in service's endpoints.
//!
//! | Method | Path | |
//! |---|---|---|
//! | `POST` | `/api/registros` | submit one check-in |
//! | `GET` | `/api/registros` | list every check-in (Basic auth) |
//! | `GET` | `/api/registros/descargar` | same, as a file download |
//! | `GET` | `/admin` | admin page |
//! | `GET` | anything else | static file from the public directory |
//!
//! Any other method or path answers `405`.

use std::sync::Arc;

use http::HeaderValue;
use http::header::{AUTHORIZATION, CONTENT_DISPOSITION};
use serde_json::json;
use tracing::{info, warn};

use crate::assets::ADMIN_DOCUMENT;
use crate::error::ApiError;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::state::AppState;
use crate::status::Status;
use crate::store::StoreError;
use crate::validate::validate;

pub const RECORDS_PATH: &str = "/api/registros";
pub const DOWNLOAD_PATH: &str = "/api/registros/descargar";
pub const ADMIN_PATH: &str = "/admin";

const DOWNLOAD_DISPOSITION: &str = r#"attachment; filename="registro_estudiantes.json""#;

/// Builds the router for the whole service.
pub fn app(state: AppState) -> Router<AppState> {
    Router::new(state)
        .on(Method::Post, RECORDS_PATH,  submit_record)
        .on(Method::Get,  RECORDS_PATH,  list_records)
        .on(Method::Get,  DOWNLOAD_PATH, download_records)
        .on(Method::Get,  ADMIN_PATH,    admin_page)
        .fallback(Method::Get, static_asset)
}

// POST /api/registros
async fn submit_record(state: Arc<AppState>, req: Request) -> Result<Response, ApiError> {
    let record = validate(req.body())?;
    let total = state.store.append(&record).await.map_err(ApiError::StoreWrite)?;
    info!(code = %record.code, total, "check-in recorded");

    Ok(Response::builder().status(Status::Created).json_value(&json!({ "ok": true })))
}

// GET /api/registros
async fn list_records(state: Arc<AppState>, req: Request) -> Result<Response, ApiError> {
    records(&state, &req, false).await
}

// GET /api/registros/descargar
async fn download_records(state: Arc<AppState>, req: Request) -> Result<Response, ApiError> {
    records(&state, &req, true).await
}

async fn records(state: &AppState, req: &Request, attachment: bool) -> Result<Response, ApiError> {
    if !state.guard.authorize(req.header(AUTHORIZATION)) {
        warn!(path = req.path(), "rejected admin credentials");
        return Err(ApiError::Unauthorized);
    }

    let records = state.store.load().await.map_err(ApiError::StoreRead)?;
    let mut body = serde_json::to_vec_pretty(&records)
        .map_err(|e| ApiError::StoreRead(StoreError::Encode(e)))?;
    body.push(b'\n');

    let mut builder = Response::builder();
    if attachment {
        builder = builder.header(CONTENT_DISPOSITION, HeaderValue::from_static(DOWNLOAD_DISPOSITION));
    }
    Ok(builder.json(body))
}

// GET /admin
async fn admin_page(state: Arc<AppState>, _req: Request) -> Result<Response, ApiError> {
    asset(&state, &format!("/{ADMIN_DOCUMENT}")).await
}

// GET /*
async fn static_asset(state: Arc<AppState>, req: Request) -> Result<Response, ApiError> {
    asset(&state, req.path()).await
}

async fn asset(state: &AppState, path: &str) -> Result<Response, ApiError> {
    let asset = state.assets.load(path).await?;
    Ok(Response::builder().bytes(asset.content_type, asset.body))
}
