//! Error types.
//!
//! Two layers:
//!
//! - [`Error`] surfaces infrastructure failures: binding to a port or an
//!   unusable public directory.
//! - [`ApiError`] is the per-request taxonomy. Every variant maps to exactly
//!   one HTTP status and body; handlers return it and the router writes it.

use std::io;

use http::HeaderValue;
use http::header::WWW_AUTHENTICATE;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::response::{IntoResponse, Response};
use crate::status::Status;
use crate::store::StoreError;

/// Challenge sent with every `401`.
pub const BASIC_CHALLENGE: &str = r#"Basic realm="Registro privado""#;

/// The error type returned by the server's fallible startup operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("public directory {path} is unusable: {source}")]
    PublicDir { path: String, source: io::Error },
}

/// Everything a request can fail with.
///
/// Client faults carry a fixed message. Server faults keep their source for
/// the log and send only the opaque message to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Datos inválidos")]
    InvalidRecord,

    #[error("No se pudo procesar el registro")]
    MalformedBody,

    #[error("No se pudo procesar el registro")]
    PayloadTooLarge,

    #[error("No autorizado")]
    Unauthorized,

    #[error("Acceso denegado")]
    Forbidden,

    #[error("Archivo no encontrado")]
    NotFound,

    #[error("Método no permitido")]
    MethodNotAllowed,

    #[error("No se pudo leer el registro")]
    StoreRead(#[source] StoreError),

    #[error("No se pudo guardar el registro")]
    StoreWrite(#[source] StoreError),

    #[error("Error del servidor")]
    AssetRead(#[source] io::Error),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidRecord | Self::MalformedBody => Status::BadRequest,
            Self::PayloadTooLarge                     => Status::PayloadTooLarge,
            Self::Unauthorized                        => Status::Unauthorized,
            Self::Forbidden                           => Status::Forbidden,
            Self::NotFound                            => Status::NotFound,
            Self::MethodNotAllowed                    => Status::MethodNotAllowed,
            Self::StoreRead(_)
            | Self::StoreWrite(_)
            | Self::AssetRead(_)                      => Status::InternalServerError,
        }
    }

    /// Static-file failures answer in plain text, like the files themselves;
    /// everything under `/api` answers in JSON.
    fn is_plain_text(&self) -> bool {
        matches!(self, Self::Forbidden | Self::NotFound | Self::AssetRead(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            match std::error::Error::source(&self) {
                Some(source) => error!(status = status.as_u16(), "{message}: {source}"),
                None => error!(status = status.as_u16(), "{message}"),
            }
        }

        let mut builder = Response::builder().status(status);
        if matches!(self, Self::Unauthorized) {
            builder = builder.header(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_CHALLENGE));
        }

        if self.is_plain_text() {
            builder.text(message)
        } else {
            builder.json_value(&json!({ "error": message }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;

    use crate::assets::AssetError;

    #[test]
    fn unauthorized_carries_challenge_and_json_body() {
        let res = ApiError::Unauthorized.into_response();
        assert_eq!(res.status_code(), Status::Unauthorized);
        assert_eq!(res.headers()[WWW_AUTHENTICATE], BASIC_CHALLENGE);
        assert_eq!(res.body(), r#"{"error":"No autorizado"}"#.as_bytes());
    }

    #[test]
    fn server_faults_hide_their_source() {
        let fault = io::Error::new(io::ErrorKind::PermissionDenied, "/srv/secret.json");
        let res = ApiError::StoreRead(StoreError::Io(fault)).into_response();
        assert_eq!(res.status_code(), Status::InternalServerError);
        let body = String::from_utf8(res.body().to_vec()).unwrap();
        assert!(!body.contains("secret"));
        assert!(body.contains("No se pudo leer el registro"));
    }

    #[test]
    fn asset_errors_are_plain_text() {
        let res = ApiError::Forbidden.into_response();
        assert_eq!(res.status_code(), Status::Forbidden);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(res.body(), "Acceso denegado".as_bytes());
    }

    #[test]
    fn unreadable_asset_is_an_opaque_plain_text_500() {
        let fault = io::Error::new(io::ErrorKind::PermissionDenied, "/srv/x");
        let res = ApiError::from(AssetError::Io(fault)).into_response();
        assert_eq!(res.status_code(), Status::InternalServerError);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(res.body(), "Error del servidor".as_bytes());
    }
}
