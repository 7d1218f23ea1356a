//! # asistencia
//!
//! A small HTTP service for student check-ins. Students submit a code and a
//! name through a public form; every submission is appended to one JSON file;
//! an administrator reads or downloads the file behind HTTP Basic auth.
//!
//! ## Layout
//!
//! - [`store`]: the JSON file. Whole-document rewrites through a single
//!   writer, atomic rename, no caching.
//! - [`validate`]: untrusted body → [`Record`].
//! - [`auth`]: Basic credential check.
//! - [`assets`]: static files with path-traversal defense.
//! - [`routes`]: the endpoint table, built on the generic [`Router`].
//!
//! ## Running
//!
//! ```text
//! ADMIN_PASS=una-clave RUST_LOG=asistencia=debug cargo run
//! ```
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use asistencia::{AccessGuard, AppState, RecordStore, Server, StaticFiles, routes};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), asistencia::Error> {
//!     let state = AppState::new(
//!         RecordStore::new("registro_estudiantes.json"),
//!         AccessGuard::new("admin", "una-clave"),
//!         StaticFiles::new("public")?,
//!     );
//!
//!     Server::bind("127.0.0.1:3000".parse().unwrap())
//!         .serve(routes::app(state))
//!         .await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod assets;
pub mod auth;
pub mod config;
pub mod record;
pub mod routes;
pub mod state;
pub mod store;
pub mod validate;

pub use assets::StaticFiles;
pub use auth::AccessGuard;
pub use config::Config;
pub use error::{ApiError, BASIC_CHALLENGE, Error};
pub use handler::Handler;
pub use method::Method;
pub use record::Record;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{MAX_BODY_BYTES, Router};
pub use server::Server;
pub use state::AppState;
pub use status::Status;
pub use store::RecordStore;
