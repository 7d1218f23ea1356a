//! Radix-tree request router.
//!
//! One tree per HTTP method plus an optional per-method fallback. A request
//! whose method has neither a matching route nor a fallback gets `405`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::request::Parts;
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::error::ApiError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Request bodies larger than this are refused with `413` while still
/// arriving, before any handler runs.
pub const MAX_BODY_BYTES: usize = 1_000_000;

/// The application router.
///
/// Owns the shared state `S` and hands an `Arc<S>` to every handler. Build
/// it once at startup; pass it to [`Server::serve`](crate::Server::serve).
pub struct Router<S> {
    state: Arc<S>,
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    fallbacks: HashMap<Method, BoxedHandler<S>>,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new(state: S) -> Self {
        Self { state: Arc::new(state), routes: HashMap::new(), fallbacks: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or is registered twice.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Handler for any `method` request that matches no registered path.
    pub fn fallback(mut self, method: Method, handler: impl Handler<S>) -> Self {
        self.fallbacks.insert(method, handler.into_boxed_handler());
        self
    }

    pub fn state(&self) -> &S { &self.state }

    fn lookup(&self, method: Method, path: &str) -> Option<BoxedHandler<S>> {
        let matched = self
            .routes
            .get(&method)
            .and_then(|tree| tree.at(path).ok())
            .map(|m| Arc::clone(m.value));
        matched.or_else(|| self.fallbacks.get(&method).map(Arc::clone))
    }

    /// Routes one request and produces one response. Never fails: every
    /// problem becomes a status code.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        let method = parts.method.clone();
        let path = parts.uri.path().to_owned();

        let response = self.route(parts, body).await;

        debug!(
            %method,
            path = %path,
            status = response.status_code().as_u16(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "request"
        );
        response.into_inner()
    }

    async fn route<B>(&self, parts: Parts, body: B) -> Response
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let Ok(method) = Method::try_from(&parts.method) else {
            return ApiError::MethodNotAllowed.into_response();
        };
        let path = parts.uri.path().to_owned();
        let Some(handler) = self.lookup(method, &path) else {
            return ApiError::MethodNotAllowed.into_response();
        };

        let body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                return ApiError::PayloadTooLarge.into_response();
            }
            Err(e) => {
                debug!(path = %path, "failed to read request body: {e}");
                return ApiError::MalformedBody.into_response();
            }
        };

        handler
            .call(Arc::clone(&self.state), Request::new(path, parts.headers, body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    struct Counter(&'static str);

    async fn named(state: Arc<Counter>, req: Request) -> Response {
        Response::text(format!("{} {}", state.0, req.path()))
    }

    async fn body_len(_: Arc<Counter>, req: Request) -> Response {
        Response::text(req.body().len().to_string())
    }

    fn router() -> Router<Counter> {
        Router::new(Counter("app"))
            .on(Method::Get, "/exact", named)
            .on(Method::Post, "/upload", body_len)
            .fallback(Method::Get, named)
    }

    fn request(method: http::Method, path: &str, body: impl Into<Bytes>) -> http::Request<Full<Bytes>> {
        http::Request::builder().method(method).uri(path).body(Full::new(body.into())).unwrap()
    }

    async fn body_text(res: http::Response<Full<Bytes>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn exact_route_and_fallback_both_receive_state() {
        let r = router();
        assert_eq!(body_text(r.handle(request(http::Method::GET, "/exact", "")).await).await, "app /exact");
        assert_eq!(body_text(r.handle(request(http::Method::GET, "/other/x", "")).await).await, "app /other/x");
    }

    #[tokio::test]
    async fn unmatched_method_or_path_is_405() {
        let r = router();
        let res = r.handle(request(http::Method::POST, "/exact", "")).await;
        assert_eq!(res.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        let res = r.handle(request(http::Method::DELETE, "/upload", "")).await;
        assert_eq!(res.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(r.handle(request(purge, "/exact", "")).await.status(), http::StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn body_at_the_limit_is_accepted() {
        let res = router().handle(request(http::Method::POST, "/upload", vec![b'a'; MAX_BODY_BYTES])).await;
        assert_eq!(res.status(), http::StatusCode::OK);
        assert_eq!(body_text(res).await, MAX_BODY_BYTES.to_string());
    }

    #[tokio::test]
    async fn body_over_the_limit_is_413() {
        let res = router().handle(request(http::Method::POST, "/upload", vec![b'a'; MAX_BODY_BYTES + 1])).await;
        assert_eq!(res.status(), http::StatusCode::from(Status::PayloadTooLarge));
    }
}
