use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use crate::auth::{SessionError, SessionUser};
use crate::error::ApiError;
use crate::gate::GateDecision;
use crate::server::AppState;

/// Runs the access gate ahead of every matched route.
///
/// Verified sessions are attached to the request as a [`SessionUser`]
/// extension; nothing about the session itself is changed.
pub async fn access_gate_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !state.gate.applies_to(&path) {
        return next.run(request).await;
    }

    let session = match state.sessions.authenticate(request.headers()) {
        Ok(user) => Some(user),
        Err(SessionError::MissingToken) => None,
        Err(e) => {
            debug!("Ignoring session on {}: {}", path, e);
            None
        }
    };

    match state.gate.decide(session.is_some(), &path) {
        GateDecision::Allow => {
            if let Some(user) = session {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        GateDecision::Deny => {
            let requested = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or(path);
            warn!("Unauthenticated request for {} redirected to login", requested);
            Redirect::to(&state.gate.login_redirect(&requested)).into_response()
        }
        GateDecision::Redirect(location) => Redirect::to(&location).into_response(),
    }
}

/// Session user attached by [`access_gate_middleware`]
#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Session required"))
    }
}
