//! Axum middleware enforcing the route gate.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, header::InvalidHeaderValue, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};
use url::form_urlencoded;

use super::{is_api_route, RouteClass, RouteGate, SessionClaims, SessionVerifier};

/// Session cookie set by Clerk's frontend SDK.
const SESSION_COOKIE: &str = "__session";

#[derive(Clone)]
pub struct GateState {
    pub gate: Arc<RouteGate>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub sign_in_url: String,
}

impl GateState {
    /// Fails when `sign_in_url` cannot be sent as a `Location` header.
    pub fn new(
        gate: RouteGate,
        sessions: Arc<dyn SessionVerifier>,
        sign_in_url: String,
    ) -> Result<Self, InvalidHeaderValue> {
        HeaderValue::try_from(sign_in_url.as_str())?;

        Ok(Self {
            gate: Arc::new(gate),
            sessions,
            sign_in_url,
        })
    }

    fn sign_in_redirect(&self, path: &str) -> Response {
        let target: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
        let separator = if self.sign_in_url.contains('?') { '&' } else { '?' };
        Redirect::temporary(&format!("{}{}redirect_url={}", self.sign_in_url, separator, target))
            .into_response()
    }
}

/// Session token from the `__session` cookie, else a bearer token.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(String::from)
    })
    .filter(|token| !token.is_empty())
}

pub async fn route_gate(
    State(state): State<GateState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let class = state.gate.classify(&path);

    if class == RouteClass::Ignored {
        return next.run(req).await;
    }

    let session = session_token(req.headers()).map(|token| state.sessions.verify_session(&token));

    match (class, session) {
        (_, Some(Ok(claims))) => {
            debug!(path = %path, clerk_id = %claims.sub, "route_gate_session_attached");
            req.extensions_mut().insert::<SessionClaims>(claims);
        }
        (RouteClass::Public, _) => {}
        (_, session) => {
            let reason = match session {
                Some(Err(e)) => e.to_string(),
                _ => "no session".to_string(),
            };
            warn!(path = %path, reason = %reason, "route_gate_rejected");

            if is_api_route(&path) {
                return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
            }
            return state.sign_in_redirect(&path);
        }
    }

    next.run(req).await
}
