//! REST API handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};

use super::types::{status_for, SignInRequest, SignInResponse};
use crate::provider::{use_auth, use_require_auth, AuthContext, RequireAuth, Scope};
use crate::session::AuthState;

/// Shared application state.
///
/// Handlers consume auth through the `app` scope, which sits below the
/// provider in the consumer tree.
#[derive(Clone, Debug)]
pub struct AppState {
    pub scope: Scope,
}

impl AppState {
    pub fn new(auth: AuthContext) -> Self {
        Self {
            scope: Scope::root().provide(auth).child("app"),
        }
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "auth-context",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Landing page.
pub async fn landing_page(State(state): State<AppState>) -> Html<String> {
    let view = use_require_auth(&state.scope.child("page"));
    Html(render_landing(&view))
}

fn render_landing(view: &RequireAuth) -> String {
    let body = if view.loading {
        "<p>Loading...</p>".to_string()
    } else if let Some(user) = view.user.as_ref().filter(|_| view.is_authenticated) {
        format!(
            "<h2>Welcome back, {}</h2>\n<p>You are signed in as {}.</p>",
            escape_html(user.display_name()),
            escape_html(&user.email)
        )
    } else {
        "<h2>Welcome</h2>\n<p>Sign in to continue.</p>".to_string()
    };

    format!(
        "<!doctype html>\n<html>\n<head><title>Auth System</title></head>\n<body>\n<h1>Auth System</h1>\n{body}\n</body>\n</html>\n"
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Current auth state.
pub async fn get_auth_state(State(state): State<AppState>) -> Json<AuthState> {
    Json(use_auth(&state.scope).state())
}

/// Authentication status view.
pub async fn get_require_auth(State(state): State<AppState>) -> Json<RequireAuth> {
    Json(use_require_auth(&state.scope))
}

/// Sign in with email and password.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Response {
    let auth = use_auth(&state.scope);
    let result = auth.sign_in(&req.email, &req.password).await;

    let status = match &result {
        Ok(()) => StatusCode::OK,
        Err(e) => status_for(e),
    };
    (status, Json(SignInResponse::from_result(&result))).into_response()
}

/// Sign out of the current session.
pub async fn sign_out(State(state): State<AppState>) -> StatusCode {
    use_auth(&state.scope).sign_out().await;
    StatusCode::NO_CONTENT
}
