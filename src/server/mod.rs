//! Axum HTTP surface: routing, session transport, request schemas.
//!
//! Every endpoint exchanges JSON. Session assertions travel in an HTTP-only,
//! secure, same-site-strict cookie named `token` (canonical) or an
//! `Authorization: Bearer` header (legacy, deprecated). Handlers validate
//! the request shape, run the store work on the blocking pool — hashing and
//! SQLite are CPU/IO-bound — and hand every error to the `ApiError` mapping
//! so raw store detail never reaches the client.

use crate::auth::password::{
    burn_verification_cost, generate_salt, hash_password, verify_password,
};
use crate::auth::{validate_password, ResetClaims, SessionClaims, TokenSigner};
use crate::config::Config;
use crate::error::ApiError;
use crate::mailer::{LogOnlyMailer, Mailer, SmtpMailer};
use crate::store::entries::EntryRow;
use crate::store::{AuditLogger, Store};
use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB).
const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout — fail fast on store unavailability.
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Session cookie name.
const SESSION_COOKIE: &str = "token";

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub audit: AuditLogger,
    pub session_signer: TokenSigner,
    pub reset_signer: TokenSigner,
    pub reset_ttl_secs: u64,
    pub mailer: Arc<dyn Mailer>,
    /// Public base URL embedded in reset links.
    pub base_url: String,
}

/// Run the HTTP server until shutdown.
pub async fn run_server(config: Config) -> Result<()> {
    let store = Store::open(&config.database.path, config.database.max_connections)?;

    let mailer: Arc<dyn Mailer> = match config.smtp.as_ref() {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            tracing::warn!("no [smtp] config — reset links will only be logged");
            Arc::new(LogOnlyMailer)
        }
    };

    let session_key = config
        .auth
        .session_key
        .clone()
        .unwrap_or_else(|| ephemeral_key("session"));
    let reset_key = config
        .auth
        .reset_key
        .clone()
        .unwrap_or_else(|| ephemeral_key("reset"));

    let state = AppState {
        audit: AuditLogger::new(store.clone()),
        store,
        session_signer: TokenSigner::new(&session_key, "session"),
        reset_signer: TokenSigner::new(&reset_key, "reset"),
        reset_ttl_secs: config.auth.reset_ttl_secs,
        mailer,
        base_url: config.public_base_url(),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "timewise listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn ephemeral_key(purpose: &str) -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    tracing::warn!(
        purpose,
        "no signing key configured — generated an ephemeral one; \
         tokens will not survive a restart"
    );
    hex::encode(bytes)
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/register", post(handle_register))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/reset", post(handle_request_reset))
        .route("/reset-confirm", post(handle_confirm_reset))
        .route("/loadEntries", put(handle_load_entries))
        .route("/loadProjects", put(handle_load_projects))
        .route("/createEntry", put(handle_create_entry))
        .route("/createProject", put(handle_create_project))
        .route("/updateEntry", put(handle_update_entry))
        .route("/updateProject", put(handle_update_project))
        .route("/loadUsers", get(handle_load_users))
        .route("/createUser", post(handle_create_user))
        .route("/deleteUser/{id}", delete(handle_delete_user))
        .route("/logs", get(handle_logs))
        .with_state(state)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

// ── Session transport ───────────────────────────────────────────────

fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; Secure; SameSite=Strict")
}

fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0")
}

/// Pull the session token from the cookie (canonical) or the bearer header
/// (legacy compatibility input).
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookies.split(';') {
            if let Some(value) = pair.trim().strip_prefix("token=") {
                if !value.is_empty() {
                    return Some(value.to_owned());
                }
            }
        }
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Resolve the caller's account from its session assertion. Fails with
/// `Unauthenticated` when the token is absent/invalid or when no live
/// account matches the embedded email + session version — the latter is how
/// password changes and account deletion revoke outstanding sessions.
async fn resolve_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(i64, String), ApiError> {
    let token = extract_session_token(headers).ok_or(ApiError::Unauthenticated)?;
    let claims: SessionClaims = state
        .session_signer
        .verify(&token)
        .map_err(|_| ApiError::Unauthenticated)?;

    let store = state.store.clone();
    let email = claims.email.clone();
    let account_id = run_blocking(move || store.resolve_account_id(&email, claims.sv)).await?;
    let account_id = account_id.ok_or(ApiError::Unauthenticated)?;
    Ok((account_id, claims.email))
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Store and hashing work runs on the blocking pool; the r2d2 checkout and
/// the 100k-round hash would otherwise stall request workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(inner)) => Ok(inner),
        Err(rejection) => Err(ApiError::Validation(format!(
            "invalid request body: {rejection}"
        ))),
    }
}

fn require_email_shape(email: &str) -> Result<(), ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') || trimmed.len() > 254 {
        return Err(ApiError::Validation("invalid email address".into()));
    }
    Ok(())
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn with_cookie(mut response: Response, cookie: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::fatal(anyhow::anyhow!("invalid cookie header: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

fn rfc3339(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn check_span(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(i64, i64), ApiError> {
    if end < start {
        return Err(ApiError::Validation("entry ends before it starts".into()));
    }
    Ok((start.timestamp(), end.timestamp()))
}

// ── Account & auth flows ────────────────────────────────────────────

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
}

/// POST /register — create an account and establish a session.
async fn handle_register(
    State(state): State<AppState>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = parse_body(body)?;
    let email = body.email.trim().to_owned();
    require_email_shape(&email)?;

    if !validate_password(&body.password) {
        state.audit.record(&email, "register", "users", None, false);
        return Err(ApiError::Validation(
            "password does not meet the policy".into(),
        ));
    }

    let store = state.store.clone();
    let (insert_email, password) = (email.clone(), body.password);
    let created = run_blocking(move || {
        let salt = generate_salt();
        let hash = hash_password(&password, &salt);
        store.create_account(&insert_email, &hash, &salt)
    })
    .await;

    match created {
        Ok(account_id) => {
            state
                .audit
                .record(&email, "register", "users", Some(account_id), true);
            let token = state
                .session_signer
                .issue(&SessionClaims::new(&email, 0))
                .map_err(ApiError::fatal)?;
            let response = json_response(StatusCode::CREATED, json!({"success": true}));
            with_cookie(response, &session_cookie(&token))
        }
        Err(err @ ApiError::Conflict(_)) => {
            // Attribute the rejection to the account already holding the email.
            let store = state.store.clone();
            let lookup = email.clone();
            let existing = run_blocking(move || store.find_live_account(&lookup))
                .await
                .unwrap_or(None)
                .map(|account| account.id);
            state.audit.record(&email, "register", "users", existing, false);
            Err(err)
        }
        Err(err) => Err(err),
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

fn invalid_credentials() -> ApiError {
    // One shape for absent account, policy-failing password, and hash
    // mismatch: no enumeration through the response.
    ApiError::Unauthorized("incorrect email or password".into())
}

/// POST /login — verify credentials and establish a session.
async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = parse_body(body)?;
    let email = body.email.trim().to_owned();

    // Fast fail: a policy-violating password can never match a stored hash.
    if !validate_password(&body.password) {
        state.audit.record(&email, "login", "users", None, false);
        return Err(invalid_credentials());
    }

    let store = state.store.clone();
    let (lookup_email, password) = (email.clone(), body.password);
    let verified = run_blocking(move || {
        match store.find_live_account(&lookup_email)? {
            Some(account) => {
                if verify_password(&password, &account.salt, &account.password_hash) {
                    Ok(account)
                } else {
                    Err(invalid_credentials())
                }
            }
            None => {
                // Burn the hashing cost so absent and present emails are
                // indistinguishable by timing.
                burn_verification_cost(&password);
                Err(invalid_credentials())
            }
        }
    })
    .await;

    match verified {
        Ok(account) => {
            state
                .audit
                .record(&email, "login", "users", Some(account.id), true);
            let token = state
                .session_signer
                .issue(&SessionClaims::new(&account.email, account.session_version))
                .map_err(ApiError::fatal)?;
            let response = json_response(StatusCode::OK, json!({"success": true}));
            with_cookie(response, &session_cookie(&token))
        }
        Err(err @ ApiError::Unauthorized(_)) => {
            state.audit.record(&email, "login", "users", None, false);
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// POST /logout — clear the session cookie. Stateless; always succeeds.
async fn handle_logout() -> Result<Response, ApiError> {
    let response = json_response(StatusCode::OK, json!({"success": true}));
    with_cookie(response, &clear_session_cookie())
}

#[derive(Deserialize)]
struct RequestResetBody {
    email: String,
}

/// POST /reset — dispatch a single-use reset link out of band.
async fn handle_request_reset(
    State(state): State<AppState>,
    body: Result<Json<RequestResetBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = parse_body(body)?;
    let email = body.email.trim().to_owned();

    let store = state.store.clone();
    let lookup = email.clone();
    let account = run_blocking(move || store.find_live_account(&lookup)).await?;

    let Some(account) = account else {
        state.audit.record(&email, "requestReset", "users", None, false);
        return Err(ApiError::NotFound("no account with this email".into()));
    };

    let token = state
        .reset_signer
        .issue(&ResetClaims::new(&account.email, state.reset_ttl_secs))
        .map_err(ApiError::fatal)?;
    let link = format!("{}/reset-confirm?token={token}", state.base_url);

    let mailer = state.mailer.clone();
    let recipient = account.email.clone();
    run_blocking(move || {
        mailer
            .send_reset_link(&recipient, &link)
            .map_err(ApiError::fatal)
    })
    .await?;

    state
        .audit
        .record(&account.email, "requestReset", "users", Some(account.id), true);
    Ok(json_response(StatusCode::OK, json!({"success": true})))
}

#[derive(Deserialize)]
struct ConfirmResetBody {
    token: String,
    password: String,
}

/// POST /reset-confirm — verify the reset assertion and overwrite the
/// password. Bumps the account's session version, so every session issued
/// before the reset stops resolving.
async fn handle_confirm_reset(
    State(state): State<AppState>,
    body: Result<Json<ConfirmResetBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = parse_body(body)?;

    let claims = state
        .reset_signer
        .verify_reset(&body.token)
        .map_err(|_| ApiError::Unauthorized("invalid or expired reset token".into()))?;

    if !validate_password(&body.password) {
        let store = state.store.clone();
        let lookup = claims.email.clone();
        let target = run_blocking(move || store.find_live_account(&lookup))
            .await
            .unwrap_or(None)
            .map(|account| account.id);
        state
            .audit
            .record(&claims.email, "confirmReset", "users", target, false);
        return Err(ApiError::Validation(
            "password does not meet the policy".into(),
        ));
    }

    let store = state.store.clone();
    let (email, password) = (claims.email.clone(), body.password);
    let rotated = run_blocking(move || {
        let salt = generate_salt();
        let hash = hash_password(&password, &salt);
        store.rotate_password(&email, &hash, &salt)
    })
    .await?;

    let Some(account_id) = rotated else {
        // Account deleted between issuance and confirmation.
        state
            .audit
            .record(&claims.email, "confirmReset", "users", None, false);
        return Err(ApiError::Unauthorized("invalid or expired reset token".into()));
    };

    state
        .audit
        .record(&claims.email, "confirmReset", "users", Some(account_id), true);
    Ok(json_response(StatusCode::OK, json!({"success": true})))
}

// ── Projects ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateProjectBody {
    name: String,
}

/// PUT /createProject
async fn handle_create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateProjectBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let (owner, email) = resolve_identity(&state, &headers).await?;
    let body = parse_body(body)?;
    let name = body.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::Validation("project name must not be empty".into()));
    }

    let store = state.store.clone();
    let insert_name = name.clone();
    let created = run_blocking(move || store.create_project(owner, &insert_name)).await;

    match created {
        Ok(project_id) => {
            state
                .audit
                .record(&email, "createProject", "projects", Some(project_id), true);
            Ok(json_response(StatusCode::OK, json!({"success": true})))
        }
        Err(err @ ApiError::Conflict(_)) => {
            let store = state.store.clone();
            let lookup = name.clone();
            let existing = run_blocking(move || store.find_live_project_id(owner, &lookup))
                .await
                .unwrap_or(None);
            state
                .audit
                .record(&email, "createProject", "projects", existing, false);
            Err(err)
        }
        Err(err) => Err(err),
    }
}

#[derive(Deserialize)]
struct UpdateProjectBody {
    /// Current name of the project to update.
    name: String,
    /// Replacement name; defaults to the current one.
    new_name: Option<String>,
    /// True soft-deletes the project.
    #[serde(default)]
    deleted: bool,
}

/// PUT /updateProject — rename and/or soft-delete, one endpoint.
async fn handle_update_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<UpdateProjectBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let (owner, email) = resolve_identity(&state, &headers).await?;
    let body = parse_body(body)?;
    let old_name = body.name.trim().to_owned();
    let new_name = body
        .new_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&old_name)
        .to_owned();
    if old_name.is_empty() {
        return Err(ApiError::Validation("project name must not be empty".into()));
    }

    let store = state.store.clone();
    let (update_old, update_new) = (old_name, new_name.clone());
    let updated = run_blocking(move || {
        store.update_project(owner, &update_old, &update_new, body.deleted)
    })
    .await;

    match updated {
        Ok(project_id) => {
            state
                .audit
                .record(&email, "updateProject", "projects", Some(project_id), true);
            Ok(json_response(StatusCode::OK, json!({"success": true})))
        }
        Err(err @ ApiError::Conflict(_)) => {
            let store = state.store.clone();
            let existing = run_blocking(move || store.find_live_project_id(owner, &new_name))
                .await
                .unwrap_or(None);
            state
                .audit
                .record(&email, "updateProject", "projects", existing, false);
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// PUT /loadProjects — every live project with its summed live-entry time.
async fn handle_load_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (owner, _) = resolve_identity(&state, &headers).await?;
    let store = state.store.clone();
    let projects = run_blocking(move || store.load_projects(owner)).await?;
    Ok(json_response(
        StatusCode::OK,
        json!({"success": true, "data": projects}),
    ))
}

// ── Entries ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateEntryBody {
    project: String,
    summary: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// PUT /createEntry — resolve the parent project by name, mint a local id.
async fn handle_create_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateEntryBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let (owner, email) = resolve_identity(&state, &headers).await?;
    let body = parse_body(body)?;
    let (start, end) = check_span(body.start, body.end)?;

    let store = state.store.clone();
    let (entry_id, local_id) = run_blocking(move || {
        store.create_entry(owner, body.project.trim(), &body.summary, start, end)
    })
    .await?;

    state
        .audit
        .record(&email, "createEntry", "entries", Some(entry_id), true);
    Ok(json_response(
        StatusCode::OK,
        json!({"success": true, "local_id": local_id}),
    ))
}

#[derive(Deserialize)]
struct UpdateEntryBody {
    local_id: String,
    summary: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    project: String,
    /// True soft-deletes the entry.
    #[serde(default)]
    deleted: bool,
}

/// PUT /updateEntry — update or soft-delete, matched by (owner, local id).
async fn handle_update_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<UpdateEntryBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let (owner, email) = resolve_identity(&state, &headers).await?;
    let body = parse_body(body)?;
    let (start, end) = check_span(body.start, body.end)?;

    let store = state.store.clone();
    let entry_id = run_blocking(move || {
        store.update_entry(
            owner,
            body.local_id.trim(),
            &body.summary,
            start,
            end,
            body.project.trim(),
            body.deleted,
        )
    })
    .await?;

    state
        .audit
        .record(&email, "updateEntry", "entries", Some(entry_id), true);
    Ok(json_response(StatusCode::OK, json!({"success": true})))
}

/// PUT /loadEntries — every live entry; parent name is null once the
/// project has been soft-deleted.
async fn handle_load_entries(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (owner, _) = resolve_identity(&state, &headers).await?;
    let store = state.store.clone();
    let entries = run_blocking(move || store.load_entries(owner)).await?;
    let data: Vec<Value> = entries.iter().map(entry_json).collect();
    Ok(json_response(
        StatusCode::OK,
        json!({"success": true, "data": data}),
    ))
}

fn entry_json(entry: &EntryRow) -> Value {
    json!({
        "local_id": entry.local_id,
        "summary": entry.summary,
        "start": rfc3339(entry.start_time),
        "end": rfc3339(entry.end_time),
        "project": entry.project,
    })
}

// ── Admin-style user surface ────────────────────────────────────────

/// GET /loadUsers — list live accounts.
async fn handle_load_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let _ = resolve_identity(&state, &headers).await?;
    let store = state.store.clone();
    let accounts = run_blocking(move || store.list_accounts()).await?;
    Ok(json_response(
        StatusCode::OK,
        json!({"success": true, "data": accounts}),
    ))
}

#[derive(Deserialize)]
struct CreateUserBody {
    email: String,
    password: String,
}

/// POST /createUser — create an account without establishing a session.
async fn handle_create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateUserBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let (_, actor_email) = resolve_identity(&state, &headers).await?;
    let body = parse_body(body)?;
    let email = body.email.trim().to_owned();
    require_email_shape(&email)?;
    if !validate_password(&body.password) {
        state.audit.record(&actor_email, "createUser", "users", None, false);
        return Err(ApiError::Validation(
            "password does not meet the policy".into(),
        ));
    }

    let store = state.store.clone();
    let (insert_email, password) = (email.clone(), body.password);
    let created = run_blocking(move || {
        let salt = generate_salt();
        let hash = hash_password(&password, &salt);
        store.create_account(&insert_email, &hash, &salt)
    })
    .await;

    match created {
        Ok(account_id) => {
            state
                .audit
                .record(&actor_email, "createUser", "users", Some(account_id), true);
            Ok(json_response(StatusCode::CREATED, json!({"success": true})))
        }
        Err(err @ ApiError::Conflict(_)) => {
            let store = state.store.clone();
            let existing = run_blocking(move || store.find_live_account(&email))
                .await
                .unwrap_or(None)
                .map(|account| account.id);
            state
                .audit
                .record(&actor_email, "createUser", "users", existing, false);
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// DELETE /deleteUser/{id} — soft-delete an account.
async fn handle_delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(account_id): Path<i64>,
) -> Result<Response, ApiError> {
    let (_, actor_email) = resolve_identity(&state, &headers).await?;

    let store = state.store.clone();
    let deleted = run_blocking(move || store.soft_delete_account(account_id)).await?;

    state
        .audit
        .record(&actor_email, "deleteUser", "users", Some(account_id), deleted);
    if !deleted {
        return Err(ApiError::NotFound("no such account".into()));
    }
    Ok(json_response(StatusCode::OK, json!({"success": true})))
}

// ── Audit surface ───────────────────────────────────────────────────

/// GET /logs — full audit trail, newest first. Operator-only: keep this
/// bound to an internal interface, it is intentionally unauthenticated to
/// match the standalone logger service it replaces.
async fn handle_logs(State(state): State<AppState>) -> Result<Response, ApiError> {
    let store = state.store.clone();
    let logs = run_blocking(move || store.list_logs()).await?;
    Ok(json_response(
        StatusCode::OK,
        json!({"success": true, "data": logs}),
    ))
}
