//! Accounts and the session guard.
//!
//! A successful login stores the public user record in the session under
//! [`SESSION_USER_KEY`]; `require_session` reads it back and hands it to the
//! mutation handlers as an `Extension<SessionUser>`.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use tower_sessions::Session;
use trackflix_models::SessionUser;
use trackflix_sources::watchlist::api::{LoginRequest, SignupRequest, UserResponse, LOGIN_SUCCESS};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiJson};
use crate::store::normalize_email;
use crate::AppState;

pub const SESSION_USER_KEY: &str = "user";

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<SessionUser>), ApiError> {
    let name = body.name.trim();
    let email = normalize_email(&body.email);
    if name.is_empty() || email.is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, email and password are required".to_string(),
        ));
    }
    if state.store.find(email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already exists".to_string()));
    }

    let cost = state.bcrypt_cost;
    let password = body.password;
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    let document = state.store.create(name, email, hash).await?;
    Ok((StatusCode::CREATED, Json(document.session_user())))
}

/// POST /login. Answers the JSON string `"Success"` and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<&'static str>, ApiError> {
    let Some(user) = state.store.find(normalize_email(&body.email)).await? else {
        debug!("Login for unknown email {}", body.email);
        return Err(ApiError::NotFound("No Records found".to_string()));
    };

    let hash = user.password.clone();
    let password = body.password;
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    if !matches {
        warn!("Wrong password for {}", user.email);
        return Err(ApiError::Unauthorized("Password doesn't match".to_string()));
    }

    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, user.session_user()).await?;
    info!(user_id = %user.id, "Session created for {}", user.email);
    Ok(Json(LOGIN_SUCCESS))
}

/// POST /logout
pub async fn logout(session: Session) -> Result<Json<&'static str>, ApiError> {
    if let Some(user) = session.get::<SessionUser>(SESSION_USER_KEY).await? {
        info!("Logging out {}", user.email);
    }
    session.flush().await?;
    Ok(Json("Logout successful"))
}

/// GET /user
pub async fn current_user(session: Session) -> Result<Json<UserResponse>, ApiError> {
    match session.get::<SessionUser>(SESSION_USER_KEY).await? {
        Some(user) => Ok(Json(UserResponse { user })),
        None => Err(ApiError::not_authenticated()),
    }
}

/// Reject requests without a logged-in session
pub async fn require_session(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user) = session.get::<SessionUser>(SESSION_USER_KEY).await? else {
        debug!(path = %request.uri().path(), "Rejected request without session");
        return Err(ApiError::not_authenticated());
    };
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
