use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use edemy_auth_types::{
    cookie::{clear_session_cookie, set_csrf_cookie, set_session_cookie},
    csrf::generate_csrf_token,
    session::Session,
};

use crate::domain::types::User;
use crate::error::MarketplaceError;
use crate::extract::Json;
use crate::handlers::OkResponse;
use crate::state::AppState;
use crate::usecase::auth::{
    CurrentUserUseCase, ForgotPasswordUseCase, LoginInput, LoginUseCase, RegisterInput,
    RegisterUseCase, ResetPasswordInput, ResetPasswordUseCase,
};

// ── POST /api/register ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<OkResponse>, MarketplaceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(OkResponse::json())
}

// ── POST /api/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret().to_owned(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(jar, out.token, &state.cookies);
    Ok((jar, Json(out.user)))
}

// ── GET|POST /api/logout ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_session_cookie(jar, &state.cookies);
    (
        jar,
        Json(MessageResponse {
            message: "Signout success",
        }),
    )
}

// ── GET /api/current-user ────────────────────────────────────────────────────

pub async fn current_user(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<User>, MarketplaceError> {
    let usecase = CurrentUserUseCase {
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(session.user_id).await?))
}

// ── GET /api/csrf-token ──────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

pub async fn csrf_token(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let token = generate_csrf_token();
    let jar = set_csrf_cookie(jar, token.clone(), &state.cookies);
    (jar, Json(CsrfTokenResponse { csrf_token: token }))
}

// ── POST /api/forgot-password ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<OkResponse>, MarketplaceError> {
    let usecase = ForgotPasswordUseCase {
        users: state.user_repo(),
        mailer: state.mailer.clone(),
    };
    usecase.execute(&body.email).await?;
    Ok(OkResponse::json())
}

// ── POST /api/reset-password ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<OkResponse>, MarketplaceError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(ResetPasswordInput {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
        })
        .await?;
    Ok(OkResponse::json())
}
