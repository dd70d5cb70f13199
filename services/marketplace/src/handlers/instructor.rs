use axum::extract::State;

use edemy_auth_types::session::Session;

use crate::domain::types::User;
use crate::error::MarketplaceError;
use crate::extract::Json;
use crate::handlers::OkResponse;
use crate::state::AppState;
use crate::usecase::instructor::{
    AccountStatusUseCase, CurrentInstructorUseCase, MakeInstructorUseCase,
};

// ── POST /api/make-instructor ────────────────────────────────────────────────

/// Responds with the onboarding URL as plain text.
pub async fn make_instructor(
    session: Session,
    State(state): State<AppState>,
) -> Result<String, MarketplaceError> {
    let usecase = MakeInstructorUseCase {
        users: state.user_repo(),
        payments: state.payments.clone(),
    };
    usecase.execute(session.user_id).await
}

// ── POST /api/get-account-status ─────────────────────────────────────────────

pub async fn get_account_status(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<User>, MarketplaceError> {
    let usecase = AccountStatusUseCase {
        users: state.user_repo(),
        payments: state.payments.clone(),
    };
    Ok(Json(usecase.execute(session.user_id).await?))
}

// ── GET /api/current-instructor ──────────────────────────────────────────────

pub async fn current_instructor(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<OkResponse>, MarketplaceError> {
    let usecase = CurrentInstructorUseCase {
        users: state.user_repo(),
    };
    usecase.execute(session.user_id).await?;
    Ok(OkResponse::json())
}
