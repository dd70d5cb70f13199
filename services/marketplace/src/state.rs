use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use edemy_auth_types::cookie::CookieSettings;
use edemy_auth_types::session::SessionKey;

use crate::infra::db::{
    DbCourseRepository, DbEnrollmentRepository, DbProgressRepository, DbUserRepository,
};
use crate::infra::s3::S3ObjectStore;
use crate::infra::ses::SesMailer;
use crate::infra::stripe::StripeClient;

/// Shared application state passed to every handler via axum `State`.
///
/// External clients are built once in `main` and cloned into use cases.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub session_key: SessionKey,
    pub cookies: CookieSettings,
    pub payments: StripeClient,
    pub storage: S3ObjectStore,
    pub mailer: SesMailer,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn course_repo(&self) -> DbCourseRepository {
        DbCourseRepository {
            db: self.db.clone(),
        }
    }

    pub fn enrollment_repo(&self) -> DbEnrollmentRepository {
        DbEnrollmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn progress_repo(&self) -> DbProgressRepository {
        DbProgressRepository {
            db: self.db.clone(),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        self.session_key.as_str()
    }
}

impl FromRef<AppState> for SessionKey {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}
