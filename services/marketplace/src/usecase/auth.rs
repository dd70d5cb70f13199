use rand::RngExt;

use edemy_auth_types::token::issue_session_token;
use edemy_domain::id::UserId;

use crate::domain::repository::{Mailer, UserRepository};
use crate::domain::types::{
    EmailMessage, MIN_PASSWORD_LEN, NewUser, RESET_CODE_LEN, User,
};
use crate::error::MarketplaceError;
use crate::password::{hash_password, verify_password};

/// Charset for password reset codes (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_reset_code() -> String {
    let mut rng = rand::rng();
    (0..RESET_CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Trim and lowercase; stored and looked-up emails are always in this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn validate_password(password: &str) -> Result<(), MarketplaceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MarketplaceError::Validation(format!(
            "Password is required and should be min {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RegisterUseCase<U> {
    pub async fn execute(&self, input: RegisterInput) -> Result<User, MarketplaceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(MarketplaceError::Validation("Name is required".to_owned()));
        }
        validate_password(&input.password)?;
        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(MarketplaceError::Validation("Email is invalid".to_owned()));
        }

        if self.users.find_credentials(&email).await?.is_some() {
            return Err(MarketplaceError::EmailTaken);
        }

        let new_user = NewUser {
            id: UserId::new(),
            name: name.to_owned(),
            email,
            password_hash: hash_password(&input.password)?,
        };
        // A concurrent register with the same email surfaces as EmailTaken from the store.
        let user = self.users.create(&new_user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub token: String,
}

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, MarketplaceError> {
        let email = normalize_email(&input.email);
        let credentials = self
            .users
            .find_credentials(&email)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;

        if !verify_password(&input.password, &credentials.password_hash) {
            return Err(MarketplaceError::InvalidCredentials);
        }

        let token = issue_session_token(credentials.user.id, &self.jwt_secret).map_err(|e| {
            MarketplaceError::Internal(anyhow::Error::new(e).context("sign session"))
        })?;
        Ok(LoginOutput {
            user: credentials.user,
            token,
        })
    }
}

// ── Current user ─────────────────────────────────────────────────────────────

pub struct CurrentUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CurrentUserUseCase<U> {
    pub async fn execute(&self, user_id: UserId) -> Result<User, MarketplaceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)
    }
}

// ── Forgot / reset password ──────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<U: UserRepository, M: Mailer> {
    pub users: U,
    pub mailer: M,
}

impl<U: UserRepository, M: Mailer> ForgotPasswordUseCase<U, M> {
    /// Store a fresh reset code and mail it. A mail failure is returned to
    /// the caller; the stored code stays valid until the next request replaces it.
    pub async fn execute(&self, email: &str) -> Result<(), MarketplaceError> {
        let email = normalize_email(email);
        let code = generate_reset_code();

        if !self.users.set_reset_code(&email, &code).await? {
            return Err(MarketplaceError::UserNotFound);
        }

        self.mailer.send(&reset_email(&email, &code)).await?;
        Ok(())
    }
}

fn reset_email(to: &str, code: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_owned(),
        subject: "Reset password".to_owned(),
        html: format!(
            "<html><h1>Reset password</h1>\
             <p>Use this code to reset your password</p>\
             <h2 style=\"color:red;\">{code}</h2>\
             <i>edemy</i></html>"
        ),
        text: format!("Use this code to reset your password: {code}"),
    }
}

pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResetPasswordUseCase<U> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), MarketplaceError> {
        validate_password(&input.new_password)?;
        let email = normalize_email(&input.email);
        let code = input.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(MarketplaceError::InvalidResetCode);
        }

        let hash = hash_password(&input.new_password)?;
        if !self.users.reset_password(&email, &code, &hash).await? {
            return Err(MarketplaceError::InvalidResetCode);
        }
        Ok(())
    }
}
