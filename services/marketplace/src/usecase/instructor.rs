use serde::Serialize;

use edemy_domain::id::UserId;
use edemy_domain::user::Role;

use crate::domain::repository::{PaymentGateway, UserRepository};
use crate::domain::types::User;
use crate::error::MarketplaceError;

#[derive(Serialize)]
struct StripeUserPrefill<'a> {
    stripe_user: PrefillEmail<'a>,
}

#[derive(Serialize)]
struct PrefillEmail<'a> {
    email: &'a str,
}

/// Onboarding link with the account email pre-filled (`stripe_user[email]`).
pub fn onboarding_url(link: &str, email: &str) -> Result<String, MarketplaceError> {
    let query = serde_qs::to_string(&StripeUserPrefill {
        stripe_user: PrefillEmail { email },
    })
    .map_err(|e| MarketplaceError::Internal(anyhow::Error::new(e).context("encode prefill")))?;
    Ok(format!("{link}?{query}"))
}

async fn load_user<U: UserRepository>(
    users: &U,
    user_id: UserId,
) -> Result<User, MarketplaceError> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or(MarketplaceError::UserNotFound)
}

// ── Onboarding ───────────────────────────────────────────────────────────────

pub struct MakeInstructorUseCase<U: UserRepository, P: PaymentGateway> {
    pub users: U,
    pub payments: P,
}

impl<U: UserRepository, P: PaymentGateway> MakeInstructorUseCase<U, P> {
    /// Create the payment account on first call, then return a fresh
    /// onboarding URL for it.
    pub async fn execute(&self, user_id: UserId) -> Result<String, MarketplaceError> {
        let user = load_user(&self.users, user_id).await?;

        let account_id = match user.stripe_account_id {
            Some(id) => id,
            None => {
                let id = self.payments.create_account(&user.email).await?;
                self.users.set_stripe_account(user_id, &id).await?;
                tracing::info!(user_id = %user_id, account_id = %id, "payment account created");
                id
            }
        };

        let link = self.payments.create_account_link(&account_id).await?;
        onboarding_url(&link, &user.email)
    }
}

pub struct AccountStatusUseCase<U: UserRepository, P: PaymentGateway> {
    pub users: U,
    pub payments: P,
}

impl<U: UserRepository, P: PaymentGateway> AccountStatusUseCase<U, P> {
    /// Grant the instructor role once the payment account can take charges.
    pub async fn execute(&self, user_id: UserId) -> Result<User, MarketplaceError> {
        let user = load_user(&self.users, user_id).await?;
        let account_id = user
            .stripe_account_id
            .ok_or(MarketplaceError::ChargesNotEnabled)?;

        let account = self.payments.retrieve_account(&account_id).await?;
        if !account.charges_enabled {
            return Err(MarketplaceError::ChargesNotEnabled);
        }

        let user = self.users.promote_instructor(user_id, account.raw).await?;
        tracing::info!(user_id = %user_id, "instructor promoted");
        Ok(user)
    }
}

pub struct CurrentInstructorUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CurrentInstructorUseCase<U> {
    pub async fn execute(&self, user_id: UserId) -> Result<(), MarketplaceError> {
        let user = load_user(&self.users, user_id).await?;
        if !user.has_role(Role::Instructor) {
            return Err(MarketplaceError::NotInstructor);
        }
        Ok(())
    }
}
