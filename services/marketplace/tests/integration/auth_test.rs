use edemy_auth_types::token::{SESSION_TOKEN_EXP, validate_session_token};
use edemy_domain::user::Role;

use edemy_marketplace::domain::repository::UserRepository;
use edemy_marketplace::error::MarketplaceError;
use edemy_marketplace::usecase::auth::{
    ForgotPasswordUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
    ResetPasswordInput, ResetPasswordUseCase,
};

use crate::helpers::{InMemoryStore, MockMailer, TEST_PASSWORD, seed_user};

const SECRET: &str = "auth-test-secret";

fn register_input(name: &str, email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        name: name.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_subscriber_with_normalized_email() {
    let store = InMemoryStore::new();
    let usecase = RegisterUseCase {
        users: store.clone(),
    };

    let user = usecase
        .execute(register_input("Ana", "  Ana@X.com ", "secret1"))
        .await
        .unwrap();

    assert_eq!(user.email, "ana@x.com");
    assert_eq!(user.roles, vec![Role::Subscriber]);
    assert_eq!(user.picture, "/avatar.png");
    assert!(store.find_credentials("ana@x.com").await.unwrap().is_some());
}

#[tokio::test]
async fn should_reject_second_registration_with_same_email() {
    let usecase = RegisterUseCase {
        users: InMemoryStore::new(),
    };
    usecase
        .execute(register_input("Ana", "ana@x.com", "secret1"))
        .await
        .unwrap();

    let err = usecase
        .execute(register_input("Ana", "ANA@x.com", "secret1"))
        .await
        .unwrap_err();

    assert!(matches!(err, MarketplaceError::EmailTaken));
    assert_eq!(err.to_string(), "Email is already registered");
}

#[tokio::test]
async fn should_reject_short_password() {
    let usecase = RegisterUseCase {
        users: InMemoryStore::new(),
    };
    let err = usecase
        .execute(register_input("Ana", "ana@x.com", "12345"))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::Validation(_)));
}

#[tokio::test]
async fn should_reject_blank_name_and_bad_email() {
    let usecase = RegisterUseCase {
        users: InMemoryStore::new(),
    };
    let err = usecase
        .execute(register_input("  ", "ana@x.com", "secret1"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Name is required");

    let err = usecase
        .execute(register_input("Ana", "not-an-email", "secret1"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Email is invalid");
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_with_seven_day_token() {
    let store = InMemoryStore::new();
    let user = seed_user(&store, "Ana", "ana@x.com").await;
    let usecase = LoginUseCase {
        users: store,
        jwt_secret: SECRET.to_owned(),
    };

    let out = usecase
        .execute(LoginInput {
            email: "Ana@X.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap();

    let info = validate_session_token(&out.token, SECRET).unwrap();
    assert_eq!(info.user_id, user.id);
    let now = chrono::Utc::now().timestamp() as u64;
    assert!(info.exp >= now + SESSION_TOKEN_EXP - 60);
    assert!(info.exp <= now + SESSION_TOKEN_EXP + 60);

    let body = serde_json::to_value(&out.user).unwrap();
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn should_fail_login_for_unknown_email_and_wrong_password() {
    let store = InMemoryStore::new();
    seed_user(&store, "Ana", "ana@x.com").await;
    let usecase = LoginUseCase {
        users: store,
        jwt_secret: SECRET.to_owned(),
    };

    let err = usecase
        .execute(LoginInput {
            email: "bob@x.com".to_owned(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::UserNotFound));

    let err = usecase
        .execute(LoginInput {
            email: "ana@x.com".to_owned(),
            password: "wrong-password".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::InvalidCredentials));
}

// ── Password reset ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_and_mail_reset_code() {
    let store = InMemoryStore::new();
    seed_user(&store, "Ana", "ana@x.com").await;
    let mailer = MockMailer::default();
    let usecase = ForgotPasswordUseCase {
        users: store.clone(),
        mailer: mailer.clone(),
    };

    usecase.execute("ana@x.com").await.unwrap();

    let code = store.stored_reset_code("ana@x.com").unwrap();
    assert_eq!(code.len(), 6);
    assert_eq!(code, code.to_uppercase());
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ana@x.com");
    assert!(sent[0].text.contains(&code));
    assert!(sent[0].html.contains(&code));
}

#[tokio::test]
async fn should_fail_forgot_password_for_unknown_email() {
    let usecase = ForgotPasswordUseCase {
        users: InMemoryStore::new(),
        mailer: MockMailer::default(),
    };
    let err = usecase.execute("nobody@x.com").await.unwrap_err();
    assert!(matches!(err, MarketplaceError::UserNotFound));
}

#[tokio::test]
async fn should_surface_mail_failure_on_forgot_password() {
    let store = InMemoryStore::new();
    seed_user(&store, "Ana", "ana@x.com").await;
    let usecase = ForgotPasswordUseCase {
        users: store.clone(),
        mailer: MockMailer {
            fail: true,
            ..MockMailer::default()
        },
    };

    let err = usecase.execute("ana@x.com").await.unwrap_err();
    assert!(matches!(err, MarketplaceError::Upstream(_)));
    assert!(store.stored_reset_code("ana@x.com").is_some());
}

#[tokio::test]
async fn should_reset_password_with_matching_code() {
    let store = InMemoryStore::new();
    seed_user(&store, "Ana", "ana@x.com").await;
    store.set_reset_code("ana@x.com", "ABC123").await.unwrap();

    let usecase = ResetPasswordUseCase {
        users: store.clone(),
    };
    usecase
        .execute(ResetPasswordInput {
            email: "ana@x.com".to_owned(),
            code: " abc123 ".to_owned(),
            new_password: "newsecret".to_owned(),
        })
        .await
        .unwrap();

    assert!(store.stored_reset_code("ana@x.com").is_none());
    let login = LoginUseCase {
        users: store,
        jwt_secret: SECRET.to_owned(),
    };
    login
        .execute(LoginInput {
            email: "ana@x.com".to_owned(),
            password: "newsecret".to_owned(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn should_reject_reset_with_wrong_code() {
    let store = InMemoryStore::new();
    seed_user(&store, "Ana", "ana@x.com").await;
    store.set_reset_code("ana@x.com", "ABC123").await.unwrap();

    let usecase = ResetPasswordUseCase {
        users: store.clone(),
    };
    let err = usecase
        .execute(ResetPasswordInput {
            email: "ana@x.com".to_owned(),
            code: "ZZZ999".to_owned(),
            new_password: "newsecret".to_owned(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MarketplaceError::InvalidResetCode));
    assert_eq!(store.stored_reset_code("ana@x.com").as_deref(), Some("ABC123"));
}
