//! # Account Pages
//!
//! Server-rendered HTML for the home, about, login and registration pages.
//! Registration hashes the password with the credential verifier and stores
//! the account; login checks a password against the stored hash.
//!
//! bcrypt runs on the blocking pool. Unknown accounts and wrong passwords
//! produce the same 401 page after the same amount of hashing work.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use bookshelf_core::Account;
use bookshelf_crypto::MAX_PASSWORD_BYTES;
use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::AppError;
use crate::extractors::{extract_validated_form, Validate};
use crate::pages::{Notice, Page};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

// -- Forms --------------------------------------------------------------------

/// Login form. Wiped on drop; `Debug` omits the password.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Email and password are required.".to_string());
        }
        Ok(())
    }
}

/// Registration form. Wiped on drop; `Debug` omits the password.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct RegisterForm {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), String> {
        if self.firstname.trim().is_empty() || self.lastname.trim().is_empty() {
            return Err("First and last name are required.".to_string());
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("A valid email address is required.".to_string());
        }
        if self.password.is_empty() {
            return Err("A password is required.".to_string());
        }
        if self.password.len() > MAX_PASSWORD_BYTES {
            return Err(format!(
                "Passwords are limited to {MAX_PASSWORD_BYTES} bytes."
            ));
        }
        Ok(())
    }
}

/// Emails are compared trimmed and lowercased.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// -- Responses ----------------------------------------------------------------

/// A rendered page with a status code.
struct PageResponse {
    status: StatusCode,
    page: Page,
    notice: Option<Notice>,
}

impl PageResponse {
    fn ok(page: Page) -> Self {
        Self {
            status: StatusCode::OK,
            page,
            notice: None,
        }
    }

    fn success(status: StatusCode, page: Page, message: String) -> Self {
        Self {
            status,
            page,
            notice: Some(Notice::Success(message)),
        }
    }

    /// Re-render `page` with the error's status and public message.
    fn failure(page: Page, err: AppError) -> Self {
        let (status, code) = err.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %err, code, "account page failed");
        }
        Self {
            status,
            page,
            notice: Some(Notice::Error(page_message(&err))),
        }
    }
}

impl IntoResponse for PageResponse {
    fn into_response(self) -> Response {
        (self.status, Html(self.page.render(self.notice.as_ref()))).into_response()
    }
}

/// Error text for HTML pages, without the error-kind prefix.
fn page_message(err: &AppError) -> String {
    match err {
        AppError::NotFound(msg)
        | AppError::Validation(msg)
        | AppError::BadRequest(msg)
        | AppError::Unauthorized(msg)
        | AppError::Conflict(msg) => msg.clone(),
        AppError::Internal(_) => err.public_message(),
    }
}

// -- Router -------------------------------------------------------------------

/// Build the account pages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/about/", get(about))
        .route("/auth/", get(login_page).post(login))
        .route("/register/", get(register_page).post(register))
}

// -- Handlers -----------------------------------------------------------------

async fn index() -> impl IntoResponse {
    PageResponse::ok(Page::Home)
}

async fn about() -> impl IntoResponse {
    PageResponse::ok(Page::About)
}

async fn login_page() -> impl IntoResponse {
    PageResponse::ok(Page::Login)
}

async fn register_page() -> impl IntoResponse {
    PageResponse::ok(Page::Register)
}

/// POST /auth/: Check a password against the stored hash.
async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    match authenticate(&state, form).await {
        Ok(email) => PageResponse::success(
            StatusCode::OK,
            Page::Home,
            format!("Welcome back, {email}."),
        )
        .into_response(),
        Err(err) => PageResponse::failure(Page::Login, err).into_response(),
    }
}

async fn authenticate(
    state: &AppState,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<String, AppError> {
    let form = extract_validated_form(form)?;
    let email = normalize_email(&form.email);
    let password = Zeroizing::new(form.password.clone());
    drop(form);

    let stored = state.accounts.password_hash(&email).await?;
    let hasher = state.hasher.clone();
    let matched = tokio::task::spawn_blocking(move || match stored {
        Some(hash) => hasher.verify(&password, hash.as_str()),
        None => hasher.verify_absent(&password),
    })
    .await
    .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))?;

    if matched {
        tracing::info!("login succeeded");
        Ok(email)
    } else {
        tracing::info!("login rejected");
        Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
    }
}

/// POST /register/: Create an account.
async fn register(
    State(state): State<AppState>,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Response {
    match create_account(&state, form).await {
        Ok(email) => PageResponse::success(
            StatusCode::CREATED,
            Page::Login,
            format!("Account created for {email}. You can sign in now."),
        )
        .into_response(),
        Err(err) => PageResponse::failure(Page::Register, err).into_response(),
    }
}

async fn create_account(
    state: &AppState,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<String, AppError> {
    let form = extract_validated_form(form)?;
    let email = normalize_email(&form.email);
    let firstname = form.firstname.trim().to_string();
    let lastname = form.lastname.trim().to_string();
    let password = Zeroizing::new(form.password.clone());
    drop(form);

    let hasher = state.hasher.clone();
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))??;

    let account = Account::register(email.clone(), firstname, lastname, hash);
    state
        .accounts
        .insert_account(&account)
        .await
        .map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => {
                AppError::Conflict("An account with this email already exists.".to_string())
            }
            other => other,
        })?;

    tracing::info!("account registered");
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form(password: &str) -> RegisterForm {
        RegisterForm {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn register_form_requires_every_field() {
        assert!(register_form("secret").validate().is_ok());
        assert!(register_form("").validate().is_err());

        let mut form = register_form("secret");
        form.email = "not-an-email".to_string();
        assert!(form.validate().is_err());

        let mut form = register_form("secret");
        form.lastname = "  ".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn register_form_limits_password_bytes() {
        let at_limit = "x".repeat(MAX_PASSWORD_BYTES);
        assert!(register_form(&at_limit).validate().is_ok());

        let over = "x".repeat(MAX_PASSWORD_BYTES + 1);
        let err = register_form(&over).validate().unwrap_err();
        assert!(err.contains("72 bytes"));

        // 25 three-byte characters: 25 chars, 75 bytes
        let multibyte = "€".repeat(25);
        assert!(register_form(&multibyte).validate().is_err());
    }

    #[test]
    fn login_form_requires_email_and_password() {
        let form = LoginForm {
            email: "ada@example.com".to_string(),
            password: String::new(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn debug_never_shows_password() {
        let form = register_form("hunter2");
        let debug = format!("{form:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn page_message_strips_kind_prefix() {
        let msg = page_message(&AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        assert_eq!(msg, INVALID_CREDENTIALS);
        let msg = page_message(&AppError::Internal("db down".to_string()));
        assert_eq!(msg, "An internal error occurred");
    }
}
