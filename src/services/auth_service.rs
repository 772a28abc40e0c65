// src/services/auth_service.rs
// DOCUMENTATION: Login, registration and profile
// PURPOSE: Validate credentials locally and keep the session token in sync
// with what the backend issues

use crate::errors::{CareError, ValidationErrors};
use crate::models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, ProfileInput, ProfilePayload,
    RegisterRequest, User,
};
use crate::services::backend_client::{BackendClient, Session};
use crate::services::validation::{check_email, optional_date, required_text, sanitize_text};
use chrono::Utc;

const MIN_PASSWORD_LENGTH: usize = 6;
const PROFILE_PATH: &str = "/user/profile";

pub struct AuthService;

impl AuthService {
    fn check_password(password: &str, errors: &mut ValidationErrors) {
        if password.is_empty() {
            errors.push("Password is required");
        } else if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }
    }

    /// Exchange credentials for a token and store it in `session`
    pub async fn login(
        client: &BackendClient,
        session: &Session,
        request: &LoginRequest,
    ) -> Result<AuthResponse, CareError> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&request.email, &mut errors);
        if request.password.is_empty() {
            errors.push("Password is required");
        }
        errors.into_result()?;

        let body = LoginRequest {
            email: email.unwrap_or_default(),
            password: request.password.clone(),
        };
        let response: AuthResponse = client.post("/auth/login", "login", session, &body).await?;
        session.set_token(response.token.clone()).await;
        log::info!("User {} logged in", body.email);
        Ok(response)
    }

    pub async fn register(
        client: &BackendClient,
        session: &Session,
        request: &RegisterRequest,
    ) -> Result<AuthResponse, CareError> {
        let mut errors = ValidationErrors::new();
        let name = required_text(Some(&request.name), "Name is required", &mut errors);
        let email = check_email(&request.email, &mut errors);
        Self::check_password(&request.password, &mut errors);
        errors.into_result()?;

        let body = RegisterRequest {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password: request.password.clone(),
            phone: sanitize_text(request.phone.as_deref()),
        };
        let response: AuthResponse = client
            .post("/auth/register", "register", session, &body)
            .await?;
        session.set_token(response.token.clone()).await;
        Ok(response)
    }

    pub async fn forgot_password(
        client: &BackendClient,
        request: &ForgotPasswordRequest,
    ) -> Result<(), CareError> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&request.email, &mut errors);
        errors.into_result()?;

        let body = ForgotPasswordRequest {
            email: email.unwrap_or_default(),
        };
        client
            .post_unit(
                "/auth/forgot-password",
                "forgot password",
                &Session::default(),
                &body,
            )
            .await
    }

    pub async fn profile(client: &BackendClient, session: &Session) -> Result<User, CareError> {
        if !session.is_authenticated().await {
            return Err(CareError::Unauthorized);
        }
        client.get(PROFILE_PATH, "get profile", session).await
    }

    pub async fn update_profile(
        client: &BackendClient,
        session: &Session,
        input: &ProfileInput,
    ) -> Result<User, CareError> {
        if !session.is_authenticated().await {
            return Err(CareError::Unauthorized);
        }

        let mut errors = ValidationErrors::new();
        let name = required_text(input.name.as_deref(), "Name is required", &mut errors);
        let date_of_birth = optional_date(
            input.date_of_birth.as_deref(),
            "Date of birth is invalid",
            &mut errors,
        );
        if let Some(dob) = date_of_birth {
            if dob > Utc::now().date_naive() {
                errors.push("Date of birth cannot be in the future");
            }
        }
        errors.into_result()?;

        let payload = ProfilePayload {
            name: name.unwrap_or_default(),
            phone: sanitize_text(input.phone.as_deref()),
            date_of_birth,
        };
        client
            .put(PROFILE_PATH, "update profile", session, &payload)
            .await
    }
}
