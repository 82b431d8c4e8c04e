//! Sign-up, sign-in, password reset and sign-out.

use serde_json::json;
use tracker_domain::UserProfile;

use crate::{
    backend::{paths, AuthUser, BackendClient},
    validation::{self, PasswordStrength},
    CoreError, ValidationError,
};

/// Fields collected by the sign-up form.
#[derive(Debug, Clone, Default)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub profile: UserProfile,
    /// Advisory rating of the chosen password.
    pub strength: PasswordStrength,
}

pub struct AuthService;

impl AuthService {
    /// Creates the account and its profile document at `users/{uid}`.
    pub fn sign_up(
        client: &BackendClient,
        request: &SignUpRequest,
    ) -> Result<SignUpOutcome, CoreError> {
        if !validation::all_present(&[&request.name, &request.email, &request.password]) {
            return Err(ValidationError::MissingRequiredFields.into());
        }
        validation::validate_email(&request.email)?;
        let strength = validation::password_strength(&request.password);

        let user = client
            .auth
            .create_user(request.email.trim(), &request.password)?;
        let mut profile = UserProfile::new(
            user.uid.clone(),
            request.name.trim(),
            user.email.clone(),
            client.clock.now(),
        );
        profile.phone_number = request
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .map(str::to_string);

        client
            .store
            .set(paths::USERS, &user.uid, serde_json::to_value(&profile)?)?;
        tracing::info!(uid = %user.uid, %strength, "user signed up");
        Ok(SignUpOutcome {
            user,
            profile,
            strength,
        })
    }

    /// Signs in and stamps `lastLogin` on the profile, recreating the profile
    /// when the account predates it.
    pub fn sign_in(
        client: &BackendClient,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, CoreError> {
        if !validation::all_present(&[email, password]) {
            return Err(ValidationError::MissingFields.into());
        }
        validation::validate_email(email)?;
        let user = client.auth.sign_in(email.trim(), password)?;
        let now = client.clock.now();
        match client.store.get(paths::USERS, &user.uid)? {
            Some(_) => client
                .store
                .update(paths::USERS, &user.uid, json!({ "lastLogin": now }))?,
            None => {
                tracing::warn!(uid = %user.uid, "profile missing at sign-in; recreating");
                let profile = UserProfile::new(user.uid.clone(), "", user.email.clone(), now);
                client
                    .store
                    .set(paths::USERS, &user.uid, serde_json::to_value(&profile)?)?;
            }
        }
        tracing::info!(uid = %user.uid, "user signed in");
        Ok(user)
    }

    pub fn send_password_reset(client: &BackendClient, email: &str) -> Result<(), CoreError> {
        if email.trim().is_empty() {
            return Err(ValidationError::MissingEmail.into());
        }
        validation::validate_email(email)?;
        client.auth.send_password_reset(email.trim())
    }

    pub fn confirm_password_reset(
        client: &BackendClient,
        code: &str,
        new_password: &str,
    ) -> Result<(), CoreError> {
        if !validation::all_present(&[code, new_password]) {
            return Err(ValidationError::MissingFields.into());
        }
        client.auth.confirm_password_reset(code, new_password)
    }

    pub fn sign_out(client: &BackendClient) -> Result<(), CoreError> {
        client.auth.sign_out()?;
        tracing::info!("user signed out");
        Ok(())
    }

    pub fn current_user(client: &BackendClient) -> Option<AuthUser> {
        client.auth.current_user()
    }
}
