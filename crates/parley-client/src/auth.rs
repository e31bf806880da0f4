//! Simulated phone/OTP sign-in.
//!
//! The flow is `EnterPhone -> OtpSent -> Authenticated`. Nothing is sent
//! anywhere; the command layer adds artificial latency around each step.

use parley_shared::{validation, User, ValidationError};
use serde::Serialize;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum LoginStep {
    EnterPhone,
    OtpSent {
        country_code: String,
        phone_number: String,
    },
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    user: Option<User>,
    step: LoginStep,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            step: LoginStep::EnterPhone,
        }
    }
}

impl AuthState {
    /// Start from a user restored from storage, if any.
    pub fn restore(user: Option<User>) -> Self {
        match user {
            Some(user) => Self {
                user: Some(user),
                step: LoginStep::Authenticated,
            },
            None => Self::default(),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn step(&self) -> &LoginStep {
        &self.step
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(ClientError::NotAuthenticated)
    }

    /// Validate the phone form. Does not change state; the caller moves to
    /// `OtpSent` with [`otp_sent`](Self::otp_sent) once the send delay
    /// has elapsed.
    pub fn check_phone(&self, country_code: &str, phone_number: &str) -> Result<()> {
        if self.is_authenticated() {
            return Err(ClientError::AlreadyAuthenticated);
        }
        validation::phone(country_code, phone_number)?;
        Ok(())
    }

    pub fn otp_sent(&mut self, country_code: &str, phone_number: &str) {
        self.step = LoginStep::OtpSent {
            country_code: country_code.trim().to_string(),
            phone_number: phone_number.trim().to_string(),
        };
    }

    /// Validate the OTP form against the current step.
    pub fn check_otp(&self, code: &str) -> Result<()> {
        if self.is_authenticated() {
            return Err(ClientError::AlreadyAuthenticated);
        }
        if !matches!(self.step, LoginStep::OtpSent { .. }) {
            return Err(ClientError::OtpNotRequested);
        }
        validation::otp(code)?;
        Ok(())
    }

    /// Complete sign-in for the number the OTP was sent to.
    pub fn authenticate(&mut self) -> Result<User> {
        let LoginStep::OtpSent {
            country_code,
            phone_number,
        } = &self.step
        else {
            return Err(ClientError::OtpNotRequested);
        };
        let user = User::new(phone_number.clone(), country_code.clone());
        self.user = Some(user.clone());
        self.step = LoginStep::Authenticated;
        Ok(user)
    }

    /// Return to the phone form, discarding the pending OTP.
    pub fn back(&mut self) -> bool {
        if matches!(self.step, LoginStep::OtpSent { .. }) {
            self.step = LoginStep::EnterPhone;
            return true;
        }
        false
    }

    pub fn logout(&mut self) -> Option<User> {
        self.step = LoginStep::EnterPhone;
        self.user.take()
    }
}

/// Whether `err` is a wrong-length OTP, reported as "Invalid OTP".
pub fn is_invalid_otp(err: &ClientError) -> bool {
    matches!(
        err,
        ClientError::Validation(ValidationError::InvalidOtpLength { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_login_flow() {
        let mut auth = AuthState::default();
        assert!(!auth.is_authenticated());

        auth.check_phone("+91", "9876543210").unwrap();
        auth.otp_sent("+91", " 9876543210 ");
        assert_eq!(
            auth.step(),
            &LoginStep::OtpSent {
                country_code: "+91".into(),
                phone_number: "9876543210".into()
            }
        );

        auth.check_otp("123456").unwrap();
        let user = auth.authenticate().unwrap();
        assert_eq!(user.phone_number, "9876543210");
        assert_eq!(user.country_code, "+91");
        assert!(auth.is_authenticated());
        assert_eq!(auth.step(), &LoginStep::Authenticated);
    }

    #[test]
    fn test_otp_before_phone_is_rejected() {
        let auth = AuthState::default();
        assert!(matches!(auth.check_otp("123456"), Err(ClientError::OtpNotRequested)));
    }

    #[test]
    fn test_short_otp_is_invalid() {
        let mut auth = AuthState::default();
        auth.otp_sent("+1", "5550100");
        let err = auth.check_otp("123").unwrap_err();
        assert!(is_invalid_otp(&err));
        assert!(err.is_validation());
    }

    #[test]
    fn test_back_returns_to_phone_form() {
        let mut auth = AuthState::default();
        assert!(!auth.back());
        auth.otp_sent("+1", "5550100");
        assert!(auth.back());
        assert_eq!(auth.step(), &LoginStep::EnterPhone);
    }

    #[test]
    fn test_restore_and_logout() {
        let user = User::new("5550100", "+1");
        let mut auth = AuthState::restore(Some(user.clone()));
        assert!(auth.is_authenticated());
        assert!(matches!(auth.check_phone("+1", "5550100"), Err(ClientError::AlreadyAuthenticated)));

        assert_eq!(auth.logout(), Some(user));
        assert!(auth.require_user().is_err());
        assert_eq!(auth.step(), &LoginStep::EnterPhone);
    }
}
