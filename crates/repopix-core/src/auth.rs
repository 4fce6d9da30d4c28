//! Local access gate.
//!
//! A shared auth code kept in [`Settings`], optionally followed by a
//! six-digit verification code. The verification step checks the code's
//! shape only; there is no one-time-password secret behind it, so this is a
//! convenience lock and not an authentication mechanism.

use thiserror::Error;

use crate::settings::{Settings, SettingsPatch, SettingsStore};
use crate::validation::validate_verification_code;

/// Reasons the gate stays closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The auth code does not match the stored one.
    #[error("invalid auth code")]
    InvalidCode,

    /// Two-factor is enabled but no verification code was given.
    #[error("verification code required")]
    MissingOtp,

    /// The verification code is not six digits.
    #[error("verification code must be six digits")]
    MalformedOtp,
}

/// Decides whether a caller may use the application.
#[derive(Debug, Clone, Copy)]
pub struct AccessGate<'a> {
    settings: &'a Settings,
}

impl<'a> AccessGate<'a> {
    /// Creates a gate over the current settings.
    #[must_use]
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Returns true if an auth code is configured.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.settings
            .auth_code
            .as_deref()
            .is_some_and(|code| !code.is_empty())
    }

    /// Checks the supplied codes.
    ///
    /// # Errors
    ///
    /// Returns the first [`AuthError`] that applies.
    pub fn login(&self, code: Option<&str>, otp: Option<&str>) -> Result<(), AuthError> {
        let Some(expected) = self.settings.auth_code.as_deref().filter(|c| !c.is_empty()) else {
            return Ok(());
        };

        if code != Some(expected) {
            tracing::warn!("auth code rejected");
            return Err(AuthError::InvalidCode);
        }

        if self.settings.two_factor_enabled {
            let otp = otp.ok_or(AuthError::MissingOtp)?;
            validate_verification_code(otp).map_err(|_| AuthError::MalformedOtp)?;
        }

        tracing::debug!("access granted");
        Ok(())
    }
}

/// Turns on the verification step after checking a sample code.
///
/// # Errors
///
/// Returns [`crate::HostError::Access`] for a malformed code and
/// [`crate::HostError::Settings`] if the settings cannot be saved.
pub fn enable_two_factor(store: &SettingsStore, verification_code: &str) -> crate::Result<Settings> {
    validate_verification_code(verification_code).map_err(|_| AuthError::MalformedOtp)?;
    store.update(SettingsPatch {
        two_factor_enabled: Some(true),
        ..Default::default()
    })
}
