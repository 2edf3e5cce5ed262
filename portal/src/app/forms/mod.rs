//! # Forms
//!
//! Client-side validated forms. Each form owns its raw input strings, the
//! per-field errors and a [`FormState`]. Submission is refused without calling
//! the backend while any field error exists; a backend failure keeps the
//! form open with the backend's message.

pub mod bank_account;
pub mod funds;
pub mod investment;
pub mod profile;

pub use bank_account::{BankAccountField, BankAccountForm};
pub use funds::{DepositForm, WithdrawalForm};
pub use investment::{InvestmentField, InvestmentForm};
pub use profile::{ProfileField, ProfileForm};

use crate::core::error::{PortalError, Result};
use crate::utils::validation::FieldErrors;

/// Label shown on the submit button while a request is in flight.
pub const SAVING_LABEL: &str = "Saving...";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl FormState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, FormState::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FormState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// State and errors shared by every form.
#[derive(Debug, Clone, Default)]
pub struct FormCore {
    pub state: FormState,
    pub errors: FieldErrors,
}

impl FormCore {
    /// Submit button text: `idle` normally, "Saving..." while submitting.
    pub fn submit_label<'a>(&self, idle: &'a str) -> &'a str {
        if self.state.is_submitting() {
            SAVING_LABEL
        } else {
            idle
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.state.is_submitting() && self.errors.is_empty()
    }

    /// A field was edited: its error goes away and a failure banner is dismissed.
    pub fn touch(&mut self, field: &str) {
        self.errors.remove(field);
        if matches!(self.state, FormState::Failed(_)) {
            self.state = FormState::Idle;
        }
    }

    /// Enter `Submitting`; refused while another submit is running.
    pub fn begin(&mut self) -> Result<()> {
        if self.state.is_submitting() {
            return Err(PortalError::State("Submission already in progress".to_string()));
        }
        self.errors = FieldErrors::new();
        self.state = FormState::Submitting;
        Ok(())
    }

    /// Keep the field errors on the form; the backend is not called.
    pub fn reject(&mut self, errors: FieldErrors) -> PortalError {
        tracing::debug!(errors = %errors, "Form validation failed");
        self.errors = errors.clone();
        self.state = FormState::Idle;
        PortalError::Validation(errors)
    }

    /// Record the outcome of the backend call.
    pub fn finish<T>(&mut self, result: Result<T>, fallback: &str) -> Result<T> {
        match &result {
            Ok(_) => self.state = FormState::Succeeded,
            Err(e) => {
                tracing::warn!(error = %e, "Form submission failed");
                self.state = FormState::Failed(e.user_message(fallback));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_keeps_errors_until_touched() {
        let mut core = FormCore::default();
        let mut errors = FieldErrors::new();
        errors.insert("bankName", "Bank name is required");

        assert!(matches!(core.reject(errors), PortalError::Validation(_)));
        assert_eq!(core.state, FormState::Idle);
        assert_eq!(core.errors.get("bankName"), Some("Bank name is required"));
        assert!(!core.can_submit());

        core.touch("bankName");
        assert!(core.can_submit());
    }

    #[test]
    fn test_submit_label_and_double_submit() {
        let mut core = FormCore::default();
        core.begin().unwrap();

        assert_eq!(core.submit_label("Add account"), "Saving...");
        assert!(matches!(core.begin(), Err(PortalError::State(_))));

        let result: Result<()> = core.finish(Err(PortalError::api(409, "Account already exists")), "Failed to save");
        assert!(result.is_err());
        assert_eq!(core.state.error(), Some("Account already exists"));
        assert_eq!(core.submit_label("Add account"), "Add account");
    }
}
