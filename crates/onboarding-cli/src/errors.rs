//! CLI error type carrying an exit code and an optional hint.

use std::fmt;

use onboarding_core::OnboardingError;

use crate::constants::exit_codes;

#[derive(Debug)]
pub struct CliError {
    message: String,
    hint: Option<String>,
    exit_code: i32,
}

impl CliError {
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: Some(hint.into()),
            exit_code: exit_codes::NOT_FOUND,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
            exit_code: exit_codes::INVALID_INPUT,
        }
    }

    pub fn conflict(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: Some(hint.into()),
            exit_code: exit_codes::CONFLICT,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Classify an error returned by a command handler.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let err = match err.downcast::<CliError>() {
            Ok(cli_error) => return cli_error,
            Err(err) => err,
        };

        let exit_code = match err.downcast_ref::<OnboardingError>() {
            Some(OnboardingError::NotFound(_))
            | Some(OnboardingError::NoMatchingChecklist { .. }) => exit_codes::NOT_FOUND,
            Some(OnboardingError::InvalidInput(_)) => exit_codes::INVALID_INPUT,
            Some(OnboardingError::Locked(_)) | Some(OnboardingError::Conflict(_)) => {
                exit_codes::CONFLICT
            }
            _ => 1,
        };

        Self {
            message: format!("{:#}", err),
            hint: None,
            exit_code,
        }
    }

    /// Print the error to stderr and exit the process.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self.message);
        if let Some(hint) = &self.hint {
            eprintln!();
            eprintln!("{}", hint);
        }
        std::process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}
