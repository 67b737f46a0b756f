use crate::db::{CredentialStore, StoreError};
use log::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both fields with surrounding whitespace removed.
    pub fn trimmed(&self) -> (&str, &str) {
        (self.username.trim(), self.password.trim())
    }

    /// True when neither trimmed field is empty.
    pub fn is_complete(&self) -> bool {
        let (username, password) = self.trimmed();
        !username.is_empty() && !password.is_empty()
    }
}

/// Result of a sign-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    Success,
    PasswordMismatch,
    UserNotFound,
}

impl SignInOutcome {
    pub fn message(self) -> &'static str {
        match self {
            SignInOutcome::Success => "Signed in successfully.",
            SignInOutcome::PasswordMismatch => "Password error.",
            SignInOutcome::UserNotFound => "User not found.",
        }
    }
}

pub fn sign_in(store: &CredentialStore, credentials: &Credentials) -> Result<SignInOutcome, StoreError> {
    let (username, password) = credentials.trimmed();

    let outcome = match store.find_by_name(username)? {
        Some(stored) if stored == password => SignInOutcome::Success,
        Some(_) => SignInOutcome::PasswordMismatch,
        None => SignInOutcome::UserNotFound,
    };

    match outcome {
        SignInOutcome::Success => info!("user {username} signed in"),
        SignInOutcome::PasswordMismatch => debug!("user {username}: password error"),
        SignInOutcome::UserNotFound => debug!("can not find user {username}"),
    }
    Ok(outcome)
}
