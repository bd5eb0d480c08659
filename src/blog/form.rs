//! Credential form shown by the auth gate while anonymous.
//!
//! Passwords arrive as [`SecretString`] and are handed straight to the provider;
//! they are never logged, stored or echoed back.

use crate::blog::{backend::SessionProvider, model::Session};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const SIGN_UP_CONFIRMATION: &str = "Account created! You can now sign in.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMessage {
    Info(String),
    Error(String),
}

impl FormMessage {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    SignedUp,
    SignedIn(Session),
    /// Failed local validation; no request was sent.
    Rejected(String),
    /// The provider refused; carries its error text.
    Failed(String),
    /// Another submission is still in flight; no request was sent.
    Busy,
}

pub type LoginHandler = Arc<dyn Fn(Session) + Send + Sync>;

#[derive(Debug, Default)]
struct FormState {
    mode: FormMode,
    submitting: bool,
    message: Option<FormMessage>,
}

pub struct CredentialForm {
    provider: Arc<dyn SessionProvider>,
    on_login: LoginHandler,
    state: Mutex<FormState>,
}

/// Clears the in-flight flag on every exit path, including a dropped future.
struct InFlight<'a> {
    form: &'a CredentialForm,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.form.state().submitting = false;
    }
}

impl CredentialForm {
    #[must_use]
    pub fn new(provider: Arc<dyn SessionProvider>, on_login: LoginHandler) -> Self {
        Self {
            provider,
            on_login,
            state: Mutex::new(FormState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn mode(&self) -> FormMode {
        self.state().mode
    }

    #[must_use]
    pub fn message(&self) -> Option<FormMessage> {
        self.state().message.clone()
    }

    /// True while a request is in flight; the submit control is disabled.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state().submitting
    }

    /// Switches between sign-in and sign-up and clears the message.
    pub fn toggle_mode(&self) {
        let mut state = self.state();
        state.mode = match state.mode {
            FormMode::SignIn => FormMode::SignUp,
            FormMode::SignUp => FormMode::SignIn,
        };
        state.message = None;
    }

    /// Submits in whichever mode the form is in.
    pub async fn submit(&self, email: &str, password: &SecretString) -> SubmitOutcome {
        match self.mode() {
            FormMode::SignIn => self.submit_sign_in(email, password).await,
            FormMode::SignUp => self.submit_sign_up(email, password).await,
        }
    }

    #[instrument(skip_all)]
    pub async fn submit_sign_up(&self, email: &str, password: &SecretString) -> SubmitOutcome {
        let Some(_in_flight) = self.begin() else {
            return SubmitOutcome::Busy;
        };
        if let Some(outcome) = self.validate(email, password) {
            return outcome;
        }

        match self.provider.sign_up(email, password).await {
            Ok(()) => {
                debug!("account created");
                let mut state = self.state();
                state.message = Some(FormMessage::Info(SIGN_UP_CONFIRMATION.to_string()));
                state.mode = FormMode::SignIn;
                SubmitOutcome::SignedUp
            }
            Err(err) => self.fail(err.user_message()),
        }
    }

    #[instrument(skip_all)]
    pub async fn submit_sign_in(&self, email: &str, password: &SecretString) -> SubmitOutcome {
        let Some(_in_flight) = self.begin() else {
            return SubmitOutcome::Busy;
        };
        if let Some(outcome) = self.validate(email, password) {
            return outcome;
        }

        match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => {
                debug!("signed in");
                (self.on_login)(session.clone());
                SubmitOutcome::SignedIn(session)
            }
            Err(err) => self.fail(err.user_message()),
        }
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        let mut state = self.state();
        if state.submitting {
            return None;
        }
        state.submitting = true;
        state.message = None;
        Some(InFlight { form: self })
    }

    fn validate(&self, email: &str, password: &SecretString) -> Option<SubmitOutcome> {
        let problem = if email.trim().is_empty() {
            "Email is required."
        } else if password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
            "Password must be at least 6 characters."
        } else {
            return None;
        };
        self.state().message = Some(FormMessage::Error(problem.to_string()));
        Some(SubmitOutcome::Rejected(problem.to_string()))
    }

    fn fail(&self, message: String) -> SubmitOutcome {
        self.state().message = Some(FormMessage::Error(message.clone()));
        SubmitOutcome::Failed(message)
    }
}
