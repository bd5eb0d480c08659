//! Auth gate for the admin screen. The gate looks the session up once on mount,
//! keeps it current through a provider subscription and derives the status that
//! decides between the credential form and the protected content.

use crate::blog::{backend::SessionProvider, model::Session, session::Subscription};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    /// Initial session lookup still in flight.
    Checking,
    Anonymous,
    Authenticated(Session),
}

impl AuthStatus {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct GateState {
    checking: bool,
    session: Option<Session>,
}

impl GateState {
    fn status(&self) -> AuthStatus {
        if self.checking {
            return AuthStatus::Checking;
        }
        self.session
            .clone()
            .map_or(AuthStatus::Anonymous, AuthStatus::Authenticated)
    }
}

/// Receiver side of the gate status, for screens that redraw on change.
pub struct StatusWatch {
    rx: watch::Receiver<GateState>,
}

impl StatusWatch {
    /// Waits for the next change and returns the new status. Returns `None` once
    /// the gate has been unmounted.
    pub async fn changed(&mut self) -> Option<AuthStatus> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().status())
    }
}

pub struct AuthGate {
    provider: Arc<dyn SessionProvider>,
    state: Arc<watch::Sender<GateState>>,
    subscription: Option<Subscription>,
}

impl AuthGate {
    /// Mounts the gate in the `Checking` state and subscribes to session changes.
    #[must_use]
    pub fn mount(provider: Arc<dyn SessionProvider>) -> Self {
        let (state, _) = watch::channel(GateState {
            checking: true,
            session: None,
        });
        let mut gate = Self {
            provider,
            state: Arc::new(state),
            subscription: None,
        };
        gate.subscribe_to_session_changes();
        gate
    }

    fn subscribe_to_session_changes(&mut self) {
        let state = Arc::clone(&self.state);
        let subscription = self.provider.subscribe_to_changes(Box::new(move |event| {
            debug!(kind = ?event.kind, "session change");
            let session = event.session.clone();
            state.send_modify(|current| current.session = session);
        }));
        self.subscription = Some(subscription);
    }

    /// Performs the one session lookup of this mount. A failed lookup degrades to
    /// anonymous; nothing is retried.
    #[instrument(skip(self))]
    pub async fn resolve_initial_session(&self) -> AuthStatus {
        let session = match self.provider.get_current_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!("Session lookup failed, continuing anonymous: {err}");
                None
            }
        };

        self.state.send_modify(|current| {
            current.session = session;
            current.checking = false;
        });

        self.status()
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.state.borrow().status()
    }

    #[must_use]
    pub fn is_checking(&self) -> bool {
        self.state.borrow().checking
    }

    #[must_use]
    pub fn watch(&self) -> StatusWatch {
        StatusWatch {
            rx: self.state.subscribe(),
        }
    }

    /// Continuation invoked by the credential form after a successful sign-in.
    pub fn on_login(&self, session: Session) {
        self.state
            .send_modify(|current| current.session = Some(session));
    }

    /// Returns [`Self::on_login`] as an owned callback.
    #[must_use]
    pub fn login_handler(&self) -> impl Fn(Session) + Send + Sync + 'static {
        let state = Arc::clone(&self.state);
        move |session| state.send_modify(|current| current.session = Some(session))
    }

    /// Asks the provider to end the session, then drops to anonymous whatever the
    /// provider answered.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> AuthStatus {
        if let Err(err) = self.provider.sign_out().await {
            warn!("Sign-out request failed, clearing local session anyway: {err}");
        }
        self.state.send_modify(|current| current.session = None);
        self.status()
    }

    /// Releases the session subscription. Dropping the gate does the same.
    pub fn unmount(mut self) {
        self.subscription.take();
    }
}
