//! Session store: the single owner of session state.
//!
//! ARCHITECTURE
//! ============
//! One `SessionStore` is built at startup and handed to every consumer. It is
//! a cheap cloneable handle over shared state, so forms, the navigation bar and
//! route guards all observe the same session. Consumers read snapshots or
//! subscribe to changes; only the operations below mutate.
//!
//! CONCURRENCY
//! ===========
//! Mutating network operations are single-writer: starting one while another
//! is in flight fails with `ApiError::Busy`. Each operation is tagged with the
//! generation current when it began; `logout` and `invalidate` advance the
//! generation, and a response whose generation is no longer current is
//! dropped instead of applied.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::session::{Session, SessionStatus};
use super::token_store::TokenStore;
use crate::net::api::AuthApi;
use crate::net::error::ApiError;
use crate::net::types::{AuthResponse, Credentials, Registration, UserProfile};
use crate::util::validate::{validate_credentials, validate_registration};

type Subscriber = Arc<dyn Fn(&Session) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Network operation currently holding the single-writer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operation {
    Hydrate,
    Login,
    Register,
}

struct Inner {
    session: Session,
    generation: u64,
    in_flight: Option<Operation>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

#[derive(Clone)]
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("SessionStore")
            .field("status", &inner.session.status)
            .field("generation", &inner.generation)
            .field("in_flight", &inner.in_flight)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            inner: Arc::new(Mutex::new(Inner {
                session: Session::default(),
                generation: 0,
                in_flight: None,
                subscribers: Vec::new(),
                next_subscription: 0,
            })),
        }
    }

    // =============================================================
    // Reads
    // =============================================================

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().session.clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.lock().session.status
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.lock().session.user.clone()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.lock().session.error_message.clone()
    }

    /// Current session generation.
    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Whether a mutating network operation is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Register `f` to run after every state change with the new session.
    pub fn subscribe<F>(&self, f: F) -> SubscriptionId
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let subscriber: Subscriber = Arc::new(f);
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.retain(|(sub, _)| *sub != id);
    }

    // =============================================================
    // Operations
    // =============================================================

    /// Hydrate the session from the persisted token. Runs once; later calls
    /// are no-ops. Failures downgrade to `Anonymous` and are only recorded in
    /// `error_message`.
    pub async fn initialize(&self) {
        if self.status() != SessionStatus::Uninitialized {
            log::debug!("session already initialized; skipping");
            return;
        }

        let Some(token) = self.tokens.load() else {
            self.update(|inner| inner.session.sign_out());
            log::debug!("no persisted token; session is anonymous");
            return;
        };

        let generation = match self.begin(Operation::Hydrate, |session| session.token = Some(token.clone())) {
            Ok(generation) => generation,
            Err(e) => {
                log::warn!("session initialize skipped: {e}");
                return;
            }
        };

        let committed = match self.api.get_profile(&token).await {
            Ok(user) => {
                log::info!("session hydrated for {}", user.username);
                self.commit(generation, |session| session.authenticate(token, user))
            }
            Err(err) => {
                if err.is_auth() {
                    log::info!("persisted token rejected during hydration: {err}");
                } else {
                    log::warn!("session hydration failed: {err}");
                }
                let tokens = &self.tokens;
                self.commit(generation, |session| {
                    tokens.clear();
                    session.sign_out();
                    session.error_message = Some(err.to_string());
                })
            }
        };
        if committed.is_err() {
            log::debug!("profile hydration superseded (generation {generation})");
        }
    }

    /// Log in with username and password.
    ///
    /// # Errors
    ///
    /// `Validation` when a field is empty (no request is made), `Busy` when
    /// another operation is in flight, `Superseded` when the session changed
    /// before the response arrived, otherwise the gateway error. Validation and
    /// gateway errors are also stored in `error_message`.
    pub async fn login(&self, credentials: Credentials) -> Result<UserProfile, ApiError> {
        if let Err(message) = validate_credentials(&credentials) {
            return Err(self.reject(message));
        }
        let generation = self.begin(Operation::Login, |_| {})?;
        log::debug!("login started for {} (generation {generation})", credentials.username);
        let result = self.api.login(&credentials).await;
        self.resolve(generation, result)
    }

    /// Create an account; success is an immediately authenticated session.
    ///
    /// # Errors
    ///
    /// Same contract as [`SessionStore::login`], with registration-specific
    /// validation (required fields, email shape, password length).
    pub async fn register(&self, data: Registration) -> Result<UserProfile, ApiError> {
        if let Err(message) = validate_registration(&data) {
            return Err(self.reject(message));
        }
        let generation = self.begin(Operation::Register, |_| {})?;
        log::debug!("register started for {} (generation {generation})", data.username);
        let result = self.api.register(&data).await;
        self.resolve(generation, result)
    }

    /// Sign out locally. Always lands in `Anonymous` and discards any
    /// in-flight result.
    pub fn logout(&self) {
        let tokens = &self.tokens;
        self.update(|inner| {
            inner.generation += 1;
            inner.in_flight = None;
            tokens.clear();
            inner.session.sign_out();
        });
        log::info!("session signed out");
    }

    /// Discard any in-flight result without signing out (view teardown).
    ///
    /// An interrupted hydration returns the session to `Uninitialized` with
    /// the persisted token left in place, so a later `initialize` retries it.
    pub fn invalidate(&self) {
        self.update(|inner| {
            inner.generation += 1;
            match inner.in_flight.take() {
                Some(Operation::Hydrate) => {
                    inner.session.token = None;
                    inner.session.status = SessionStatus::Uninitialized;
                }
                Some(op) if inner.session.is_loading() => {
                    log::debug!("{op:?} discarded by invalidate");
                    inner.session.status = if inner.session.user.is_some() {
                        SessionStatus::Authenticated
                    } else {
                        SessionStatus::Anonymous
                    };
                }
                _ => {}
            }
        });
    }

    // =============================================================
    // Internals
    // =============================================================

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` and notify subscribers if the session changed. Subscribers run
    /// after the lock is released so they may read the store.
    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let (result, changed) = {
            let mut inner = self.lock();
            let before = inner.session.clone();
            let result = f(&mut *inner);
            let changed = (inner.session != before).then(|| {
                let subscribers: Vec<Subscriber> = inner.subscribers.iter().map(|(_, s)| Arc::clone(s)).collect();
                (inner.session.clone(), subscribers)
            });
            (result, changed)
        };
        if let Some((session, subscribers)) = changed {
            for subscriber in subscribers {
                subscriber(&session);
            }
        }
        result
    }

    fn reject(&self, message: &str) -> ApiError {
        self.update(|inner| inner.session.error_message = Some(message.to_owned()));
        ApiError::Validation(message.to_owned())
    }

    fn begin(&self, op: Operation, prepare: impl FnOnce(&mut Session)) -> Result<u64, ApiError> {
        self.update(|inner| {
            if let Some(running) = inner.in_flight {
                log::debug!("{op:?} rejected while {running:?} is in flight");
                return Err(ApiError::Busy);
            }
            inner.generation += 1;
            inner.in_flight = Some(op);
            inner.session.begin();
            prepare(&mut inner.session);
            Ok(inner.generation)
        })
    }

    fn commit(&self, generation: u64, apply: impl FnOnce(&mut Session)) -> Result<(), ApiError> {
        self.update(|inner| {
            if inner.generation != generation {
                log::debug!("dropping stale result for generation {generation} (current {})", inner.generation);
                return Err(ApiError::Superseded);
            }
            inner.in_flight = None;
            apply(&mut inner.session);
            Ok(())
        })
    }

    fn resolve(&self, generation: u64, result: Result<AuthResponse, ApiError>) -> Result<UserProfile, ApiError> {
        let tokens = &self.tokens;
        match result {
            Ok(resp) => {
                let user = resp.user.clone();
                self.commit(generation, |session| {
                    tokens.save(&resp.token);
                    session.authenticate(resp.token, resp.user);
                })?;
                log::info!("session authenticated for {}", user.username);
                Ok(user)
            }
            Err(err) => {
                self.commit(generation, |session| session.fail(err.to_string()))?;
                Err(err)
            }
        }
    }
}
