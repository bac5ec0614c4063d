use std::sync::{Arc, Mutex};

use futures::executor::block_on;

use super::test_helpers::{auth_ok, credentials, test_store, user};
use super::*;
use crate::state::token_store::MemoryTokenStore;

fn assert_invariants(store: &SessionStore, tokens: &MemoryTokenStore) {
    let session = store.snapshot();
    assert!(session.is_consistent(), "status/user mismatch: {session:?}");
    assert_eq!(session.token, tokens.load(), "token out of sync with persisted slot");
    assert_eq!(session.is_loading(), store.is_busy());
}

// =============================================================
// initialize
// =============================================================

#[test]
fn initialize_without_token_is_anonymous_without_network() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    assert_eq!(store.status(), SessionStatus::Uninitialized);

    block_on(store.initialize());

    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(store.user(), None);
    assert!(api.calls().is_empty());
    assert_invariants(&store, &tokens);
}

#[test]
fn initialize_with_token_hydrates_profile() {
    let tokens = MemoryTokenStore::with_token("t-1");
    let (store, api) = test_store(&tokens);
    api.push_profile(Ok(user(1, "alice")));

    block_on(store.initialize());

    assert_eq!(store.status(), SessionStatus::Authenticated);
    assert_eq!(store.user(), Some(user(1, "alice")));
    assert_eq!(api.calls(), vec!["profile:t-1".to_owned()]);
    assert_eq!(tokens.load().as_deref(), Some("t-1"));
    assert_invariants(&store, &tokens);
}

#[test]
fn initialize_with_rejected_token_clears_it() {
    let tokens = MemoryTokenStore::with_token("expired");
    let (store, api) = test_store(&tokens);
    api.push_profile(Err(ApiError::from_status(401, r#"{"error":"Not authenticated"}"#)));

    block_on(store.initialize());

    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(store.user(), None);
    assert_eq!(tokens.load(), None);
    assert_eq!(store.error_message().as_deref(), Some("Not authenticated"));
    assert_invariants(&store, &tokens);
}

#[test]
fn initialize_network_failure_also_downgrades() {
    let tokens = MemoryTokenStore::with_token("t-1");
    let (store, api) = test_store(&tokens);
    api.push_profile(Err(ApiError::network("offline")));

    block_on(store.initialize());

    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(tokens.load(), None);
    assert!(store.error_message().is_some());
    assert_invariants(&store, &tokens);
}

#[test]
fn initialize_is_loading_while_in_flight() {
    let tokens = MemoryTokenStore::with_token("t-1");
    let (store, api) = test_store(&tokens);
    let tx = api.pending_profile();

    block_on(async {
        futures::join!(store.initialize(), async {
            assert_eq!(store.status(), SessionStatus::Loading);
            assert_invariants(&store, &tokens);
            tx.send(Ok(user(1, "alice"))).unwrap();
        });
    });

    assert_eq!(store.status(), SessionStatus::Authenticated);
}

#[test]
fn initialize_runs_only_once() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    tokens.save("late");
    block_on(store.initialize());
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert!(api.calls().is_empty());
}

#[test]
fn hydration_resolving_after_logout_is_discarded() {
    let tokens = MemoryTokenStore::with_token("t-1");
    let (store, api) = test_store(&tokens);
    let tx = api.pending_profile();

    block_on(async {
        futures::join!(store.initialize(), async {
            store.logout();
            tx.send(Ok(user(1, "alice"))).unwrap();
        });
    });

    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(store.user(), None);
    assert_eq!(tokens.load(), None);
    assert_invariants(&store, &tokens);
}

// =============================================================
// login
// =============================================================

#[test]
fn login_success_persists_token() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    api.push_login(Ok(auth_ok("t-1", 1, "alice")));

    let result = block_on(store.login(credentials("alice", "secret123")));

    assert_eq!(result, Ok(user(1, "alice")));
    assert_eq!(store.status(), SessionStatus::Authenticated);
    assert_eq!(tokens.load().as_deref(), Some("t-1"));
    assert_eq!(store.error_message(), None);
    assert_invariants(&store, &tokens);
}

#[test]
fn login_rejected_sets_error_and_returns_it() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    api.push_login(Err(ApiError::from_status(401, r#"{"error":"invalid credentials"}"#)));

    let err = block_on(store.login(credentials("alice", "wrong"))).unwrap_err();

    assert_eq!(err.to_string(), "invalid credentials");
    assert!(err.is_auth());
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(store.error_message().as_deref(), Some("invalid credentials"));
    assert_eq!(tokens.load(), None);
    assert_invariants(&store, &tokens);
}

#[test]
fn login_with_empty_field_makes_no_request() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());

    let err = block_on(store.login(credentials("alice", ""))).unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(store.error_message().as_deref(), Some("Username and password are required"));
    assert!(api.calls().is_empty());
}

#[test]
fn error_message_is_cleared_when_next_attempt_starts() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    api.push_login(Err(ApiError::from_status(401, r#"{"error":"invalid credentials"}"#)));
    let _ = block_on(store.login(credentials("alice", "wrong")));
    let tx = api.pending_login();

    block_on(async {
        futures::join!(store.login(credentials("alice", "secret123")), async {
            assert_eq!(store.error_message(), None);
            tx.send(Ok(auth_ok("t-1", 1, "alice"))).unwrap();
        })
    })
    .0
    .unwrap();
}

#[test]
fn failed_login_while_authenticated_keeps_identity() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    api.push_login(Ok(auth_ok("t-1", 1, "alice")));
    block_on(store.login(credentials("alice", "secret123"))).unwrap();
    api.push_login(Err(ApiError::from_status(401, r#"{"error":"invalid credentials"}"#)));

    let _ = block_on(store.login(credentials("bob", "wrong")));

    assert_eq!(store.status(), SessionStatus::Authenticated);
    assert_eq!(store.user(), Some(user(1, "alice")));
    assert_eq!(tokens.load().as_deref(), Some("t-1"));
    assert_invariants(&store, &tokens);
}

#[test]
fn second_login_while_in_flight_is_busy() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    let tx = api.pending_login();

    let (first, second) = block_on(async {
        futures::join!(store.login(credentials("alice", "secret123")), async {
            let second = store.login(credentials("bob", "secret123")).await;
            tx.send(Ok(auth_ok("t-1", 1, "alice"))).unwrap();
            second
        })
    });

    assert_eq!(second, Err(ApiError::Busy));
    assert_eq!(first, Ok(user(1, "alice")));
    assert_eq!(api.calls(), vec!["login:alice".to_owned()]);
    assert_invariants(&store, &tokens);
}

#[test]
fn stale_login_does_not_overwrite_newer_session() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    let tx = api.pending_login();

    let (stale, ()) = block_on(async {
        futures::join!(store.login(credentials("alice", "secret123")), async {
            assert_eq!(store.status(), SessionStatus::Loading);
            store.logout();
            assert_eq!(store.status(), SessionStatus::Anonymous);
            api.push_login(Ok(auth_ok("t-2", 2, "bob")));
            store.login(credentials("bob", "secret123")).await.unwrap();
            tx.send(Ok(auth_ok("t-1", 1, "alice"))).unwrap();
        })
    });

    assert_eq!(stale, Err(ApiError::Superseded));
    assert_eq!(store.user(), Some(user(2, "bob")));
    assert_eq!(tokens.load().as_deref(), Some("t-2"));
    assert_invariants(&store, &tokens);
}

#[test]
fn stale_login_failure_does_not_touch_state() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    let tx = api.pending_login();

    let (stale, ()) = block_on(async {
        futures::join!(store.login(credentials("alice", "secret123")), async {
            store.logout();
            tx.send(Err(ApiError::network("offline"))).unwrap();
        })
    });

    assert_eq!(stale, Err(ApiError::Superseded));
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(store.error_message(), None);
}

// =============================================================
// register
// =============================================================

#[test]
fn register_short_password_makes_no_request() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    let data = Registration {
        username: "bob".to_owned(),
        email: "bob@x.com".to_owned(),
        password: "short".to_owned(),
        ..Registration::default()
    };

    let err = block_on(store.register(data)).unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(store.error_message().unwrap().contains("8 characters"));
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert!(api.calls().is_empty());
}

#[test]
fn register_success_is_immediately_authenticated() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    api.push_register(Ok(auth_ok("t-9", 9, "bob")));
    let data = Registration {
        username: "bob".to_owned(),
        email: "bob@x.com".to_owned(),
        password: "longenough".to_owned(),
        first_name: Some("Bob".to_owned()),
        last_name: None,
    };

    let result = block_on(store.register(data));

    assert_eq!(result, Ok(user(9, "bob")));
    assert_eq!(store.status(), SessionStatus::Authenticated);
    assert_eq!(tokens.load().as_deref(), Some("t-9"));
    assert_eq!(api.calls(), vec!["register:bob".to_owned()]);
    assert_invariants(&store, &tokens);
}

#[test]
fn register_conflict_surfaces_server_message() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    api.push_register(Err(ApiError::from_status(409, r#"{"error":"Username already exists"}"#)));
    let data = Registration {
        username: "bob".to_owned(),
        email: "bob@x.com".to_owned(),
        password: "longenough".to_owned(),
        ..Registration::default()
    };

    let err = block_on(store.register(data)).unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 409, .. }));
    assert_eq!(store.error_message().as_deref(), Some("Username already exists"));
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_invariants(&store, &tokens);
}

// =============================================================
// logout / invalidate
// =============================================================

#[test]
fn logout_from_every_status_is_anonymous() {
    // Uninitialized
    let tokens = MemoryTokenStore::with_token("t-0");
    let (store, _api) = test_store(&tokens);
    store.logout();
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(tokens.load(), None);

    // Authenticated
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    api.push_login(Ok(auth_ok("t-1", 1, "alice")));
    block_on(store.login(credentials("alice", "secret123"))).unwrap();
    store.logout();
    assert_eq!(store.snapshot(), Session { status: SessionStatus::Anonymous, ..Session::default() });
    assert_eq!(tokens.load(), None);
    assert_invariants(&store, &tokens);

    // Anonymous with an error on display
    let _ = block_on(store.login(credentials("", "")));
    store.logout();
    assert_eq!(store.error_message(), None);
}

#[test]
fn invalidate_resolves_loading_and_drops_result() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    block_on(store.initialize());
    let tx = api.pending_login();

    let (result, ()) = block_on(async {
        futures::join!(store.login(credentials("alice", "secret123")), async {
            store.invalidate();
            assert_eq!(store.status(), SessionStatus::Anonymous);
            assert!(!store.is_busy());
            tx.send(Ok(auth_ok("t-1", 1, "alice"))).unwrap();
        })
    });

    assert_eq!(result, Err(ApiError::Superseded));
    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert_eq!(tokens.load(), None);
}

#[test]
fn invalidate_during_hydration_allows_retry() {
    let tokens = MemoryTokenStore::with_token("t-1");
    let (store, api) = test_store(&tokens);
    let tx = api.pending_profile();

    block_on(async {
        futures::join!(store.initialize(), async {
            store.invalidate();
            tx.send(Ok(user(1, "alice"))).unwrap();
        });
    });

    assert_eq!(store.status(), SessionStatus::Uninitialized);
    assert_eq!(store.snapshot().token, None);
    assert_eq!(store.user(), None);
    assert!(!store.is_busy());
    assert_eq!(tokens.load().as_deref(), Some("t-1"));

    api.push_profile(Ok(user(1, "alice")));
    block_on(store.initialize());
    assert_eq!(store.status(), SessionStatus::Authenticated);
    assert_eq!(api.calls(), vec!["profile:t-1", "profile:t-1"]);
    assert_invariants(&store, &tokens);
}

#[test]
fn generation_advances_on_operations_and_logout() {
    let tokens = MemoryTokenStore::new();
    let (store, api) = test_store(&tokens);
    let start = store.generation();
    api.push_login(Ok(auth_ok("t-1", 1, "alice")));
    block_on(store.login(credentials("alice", "secret123"))).unwrap();
    let after_login = store.generation();
    store.logout();
    assert!(after_login > start);
    assert!(store.generation() > after_login);
}

// =============================================================
// subscriptions
// =============================================================

#[test]
fn subscribers_see_every_transition_and_invariant_holds() {
    let tokens = MemoryTokenStore::with_token("t-1");
    let (store, api) = test_store(&tokens);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    store.subscribe(move |session| {
        assert!(session.is_consistent());
        sink.lock().unwrap().push(session.status);
    });
    api.push_profile(Ok(user(1, "alice")));

    block_on(store.initialize());
    store.logout();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![SessionStatus::Loading, SessionStatus::Authenticated, SessionStatus::Anonymous]
    );
}

#[test]
fn unsubscribed_callback_is_not_called() {
    let tokens = MemoryTokenStore::new();
    let (store, _api) = test_store(&tokens);
    let count = Arc::new(Mutex::new(0));
    let sink = count.clone();
    let id = store.subscribe(move |_| *sink.lock().unwrap() += 1);
    store.logout();
    store.unsubscribe(id);
    block_on(store.login(credentials("", ""))).unwrap_err();
    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn subscriber_may_read_store() {
    let tokens = MemoryTokenStore::new();
    let (store, _api) = test_store(&tokens);
    let reader = store.clone();
    let observed = Arc::new(Mutex::new(None));
    let sink = observed.clone();
    store.subscribe(move |_| *sink.lock().unwrap() = Some(reader.status()));
    store.logout();
    assert_eq!(*observed.lock().unwrap(), Some(SessionStatus::Anonymous));
}
