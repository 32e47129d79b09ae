//! The auth lifecycle controller.

use parking_lot::Mutex;

use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::types::{Registration, UserIdentity};
use crate::session::SessionStore;

/// Lifecycle states. `Initializing` lasts from construction until the
/// startup credential check resolves; no guarded content may render before
/// that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Initializing,
    Authenticated,
    Anonymous,
}

struct Inner {
    phase: AuthPhase,
    identity: Option<UserIdentity>,
}

pub struct AuthController {
    store: SessionStore,
    inner: Mutex<Inner>,
}

impl AuthController {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            inner: Mutex::new(Inner {
                phase: AuthPhase::Initializing,
                identity: None,
            }),
        }
    }

    pub fn phase(&self) -> AuthPhase {
        self.inner.lock().phase
    }

    /// True until [`initialize`](Self::initialize) has resolved.
    pub fn loading(&self) -> bool {
        self.phase() == AuthPhase::Initializing
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.inner.lock().identity.clone()
    }

    /// True iff the state is authenticated and the persisted credential is
    /// currently non-empty. The store is re-read on every call so external
    /// tampering with the session file is caught immediately.
    pub fn is_authenticated(&self) -> bool {
        let identity_held = {
            let inner = self.inner.lock();
            inner.phase == AuthPhase::Authenticated && inner.identity.is_some()
        };
        identity_held && self.store.credential().is_some_and(|c| !c.is_empty())
    }

    /// Startup credential validation. Runs once; a second call is a no-op.
    ///
    /// A persisted credential is validated against `GET /auth/me`. Success
    /// restores the session; any failure, rejection or transport alike, clears
    /// the store so no half-valid session lingers.
    pub async fn initialize(&self, api: &ApiClient) {
        if !self.loading() {
            return;
        }

        let identity = match self.store.load() {
            None => None,
            Some(_) => match api.me().await {
                Ok(me) => Some(me.user),
                Err(e) => {
                    if e.is_unauthorized() {
                        tracing::info!("stored credential rejected, signing out");
                    } else {
                        tracing::info!("startup credential validation failed: {}", e.message());
                    }
                    self.store.clear();
                    None
                }
            },
        };

        let mut inner = self.inner.lock();
        match identity {
            Some(identity) => {
                inner.identity = Some(identity);
                inner.phase = AuthPhase::Authenticated;
            }
            None => {
                inner.identity = None;
                inner.phase = AuthPhase::Anonymous;
            }
        }
    }

    /// Exchange credentials for a session. On success identity and
    /// credential are persisted together before the in-memory transition;
    /// on failure nothing is written and the backend's message propagates.
    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, ApiError> {
        let auth = api.login(email, password).await?;
        self.establish(auth.user, auth.token)
    }

    /// Same contract as [`login`](Self::login), via the registration endpoint.
    pub async fn register(
        &self,
        api: &ApiClient,
        registration: &Registration,
    ) -> Result<UserIdentity, ApiError> {
        let auth = api.register(registration).await?;
        self.establish(auth.user, auth.token)
    }

    fn establish(&self, user: UserIdentity, token: String) -> Result<UserIdentity, ApiError> {
        self.store.save(&user, &token).map_err(|e| {
            tracing::error!("failed to persist session: {e:#}");
            ApiError::Transport {
                message: "Login failed".to_string(),
            }
        })?;
        let mut inner = self.inner.lock();
        inner.identity = Some(user.clone());
        inner.phase = AuthPhase::Authenticated;
        Ok(user)
    }

    /// Client-side invalidation: clears memory and store together. Always
    /// succeeds, idempotent, no backend call.
    pub fn logout(&self) {
        {
            let mut inner = self.inner.lock();
            inner.identity = None;
            inner.phase = AuthPhase::Anonymous;
        }
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn identity() -> UserIdentity {
        UserIdentity {
            id: Some("owner-1".into()),
            email: "admin@xeroxshop.com".into(),
            shop_id: "shop-1".into(),
            name: None,
        }
    }

    fn setup(base: &str) -> (TempDir, SessionStore, ApiClient, AuthController) {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());
        let api = ApiClient::new(base, store.clone()).unwrap();
        let controller = AuthController::new(store.clone());
        (tmp, store, api, controller)
    }

    fn me_ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": {"_id": "owner-1", "email": "admin@xeroxshop.com", "shopId": "shop-1"}
        }))
    }

    #[tokio::test]
    async fn initialize_without_credential_skips_the_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(me_ok())
            .expect(0)
            .mount(&server)
            .await;

        let (_tmp, _store, api, controller) = setup(&server.uri());
        assert!(controller.loading());
        controller.initialize(&api).await;

        assert_eq!(controller.phase(), AuthPhase::Anonymous);
        assert!(!controller.loading());
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn initialize_restores_a_valid_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(me_ok())
            .mount(&server)
            .await;

        let (_tmp, store, api, controller) = setup(&server.uri());
        store.save(&identity(), "abc123").unwrap();
        controller.initialize(&api).await;

        assert_eq!(controller.phase(), AuthPhase::Authenticated);
        assert!(controller.is_authenticated());
        assert_eq!(controller.identity().unwrap().shop_id, "shop-1");
        // The mirror survives validation.
        assert_eq!(store.credential().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn rejected_credential_leaves_no_half_valid_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Token expired"})),
            )
            .mount(&server)
            .await;

        let (_tmp, store, api, controller) = setup(&server.uri());
        store.save(&identity(), "stale-token").unwrap();
        controller.initialize(&api).await;

        assert_eq!(controller.phase(), AuthPhase::Anonymous);
        assert!(store.load().is_none());
        assert!(controller.identity().is_none());
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn unreachable_backend_also_clears_the_store() {
        let (_tmp, store, api, controller) = setup("http://127.0.0.1:1");
        store.save(&identity(), "abc123").unwrap();
        controller.initialize(&api).await;

        assert_eq!(controller.phase(), AuthPhase::Anonymous);
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn login_persists_credential_and_transitions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user": {"_id": "owner-1", "email": "admin@xeroxshop.com", "shopId": "shop-1"},
                "token": "abc123"
            })))
            .mount(&server)
            .await;

        let (_tmp, store, api, controller) = setup(&server.uri());
        controller.initialize(&api).await;
        let user = controller
            .login(&api, "admin@xeroxshop.com", "password")
            .await
            .unwrap();

        assert_eq!(user.email, "admin@xeroxshop.com");
        assert_eq!(store.credential().as_deref(), Some("abc123"));
        assert_eq!(controller.phase(), AuthPhase::Authenticated);
        assert!(controller.is_authenticated());
    }

    #[tokio::test]
    async fn failed_login_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let (_tmp, store, api, controller) = setup(&server.uri());
        controller.initialize(&api).await;
        let err = controller
            .login(&api, "admin@xeroxshop.com", "nope")
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Invalid credentials");
        assert_eq!(controller.phase(), AuthPhase::Anonymous);
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn logout_twice_equals_logout_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(me_ok())
            .mount(&server)
            .await;

        let (_tmp, store, api, controller) = setup(&server.uri());
        store.save(&identity(), "abc123").unwrap();
        controller.initialize(&api).await;
        assert!(controller.is_authenticated());

        controller.logout();
        assert_eq!(controller.phase(), AuthPhase::Anonymous);
        assert!(store.load().is_none());

        controller.logout();
        assert_eq!(controller.phase(), AuthPhase::Anonymous);
        assert!(store.load().is_none());
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn tampered_store_is_caught_live() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(me_ok())
            .mount(&server)
            .await;

        let (_tmp, store, api, controller) = setup(&server.uri());
        store.save(&identity(), "abc123").unwrap();
        controller.initialize(&api).await;
        assert!(controller.is_authenticated());

        // Something outside the controller wipes the persisted copy.
        store.clear();
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn initialize_runs_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(me_ok())
            .expect(1)
            .mount(&server)
            .await;

        let (_tmp, store, api, controller) = setup(&server.uri());
        store.save(&identity(), "abc123").unwrap();
        controller.initialize(&api).await;
        controller.initialize(&api).await;
        assert_eq!(controller.phase(), AuthPhase::Authenticated);
    }
}
