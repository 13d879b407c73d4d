use std::rc::Rc;

use chrono::Utc;
use futures_signals::signal::{Mutable, Signal};

use crate::{
    api::{ApiClient, HttpTransport, Transport},
    error::{Error, Result},
    models::{Profile, RegisterForm, RegisterRequest, Role},
    session::SessionStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated(Role),
}

/// Login, registration and logout on top of the shared session.
pub struct AuthFlow<T = HttpTransport> {
    client: Rc<ApiClient<T>>,
    state: Mutable<AuthState>,
}

/// The register endpoint does not reliably use status codes, an account
/// counts as created when the body carries any identity field.
fn account_created(body: &serde_json::Value) -> bool {
    ["access_token", "id", "username"]
        .iter()
        .any(|key| body.get(key).is_some_and(|value| !value.is_null()))
}

fn registration_error(body: &serde_json::Value) -> Error {
    let detail = match body.get("detail") {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(serde_json::Value::Array(fields)) => fields
            .iter()
            .filter_map(|field| field.get("msg").and_then(|msg| msg.as_str()))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "Registration failed. Please try again.".to_string(),
    };

    Error::Http {
        status: 200,
        detail,
    }
}

impl<T: Transport> AuthFlow<T> {
    pub fn new(client: Rc<ApiClient<T>>) -> Self {
        let session = client.session();
        let state = match (session.is_authenticated(), session.role()) {
            (true, Some(role)) => AuthState::Authenticated(role),
            _ => AuthState::Anonymous,
        };

        Self {
            client,
            state: Mutable::new(state),
        }
    }

    pub fn client(&self) -> &Rc<ApiClient<T>> {
        &self.client
    }

    fn session(&self) -> &SessionStore {
        self.client.session()
    }

    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    pub fn state_signal(&self) -> impl Signal<Item = AuthState> + use<T> {
        self.state.signal()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Exchanges credentials for a token, then loads the profile to learn
    /// the role. A token without a profile is discarded.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Profile> {
        self.state.set(AuthState::Authenticating);

        let token = match self.client.login(identifier, password).await {
            Ok(token) => token,
            Err(e) => {
                self.state.set(AuthState::Anonymous);
                return Err(e);
            }
        };

        self.session().create(&token.access_token);
        match self.client.me().await {
            Ok(profile) => {
                self.session().refresh(&profile);
                self.state.set(AuthState::Authenticated(profile.role));
                info!("signed in as {} ({})", profile.username, profile.role);
                Ok(profile)
            }
            Err(e) => {
                error!("profile fetch error: {}", e);
                self.session().clear();
                self.state.set(AuthState::Anonymous);
                Err(Error::ProfileUnavailable)
            }
        }
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<()> {
        form.validate()?;

        let request = RegisterRequest::from_form(form, Utc::now());
        let body = self.client.register(&request).await?;
        if account_created(&body) {
            info!("account {} created", request.username);
            Ok(())
        } else {
            Err(registration_error(&body))
        }
    }

    pub fn logout(&self) {
        self.session().clear();
        self.state.set(AuthState::Anonymous);
        info!("signed out");
    }

    /// Loads the profile for the stored token and refreshes the session.
    /// A refused token clears the session.
    pub async fn refresh_profile(&self) -> Result<Profile> {
        match self.client.me().await {
            Ok(profile) => {
                self.session().refresh(&profile);
                self.state.set(AuthState::Authenticated(profile.role));
                Ok(profile)
            }
            Err(e) => {
                if e.is_auth() {
                    self.logout();
                }
                Err(e)
            }
        }
    }

    /// Validates an existing token. Any failure leaves the visitor anonymous.
    pub async fn check_auth_on_load(&self) -> bool {
        if !self.session().is_authenticated() {
            self.state.set(AuthState::Anonymous);
            return false;
        }

        match self.client.me().await {
            Ok(profile) => {
                self.session().refresh(&profile);
                self.state.set(AuthState::Authenticated(profile.role));
                true
            }
            Err(e) => {
                warn!("stored token rejected: {}", e);
                self.logout();
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::{
        api::Method,
        session::Gate,
        testing::{FakeTransport, client_with},
    };

    fn profile_json(role: &str) -> serde_json::Value {
        json!({
            "id": 5,
            "username": "sophea",
            "full_name": "Sophea Lim",
            "role": role,
            "profile_url": "https://cdn.example.com/s.png"
        })
    }

    fn flow(transport: &Rc<FakeTransport>, token: Option<&str>) -> AuthFlow<Rc<FakeTransport>> {
        AuthFlow::new(Rc::new(client_with(transport.clone(), token)))
    }

    #[tokio::test]
    async fn test_login_stores_identity() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Post, "/auth/login", 200, json!({"access_token": "abc"}));
        transport.respond(Method::Get, "/users/me", 200, profile_json("teacher"));
        let auth = flow(&transport, None);

        let profile = auth.login("sophea@example.com", "pw").await.unwrap();

        assert_eq!(profile.role, Role::Teacher);
        assert_eq!(auth.state(), AuthState::Authenticated(Role::Teacher));
        let session = auth.client().session().current().unwrap();
        assert_eq!(session.token, "abc");
        assert_eq!(session.user_id, Some(5));
        assert_eq!(session.display_name.as_deref(), Some("Sophea Lim"));
        let me = transport.requests_to(Method::Get, "/users/me");
        assert_eq!(me[0].bearer.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_login_profile_failure_discards_token() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Post, "/auth/login", 200, json!({"access_token": "abc"}));
        transport.respond(Method::Get, "/users/me", 500, json!({"detail": "boom"}));
        let auth = flow(&transport, None);

        let result = auth.login("sophea", "pw").await;

        assert_eq!(result, Err(Error::ProfileUnavailable));
        assert_eq!(
            Error::ProfileUnavailable.to_string(),
            "Login success but profile failed."
        );
        assert!(!auth.is_authenticated());
        assert_eq!(auth.client().session().current(), None);
        assert_eq!(auth.state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_login_rejected_credentials() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(
            Method::Post,
            "/auth/login",
            401,
            json!({"detail": "Incorrect username or password"}),
        );
        let auth = flow(&transport, None);

        let err = auth.login("sophea", "nope").await.unwrap_err();

        assert_eq!(err.user_message(), "Incorrect username or password");
        assert!(!auth.is_authenticated());
        assert!(transport.requests_to(Method::Get, "/users/me").is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Post, "/auth/login", 200, json!({"access_token": "abc"}));
        transport.respond(Method::Get, "/users/me", 200, profile_json("admin"));
        let auth = flow(&transport, None);
        auth.login("sophea", "pw").await.unwrap();
        assert!(auth.client().session().allows(Gate::Admin));

        auth.logout();

        let session = auth.client().session();
        assert!(!auth.is_authenticated());
        assert_eq!(session.role(), None);
        assert_eq!(session.user_id(), None);
        assert_eq!(session.display_name(), None);
        assert_eq!(session.avatar_url(), None);
        assert!(!session.allows(Gate::Admin));
        assert!(!session.allows(Gate::Upload));
        assert!(!session.allows(Gate::Dashboard));
    }

    #[tokio::test]
    async fn test_check_auth_on_load() {
        let transport = Rc::new(FakeTransport::new());
        let auth = flow(&transport, None);
        assert!(!auth.check_auth_on_load().await);
        assert!(transport.requests().is_empty());

        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Get, "/users/me", 200, profile_json("student"));
        let auth = flow(&transport, Some("abc"));
        assert!(auth.check_auth_on_load().await);
        assert_eq!(auth.client().session().role(), Some(Role::Student));

        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Get, "/users/me", 401, json!({"detail": "expired"}));
        let auth = flow(&transport, Some("stale"));
        assert!(!auth.check_auth_on_load().await);
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_check_auth_on_load_refreshes_identity() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Get, "/users/me", 200, profile_json("teacher"));
        let auth = flow(&transport, Some("tok"));
        auth.client().session().set_display_name("Old Name");

        assert!(auth.check_auth_on_load().await);
        let session = auth.client().session().current().unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.role, Some(Role::Teacher));
        assert_eq!(session.user_id, Some(5));
        assert_eq!(session.display_name.as_deref(), Some("Sophea Lim"));
        assert_eq!(
            session.avatar_url.as_deref(),
            Some("https://cdn.example.com/s.png")
        );
    }

    #[tokio::test]
    async fn test_register_infers_success() {
        let form = RegisterForm {
            username: "dara".to_string(),
            full_name: "Dara".to_string(),
            email: "dara@example.com".to_string(),
            password: "pw".to_string(),
            confirm_password: "pw".to_string(),
        };

        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Post, "/auth/register", 201, json!({"id": 9, "username": "dara"}));
        assert_eq!(flow(&transport, None).register(&form).await, Ok(()));
        let sent = transport.requests_to(Method::Post, "/auth/register");
        assert_eq!(sent[0].json().unwrap()["role"], "teacher");

        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Post, "/auth/register", 200, json!({"detail": "Email taken"}));
        let err = flow(&transport, None).register(&form).await.unwrap_err();
        assert_eq!(err.user_message(), "Email taken");

        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Post, "/auth/register", 200, json!({}));
        let err = flow(&transport, None).register(&form).await.unwrap_err();
        assert_eq!(err.user_message(), "Registration failed. Please try again.");
    }

    #[tokio::test]
    async fn test_register_validation_blocks_request() {
        let transport = Rc::new(FakeTransport::new());
        let form = RegisterForm {
            username: "dara".to_string(),
            password: "a".to_string(),
            confirm_password: "b".to_string(),
            ..Default::default()
        };

        let err = flow(&transport, None).register(&form).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(transport.requests().is_empty());
    }
}
