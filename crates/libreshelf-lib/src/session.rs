//! Client-side session state.
//!
//! The session lives in persistent key-value storage so that every page
//! load sees the same identity. Nothing is validated here beyond presence:
//! an expired token is only discovered when a request fails.

use std::rc::Rc;

use crate::{
    models::{Profile, Role},
    storage::KeyValueStore,
};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_ROLE_KEY: &str = "user_role";
pub const USER_ID_KEY: &str = "user_id";
pub const USER_NAME_KEY: &str = "user_name";
pub const USER_AVATAR_KEY: &str = "user_avatar";

const SESSION_KEYS: [&str; 5] = [
    ACCESS_TOKEN_KEY,
    USER_ROLE_KEY,
    USER_ID_KEY,
    USER_NAME_KEY,
    USER_AVATAR_KEY,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Option<Role>,
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Pages that check the stored role before loading anything. The dashboard
/// only needs a token; its profile fetch decides the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Upload,
    Admin,
    Dashboard,
}

impl Gate {
    pub fn permits(&self, role: Option<Role>) -> bool {
        match (self, role) {
            (Gate::Dashboard, _) => true,
            (Gate::Upload, Some(role)) => role.can_upload(),
            (Gate::Admin, Some(role)) => role.is_admin(),
            (_, None) => false,
        }
    }
}

/// Handle to the persisted session, cheap to clone and shared by every view.
#[derive(Clone)]
pub struct SessionStore {
    store: Rc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn storage(&self) -> Rc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.store
            .get(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.store
            .get(USER_ROLE_KEY)
            .and_then(|role| role.parse().ok())
    }

    pub fn user_id(&self) -> Option<i64> {
        self.store.get(USER_ID_KEY).and_then(|id| id.parse().ok())
    }

    pub fn display_name(&self) -> Option<String> {
        self.store.get(USER_NAME_KEY)
    }

    pub fn avatar_url(&self) -> Option<String> {
        self.store.get(USER_AVATAR_KEY)
    }

    pub fn current(&self) -> Option<Session> {
        self.token().map(|token| Session {
            token,
            role: self.role(),
            user_id: self.user_id(),
            display_name: self.display_name(),
            avatar_url: self.avatar_url(),
        })
    }

    /// Role checks are a convenience, the server enforces authorization.
    pub fn allows(&self, gate: Gate) -> bool {
        self.is_authenticated() && gate.permits(self.role())
    }

    /// First half of a login: the token exists but the identity is unknown.
    pub fn create(&self, token: &str) {
        self.store.set(ACCESS_TOKEN_KEY, token);
    }

    pub fn refresh(&self, profile: &Profile) {
        self.store.set(USER_ROLE_KEY, profile.role.as_str());
        self.store.set(USER_ID_KEY, &profile.id.to_string());
        self.store.set(USER_NAME_KEY, profile.display_name());
        self.store.set(USER_AVATAR_KEY, profile.avatar_url());
    }

    pub fn set_display_name(&self, name: &str) {
        self.store.set(USER_NAME_KEY, name);
    }

    pub fn set_avatar_url(&self, url: &str) {
        self.store.set(USER_AVATAR_KEY, url);
    }

    pub fn clear(&self) {
        for key in SESSION_KEYS {
            self.store.remove(key);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::MemoryStore;

    fn profile(role: Role) -> Profile {
        Profile {
            id: 42,
            username: "vanna".to_string(),
            role,
            full_name: Some("Vanna Keo".to_string()),
            email: None,
            bio: None,
            gender: None,
            phone_number: None,
            profile_url: Some("https://cdn.example.com/a.png".to_string()),
            address: None,
            date_of_birth: None,
        }
    }

    #[test]
    fn test_lifecycle() {
        let store = Rc::new(MemoryStore::new());
        let session = SessionStore::new(store.clone());
        assert!(!session.is_authenticated());
        assert_eq!(session.current(), None);

        session.create("tok");
        session.refresh(&profile(Role::Teacher));
        let current = session.current().unwrap();
        assert_eq!(current.token, "tok");
        assert_eq!(current.role, Some(Role::Teacher));
        assert_eq!(current.user_id, Some(42));
        assert_eq!(current.display_name.as_deref(), Some("Vanna Keo"));
        assert_eq!(
            current.avatar_url.as_deref(),
            Some("https://cdn.example.com/a.png")
        );

        session.clear();
        assert!(!session.is_authenticated());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_keeps_unrelated_keys() {
        let store = Rc::new(MemoryStore::new());
        store.set("theme", "dark");
        let session = SessionStore::new(store.clone());
        session.create("tok");
        session.clear();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_gates() {
        let session = SessionStore::new(Rc::new(MemoryStore::new()));
        assert!(!session.allows(Gate::Dashboard));

        session.create("tok");
        session.refresh(&profile(Role::Student));
        assert!(session.allows(Gate::Dashboard));
        assert!(!session.allows(Gate::Upload));
        assert!(!session.allows(Gate::Admin));

        session.refresh(&profile(Role::Admin));
        assert!(session.allows(Gate::Upload));
        assert!(session.allows(Gate::Admin));

        session.clear();
        assert!(!session.allows(Gate::Upload));
    }

    #[test]
    fn test_dashboard_needs_only_a_token() {
        let store = Rc::new(MemoryStore::new());
        let session = SessionStore::new(store.clone());
        session.create("tok");
        assert_eq!(session.role(), None);
        assert!(session.allows(Gate::Dashboard));
        assert!(!session.allows(Gate::Upload));

        store.set(USER_ROLE_KEY, "librarian");
        assert!(session.allows(Gate::Dashboard));
        assert!(!session.allows(Gate::Admin));
    }
}
