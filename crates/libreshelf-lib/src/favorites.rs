//! Favorite books.
//!
//! Server bookmarks are the source of truth for a signed-in visitor. The
//! browser-local list only serves anonymous visitors and is never merged
//! into the bookmarks.

use std::rc::Rc;

use crate::{
    api::{ApiClient, HttpTransport, Transport},
    error::Result,
    storage::KeyValueStore,
};

pub const FAVORITES_KEY: &str = "user_favorites";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteSource {
    Bookmarks,
    Local,
}

/// Book ids kept in local storage as a JSON array of strings.
#[derive(Clone)]
pub struct LocalFavorites {
    store: Rc<dyn KeyValueStore>,
}

impl LocalFavorites {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn ids(&self) -> Vec<String> {
        self.store
            .get(FAVORITES_KEY)
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(ids) => Some(ids),
                Err(e) => {
                    warn!("ignoring malformed favorites: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, book_id: i64) -> bool {
        let id = book_id.to_string();
        self.ids().iter().any(|fav| *fav == id)
    }

    /// Returns whether the book is a favorite afterwards.
    pub fn toggle(&self, book_id: i64) -> bool {
        let id = book_id.to_string();
        let mut ids = self.ids();
        let now_favorite = if ids.contains(&id) {
            ids.retain(|fav| *fav != id);
            false
        } else {
            ids.push(id);
            true
        };

        match serde_json::to_string(&ids) {
            Ok(json) => self.store.set(FAVORITES_KEY, &json),
            Err(e) => error!("failed to store favorites: {}", e),
        }
        now_favorite
    }
}

pub struct Favorites<T = HttpTransport> {
    client: Rc<ApiClient<T>>,
    local: LocalFavorites,
}

impl<T: Transport> Favorites<T> {
    pub fn new(client: Rc<ApiClient<T>>) -> Self {
        let local = LocalFavorites::new(client.session().storage());
        Self { client, local }
    }

    pub fn source(&self) -> FavoriteSource {
        if self.client.session().is_authenticated() {
            FavoriteSource::Bookmarks
        } else {
            FavoriteSource::Local
        }
    }

    pub async fn is_favorite(&self, book_id: i64) -> Result<bool> {
        match self.source() {
            FavoriteSource::Bookmarks => Ok(self
                .client
                .bookmarks()
                .await?
                .iter()
                .any(|book| book.id == book_id)),
            FavoriteSource::Local => Ok(self.local.contains(book_id)),
        }
    }

    /// Flips the favorite state and returns the new one.
    pub async fn toggle(&self, book_id: i64, is_favorite: bool) -> Result<bool> {
        match self.source() {
            FavoriteSource::Bookmarks => {
                if is_favorite {
                    self.client.remove_bookmark(book_id).await?;
                } else {
                    self.client.add_bookmark(book_id).await?;
                }
                Ok(!is_favorite)
            }
            FavoriteSource::Local => Ok(self.local.toggle(book_id)),
        }
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::{
        api::Method,
        storage::MemoryStore,
        testing::{FakeTransport, client_with},
    };

    #[test]
    fn test_local_toggle_round_trip() {
        let store = Rc::new(MemoryStore::new());
        let favorites = LocalFavorites::new(store.clone());

        assert!(favorites.toggle(4));
        assert!(favorites.toggle(9));
        assert!(favorites.contains(4));
        assert_eq!(store.get(FAVORITES_KEY).as_deref(), Some(r#"["4","9"]"#));

        assert!(!favorites.toggle(4));
        assert!(!favorites.contains(4));
        assert_eq!(favorites.ids(), vec!["9".to_string()]);
    }

    #[test]
    fn test_malformed_local_list_is_empty() {
        let store = Rc::new(MemoryStore::new());
        store.set(FAVORITES_KEY, "{oops");
        assert!(LocalFavorites::new(store).ids().is_empty());
    }

    #[tokio::test]
    async fn test_signed_in_uses_bookmarks_only() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Get, "/books/bookmark/me/", 200, json!([{"id": 3}]));
        transport.respond(Method::Delete, "/books/bookmark/3/", 204, json!(null));
        let favorites = Favorites::new(Rc::new(client_with(transport.clone(), Some("tok"))));

        assert_eq!(favorites.source(), FavoriteSource::Bookmarks);
        assert_eq!(favorites.is_favorite(3).await, Ok(true));
        assert_eq!(favorites.toggle(3, true).await, Ok(false));
        assert!(favorites.local.ids().is_empty());
        assert_eq!(transport.requests_to(Method::Delete, "/books/bookmark/3/").len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_uses_local_list() {
        let transport = Rc::new(FakeTransport::new());
        let favorites = Favorites::new(Rc::new(client_with(transport.clone(), None)));

        assert_eq!(favorites.source(), FavoriteSource::Local);
        assert_eq!(favorites.toggle(6, false).await, Ok(true));
        assert_eq!(favorites.is_favorite(6).await, Ok(true));
        assert!(transport.requests().is_empty());
    }
}
