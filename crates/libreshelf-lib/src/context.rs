use std::rc::Rc;

use crate::{
    api::{ApiClient, HttpTransport, Transport},
    auth::AuthFlow,
    catalog::CatalogController,
    config::Config,
    favorites::Favorites,
    library::Library,
    session::SessionStore,
    storage::KeyValueStore,
};

/// Everything a page needs, built once at start-up and handed to each view.
pub struct AppContext<T = HttpTransport> {
    pub config: Rc<Config>,
    pub session: SessionStore,
    pub client: Rc<ApiClient<T>>,
    pub auth: Rc<AuthFlow<T>>,
    pub favorites: Rc<Favorites<T>>,
    pub library: Rc<Library<T>>,
}

impl AppContext<HttpTransport> {
    pub fn new(config: Config, store: Rc<dyn KeyValueStore>) -> Rc<Self> {
        let session = SessionStore::new(store);
        let client = ApiClient::from_config(&config, session);
        Self::with_client(config, client)
    }
}

impl<T: Transport> AppContext<T> {
    pub fn with_client(config: Config, client: ApiClient<T>) -> Rc<Self> {
        let config = Rc::new(config);
        let session = client.session().clone();
        let client = Rc::new(client);
        Rc::new(Self {
            auth: Rc::new(AuthFlow::new(client.clone())),
            favorites: Rc::new(Favorites::new(client.clone())),
            library: Rc::new(Library::new(client.clone(), config.clone())),
            config,
            session,
            client,
        })
    }

    pub fn catalog(&self) -> CatalogController<Rc<ApiClient<T>>> {
        CatalogController::new(self.client.clone(), self.config.page_size)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::{
        api::Method,
        catalog::LoadOutcome,
        testing::{FakeTransport, client_with},
    };

    #[tokio::test]
    async fn test_catalog_uses_configured_page_size() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Get, "/books/", 200, json!({"books": [{"id": 1}]}));
        let config = Config {
            page_size: 5,
            ..Default::default()
        };
        let context = AppContext::with_client(config, client_with(transport.clone(), None));

        let catalog = context.catalog();
        assert_eq!(catalog.load_next().await, LoadOutcome::Loaded(1));
        assert!(!catalog.has_more());
        assert_eq!(
            transport.requests_to(Method::Get, "/books/")[0].query_value("limit"),
            Some("5")
        );
    }

    #[tokio::test]
    async fn test_shares_one_session() {
        let transport = Rc::new(FakeTransport::new());
        let context = AppContext::with_client(Config::default(), client_with(transport, Some("t")));
        assert!(context.auth.is_authenticated());
        context.auth.logout();
        assert!(!context.session.is_authenticated());
        assert!(!context.client.session().is_authenticated());
    }
}
