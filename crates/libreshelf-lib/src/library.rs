//! Data loading for the home, dashboard and admin pages.

use std::rc::Rc;

use crate::{
    api::{ApiClient, Transport},
    config::Config,
    error::{Error, Result},
    models::{Book, BookQuery, Category, ProfileUpdate},
    view,
};

pub struct Library<T> {
    client: Rc<ApiClient<T>>,
    config: Rc<Config>,
}

impl<T: Transport> Library<T> {
    pub fn new(client: Rc<ApiClient<T>>, config: Rc<Config>) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &Rc<ApiClient<T>> {
        &self.client
    }

    pub async fn new_releases(&self) -> Result<Vec<Book>> {
        let query = BookQuery::new(1, self.config.new_release_limit);
        Ok(self.client.books(&query).await?.books)
    }

    pub async fn popular(&self) -> Result<Vec<Book>> {
        let query = BookQuery::new(2, self.config.popular_limit);
        Ok(self.client.books(&query).await?.books)
    }

    /// Books uploaded by the signed-in user.
    pub async fn my_books(&self) -> Result<Vec<Book>> {
        let user_id = self.client.session().user_id().ok_or(Error::Auth)?;
        let query = BookQuery::new(1, self.config.admin_page_size);
        let page = self.client.books(&query).await?;
        Ok(view::owned_by(page.books, user_id))
    }

    pub async fn admin_books(&self, search: &str) -> Result<Vec<Book>> {
        let mut query = BookQuery::new(1, self.config.admin_page_size);
        if !search.trim().is_empty() {
            query = query.with_search(search.trim());
        }
        Ok(self.client.books(&query).await?.books)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.client.categories().await
    }

    /// Saves the profile and mirrors the name and avatar into the session.
    pub async fn save_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let session = self.client.session();
        let user_id = session.user_id().ok_or(Error::Auth)?;
        self.client.update_user(user_id, update).await?;

        if !update.full_name.trim().is_empty() {
            session.set_display_name(update.full_name.trim());
        }
        if !update.profile_url.is_empty() {
            session.set_avatar_url(&update.profile_url);
        }
        info!("profile {} updated", user_id);
        Ok(())
    }
}
