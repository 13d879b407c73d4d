//! Book publishing form: create a new book or edit an existing one.

use crate::{
    api::{ApiClient, FilePart, Transport},
    error::{Error, Result},
    models::{Book, BookPayload, NewCategory},
};

pub const NEW_CATEGORY_DESCRIPTION: &str = "User created";

/// Either pick an existing category or create one on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryInput {
    Existing(Option<i64>),
    New(String),
}

impl Default for CategoryInput {
    fn default() -> Self {
        CategoryInput::Existing(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Created,
    Updated(i64),
}

#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub edit_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub category: CategoryInput,
    pub cover: Option<FilePart>,
    pub document: Option<FilePart>,
    pub existing_cover: Option<String>,
    pub existing_document: Option<String>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills from a stored book. Files left untouched keep their URLs.
    pub fn for_edit(book: &Book) -> Self {
        Self {
            edit_id: Some(book.id),
            title: book.title.clone().unwrap_or_default(),
            description: book.description.clone().unwrap_or_default(),
            category: CategoryInput::Existing(book.categories.first().and_then(|c| c.id())),
            cover: None,
            document: None,
            existing_cover: book.thumbnail.clone().filter(|url| !url.is_empty()),
            existing_document: book.file_url.clone().filter(|url| !url.is_empty()),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.edit_id.is_some()
    }

    pub fn is_new_category(&self) -> bool {
        matches!(self.category, CategoryInput::New(_))
    }

    pub fn toggle_category_mode(&mut self) {
        self.category = match self.category {
            CategoryInput::Existing(_) => CategoryInput::New(String::new()),
            CategoryInput::New(_) => CategoryInput::Existing(None),
        };
    }

    /// Everything that can be checked without the network.
    pub fn validate(&self) -> Result<()> {
        self.validate_with_files(self.cover.is_some(), self.document.is_some())
    }

    /// Same checks as [`UploadForm::validate`] for a form whose picked files
    /// have not been read yet.
    pub fn validate_with_files(&self, cover_picked: bool, document_picked: bool) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Please enter a title."));
        }
        match &self.category {
            CategoryInput::Existing(None) => {
                return Err(Error::validation("Please select a category."));
            }
            CategoryInput::New(name) if name.trim().is_empty() => {
                return Err(Error::validation("Please enter a category name."));
            }
            _ => {}
        }

        let has_cover = cover_picked || self.existing_cover.is_some();
        let has_document = document_picked || self.existing_document.is_some();
        if !self.is_edit() && !(has_cover && has_document) {
            return Err(Error::validation("Cover image and PDF are required."));
        }
        Ok(())
    }

    /// Resolves the category and both files to ids and URLs, then creates
    /// or updates the book. The record is only written once every upload
    /// succeeded.
    pub async fn submit<T: Transport>(self, client: &ApiClient<T>) -> Result<UploadOutcome> {
        self.validate()?;

        let category_id = match self.category {
            CategoryInput::Existing(Some(id)) => id,
            CategoryInput::New(name) => {
                let category = NewCategory::new(name.trim(), NEW_CATEGORY_DESCRIPTION).without_parent();
                client.create_category(&category).await?.id
            }
            CategoryInput::Existing(None) => {
                return Err(Error::validation("Please select a category."));
            }
        };

        let thumbnail = match self.cover {
            Some(file) => client.upload_file(file).await?,
            None => self.existing_cover.unwrap_or_default(),
        };
        let file_url = match self.document {
            Some(file) => client.upload_file(file).await?,
            None => self.existing_document.unwrap_or_default(),
        };

        let payload = BookPayload {
            title: self.title.trim().to_string(),
            description: self.description,
            category_ids: vec![category_id],
            thumbnail,
            file_url,
            metadata: "{}".to_string(),
        };

        match self.edit_id {
            Some(book_id) => {
                client.update_book(book_id, &payload).await?;
                info!("book {} updated", book_id);
                Ok(UploadOutcome::Updated(book_id))
            }
            None => {
                client.create_book(&payload).await?;
                info!("book {:?} published", payload.title);
                Ok(UploadOutcome::Created)
            }
        }
    }
}
