use std::{cell::RefCell, rc::Rc};

use dominator::{Dom, clone, events, html, routing, with_node};
use futures_signals::{
    signal::{Mutable, SignalExt},
    signal_vec::{MutableVec, SignalVecExt},
};
use libreshelf_lib::{
    Error,
    models::Category,
    upload::{CategoryInput, UploadForm, UploadOutcome},
};
use web_sys::{File, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use crate::{
    Context,
    common::{Route, Spinner},
    utils::{self, AsyncLoader},
};

pub struct Upload {
    ctx: Rc<Context>,
    edit_id: Option<i64>,
    form: Mutable<UploadForm>,
    categories: MutableVec<Category>,
    cover: RefCell<Option<File>>,
    document: RefCell<Option<File>>,
    is_submitting: Mutable<bool>,
    loader: AsyncLoader,
    submit_loader: AsyncLoader,
}

fn selected_file(input: &HtmlInputElement) -> Option<File> {
    input.files().and_then(|files| files.get(0))
}

impl Upload {
    pub fn new(ctx: Rc<Context>, edit_id: Option<i64>) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            edit_id,
            form: Mutable::new(UploadForm::new()),
            categories: MutableVec::new(),
            cover: RefCell::new(None),
            document: RefCell::new(None),
            is_submitting: Mutable::new(false),
            loader: AsyncLoader::new(),
            submit_loader: AsyncLoader::new(),
        })
    }

    fn fetch(upload: Rc<Self>) {
        upload.loader.load(clone!(upload => async move {
            match upload.ctx.client.categories().await {
                Ok(categories) => upload.categories.lock_mut().replace_cloned(categories),
                Err(e) => error!("error loading categories: {}", e),
            }

            if let Some(book_id) = upload.edit_id {
                match upload.ctx.client.book(book_id).await {
                    Ok(book) => upload.form.set(UploadForm::for_edit(&book)),
                    Err(e) => {
                        error!("error loading book {}: {}", book_id, e);
                        utils::alert("Failed to load book data.");
                    }
                }
            }
        }));
    }

    async fn prepare(&self) -> Result<UploadForm, anyhow::Error> {
        let mut form = self.form.get_cloned();
        form.edit_id = self.edit_id.or(form.edit_id);

        let cover = self.cover.borrow().clone();
        if let Some(file) = cover {
            form.cover = Some(utils::read_file(&file).await?);
        }
        let document = self.document.borrow().clone();
        if let Some(file) = document {
            form.document = Some(utils::read_file(&file).await?);
        }
        Ok(form)
    }

    fn submit(upload: Rc<Self>) {
        if let Err(Error::Validation(message)) = upload.form.lock_ref().validate_with_files(
            upload.cover.borrow().is_some(),
            upload.document.borrow().is_some(),
        ) {
            utils::alert(&message);
            return;
        }

        upload.is_submitting.set(true);
        upload.submit_loader.load(clone!(upload => async move {
            let form = match upload.prepare().await {
                Ok(form) => form,
                Err(e) => {
                    error!("{}", e);
                    utils::alert("Could not read the selected files.");
                    upload.is_submitting.set(false);
                    return;
                }
            };

            match form.submit(&upload.ctx.client).await {
                Ok(UploadOutcome::Created) => {
                    utils::alert("Book Published Successfully!");
                    routing::go_to_url(&Route::Dashboard.url());
                }
                Ok(UploadOutcome::Updated(_)) => {
                    utils::alert("Book Updated Successfully!");
                    routing::go_to_url(&Route::Dashboard.url());
                }
                Err(e) => {
                    error!("error publishing book: {}", e);
                    utils::alert(&e.user_message());
                }
            }
            upload.is_submitting.set(false);
        }));
    }

    fn render_category(upload: Rc<Self>) -> Dom {
        let is_new = upload.form.signal_ref(|form| form.is_new_category());

        html!("div", {
            .class("field")
            .children(&mut [
                html!("label", {
                    .text("Category")
                }),
                html!("button", {
                    .attr("type", "button")
                    .class("link")
                    .text_signal(upload.form.signal_ref(|form| {
                        if form.is_new_category() { "Cancel (Select Existing)" } else { "+ Create New" }
                    }))
                    .event(clone!(upload => move |_: events::Click| {
                        upload.form.lock_mut().toggle_category_mode();
                    }))
                }),
            ])
            .child_signal(is_new.map(clone!(upload => move |is_new| Some(if is_new {
                html!("input" => HtmlInputElement, {
                    .attr("type", "text")
                    .attr("placeholder", "New category name")
                    .with_node!(input => {
                        .event(clone!(upload => move |_: events::Input| {
                            upload.form.lock_mut().category = CategoryInput::New(input.value());
                        }))
                    })
                })
            } else {
                html!("select" => HtmlSelectElement, {
                    .children(&mut [
                        html!("option", {
                            .attr("value", "")
                            .text("Select a category")
                        })
                    ])
                    .children_signal_vec(upload.categories.signal_vec_cloned().map(clone!(upload => move |category| {
                        let id = category.id;
                        html!("option", {
                            .attr("value", &id.to_string())
                            .prop_signal("selected", upload.form.signal_ref(move |form| {
                                form.category == CategoryInput::Existing(Some(id))
                            }))
                            .text(&category.name)
                        })
                    })))
                    .with_node!(select => {
                        .event(clone!(upload => move |_: events::Change| {
                            upload.form.lock_mut().category = CategoryInput::Existing(select.value().parse().ok());
                        }))
                    })
                })
            }))))
        })
    }

    fn render_file(upload: &Rc<Self>, label: &str, accept: &str, is_cover: bool) -> Dom {
        let current = upload.form.signal_ref(move |form| {
            if is_cover {
                form.existing_cover.is_some()
            } else {
                form.existing_document.is_some()
            }
        });

        html!("div", {
            .class("field")
            .children(&mut [
                html!("label", {
                    .text(label)
                }),
                html!("input" => HtmlInputElement, {
                    .attr("type", "file")
                    .attr("accept", accept)
                    .with_node!(input => {
                        .event(clone!(upload => move |_: events::Change| {
                            let file = selected_file(&input);
                            if is_cover {
                                upload.cover.replace(file);
                            } else {
                                upload.document.replace(file);
                            }
                        }))
                    })
                }),
                html!("small", {
                    .visible_signal(current)
                    .text("Leave empty to keep the current file.")
                }),
            ])
        })
    }

    pub fn render(upload: Rc<Self>) -> Dom {
        Self::fetch(upload.clone());
        let title = if upload.edit_id.is_some() {
            "Edit Book"
        } else {
            "Upload Book"
        };

        html!("div", {
            .class("content")
            .class("upload")
            .children(&mut [
                html!("h1", {
                    .text(title)
                }),
                html!("div", {
                    .class("field")
                    .children(&mut [
                        html!("label", {
                            .text("Title")
                        }),
                        html!("input" => HtmlInputElement, {
                            .attr("type", "text")
                            .prop_signal("value", upload.form.signal_ref(|form| form.title.clone()))
                            .with_node!(input => {
                                .event(clone!(upload => move |_: events::Input| {
                                    upload.form.lock_mut().title = input.value();
                                }))
                            })
                        }),
                    ])
                }),
                html!("div", {
                    .class("field")
                    .children(&mut [
                        html!("label", {
                            .text("Description")
                        }),
                        html!("textarea" => HtmlTextAreaElement, {
                            .prop_signal("value", upload.form.signal_ref(|form| form.description.clone()))
                            .with_node!(input => {
                                .event(clone!(upload => move |_: events::Input| {
                                    upload.form.lock_mut().description = input.value();
                                }))
                            })
                        }),
                    ])
                }),
                Self::render_category(upload.clone()),
                Self::render_file(&upload, "Cover image", "image/*", true),
                Self::render_file(&upload, "Document (PDF)", "application/pdf", false),
                Spinner::render_signal(upload.is_submitting.signal()),
                html!("button", {
                    .class("primary")
                    .text(if upload.edit_id.is_some() { "Save changes" } else { "Publish" })
                    .prop_signal("disabled", upload.is_submitting.signal())
                    .event(clone!(upload => move |_: events::Click| {
                        Self::submit(upload.clone());
                    }))
                }),
            ])
        })
    }
}
