mod route;
pub use route::Route;

mod spinner;
pub use spinner::Spinner;

mod navbar;
pub use navbar::Navbar;

pub mod book_card;
pub mod footer;
pub mod snackbar;
