mod admin;
pub use admin::Admin;

mod catalog;
pub use catalog::Catalog;

mod dashboard;
pub use dashboard::Dashboard;

mod detail;
pub use detail::Detail;

mod home;
pub use home::Home;

mod signin;
pub use signin::SignIn;

mod signup;
pub use signup::SignUp;

mod upload;
pub use upload::Upload;
