mod client;
pub use client::*;

mod transport;
pub use transport::*;
