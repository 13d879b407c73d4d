#[macro_use]
extern crate log;

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod favorites;
pub mod library;
pub mod models;
pub mod session;
pub mod storage;
pub mod theme;
pub mod upload;
pub mod view;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
