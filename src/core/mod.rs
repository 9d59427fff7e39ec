pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod library;
pub mod library_store;
pub mod selection;
pub mod session;
pub mod version;
