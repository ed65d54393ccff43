//! Terminal UI for the chat console

pub mod app;
pub mod commands;
pub mod composer;
pub mod history;

pub use app::ChatApp;
