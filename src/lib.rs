pub mod analytics;
pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod lifecycle;
pub mod management;
pub mod models;
pub mod shell;
pub mod state;
pub mod ui;

pub use app::router;
pub use client::ApiClient;
pub use config::{ClientConfig, Config};
pub use state::AppState;
