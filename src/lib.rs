pub mod app;
pub mod config;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod insight;
pub mod models;
pub mod settings;
pub mod shell;
pub mod state;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod table;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{load_settings, persist_settings};
