pub mod app;
pub mod config;
pub mod entry;
pub mod errors;
pub mod handlers;
pub mod insight;
pub mod logbook;
pub mod models;
pub mod seed;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::DataPaths;
