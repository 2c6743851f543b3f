//! FILENAME: app/src/lib.rs
// PURPOSE: Matrix grid view library: view state, configuration and logging.
// CONTEXT: The engine crate holds the pure grid logic, the persistence crate
// talks to the study server. This crate wires both into one view per matrix.

pub mod api_types;
pub mod config;
pub mod error;
pub mod logging;
pub mod notifications;
pub mod view;

pub use api_types::{CellData, CellUpdateInput, ColumnData, EditResult, UndoResult, ViewSnapshot};
pub use config::{ConfigError, DateFormat, ViewConfig};
pub use error::ViewError;
pub use logging::{init_log_file, write_log};
pub use notifications::{Notification, NotificationLevel, Notifications};
pub use view::{MatrixView, ViewStatus};

use persistence::HttpMatrixStore;

/// Remote store for the configured study server.
pub fn http_store(config: &ViewConfig) -> Result<HttpMatrixStore, ViewError> {
    Ok(HttpMatrixStore::new(
        config.api_url.clone(),
        config.token.clone(),
        config.timeout(),
    )?)
}

/// Sets up the unified log sink from the config. Safe to call more than once;
/// only the first call installs the `log` facade bridge.
pub fn init_logging(config: &ViewConfig) {
    logging::set_stderr(config.log_to_stderr);
    logging::set_level(config.log_level_filter());
    if let Some(path) = &config.log_file {
        if let Err(e) = init_log_file(path) {
            eprintln!("[LOG_ERROR] Failed to open {}: {}", path.display(), e);
        }
    }
    if logging::init_logger(config.log_level_filter()).is_err() {
        log::set_max_level(config.log_level_filter());
    }
    log_info!("SYSTEM", "logging initialized (level={})", config.log_level);
}
