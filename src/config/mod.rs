// Configuration management module
// Handles the TOML project configuration and startup credentials

pub mod interactive;
pub mod settings;


use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    API_KEY_ENV, BASE_URL_ENV, Config, ConfigError, Credentials, ModelConfig, ProviderConfig,
    RetrievalConfig,
};

/// Environment file read from the project root at startup
pub const DOTENV_FILE: &str = ".env";

/// Resolve the project root used when no `--root` is given
#[inline]
pub fn default_project_root() -> Result<PathBuf, ConfigError> {
    std::env::current_dir().map_err(|_| ConfigError::DirectoryError)
}

/// Load `<project root>/.env` into the process environment.
///
/// Variables already set in the environment win over the file. Returns the path of the
/// loaded file, or `None` when there is none or it could not be parsed.
#[inline]
pub fn load_dotenv(project_root: &Path) -> Option<PathBuf> {
    let path = project_root.join(DOTENV_FILE);
    match dotenvy::from_path(&path) {
        Ok(()) => {
            debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("Ignoring {}: {}", path.display(), e);
            None
        }
    }
}
