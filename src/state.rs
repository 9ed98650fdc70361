use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::dataset::{Dataset, DatasetError};
use crate::types::{Config, FilterMeta};

/// Shared application state: configuration plus the immutable dataset and
/// the filter-control metadata derived from it once at startup. No locks;
/// nothing here mutates after load.
pub struct AppState {
    pub config: Config,
    pub dataset: Arc<Dataset>,
    pub meta: FilterMeta,
}

impl AppState {
    /// Load the dataset named by the configuration. A dataset that fails to
    /// load is fatal: there is nothing to serve without it.
    pub fn new(config: Config) -> Result<Self, DatasetError> {
        let dataset = Dataset::load(Path::new(&config.dataset_path))?;
        log::info!(
            "loaded {} appointments from {}",
            dataset.len(),
            config.dataset_path
        );
        if dataset.is_empty() {
            log::warn!("dataset is empty; the dashboard will render degenerate output");
        }

        let meta = dataset.filter_meta();
        Ok(Self {
            config,
            dataset: Arc::new(dataset),
            meta,
        })
    }
}

/// Get the canonical config file path (~/.apptdash/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".apptdash").join("config.json"))
}

/// Load configuration from ~/.apptdash/config.json.
///
/// A missing file means "run with defaults"; a file that exists but cannot
/// be read or parsed is an error, not a silent fallback.
pub fn load_config() -> Result<Config, String> {
    let path = config_path()?;
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}
