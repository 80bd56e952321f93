//! Configuration data for Stapel

use std::path::Path;

use serde_derive::Deserialize;

/// Config file root structure
#[derive(Debug, Default, Deserialize, Clone)]
pub struct Settings {
    /// Default sort order, same values as the --sort-by flag (optional)
    pub sort_by: Option<String>,
    /// Wrap the cursor around the listing by default (optional)
    pub wrap: Option<bool>,
    /// Skip files that fail to decode when iterating a whole listing (optional)
    pub skip_errors: Option<bool>,
}

impl Settings {
    /// Load settings from the given file, or from `stapel/stapel.toml` in the
    /// XDG config directories. An absent file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(|| {
            xdg::BaseDirectories::with_prefix("stapel")
                .ok()
                .and_then(|dirs| dirs.find_config_file("stapel.toml"))
        });
        let mut settings = config::Config::default();
        if let Some(path) = path {
            settings.merge(config::File::from(path))?;
        }
        settings.try_into()
    }
}
