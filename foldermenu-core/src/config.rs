use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "Settings", alias = "settings", default)]
    pub settings: Settings,
}

fn default_show_icons() -> bool {
    true
}

fn default_show_hidden() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(
        rename = "RootPath",
        alias = "rootpath",
        alias = "root_path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub root_path: Option<String>,
    #[serde(rename = "ShowIcons", alias = "show_icons", default = "default_show_icons")]
    pub show_icons: bool,
    #[serde(rename = "ShowHidden", alias = "show_hidden", default = "default_show_hidden")]
    pub show_hidden: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_path: None,
            show_icons: default_show_icons(),
            show_hidden: default_show_hidden(),
        }
    }
}

/// Everything the popup needs once the settings file has been read or created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    pub root_path: PathBuf,
    pub show_icons: bool,
    pub show_hidden: bool,
    /// The settings file did not exist and a default one was written.
    pub created_default: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    Write { path: PathBuf, message: String },
    KeyMissing { path: PathBuf },
    NoHomeDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, message } => {
                write!(f, "Failed to read {}:\n{message}", path.display())
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Failed to parse {}:\n{message}", path.display())
            }
            ConfigError::Write { path, message } => {
                write!(f, "Failed to create {}:\n{message}", path.display())
            }
            ConfigError::KeyMissing { path } => {
                write!(f, "RootPath not found in {}.", display_file_name(path))
            }
            ConfigError::NoHomeDir => write!(f, "Could not determine the user's home folder."),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn with_root(root: &Path) -> Self {
        Self {
            settings: Settings {
                root_path: Some(root.to_string_lossy().to_string()),
                ..Settings::default()
            },
        }
    }

    /// The settings file lives next to the executable so the tool stays portable.
    pub fn config_path() -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Reads the settings file at `path`, writing a default rooted at `home` when it is absent.
    pub fn bootstrap(path: &Path, home: Option<&Path>) -> Result<Startup, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::parse(path, &content)?;
                config.startup(path, false)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let home = home.ok_or(ConfigError::NoHomeDir)?;
                let config = Self::with_root(home);
                config.save(path)?;
                log::info!("Created {} with root {}", path.display(), home.display());
                config.startup(path, true)
            }
            Err(err) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |message: String| ConfigError::Write {
            path: path.to_path_buf(),
            message,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| write_error(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;
        fs::write(path, content).map_err(|e| write_error(e.to_string()))
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn startup(&self, path: &Path, created_default: bool) -> Result<Startup, ConfigError> {
        let root = self
            .settings
            .root_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ConfigError::KeyMissing {
                path: path.to_path_buf(),
            })?;

        Ok(Startup {
            root_path: PathBuf::from(root),
            show_icons: self.settings.show_icons,
            show_hidden: self.settings.show_hidden,
            created_default,
        })
    }
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
