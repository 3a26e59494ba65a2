// Configuration loading and parsing (hoopcast.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides `credentials.toml`'s `api_key`.
pub const API_KEY_ENV: &str = "BALLDONTLIE_API_KEY";

/// File name used for the ledger when `[ledger] path` is not configured.
pub const DEFAULT_LEDGER_FILE: &str = "saved_props.csv";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub analysis: AnalysisConfig,
    pub projection: ProjectionConfig,
    pub ledger_path: PathBuf,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// hoopcast.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire hoopcast.toml file.
#[derive(Debug, Clone, Deserialize)]
struct HoopcastFile {
    api: ApiConfig,
    analysis: AnalysisConfig,
    projection: ProjectionConfig,
    #[serde(default)]
    ledger: LedgerSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub per_page: u32,
    /// Upper bound on cursor pages fetched for a single listing.
    pub max_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Season analysed when the caller does not name one.
    pub season: i32,
    /// Size of the "last N games" split.
    pub last_n: usize,
}

/// Weights and constants for the linear projection blend.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    pub weight_last_n: f64,
    pub weight_season: f64,
    pub weight_context: f64,
    /// League-wide points-allowed baseline.
    pub league_average: f64,
    /// How strongly opponent defense bends the projection.
    pub defense_k: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            weight_last_n: 0.5,
            weight_season: 0.3,
            weight_context: 0.2,
            league_average: 114.0,
            defense_k: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LedgerSection {
    path: Option<String>,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/hoopcast.toml` and
/// (optionally) `config/credentials.toml`, both relative to `base_dir`.
///
/// Does not copy defaults and ignores the API key environment override;
/// `load_config()` layers those on top.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- hoopcast.toml (required) ---
    let main_path = config_dir.join("hoopcast.toml");
    let main_text = read_file(&main_path)?;
    let file: HoopcastFile = toml::from_str(&main_text).map_err(|e| ConfigError::ParseError {
        path: main_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let ledger_path = match file.ledger.path {
        Some(p) if !p.trim().is_empty() => base_dir.join(p.trim()),
        _ => default_ledger_path(base_dir),
    };

    let config = Config {
        api: file.api,
        analysis: file.analysis,
        projection: file.projection,
        ledger_path,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Config files seeded from `defaults/` on first run. Credentials are never
/// seeded; `defaults/credentials.toml.example` documents them.
const SEEDED_FILES: [&str; 1] = ["hoopcast.toml"];

/// Copy each missing seeded file from `defaults/` into `config/`, returning
/// the files written. An existing `config/` copy is never overwritten.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    let defaults_dir = base_dir.join("defaults");

    let mut copied = Vec::new();
    for name in SEEDED_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "{} is missing and there is no {} to copy; run from the project root",
                    target.display(),
                    source.display()
                ),
            });
        }
        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", config_dir.display()),
        })?;
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {}: {e}", source.display()),
        })?;
        info!("seeded {} from {}", target.display(), source.display());
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory,
/// copying defaults first and applying the `BALLDONTLIE_API_KEY` override.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.credentials.api_key = Some(key.trim().to_string());
        }
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Platform data directory for the ledger, falling back to `data/` under
/// `base_dir` when no home directory can be determined.
fn default_ledger_path(base_dir: &Path) -> PathBuf {
    match directories::ProjectDirs::from("", "", "hoopcast") {
        Some(dirs) => dirs.data_dir().join(DEFAULT_LEDGER_FILE),
        None => base_dir.join("data").join(DEFAULT_LEDGER_FILE),
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let api = &config.api;
    if api.base_url.trim().is_empty() {
        return Err(invalid("api.base_url", "must not be empty"));
    }
    if api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be greater than 0"));
    }
    if api.per_page == 0 || api.per_page > 100 {
        return Err(invalid(
            "api.per_page",
            format!("must be between 1 and 100, got {}", api.per_page),
        ));
    }
    if api.max_pages == 0 {
        return Err(invalid("api.max_pages", "must be greater than 0"));
    }

    if config.analysis.last_n == 0 {
        return Err(invalid("analysis.last_n", "must be greater than 0"));
    }

    let p = &config.projection;
    let weights = [
        ("projection.weight_last_n", p.weight_last_n),
        ("projection.weight_season", p.weight_season),
        ("projection.weight_context", p.weight_context),
    ];
    for (field, w) in weights {
        if !w.is_finite() || w < 0.0 {
            return Err(invalid(field, format!("must be a non-negative number, got {w}")));
        }
    }
    if weights.iter().all(|(_, w)| *w == 0.0) {
        return Err(invalid("projection", "at least one weight must be positive"));
    }
    if !p.league_average.is_finite() || p.league_average <= 0.0 {
        return Err(invalid(
            "projection.league_average",
            format!("must be positive, got {}", p.league_average),
        ));
    }
    if !(0.0..=1.0).contains(&p.defense_k) {
        return Err(invalid(
            "projection.defense_k",
            format!("must be between 0.0 and 1.0, got {}", p.defense_k),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
