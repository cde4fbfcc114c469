//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file; without one, start
//!    from defaults
//! 2. Apply `DAILYTRACK_*` environment overrides on top
//!
//! ## Environment Variables
//! - `DAILYTRACK_API_URL`: explicit API base (wins over origin resolution)
//! - `DAILYTRACK_ORIGIN`: origin the client is served from
//! - `DAILYTRACK_SESSION_PATH`: JSON file for the persisted session
//! - `DAILYTRACK_HTTP_TIMEOUT`: per-request timeout in seconds
//! - `DAILYTRACK_HEALTH_INTERVAL`: health poll interval in seconds
//! - `DAILYTRACK_HEALTH_TIMEOUT`: health probe timeout in seconds
//! - `DAILYTRACK_HEALTH_ENABLED`: whether to poll health (true/false)
//! - `DAILYTRACK_LOG_LEVEL`: default log filter
//! - `DAILYTRACK_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! 1. `./dailytrack.{toml,json}`, `./config.{toml,json}`
//! 2. The same names in the parent and grandparent directories
//! 3. Next to the executable

use std::path::{Path, PathBuf};

use dailytrack_domain::{Config, Result, TrackerError};

const FILE_NAMES: [&str; 4] = ["dailytrack.toml", "dailytrack.json", "config.toml", "config.json"];

/// Load configuration: optional file, then environment overrides.
///
/// # Errors
/// Returns `TrackerError::Config` if a found file cannot be parsed or an
/// override has an invalid value.
pub fn load() -> Result<Config> {
    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(base)
}

/// Defaults with environment overrides applied.
///
/// # Errors
/// Returns `TrackerError::Config` if an override has an invalid value.
pub fn load_from_env() -> Result<Config> {
    apply_env_overrides(Config::default())
}

/// Read a TOML or JSON config file; `None` probes the standard locations.
///
/// Sections missing from the file keep their defaults.
///
/// # Errors
/// Returns `TrackerError::Config` when the named file is missing, nothing
/// is found by probing, or the contents do not parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TrackerError::Config(format!("no config file at {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TrackerError::Config("no dailytrack config file found".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Reading config file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TrackerError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let format = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match format {
        "toml" => toml::from_str(contents)
            .map_err(|e| TrackerError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TrackerError::Config(format!("Invalid JSON format: {}", e))),
        other => Err(TrackerError::Config(format!("Unsupported config format: {other}"))),
    }
}

/// First existing config file in the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
        dirs.push(cwd.join("../.."));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Apply `DAILYTRACK_*` variables on top of `config`.
///
/// # Errors
/// Returns `TrackerError::Config` if a numeric variable does not parse.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    if let Some(url) = env_opt("DAILYTRACK_API_URL") {
        config.api.base_url = Some(url);
    }
    if let Some(origin) = env_opt("DAILYTRACK_ORIGIN") {
        config.api.origin = origin;
    }
    if let Some(path) = env_opt("DAILYTRACK_SESSION_PATH") {
        config.session.storage_path = Some(path);
    }
    if let Some(secs) = env_u64("DAILYTRACK_HTTP_TIMEOUT")? {
        config.api.timeout_seconds = secs;
    }
    if let Some(secs) = env_u64("DAILYTRACK_HEALTH_INTERVAL")? {
        config.health.interval_seconds = secs;
    }
    if let Some(secs) = env_u64("DAILYTRACK_HEALTH_TIMEOUT")? {
        config.health.timeout_seconds = secs;
    }
    config.health.enabled = env_bool("DAILYTRACK_HEALTH_ENABLED", config.health.enabled);
    if let Some(level) = env_opt("DAILYTRACK_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("DAILYTRACK_LOG_JSON", config.logging.json);
    Ok(config)
}

/// Non-empty value of an environment variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    env_opt(key)
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|e| TrackerError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// `1`, `true`, `yes` and `on` (any case) are true; anything else set is
/// false; unset keeps `default`.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
