use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the real environment so
/// tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let latitude = require("LATITUDE")?;
    let longitude = require("LONGITUDE")?;
    validate_coordinate("LATITUDE", &latitude, 90.0)?;
    validate_coordinate("LONGITUDE", &longitude, 180.0)?;

    let env = parse_environment(&or_default("PLACESCOUT_ENV", "development"))?;
    let log_level = or_default("PLACESCOUT_LOG_LEVEL", "info");
    let output_dir = PathBuf::from(or_default("PLACESCOUT_OUTPUT_DIR", "./data"));
    let chrome_path = lookup("PLACESCOUT_CHROME_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let headless = parse_bool("PLACESCOUT_HEADLESS", "true")?;

    let zoom = or_default("PLACESCOUT_ZOOM", "17")
        .parse::<u8>()
        .map_err(|e| invalid("PLACESCOUT_ZOOM", e.to_string()))?;
    if !(1..=21).contains(&zoom) {
        return Err(invalid(
            "PLACESCOUT_ZOOM",
            format!("zoom must be between 1 and 21, got {zoom}"),
        ));
    }

    let navigation_timeout_secs = parse_u64("PLACESCOUT_NAVIGATION_TIMEOUT_SECS", "60")?;
    let selector_timeout_secs = parse_u64("PLACESCOUT_SELECTOR_TIMEOUT_SECS", "30")?;
    let network_idle_ms = parse_u64("PLACESCOUT_NETWORK_IDLE_MS", "500")?;
    let settle_interval_ms = parse_u64("PLACESCOUT_SETTLE_INTERVAL_MS", "250")?;
    let settle_max_ms = parse_u64("PLACESCOUT_SETTLE_MAX_MS", "1000")?;
    let max_scroll_iterations = parse_u32("PLACESCOUT_MAX_SCROLL_ITERATIONS", "200")?;
    let item_timeout_secs = parse_u64("PLACESCOUT_ITEM_TIMEOUT_SECS", "90")?;
    let run_timeout_secs = parse_u64("PLACESCOUT_RUN_TIMEOUT_SECS", "3600")?;
    let item_max_retries = parse_u32("PLACESCOUT_ITEM_MAX_RETRIES", "1")?;

    if max_scroll_iterations == 0 {
        return Err(invalid(
            "PLACESCOUT_MAX_SCROLL_ITERATIONS",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        latitude,
        longitude,
        output_dir,
        chrome_path,
        headless,
        zoom,
        navigation_timeout_secs,
        selector_timeout_secs,
        network_idle_ms,
        settle_interval_ms,
        settle_max_ms,
        max_scroll_iterations,
        item_timeout_secs,
        run_timeout_secs,
        item_max_retries,
    })
}

/// Checks that `raw` is a finite decimal within `±bound`.
fn validate_coordinate(var: &str, raw: &str, bound: f64) -> Result<(), ConfigError> {
    let value = raw
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
    if !value.is_finite() || value.abs() > bound {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("{raw} is outside -{bound}..={bound}"),
        });
    }
    Ok(())
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PLACESCOUT_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
