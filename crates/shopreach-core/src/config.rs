use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so only malformed values can fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let base_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if !(raw.starts_with("http://") || raw.starts_with("https://")) {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("\"{raw}\" is not an http(s) URL"),
            });
        }
        Ok(raw.trim_end_matches('/').to_string())
    };

    let log_level = or_default("SHOPREACH_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("SHOPREACH_DATA_DIR", "./data"));
    let groups_file = or_default("SHOPREACH_GROUPS_FILE", "groups.json");
    if groups_file.is_empty() || groups_file.contains(['/', '\\']) {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPREACH_GROUPS_FILE".to_string(),
            reason: "must be a bare file name".to_string(),
        });
    }

    let webdriver_url = base_url("SHOPREACH_WEBDRIVER_URL", "http://localhost:9515")?;
    let profile_dir = PathBuf::from(or_default("SHOPREACH_PROFILE_DIR", "./chrome_profiles"));
    let profile_name = or_default("SHOPREACH_PROFILE_NAME", "WA");

    let shop_base_url = base_url("SHOPREACH_SHOP_BASE_URL", "https://sawa9ly.app")?;
    let social_base_url = base_url("SHOPREACH_SOCIAL_BASE_URL", "https://web.facebook.com")?;
    let api_base_url = base_url("SHOPREACH_API_BASE_URL", "http://localhost:3000")?;
    let api_timeout_secs = parse_u64("SHOPREACH_API_TIMEOUT_SECS", "30")?;

    let page_settle_ms = parse_u64("SHOPREACH_PAGE_SETTLE_MS", "2000")?;
    let post_page_settle_ms = parse_u64("SHOPREACH_POST_PAGE_SETTLE_MS", "10000")?;
    let post_step_settle_ms = parse_u64("SHOPREACH_POST_STEP_SETTLE_MS", "2000")?;
    let status_settle_ms = parse_u64("SHOPREACH_STATUS_SETTLE_MS", "5000")?;
    let dispatch_delay_secs = parse_u64("SHOPREACH_DISPATCH_DELAY_SECS", "10")?;

    Ok(AppConfig {
        log_level,
        data_dir,
        groups_file,
        webdriver_url,
        profile_dir,
        profile_name,
        shop_base_url,
        social_base_url,
        api_base_url,
        api_timeout_secs,
        page_settle_ms,
        post_page_settle_ms,
        post_step_settle_ms,
        status_settle_ms,
        dispatch_delay_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
