use super::prompts;
use crate::context::AppContext;
use crate::output::{Output, OutputFormat};
use crate::render;
use crate::{BackendArg, ConfigCommands};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color};
use moviewatch_config::{resolve_tmdb_api_key, Config, StorageBackend, TMDB_API_KEY_ENV};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(ctx: AppContext, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(&ctx, full, output),
        ConfigCommands::Tmdb { api_key, language } => configure_tmdb(ctx, api_key, language, output),
        ConfigCommands::Storage { backend, key, quota_bytes } => configure_storage(ctx, backend, key, quota_bytes, output),
    }
}

fn backend_name(backend: StorageBackend) -> &'static str {
    match backend {
        StorageBackend::File => "file",
        StorageBackend::Memory => "memory",
        StorageBackend::Disabled => "disabled",
    }
}

/// Where the API key in effect comes from
fn api_key_source(ctx: &AppContext) -> Result<(&'static str, Option<String>)> {
    let credentials = ctx.credentials()?;
    let key = resolve_tmdb_api_key(&credentials);
    let from_env = std::env::var(TMDB_API_KEY_ENV).map(|v| !v.trim().is_empty()).unwrap_or(false);
    let source = match (&key, from_env) {
        (None, _) => "not set",
        (Some(_), true) => "environment",
        (Some(_), false) => "credentials file",
    };
    Ok((source, key))
}

fn show_config(ctx: &AppContext, full: bool, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let config_file = ctx.paths.config_file();
    let (key_source, api_key) = api_key_source(ctx)?;
    let api_key_display = match &api_key {
        Some(key) if full => key.clone(),
        Some(key) => mask_string(key),
        None => "<not set>".to_string(),
    };
    let storage_location = match config.watchlist.backend {
        StorageBackend::File => config.storage_dir(&ctx.paths).display().to_string(),
        StorageBackend::Memory => "in memory (not kept between runs)".to_string(),
        StorageBackend::Disabled => "none".to_string(),
    };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            if !config_file.exists() {
                output.warn(format!("Configuration file not found at: {} (showing defaults)", config_file.display()));
            }

            println!("{}", render::section_header("Configuration"));
            let mut table = render::styled_table();
            table.set_header(vec![
                Cell::new("Config File").add_attribute(Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            table.add_row(vec![Cell::new("Credentials File"), Cell::new(ctx.paths.credentials_file().display())]);
            println!("{}", table);

            let mut tmdb = render::styled_table();
            tmdb.set_header(vec![
                Cell::new("TMDB").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
            tmdb.add_row(vec![Cell::new("API Key"), Cell::new(format!("{} ({})", api_key_display, key_source))]);
            tmdb.add_row(vec![Cell::new("API URL"), Cell::new(&config.tmdb.api_base_url)]);
            tmdb.add_row(vec![Cell::new("Image URL"), Cell::new(&config.tmdb.image_base_url)]);
            tmdb.add_row(vec![
                Cell::new("Language"),
                Cell::new(config.tmdb.language.as_deref().unwrap_or("<provider default>")),
            ]);
            tmdb.add_row(vec![Cell::new("Cast Shown"), Cell::new(config.tmdb.cast_limit)]);
            tmdb.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.tmdb.timeout_seconds))]);
            println!("{}", tmdb);

            let mut storage = render::styled_table();
            storage.set_header(vec![
                Cell::new("Watchlist Storage").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
            storage.add_row(vec![Cell::new("Backend"), Cell::new(backend_name(config.watchlist.backend))]);
            storage.add_row(vec![Cell::new("Key"), Cell::new(&config.watchlist.key)]);
            storage.add_row(vec![Cell::new("Location"), Cell::new(storage_location)]);
            storage.add_row(vec![
                Cell::new("Quota"),
                Cell::new(match config.storage_quota() {
                    Some(bytes) => format!("{} bytes", bytes),
                    None => "unlimited".to_string(),
                }),
            ]);
            println!("{}", storage);

            let mut cache = render::styled_table();
            cache.set_header(vec![
                Cell::new("Listing Cache").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
            cache.add_row(vec![
                Cell::new("Enabled"),
                Cell::new(if config.cache.enabled { "✓ Yes" } else { "✗ No" }),
            ]);
            cache.add_row(vec![Cell::new("TTL"), Cell::new(format!("{} minutes", config.cache.ttl_minutes))]);
            cache.add_row(vec![Cell::new("Directory"), Cell::new(ctx.paths.catalog_cache_dir().display())]);
            println!("{}", cache);

            if let Err(e) = config.validate() {
                output.warn(format!("Configuration problem: {}", e));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "credentials_file": ctx.paths.credentials_file().display().to_string(),
                "tmdb": {
                    "api_key": api_key.as_ref().map(|_| api_key_display.clone()),
                    "api_key_source": key_source,
                    "api_base_url": config.tmdb.api_base_url,
                    "image_base_url": config.tmdb.image_base_url,
                    "language": config.tmdb.language,
                    "cast_limit": config.tmdb.cast_limit,
                    "timeout_seconds": config.tmdb.timeout_seconds,
                },
                "watchlist": {
                    "backend": backend_name(config.watchlist.backend),
                    "key": config.watchlist.key,
                    "location": storage_location,
                    "quota_bytes": config.watchlist.quota_bytes,
                },
                "cache": {
                    "enabled": config.cache.enabled,
                    "ttl_minutes": config.cache.ttl_minutes,
                    "dir": ctx.paths.catalog_cache_dir().display().to_string(),
                },
                "valid": config.validate().is_ok(),
            }));
        }
    }

    Ok(())
}

fn save_config(ctx: &AppContext, config: &Config) -> Result<()> {
    config.validate().map_err(|e| eyre!("Invalid configuration: {}", e))?;
    ctx.paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;
    let config_file = ctx.paths.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))
}

fn configure_tmdb(
    mut ctx: AppContext,
    api_key_arg: Option<String>,
    language: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut credentials = ctx.credentials()?;

    let api_key = match api_key_arg {
        Some(key) => key,
        None => {
            output.println(format!("{}", "TMDB API Setup".bold().bright_cyan()));
            output.println("Create an API key at https://www.themoviedb.org/settings/api");
            if let Some(existing) = credentials.get_tmdb_api_key() {
                output.println(format!("Current key: {}", mask_string(existing)));
            }
            prompts::prompt_secret("TMDB API Key")?
        }
    };

    validate_api_key(api_key.trim()).map_err(|e| eyre!("Validation error: {}", e))?;
    credentials.set_tmdb_api_key(api_key);
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;
    output.success(format!("TMDB API key saved to {}", ctx.paths.credentials_file().display()));

    if std::env::var(TMDB_API_KEY_ENV).map(|v| !v.trim().is_empty()).unwrap_or(false) {
        output.warn(format!("{} is set and takes precedence over the stored key", TMDB_API_KEY_ENV));
    }

    let language = match language {
        Some(language) => Some(language),
        None if output.is_human() && super::progress::is_interactive() => {
            let current = ctx.config.tmdb.language.clone().unwrap_or_default();
            let answer = prompts::prompt_string("Response language (e.g. en-US, empty for default)", Some(current.as_str()))?;
            (answer.trim() != current).then_some(answer)
        }
        None => None,
    };

    if let Some(language) = language {
        let language = language.trim().to_string();
        ctx.config.tmdb.language = if language.is_empty() { None } else { Some(language) };
        save_config(&ctx, &ctx.config)?;
        output.success("TMDB settings saved");
    }

    output.json(&json!({ "tmdb": { "api_key": "saved", "language": ctx.config.tmdb.language } }));
    Ok(())
}

fn configure_storage(
    mut ctx: AppContext,
    backend: Option<BackendArg>,
    key: Option<String>,
    quota_bytes: Option<u64>,
    output: &Output,
) -> Result<()> {
    if backend.is_none() && key.is_none() && quota_bytes.is_none() {
        output.warn("No storage option specified. Use --backend, --key or --quota-bytes");
        output.println("\nExample: moviewatch config storage --backend file --quota-bytes 0");
        return Ok(());
    }

    if let Some(backend) = backend {
        ctx.config.watchlist.backend = backend.into();
    }
    if let Some(key) = key {
        ctx.config.watchlist.key = key.trim().to_string();
    }
    if let Some(quota_bytes) = quota_bytes {
        ctx.config.watchlist.quota_bytes = quota_bytes;
    }

    save_config(&ctx, &ctx.config)?;
    output.success(format!(
        "Watchlist storage: {} backend, key '{}'",
        backend_name(ctx.config.watchlist.backend),
        ctx.config.watchlist.key
    ));
    output.json(&json!({
        "watchlist": {
            "backend": backend_name(ctx.config.watchlist.backend),
            "key": ctx.config.watchlist.key,
            "quota_bytes": ctx.config.watchlist.quota_bytes,
        }
    }));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_API_KEY" {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Catches obvious paste mistakes before the key is stored
fn validate_api_key(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("API key cannot be empty");
    }
    if input.len() < 16 {
        return Err("API key seems too short. Please verify it's correct.");
    }
    if input.chars().any(char::is_whitespace) {
        return Err("API key cannot contain whitespace");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("YOUR_API_KEY"), "<not set>");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("0123456789abcdef"), "01***ef");
    }

    #[test]
    fn test_validate_api_key() {
        assert!(validate_api_key("").is_err());
        assert!(validate_api_key("short").is_err());
        assert!(validate_api_key("0123456789abcdef 0123").is_err());
        assert!(validate_api_key("0123456789abcdef0123456789abcdef").is_ok());
    }
}
