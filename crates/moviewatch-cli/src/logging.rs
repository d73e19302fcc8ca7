use anyhow::Result;
use moviewatch_config::LoggingConfig;
use std::io;
use std::io::IsTerminal;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directive for the command-line flags, `None` when the config/env decides
fn verbosity_filter(verbose_level: u8, quiet: bool) -> Option<&'static str> {
    if quiet {
        return Some("error");
    }
    match verbose_level {
        0 => None,
        // -v: debug, minus hyper's connection chatter
        1 => Some("debug,hyper::proto::h1=warn,hyper::client::pool=warn"),
        _ => Some("trace"),
    }
}

fn build_filter(verbose_level: u8, quiet: bool, config_level: &str) -> EnvFilter {
    match verbosity_filter(verbose_level, quiet) {
        Some("error") => EnvFilter::new("error"),
        Some(directive) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config_level))
            .unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn use_json(config: &LoggingConfig) -> bool {
    if let Ok(v) = std::env::var("RUST_LOG_JSON") {
        return v == "true";
    }
    config.json.unwrap_or_else(|| !io::stdout().is_terminal())
}

/// Prefix for rotated files: `moviewatch.log` rotates as `moviewatch.<date>`
fn rotation_prefix(file_name: &str) -> &str {
    file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name)
}

pub fn init_logging(verbose_level: u8, quiet: bool, config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(verbose_level, quiet, &config.level);
    let json = use_json(config);
    let registry = Registry::default().with(filter);

    let Some(log_path) = config.file.as_deref() else {
        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(json_layer).init();
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(fmt_layer).init();
        }
        return Ok(());
    };

    let file_appender = rolling_appender(log_path)?;
    if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(file_appender);
        registry.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_writer(file_appender);
        registry.with(fmt_layer).init();
    }

    Ok(())
}

fn rolling_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(log_dir)?;

    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;

    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, rotation_prefix(log_filename)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(3, true), Some("error"));
        assert_eq!(verbosity_filter(0, false), None);
        assert!(verbosity_filter(1, false).unwrap().starts_with("debug"));
        assert_eq!(verbosity_filter(2, false), Some("trace"));
    }

    #[test]
    fn test_rotation_prefix() {
        assert_eq!(rotation_prefix("moviewatch.log"), "moviewatch");
        assert_eq!(rotation_prefix("moviewatch"), "moviewatch");
        assert_eq!(rotation_prefix("app.debug.log"), "app.debug");
    }
}
