//! `tracing` subscriber setup.

use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::Context;
use aurex_core::config::settings::LoggingConfig;
use tracing::Level;

/// The level to log at: `-v` flags win over the configured level.
pub fn level(verbose: u8, config: &LoggingConfig) -> anyhow::Result<Level> {
    match verbose {
        0 => Level::from_str(config.level.trim())
            .map_err(|_| anyhow::anyhow!("invalid log level {:?} in config", config.level)),
        1 => Ok(Level::DEBUG),
        _ => Ok(Level::TRACE),
    }
}

/// Installs the global subscriber, writing to the configured file or stderr.
pub fn init(level: Level, config: &LoggingConfig) -> anyhow::Result<()> {
    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_max_level(level)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_max_level(level)
                .init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            file: None,
        }
    }

    #[test]
    fn config_level_is_used_without_flags() {
        assert_eq!(level(0, &config("warn")).unwrap(), Level::WARN);
        assert_eq!(level(0, &config("DEBUG")).unwrap(), Level::DEBUG);
    }

    #[test]
    fn flags_override_config() {
        assert_eq!(level(1, &config("error")).unwrap(), Level::DEBUG);
        assert_eq!(level(3, &config("error")).unwrap(), Level::TRACE);
    }

    #[test]
    fn bad_level_is_an_error() {
        let err = level(0, &config("loud")).unwrap_err();
        assert!(err.to_string().contains("loud"));
    }
}
