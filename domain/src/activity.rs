//! Activity records for ShuftiPro traffic.
//!
//! Records go through the `log` facade with the configured channel as the log
//! target, so they can be routed or filtered separately from the rest of the
//! driver's diagnostics.

use log::*;
use serde_json::Value;
use service::config::Config;

#[derive(Debug, Clone)]
pub struct ActivityLogger {
    enabled: bool,
    channel: String,
}

impl ActivityLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.shuftipro_logging_enabled,
            channel: config.shuftipro_log_channel().to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Log `message` with its JSON `context` at info level. Does nothing when
    /// activity logging is switched off.
    pub fn record(&self, message: &str, context: &Value) {
        if !self.enabled {
            return;
        }
        info!(target: self.channel.as_str(), "{} {}", message, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    fn config(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("kyc").chain(args.iter().copied()))
    }

    #[test]
    fn test_reads_channel_and_flag_from_config() {
        let logger = ActivityLogger::new(&config(&["--shuftipro-log-channel", "kyc"]));
        assert!(logger.is_enabled());
        assert_eq!(logger.channel(), "kyc");
    }

    #[test]
    fn test_disabled_logger_records_nothing() {
        let logger = ActivityLogger::new(&config(&["--shuftipro-logging-enabled", "false"]));
        assert!(!logger.is_enabled());
        logger.record("Creating verification request", &json!({"reference": "SP_1"}));
    }
}
