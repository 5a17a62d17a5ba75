use clap::builder::{BoolishValueParser, TypedValueParser as _};
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;

/// Default ShuftiPro API base URL used when `SHUFTIPRO_BASE_URL` is not set.
pub const DEFAULT_SHUFTIPRO_BASE_URL: &str = "https://api.shuftipro.com";

/// Name of the driver as registered with the KYC abstraction layer.
pub const DRIVER_NAME: &str = "shuftipro";

/// Driver configuration, read once at startup and handed to every component by
/// reference. Each value can be given as a command line flag or through the
/// environment (a `.env` file is honored).
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The base URL of the ShuftiPro API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_SHUFTIPRO_BASE_URL)]
    shuftipro_base_url: String,

    /// The client id used as the Basic auth user name when calling ShuftiPro.
    #[arg(long, env)]
    shuftipro_client_id: Option<String>,

    /// The secret key used as the Basic auth password when calling ShuftiPro.
    #[arg(long, env, hide_env_values = true)]
    shuftipro_secret_key: Option<String>,

    /// Timeout in seconds for each ShuftiPro API call
    #[arg(long, env, default_value_t = 30)]
    pub shuftipro_timeout: u64,

    /// The shared secret ShuftiPro appends to the signed webhook content.
    #[arg(long, env, hide_env_values = true)]
    shuftipro_webhook_secret: Option<String>,

    /// Where ShuftiPro posts verification webhooks.
    #[arg(long, env)]
    shuftipro_callback_url: Option<String>,

    /// Where the user's browser is sent when the hosted verification ends.
    #[arg(long, env)]
    shuftipro_redirect_url: Option<String>,

    /// Reject webhooks whose signature does not match.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new())]
    pub shuftipro_webhook_signature_validation: bool,

    /// Journey started by the simple verification entry point when journeys are enabled.
    #[arg(long, env)]
    shuftipro_default_journey_id: Option<String>,

    /// Prefer the default journey over an ad-hoc document + face verification.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new())]
    pub shuftipro_journeys_enabled: bool,

    /// Record driver activity (requests, responses, webhooks) in the log.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new())]
    pub shuftipro_logging_enabled: bool,

    /// Log target used for driver activity records.
    #[arg(long, env, default_value = "daily")]
    shuftipro_log_channel: String,

    /// Storage disk that downloaded documents are written to.
    #[arg(long, env, default_value = "s3")]
    shuftipro_document_storage_disk: String,

    /// Path prefix, inside the disk, for downloaded documents.
    #[arg(long, env, default_value = "shuftipro/documents")]
    shuftipro_document_storage_path: String,

    /// Local directory holding one sub-directory per storage disk.
    #[arg(long, env, default_value = "storage")]
    shuftipro_document_storage_root: String,

    /// Timeout in seconds for downloading a single document
    #[arg(long, env, default_value_t = 60)]
    pub shuftipro_document_timeout: u64,

    /// Largest document, in bytes, that is downloaded; bigger ones are skipped
    #[arg(long, env, default_value_t = 10_485_760)]
    pub shuftipro_max_file_size: u64,

    /// Interface language used when a request does not name one
    #[arg(long, env, default_value = "en")]
    shuftipro_default_language: String,

    /// Whether the ShuftiPro driver is enabled in the KYC layer.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new())]
    pub kyc_shuftipro_enabled: bool,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        Self::load_env_file();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Load variables from a `.env` file, if one exists, into the process environment.
    pub fn load_env_file() {
        dotenv().ok();
    }

    pub fn shuftipro_base_url(&self) -> &str {
        &self.shuftipro_base_url
    }

    pub fn set_shuftipro_base_url(mut self, base_url: String) -> Self {
        self.shuftipro_base_url = base_url;
        self
    }

    pub fn shuftipro_client_id(&self) -> Option<String> {
        self.shuftipro_client_id.clone()
    }

    pub fn shuftipro_secret_key(&self) -> Option<String> {
        self.shuftipro_secret_key.clone()
    }

    pub fn set_shuftipro_credentials(mut self, client_id: String, secret_key: String) -> Self {
        self.shuftipro_client_id = Some(client_id);
        self.shuftipro_secret_key = Some(secret_key);
        self
    }

    pub fn shuftipro_webhook_secret(&self) -> Option<String> {
        self.shuftipro_webhook_secret.clone()
    }

    pub fn set_shuftipro_webhook_secret(mut self, secret: String) -> Self {
        self.shuftipro_webhook_secret = Some(secret);
        self
    }

    /// Returns the callback URL, treating an empty value as unset.
    pub fn shuftipro_callback_url(&self) -> Option<String> {
        self.shuftipro_callback_url
            .clone()
            .filter(|url| !url.is_empty())
    }

    pub fn shuftipro_redirect_url(&self) -> Option<String> {
        self.shuftipro_redirect_url
            .clone()
            .filter(|url| !url.is_empty())
    }

    pub fn set_shuftipro_urls(mut self, callback_url: String, redirect_url: String) -> Self {
        self.shuftipro_callback_url = Some(callback_url);
        self.shuftipro_redirect_url = Some(redirect_url);
        self
    }

    /// Returns the default journey id, treating an empty value as unset.
    pub fn shuftipro_default_journey_id(&self) -> Option<String> {
        self.shuftipro_default_journey_id
            .clone()
            .filter(|journey_id| !journey_id.is_empty())
    }

    pub fn set_shuftipro_journeys(mut self, enabled: bool, journey_id: Option<String>) -> Self {
        self.shuftipro_journeys_enabled = enabled;
        self.shuftipro_default_journey_id = journey_id;
        self
    }

    pub fn shuftipro_log_channel(&self) -> &str {
        &self.shuftipro_log_channel
    }

    pub fn shuftipro_document_storage_disk(&self) -> &str {
        &self.shuftipro_document_storage_disk
    }

    pub fn shuftipro_document_storage_path(&self) -> &str {
        &self.shuftipro_document_storage_path
    }

    pub fn shuftipro_document_storage_root(&self) -> &str {
        &self.shuftipro_document_storage_root
    }

    pub fn set_shuftipro_document_storage(
        mut self,
        root: String,
        disk: String,
        path: String,
    ) -> Self {
        self.shuftipro_document_storage_root = root;
        self.shuftipro_document_storage_disk = disk;
        self.shuftipro_document_storage_path = path;
        self
    }

    pub fn shuftipro_default_language(&self) -> &str {
        &self.shuftipro_default_language
    }
}
