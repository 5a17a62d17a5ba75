use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use domain::driver::ShuftiProDriver;
use kyc_auth::webhook::SignedPayloadValidator;
use kyc_core::traits::driver::Driver;
use kyc_core::{SimpleVerificationOptions, User, VerificationRequest, VerificationResult};
use log::*;
use secrecy::SecretString;
use serde_json::{Map, Value};
use service::{config::Config, logging::Logger};

/// Drive ShuftiPro identity verifications from the command line.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a verification from explicit request fields
    Create {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        country: String,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        journey_id: Option<String>,
        #[arg(long)]
        redirect_url: Option<String>,
        #[arg(long)]
        callback_url: Option<String>,
        /// Allowed country codes, comma separated
        #[arg(long, value_delimiter = ',')]
        allowed_countries: Vec<String>,
        /// Denied country codes, comma separated
        #[arg(long, value_delimiter = ',')]
        denied_countries: Vec<String>,
    },
    /// Create a verification from the configured defaults (journey or document + face)
    Simple {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Retrieve a verification, including its document images
    Status { reference: String },
    /// Whether the user can still continue a verification
    Resume { reference: String },
    /// Print the hosted verification URL
    Url { reference: String },
    /// Validate and normalize a webhook body read from a file
    Webhook {
        file: PathBuf,
        /// Request header as `Name: value`, repeatable
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },
    /// Print the signature ShuftiPro would send for a webhook body read from a file
    Sign { file: PathBuf },
    /// Download and store every document of a verification
    Download {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        email: String,
        reference: String,
    },
}

#[tokio::main]
async fn main() {
    Config::load_env_file();
    let cli = Cli::parse();

    if let Err(e) = Logger::init_logger(&cli.config) {
        eprintln!("Failed to start logger: {e}");
    }

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config;

    if let Command::Sign { file } = &cli.command {
        let secret = config.shuftipro_webhook_secret().unwrap_or_default();
        let validator = SignedPayloadValidator::shufti_pro(SecretString::new(secret))?;
        println!("{}", validator.compute_signature(&read_payload(file)?));
        return Ok(());
    }

    let driver = ShuftiProDriver::new(&config)?;
    if !driver.is_enabled() {
        warn!("The {} driver is disabled in configuration", driver.name());
    }

    match cli.command {
        Command::Create {
            user_id,
            email,
            country,
            language,
            reference,
            journey_id,
            redirect_url,
            callback_url,
            allowed_countries,
            denied_countries,
        } => {
            let mut request = VerificationRequest::new(email.clone()).with_country(country);
            if let Some(language) = language {
                request = request.with_language(language);
            }
            if let Some(reference) = reference {
                request = request.with_reference(reference);
            }
            if let Some(journey_id) = journey_id {
                request = request.with_journey_id(journey_id);
            }
            if let Some(url) = redirect_url {
                request = request.with_redirect_url(url);
            }
            if let Some(url) = callback_url {
                request = request.with_callback_url(url);
            }
            if !allowed_countries.is_empty() {
                request = request.with_allowed_countries(allowed_countries);
            }
            if !denied_countries.is_empty() {
                request = request.with_denied_countries(denied_countries);
            }

            let result = driver
                .create_verification(&User::new(user_id, email), request)
                .await?;
            print_json(&result)?;
        }
        Command::Simple {
            user_id,
            email,
            country,
            language,
        } => {
            let options = SimpleVerificationOptions { country, language };
            let result = driver
                .create_simple_verification(&User::new(user_id, email), options)
                .await?;
            print_json(&result)?;
        }
        Command::Status { reference } => {
            let result = driver.retrieve_verification(&reference).await?;
            info!(
                "{} is {}",
                reference,
                driver.map_event_to_status(&result.event)
            );
            print_json(&result)?;
        }
        Command::Resume { reference } => {
            println!("{}", driver.can_resume_verification(&reference).await);
        }
        Command::Url { reference } => match driver.get_verification_url(&reference).await {
            Some(url) => println!("{url}"),
            None => warn!("No verification URL available for {reference}"),
        },
        Command::Webhook { file, headers } => {
            let headers = parse_headers(&headers);
            let result = driver.process_webhook(read_payload(&file)?, &headers).await?;
            info!(
                "Webhook for {} maps to {}",
                result.reference,
                driver.map_event_to_status(&result.event)
            );
            print_json(&result)?;
        }
        Command::Download {
            user_id,
            email,
            reference,
        } => {
            let paths = driver
                .download_documents(&User::new(user_id, email), &reference)
                .await?;
            for path in paths {
                println!("{}", driver.documents().document_url(&path));
            }
        }
        Command::Sign { .. } => {}
    }

    Ok(())
}

fn read_payload(file: &PathBuf) -> Result<Map<String, Value>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(file)?;
    match serde_json::from_str(&text)? {
        Value::Object(payload) => Ok(payload),
        _ => Err(format!("{} does not contain a JSON object", file.display()).into()),
    }
}

fn parse_headers(raw: &[String]) -> HashMap<String, String> {
    raw.iter()
        .filter_map(|header| header.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn print_json(result: &VerificationResult) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
