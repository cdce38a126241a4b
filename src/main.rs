/// HMAC Signature Fixer CLI
///
/// Reads a raw HTTP request (file or stdin) and:
/// - sign: prints it with a freshly computed `signature` parameter
/// - verify: exits 0 if its current signature is valid, 1 otherwise
/// - canonical: prints the string the signature is computed over
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hmac_fixer::config::{load_config, Config};
use hmac_fixer::utils::{init_logging, TracingObserver};
use hmac_fixer::{handle_request, HttpRequest, RequestAction, Signer};

#[derive(Parser)]
#[command(name = "hmac-fixer", version, about = "Re-sign HTTP requests with HMAC-SHA256")]
struct Cli {
    /// JSON config file with `enabled`, `secret` and `log_level`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Shared secret, overrides the config file
    #[arg(long, env = "HMAC_FIXER_SECRET", global = true, hide_env_values = true)]
    secret: Option<String>,

    /// Forward requests untouched
    #[arg(long, global = true)]
    disabled: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the request's signature and print the result
    Sign {
        /// Raw request file, `-` or nothing for stdin
        file: Option<PathBuf>,
    },
    /// Check the request's existing signature
    Verify { file: Option<PathBuf> },
    /// Print the canonical string that gets signed
    Canonical { file: Option<PathBuf> },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!("❌ Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log_level);
    tracing::debug!(?config, "Configuration loaded");

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(secret) = &cli.secret {
        config = config.with_secret(secret);
    }
    if cli.disabled {
        config.enabled = false;
    }
    Ok(config)
}

fn run(command: Command, config: &Config) -> Result<ExitCode, Box<dyn Error>> {
    match command {
        Command::Sign { file } => {
            let request = read_request(file.as_deref())?;
            let signer = Signer::with_observer(TracingObserver);

            let action = handle_request(request, config, &signer);
            if let RequestAction::Signed(signed) = &action {
                tracing::info!(signature = signed.signature(), "✅ Request signed");
            }

            print!("{}", action.into_request().render());
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { file } => {
            if config.secret.is_empty() {
                return Err(
                    "verify needs a secret (--secret, HMAC_FIXER_SECRET or config file)".into(),
                );
            }

            let request = read_request(file.as_deref())?;
            if Signer::verify(&request, &config.secret)? {
                tracing::info!("✅ Signature valid");
                Ok(ExitCode::SUCCESS)
            } else {
                tracing::warn!("❌ Signature missing or invalid");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Canonical { file } => {
            let request = read_request(file.as_deref())?;
            let set = Signer::canonicalize(&request);
            if set.decode_fallbacks() > 0 {
                tracing::warn!(
                    fallbacks = set.decode_fallbacks(),
                    "⚠️  Some values were kept undecoded"
                );
            }
            println!("{}", set.canonical_string());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_request(file: Option<&Path>) -> Result<HttpRequest, Box<dyn Error>> {
    let raw = match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read request file {}: {}", path.display(), e))?,
        _ => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };

    Ok(HttpRequest::parse(&raw)?)
}
