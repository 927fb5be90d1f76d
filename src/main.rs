//! credmatch CLI - resolve deployment passwords from stored servers
//!
//! Run `credmatch --help` for usage information.

use clap::{Parser, Subcommand};
use credmatch::config::{Config, LogFormat};
use credmatch::crypto::{encrypt_password, generate_salt};
use credmatch::settings::Settings;
use credmatch::store::{SettingsDecrypter, SettingsStore};
use credmatch::{
    AttributeProfile, CredentialResolver, CredmatchError, Resolution, ResolveRequest, Secret,
};
use secrecy::SecretString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the master password
const MASTER_PASSWORD_ENV: &str = "CREDMATCH_MASTER_PASSWORD";

#[derive(Parser)]
#[command(
    name = "credmatch",
    about = "Resolve deployment passwords by matching host/account/user against stored servers",
    version
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Settings file path (overrides the configuration)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the password of the best matching server (shown in clear text)
    Resolve {
        /// Host to match
        #[arg(long)]
        host: Option<String>,

        /// Account to match
        #[arg(long)]
        account: Option<String>,

        /// User to match
        #[arg(long)]
        user: Option<String>,
    },

    /// List the servers in the settings file (passwords are never shown)
    List {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Encrypt a password for use in the settings file
    Encrypt {
        /// Password to encrypt (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },

    /// Initialize configuration and settings files
    Init {
        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path).await?
    } else {
        Config::load_or_default(Config::default_path()).await
    };

    if let Some(settings) = cli.settings {
        config.settings.path = settings;
    }

    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Resolve {
            host,
            account,
            user,
        } => {
            resolve(&config, AttributeProfile::new(host, account, user)).await?;
        }
        Commands::List { format } => {
            list_servers(&config, format).await?;
        }
        Commands::Encrypt { password } => {
            encrypt(&config, password).await?;
        }
        Commands::Init { force } => {
            init(&config, force).await?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber; logs go to stderr
fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = config.logging.format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(io::stderr)))
        .init();
}

/// Get the master password from the environment or prompt
fn get_master_password() -> Result<SecretString, Box<dyn std::error::Error>> {
    if let Ok(password) = std::env::var(MASTER_PASSWORD_ENV) {
        return Ok(SecretString::from(password));
    }

    eprint!("Enter master password: ");
    io::stderr().flush()?;

    let password = rpassword::read_password()?;
    Ok(SecretString::from(password))
}

/// Build the settings store, asking for the master password only when the
/// settings contain encrypted passwords
async fn open_store(config: &Config) -> SettingsStore {
    let path = &config.settings.path;

    let needs_master_password = match Settings::load(path).await {
        Ok(settings) => settings.first_encrypted().is_some(),
        Err(e) => {
            debug!(error = %e, "Could not inspect settings");
            false
        }
    };

    let master_password = if needs_master_password {
        match get_master_password() {
            Ok(password) => Some(password),
            Err(e) => {
                warn!(error = %e, "Could not read master password");
                None
            }
        }
    } else {
        None
    };

    SettingsStore::new(path, master_password)
}

/// Resolve a password in standalone mode and print it
async fn resolve(
    config: &Config,
    query: AttributeProfile,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config).await;
    let resolver = CredentialResolver::new(Arc::new(store));

    match resolver.resolve(&ResolveRequest::standalone(query)).await {
        Resolution::Found { id, secret, .. } => {
            eprintln!("Matching server '{}' found. The password is shown in clear text:", id);
            println!("{}", secret.expose());
        }
        Resolution::NotFound => {
            println!("No matching server found, or matching server(s) had no password specified");
        }
        Resolution::NothingToMatch => {
            println!("No attributes to match specified.");
            println!("Hint: specify attributes to match like this:");
            println!("      credmatch resolve --host myhost --account myaccount --user myuser");
        }
    }

    Ok(())
}

/// List servers in the settings file
async fn list_servers(config: &Config, format: String) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(&config.settings.path)
        .await
        .map_err(CredmatchError::from)?;

    if settings.servers.is_empty() {
        println!("No servers defined in {}", config.settings.path.display());
        return Ok(());
    }

    match format.as_str() {
        "json" => {
            let servers: Vec<_> = settings
                .servers
                .iter()
                .map(|server| {
                    serde_json::json!({
                        "id": server.id,
                        "password_defined": server.password.is_some(),
                        "configuration": server.profile(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&servers)?);
        }
        _ => {
            println!(
                "{:<20} {:<10} {:<36} {:<16} {}",
                "ID", "PASSWORD", "HOST", "ACCOUNT", "USER"
            );
            println!("{}", "-".repeat(100));
            for server in &settings.servers {
                let password = if server.password.is_some() { "defined" } else { "-" };
                match server.profile() {
                    Some(profile) => println!(
                        "{:<20} {:<10} {:<36} {:<16} {}",
                        server.id,
                        password,
                        profile.host().unwrap_or("-"),
                        profile.account().unwrap_or("-"),
                        profile.user().unwrap_or("-"),
                    ),
                    None => println!("{:<20} {:<10} (no configuration)", server.id, password),
                }
            }
        }
    }

    Ok(())
}

/// Encrypt a password with the master password and the settings salt
async fn encrypt(
    config: &Config,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(&config.settings.path)
        .await
        .map_err(CredmatchError::from)?;
    let salt = settings.salt.ok_or_else(|| {
        format!(
            "No [security] salt in {}. Run 'credmatch init' first.",
            config.settings.path.display()
        )
    })?;

    let master_password = get_master_password()?;
    let decrypter = SettingsDecrypter::new(&master_password, &salt).map_err(CredmatchError::from)?;

    let password = match password {
        Some(p) => p,
        None => {
            eprint!("Enter password to encrypt: ");
            io::stderr().flush()?;
            rpassword::read_password()?
        }
    };

    let encrypted =
        encrypt_password(&Secret::new(password), decrypter.key()).map_err(CredmatchError::from)?;
    println!("{}", encrypted.encode());

    Ok(())
}

/// Initialize configuration and settings files
async fn init(config: &Config, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = Config::default_path();
    let settings_path = &config.settings.path;

    for path in [&config_path, settings_path] {
        if path.exists() && !force {
            return Err(format!(
                "{} already exists. Use --force to overwrite.",
                path.display()
            )
            .into());
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    tokio::fs::write(&config_path, Config::template()).await?;
    println!("Configuration initialized at {}", config_path.display());

    tokio::fs::write(settings_path, Settings::template(&generate_salt())).await?;
    println!("Settings initialized at {}", settings_path.display());

    println!("\nNext steps:");
    println!("1. Set {} or you'll be prompted for the master password", MASTER_PASSWORD_ENV);
    println!("2. Encrypt a password: credmatch encrypt");
    println!("3. Add a [[servers]] entry with the encrypted password to the settings file");
    println!("4. Resolve: credmatch resolve --host <host> --user <user>");

    Ok(())
}
