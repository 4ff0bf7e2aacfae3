use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regula_core::config::Config;
use regula_core::identity::RegistrationForm;
use regula_core::logging::{init_logging_with_config, LogConfig};
use regula_core::shutdown::install_signal_handlers;
use regula_core::Platform;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "regula")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the persisted session
    #[arg(long)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Repeat the password; defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
        /// Accept the terms of service
        #[arg(long)]
        accept_terms: bool,
    },

    /// Log in (any password is accepted)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },

    /// Forget the persisted session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Request a password reset code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Print the logged-in user's dashboard stats as JSON
    Stats,

    /// List the featured packages
    Featured {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Submit a package and follow it through review
    Simulate(commands::SimulateArgs),
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env().context("Invalid environment override")?;

    if let Some(dir) = &args.data_dir {
        let expanded = shellexpand::tilde(dir);
        config.identity.data_dir = PathBuf::from(expanded.as_ref());
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.to_lowercase();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args)?;
    if let Command::Simulate(sim) = &args.command {
        sim.tune(&mut config.catalog);
    }

    init_logging_with_config(LogConfig::from_settings(&config.logging)?)?;

    debug!("Configuration: {:?}", config);

    let platform = Platform::from_config(&config).await;
    install_signal_handlers(Arc::clone(platform.shutdown_coordinator()));

    match args.command {
        Command::Register {
            name,
            email,
            password,
            confirm_password,
            accept_terms,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            commands::register(
                &platform,
                RegistrationForm {
                    full_name: name,
                    email,
                    password,
                    confirm_password,
                    accept_terms,
                },
            )
            .await?
        }
        Command::Login { email, password } => commands::login(&platform, email, password).await?,
        Command::Logout => commands::logout(&platform).await?,
        Command::Whoami => commands::whoami(&platform).await,
        Command::ForgotPassword { email } => commands::forgot_password(&platform, &email).await,
        Command::Stats => commands::stats(&platform).await?,
        Command::Featured { json } => commands::featured(&platform, json).await?,
        Command::Simulate(sim) => commands::simulate(&platform, sim).await?,
    }

    platform.shutdown().await;
    info!("Regula CLI finished");

    Ok(())
}
