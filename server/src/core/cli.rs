use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::Environment;
use super::constants::{
    ENV_CONFIG, ENV_CORS_ORIGIN, ENV_DATABASE, ENV_ENVIRONMENT, ENV_HOST, ENV_JWT_SECRET, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "micropost")]
#[command(version, about = "Micro-blogging API server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Secret used to sign access tokens (required)
    #[arg(long, global = true, env = ENV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// SQLite database file
    #[arg(long, global = true, env = ENV_DATABASE)]
    pub database: Option<PathBuf>,

    /// Deployment environment (development, production, test)
    #[arg(long, global = true, env = ENV_ENVIRONMENT, value_parser = parse_environment)]
    pub environment: Option<Environment>,

    /// Frontend origin allowed by CORS
    #[arg(long, global = true, env = ENV_CORS_ORIGIN)]
    pub cors_origin: Option<String>,
}

/// Parse environment from CLI/env string
fn parse_environment(s: &str) -> Result<Environment, String> {
    match s.to_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "production" | "prod" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        _ => Err(format!(
            "Invalid environment '{}'. Valid options: development, production, test",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete the database file (all users, posts and likes). Requires confirmation.
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub database: Option<PathBuf>,
    pub environment: Option<Environment>,
    pub cors_origin: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        jwt_secret: cli.jwt_secret,
        database: cli.database,
        environment: cli.environment,
        cors_origin: cli.cors_origin,
    };
    (config, cli.command)
}
