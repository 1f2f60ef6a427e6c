//! Core application

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiServer, AuthManager};
use crate::core::cli::{self, CliConfig, Commands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME, APP_NAME_LOWER, DEFAULT_DATABASE_PATH, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::SqliteService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub database: Arc<SqliteService>,
    pub auth: Arc<AuthManager>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => {
                return Self::handle_system_command(system_cmd, &cli_config);
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let database = Arc::new(
            SqliteService::init(&config.database.path)
                .await
                .with_context(|| {
                    format!(
                        "Failed to open database: {}",
                        config.database.path.display()
                    )
                })?,
        );

        let auth = Arc::new(AuthManager::new(
            &config.auth,
            config.environment,
            database.pool().clone(),
        ));
        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            database,
            auth,
        })
    }

    fn handle_system_command(cmd: SystemCommands, cli: &CliConfig) -> Result<()> {
        match cmd {
            SystemCommands::Reset { yes } => {
                let path = cli
                    .database
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));
                Self::reset_database(&path, yes)
            }
        }
    }

    fn reset_database(path: &Path, skip_confirm: bool) -> Result<()> {
        if !path.exists() {
            println!("Nothing to reset. Database does not exist: {}", path.display());
            return Ok(());
        }

        println!("This will permanently delete the database:");
        println!("  {}", path.display());
        println!();
        println!(
            "Make sure the server is not running. \
             Deleting the database while the server is running will cause data corruption."
        );

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        remove_database_files(path)?;
        println!("Reset: {}", path.display());
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        tracing::info!(
            app = APP_NAME,
            version = env!("CARGO_PKG_VERSION"),
            database = %app.config.database.path.display(),
            "Starting"
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}

/// Delete the database file and its WAL side files
fn remove_database_files(path: &Path) -> Result<()> {
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to delete database: {}", path.display()))?;

    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let side = PathBuf::from(side);
        if side.exists() {
            std::fs::remove_file(&side)
                .with_context(|| format!("Failed to delete {}", side.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_removes_database_and_side_files() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("micropost.db");
        std::fs::write(&db, b"db").unwrap();
        std::fs::write(dir.path().join("micropost.db-wal"), b"wal").unwrap();

        CoreApp::reset_database(&db, true).unwrap();

        assert!(!db.exists());
        assert!(!dir.path().join("micropost.db-wal").exists());
    }

    #[test]
    fn test_reset_missing_database_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("missing.db");
        assert!(CoreApp::reset_database(&db, true).is_ok());
    }

    #[tokio::test]
    async fn test_init_opens_database_from_cli() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let cli = CliConfig {
            jwt_secret: Some("0123456789abcdef0123".to_string()),
            database: Some(path.clone()),
            ..Default::default()
        };

        let app = CoreApp::init(&cli).await.unwrap();
        assert!(path.exists());
        let user = app
            .auth
            .register("Test", "test@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(user.user_roles, vec!["general".to_string()]);

        app.shutdown.shutdown().await;
        assert!(app.database.pool().is_closed());
    }

    #[tokio::test]
    async fn test_init_requires_jwt_secret() {
        let dir = tempfile::tempdir().unwrap();
        let cli = CliConfig {
            database: Some(dir.path().join("app.db")),
            ..Default::default()
        };
        assert!(CoreApp::init(&cli).await.is_err());
    }
}
