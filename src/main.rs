//! PollBooth server
//!
//! Main application entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use pollbooth::{config::Settings, models::RegisterRequest, utils::logging};

#[derive(Parser)]
#[command(name = "pollbooth", version, about = "Poll service")]
struct Cli {
    /// Configuration file, extension optional
    #[arg(long, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create an account with superuser rights
    CreateSuperuser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "POLLBOOTH_SUPERUSER_PASSWORD")]
        password: String,
        #[arg(long, default_value = "Admin")]
        first_name: String,
        #[arg(long, default_value = "User")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_file(&cli.config).context("Failed to load configuration")?;
    settings.validate().context("Invalid configuration")?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", pollbooth::info());
    let services = pollbooth::connect(&settings).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings, services).await,
        Command::CreateSuperuser {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let user = services
                .account_service
                .create_superuser(RegisterRequest {
                    username,
                    email,
                    first_name,
                    last_name,
                    password_confirm: password.clone(),
                    password,
                    avatar: None,
                })
                .await?;
            info!(user_id = user.id, username = %user.username, "Superuser created");
            Ok(())
        }
    }
}

async fn serve(settings: Settings, services: pollbooth::ServiceFactory) -> anyhow::Result<()> {
    let app = pollbooth::build_app(&settings, services);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("PollBooth has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
