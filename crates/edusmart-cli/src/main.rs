use anyhow::Result;
use clap::{Parser, Subcommand};
use edusmart_application::{AppServices, BootstrapOptions, Notifier};
use edusmart_infrastructure::ConfigLoader;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "edusmart")]
#[command(about = "EduSmart ERP client - session, academic context and scoped reads", long_about = None)]
struct Cli {
    /// Backend base URL (overrides config.toml and EDUSMART_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep the session and preferences in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        email: String,
        /// Password (falls back to EDUSMART_PASSWORD, then a prompt)
        #[arg(long)]
        password: Option<String>,
        /// Location to continue at after signing in
        #[arg(long)]
        from: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Inspect or change the active campus and academic year
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },
    /// Read an endpoint scoped to the active campus and year
    Fetch {
        /// Endpoint path, e.g. /students or /finance/reports
        endpoint: String,
    },
    /// Route and permission checks for the signed-in role
    Route {
        #[command(subcommand)]
        action: RouteAction,
    },
    /// Academic year administration
    Years {
        #[command(subcommand)]
        action: YearsAction,
    },
}

#[derive(Subcommand)]
enum ContextAction {
    /// Show available and active campus/year
    Show,
    /// Switch the active campus
    Campus { id: String },
    /// Switch the active academic year
    Year { id: String },
    /// Re-fetch the lists, keeping the current selection when possible
    Refresh,
}

#[derive(Subcommand)]
enum RouteAction {
    /// Show what the guard decides for a location
    Check { location: String },
    /// List action permissions of the signed-in role
    Permissions,
}

#[derive(Subcommand)]
enum YearsAction {
    /// Create a new academic year
    Create {
        /// Label such as 2025-26
        label: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<chrono::NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<chrono::NaiveDate>,
        /// Mark as the institution's current year
        #[arg(long)]
        current: bool,
    },
    /// Mark an existing year as the institution's current year
    SetCurrent { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::new()?.load()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    init_tracing(&config.log_level);

    let (notifier, notifications) = Notifier::channel();
    let printer = tokio::spawn(commands::output::print_notifications(notifications));

    let options = BootstrapOptions {
        persistent: !cli.ephemeral,
    };
    let services = AppServices::bootstrap(config, options, notifier).await?;

    let result = match cli.command {
        Commands::Login {
            email,
            password,
            from,
        } => commands::auth::login(&services, &email, password, from.as_deref()).await,
        Commands::Logout => commands::auth::logout(&services).await,
        Commands::Whoami => commands::auth::whoami(&services),
        Commands::Context { action } => match action {
            ContextAction::Show => commands::context::show(&services).await,
            ContextAction::Campus { id } => commands::context::change_campus(&services, &id).await,
            ContextAction::Year { id } => commands::context::change_year(&services, &id).await,
            ContextAction::Refresh => commands::context::refresh(&services).await,
        },
        Commands::Fetch { endpoint } => commands::fetch::run(&services, &endpoint).await,
        Commands::Route { action } => match action {
            RouteAction::Check { location } => commands::route::check(&services, &location),
            RouteAction::Permissions => commands::route::permissions(&services),
        },
        Commands::Years { action } => match action {
            YearsAction::Create {
                label,
                start,
                end,
                current,
            } => commands::years::create(&services, label, start, end, current).await,
            YearsAction::SetCurrent { id } => commands::years::set_current(&services, &id).await,
        },
    };

    // Dropping the services closes the notification channel
    services.shutdown().await;
    let _ = printer.await;
    result
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
