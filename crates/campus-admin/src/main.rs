//! campus-admin: command-line front end for the campusdesk admin screens.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use campus_admin::cli::{parse_field, parse_file, render_table};
use campus_admin::AdminScreen;
use campus_client::public::{contact_link, subscribe_newsletter};
use campus_client::{ApiClient, AuthDecision, AuthGate, ClientConfig, HttpGateway, SessionClient};
use campus_core::{
    EntityKind, MemoryGateway, Persistence, RecordId, RemoteGateway, SessionVerifier,
};

#[derive(Parser)]
#[command(name = "campus-admin")]
#[command(author, version, about = "Manage campusdesk content from the command line")]
#[command(propagate_version = true)]
struct Cli {
    /// API base URL (overrides CAMPUS_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of an entity's records
    List {
        /// Entity name, e.g. universities or blog
        entity: String,

        /// Case-insensitive search over the entity's searchable fields
        #[arg(short, long, default_value = "")]
        query: String,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = campus_core::defaults::PAGE_SIZE)]
        page_size: usize,
    },

    /// Show one record as JSON
    Show { entity: String, id: String },

    /// Create a record
    Create {
        entity: String,

        /// Field value as name=value (repeatable; JSON values accepted)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// File for a media field as name=path (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,
    },

    /// Update a record
    Update {
        entity: String,
        id: String,

        #[arg(short, long = "field")]
        fields: Vec<String>,

        #[arg(long = "file")]
        files: Vec<String>,
    },

    /// Delete a record
    Delete { entity: String, id: String },

    /// Run a custom action, e.g. `action consultations mark_completed <id>`
    Action {
        entity: String,
        name: String,
        id: String,
    },

    /// Check whether the configured session cookie is valid
    VerifySession,

    /// Subscribe an email address to the newsletter
    Subscribe { email: String },

    /// Print the chat contact link for the configured number
    Contact,
}

fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // LOG_FORMAT - "json" or "text" (default: "text")
    // LOG_FILE   - path to log file (optional, enables file logging)
    // RUST_LOG   - standard env filter
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campus_admin=info,campus_client=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("campus-admin.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        // Console logs go to stderr so stdout stays clean for output.
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let api = ApiClient::new(config).context("invalid client configuration")?;

    match cli.command {
        Commands::List {
            entity,
            query,
            page,
            page_size,
        } => {
            let mut screen = open_screen(&api, &entity).await?.with_page_size(page_size);
            load(&mut screen).await?;
            screen.set_query(query);
            screen.set_page(page);
            println!("{}", render_table(screen.descriptor(), &screen.view()));
        }
        Commands::Show { entity, id } => {
            let screen = open_screen(&api, &entity).await?;
            let record = screen.gateway().get_by_id(&RecordId::new(id)).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Create {
            entity,
            fields,
            files,
        } => {
            let mut screen = open_screen(&api, &entity).await?;
            screen.open_create();
            fill_form(&mut screen, &fields, &files)?;
            if !screen.submit().await {
                bail!(banner(&screen));
            }
            if let Some(created) = screen.store().records().first() {
                println!("{}", serde_json::to_string_pretty(created)?);
            }
        }
        Commands::Update {
            entity,
            id,
            fields,
            files,
        } => {
            let id = RecordId::new(id);
            let mut screen = open_screen(&api, &entity).await?;
            load(&mut screen).await?;
            if !screen.open_edit(&id) {
                bail!(banner(&screen));
            }
            fill_form(&mut screen, &fields, &files)?;
            if !screen.submit().await {
                bail!(banner(&screen));
            }
            if let Some(updated) = screen.store().get(&id) {
                println!("{}", serde_json::to_string_pretty(updated)?);
            }
        }
        Commands::Delete { entity, id } => {
            let mut screen = open_screen(&api, &entity).await?;
            load(&mut screen).await?;
            if !screen.delete(&RecordId::new(id.clone())).await {
                bail!(banner(&screen));
            }
            println!("Deleted {} {}", screen.descriptor().label, id);
        }
        Commands::Action { entity, name, id } => {
            let id = RecordId::new(id);
            let mut screen = open_screen(&api, &entity).await?;
            load(&mut screen).await?;
            if !screen.run_action(&name, &id).await {
                bail!(banner(&screen));
            }
            if let Some(record) = screen.store().get(&id) {
                println!("{}", serde_json::to_string_pretty(record)?);
            }
        }
        Commands::VerifySession => {
            let valid = SessionClient::new(api.clone()).verify_session().await?;
            println!("{}", if valid { "Session valid" } else { "Session invalid" });
            if !valid {
                bail!("log in at {}", api.config().login_route);
            }
        }
        Commands::Subscribe { email } => {
            subscribe_newsletter(&api, &email).await?;
            println!("Subscribed {}", email.trim());
        }
        Commands::Contact => {
            let number = api
                .config()
                .contact_number
                .as_deref()
                .context("CAMPUS_CONTACT_NUMBER is not set")?;
            match contact_link(number) {
                Some(link) => println!("{}", link),
                None => bail!("contact number '{}' has no digits", number),
            }
        }
    }

    Ok(())
}

/// Build the screen for an entity. Remote entities require a valid session;
/// local-only ones get a fresh in-memory gateway.
async fn open_screen(
    api: &ApiClient,
    entity: &str,
) -> anyhow::Result<AdminScreen<Arc<dyn RemoteGateway>>> {
    let kind: EntityKind = entity.parse()?;
    let descriptor = kind.descriptor();

    let gateway: Arc<dyn RemoteGateway> = match descriptor.persistence {
        Persistence::LocalOnly => Arc::new(MemoryGateway::new(descriptor)),
        Persistence::Remote => {
            let gate = AuthGate::new(
                SessionClient::new(api.clone()),
                api.config().login_route.clone(),
            );
            if let AuthDecision::Redirect(route) = gate.check().await {
                bail!("session is not valid; log in at {}", route);
            }
            Arc::new(HttpGateway::new(api.clone(), descriptor))
        }
    };
    Ok(AdminScreen::new(gateway))
}

async fn load(screen: &mut AdminScreen<Arc<dyn RemoteGateway>>) -> anyhow::Result<()> {
    if !screen.load().await {
        bail!(banner(screen));
    }
    Ok(())
}

fn fill_form(
    screen: &mut AdminScreen<Arc<dyn RemoteGateway>>,
    fields: &[String],
    files: &[String],
) -> anyhow::Result<()> {
    let editor = screen.editor_mut();
    for arg in fields {
        let (name, value) = parse_field(arg)?;
        editor.set_field(&name, value)?;
    }
    for arg in files {
        let (name, file) = parse_file(arg).with_context(|| format!("cannot attach '{}'", arg))?;
        editor.pick_file(&name, file)?;
    }
    Ok(())
}

fn banner(screen: &AdminScreen<Arc<dyn RemoteGateway>>) -> String {
    screen
        .error()
        .unwrap_or("operation failed")
        .to_string()
}
