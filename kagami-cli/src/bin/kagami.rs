use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, command};
use secrecy::ExposeSecret;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use kagami_cli::{
    api_client::ApiClient,
    config::{Credentials, partial_show_secret},
    wizard,
};
use kagami_core::Error;
use kagami_core::api::gateway::AnswerGateway;
use kagami_core::form::Part;

#[derive(Parser)]
#[command(author, version, about = "360-degree evaluation wizard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API server URL
    #[arg(
        long,
        short = 'u',
        default_value = "http://localhost:3000",
        env = "KAGAMI_API_URL",
        global = true
    )]
    api_url: Option<String>,

    /// API key for authentication
    #[arg(long, short = 'k', env = "KAGAMI_API_KEY", global = true)]
    api_key: Option<String>,

    /// Credentials directory
    #[arg(long, short = 'd', default_value = ".kagami", global = true)]
    credentials_dir: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the evaluation wizard
    Evaluate(EvaluateArgs),

    /// Show per-group completion of one step
    Status(StatusArgs),

    /// Print the group structure of a form definition file (offline)
    Preview(PreviewArgs),

    /// Manage API credentials
    Login(LoginArgs),
}

#[derive(Parser)]
struct EvaluateArgs {
    /// Evaluation id
    #[arg(long)]
    evaluation: u64,

    /// Evaluatee id the wizard route is keyed by
    #[arg(long)]
    evaluatee: u64,

    /// Step to start from
    #[arg(long, default_value_t = 1)]
    step: u32,
}

#[derive(Parser)]
struct StatusArgs {
    /// Evaluation id
    #[arg(long)]
    evaluation: u64,

    /// Evaluatee id
    #[arg(long)]
    evaluatee: u64,

    /// Step to inspect
    #[arg(long, default_value_t = 1)]
    step: u32,
}

#[derive(Parser)]
struct PreviewArgs {
    /// Path to a JSON form-definition file (one part)
    #[arg(long)]
    file: PathBuf,
}

#[derive(Parser)]
struct LoginArgs {
    /// API key to store
    #[arg(long)]
    api_key: Option<String>,

    /// API server URL to store
    #[arg(long)]
    api_url: Option<String>,

    /// Credentials directory
    #[arg(long)]
    credentials_dir: Option<String>,

    /// Save the resolved credentials to the credentials file
    #[arg(long)]
    save: bool,

    /// Test the API connection with the resolved credentials
    #[arg(long)]
    test: bool,
}

fn get_api_client(cli: &Cli) -> ApiClient {
    let credentials = Credentials::initialize(
        cli.credentials_dir.clone(),
        cli.api_url.clone(),
        cli.api_key.clone(),
    );
    ApiClient::new(&credentials.api_url, credentials.api_key.expose_secret())
}

async fn handle_evaluate(args: &EvaluateArgs, cli: &Cli) -> Result<(), Error> {
    let client = Arc::new(get_api_client(cli));
    let gateway: Arc<dyn AnswerGateway> = client.clone();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let outcome = wizard::run_wizard(
        client.as_ref(),
        gateway,
        &mut input,
        &mut out,
        args.evaluation,
        args.evaluatee,
        args.step,
    )
    .await
    .map_err(|e| Error::internal(e.to_string()))?;

    if !outcome.finished {
        println!("Progress is saved per group; run the same command to continue.");
    }
    Ok(())
}

async fn handle_status(args: &StatusArgs, cli: &Cli) -> Result<(), Error> {
    let client = Arc::new(get_api_client(cli));
    let gateway: Arc<dyn AnswerGateway> = client.clone();

    let mut out = io::stdout();
    wizard::print_status(
        client.as_ref(),
        gateway,
        &mut out,
        args.evaluation,
        args.evaluatee,
        args.step,
    )
    .await
    .map_err(|e| Error::internal(e.to_string()))
}

fn handle_preview(args: &PreviewArgs) -> Result<(), Error> {
    let content = fs::read_to_string(&args.file)
        .map_err(|e| Error::internal(format!("Failed to read form definition file: {}", e)))?;
    let part = Part::from_json(&content)?;

    println!("Part: {}", part.title);
    let groups = part.question_groups();
    if groups.is_empty() {
        println!("  (no question groups — this part cannot be served as a step)");
        return Ok(());
    }
    for (index, group) in groups.iter().enumerate() {
        println!(
            "  Group {}/{}: {} ({} questions)",
            index + 1,
            groups.len(),
            group.label,
            group.questions.len()
        );
        for question in &group.questions {
            println!("    - [{}] {}", question.kind, question.text);
        }
    }
    Ok(())
}

async fn handle_login(args: &LoginArgs) -> Result<(), Error> {
    let credentials = Credentials::initialize(
        args.credentials_dir.clone(),
        args.api_url.clone(),
        args.api_key.clone(),
    );

    println!("Current API settings:");
    println!("API URL: {}", credentials.api_url);
    if !credentials.api_key.expose_secret().is_empty() {
        println!("API Key: {:#?}", partial_show_secret(&credentials.api_key));
    } else {
        println!("API Key: Not set");
    }

    if args.save {
        credentials
            .save_credentials()
            .map_err(|e| Error::internal(e.to_string()))?;
        println!("Credentials saved.");
    }

    if args.test {
        print!("Testing API connection... ");
        io::stdout()
            .flush()
            .map_err(|e| Error::internal(e.to_string()))?;

        let client = ApiClient::new(&credentials.api_url, credentials.api_key.expose_secret());
        match client.health_check().await {
            Ok(_) => println!("✅ Success"),
            Err(e) => println!("❌ Failed: {}", e),
        }
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<(), Error> {
    match &cli.command {
        Commands::Evaluate(args) => handle_evaluate(args, cli).await,
        Commands::Status(args) => handle_status(args, cli).await,
        Commands::Preview(args) => handle_preview(args),
        Commands::Login(args) => handle_login(args).await,
    }
}

#[tokio::main]
async fn main() {
    // dotenv before parsing so env-backed args see the file
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer())
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
