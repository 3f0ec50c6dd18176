use clap::{Parser, Subcommand};
use hc_agent::{AgentConfig, AgentEnv, ChatMessage};
use hc_core::config::core_config_from_env_values;
use hc_core::{Importer, Services};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "hc")]
#[command(about = "Healthcare records and clinical assistant CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Import a FHIR Bundle JSON file, or every *.json in a directory
    Import {
        /// Bundle file or directory
        path: PathBuf,
    },
    /// Check that the REST API is reachable
    Health,
    /// List the assistant's tools
    Tools,
    /// Run one assistant tool directly
    Tool {
        /// Tool name, e.g. get_patient_info
        name: String,
        /// Tool argument (repeatable)
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
    },
    /// Ask the clinical assistant a single question
    Ask {
        /// The question
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Chat with the clinical assistant (empty line or "exit" to quit)
    Chat,
}

#[tokio::main]
async fn main() -> CliResult {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hc=info".parse()?)
                .add_directive("hc_core=info".parse()?)
                .add_directive("hc_agent=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Migrate) => {
            services().await?;
            println!("Database schema is up to date.");
        }
        Some(Commands::Import { path }) => {
            let importer = Importer::new(services().await?);
            match importer.import_path(&path).await {
                Ok(summary) => println!("Imported {}: {}", path.display(), summary),
                Err(e) => eprintln!("Error importing {}: {}", path.display(), e),
            }
        }
        Some(Commands::Health) => {
            let cfg = agent_config()?;
            let client = hc_agent::api_client(&cfg)?;
            match client.health().await {
                Ok(health) => println!(
                    "API at {} is {} ({})",
                    client.base_url(),
                    health.status,
                    health.api
                ),
                Err(e) => eprintln!("API at {} is unreachable: {}", client.base_url(), e),
            }
        }
        Some(Commands::Tools) => {
            let toolbox = hc_agent::Toolbox::new(hc_agent::api_client(&agent_config()?)?);
            for spec in toolbox.specs() {
                println!("{:<32} {}", spec.name, spec.description);
            }
        }
        Some(Commands::Tool { name, args }) => {
            let toolbox = hc_agent::Toolbox::new(hc_agent::api_client(&agent_config()?)?);
            let arguments = parse_tool_args(&args)?;
            println!("{}", toolbox.call(&name, &arguments).await);
        }
        Some(Commands::Ask { question }) => {
            let agent = hc_agent::build_agent(&agent_config()?).await?;
            match agent.ask(&question.join(" ")).await {
                Ok(answer) => println!("{}", answer),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        Some(Commands::Chat) => chat().await?,
        None => {
            println!("Use 'hc --help' for commands");
        }
    }

    Ok(())
}

/// Open (and migrate) the configured database.
async fn services() -> Result<Services, Box<dyn std::error::Error>> {
    let cfg = core_config_from_env_values(
        std::env::var("DATABASE_URL").ok(),
        std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
    )?;
    Ok(Services::new(hc_core::db::connect(&cfg).await?))
}

fn agent_config() -> Result<AgentConfig, hc_agent::AgentError> {
    AgentConfig::from_env_values(AgentEnv::from_env())
}

/// `KEY=VALUE` pairs to a JSON object; integer values stay numbers.
fn parse_tool_args(args: &[String]) -> Result<Value, String> {
    let mut map = Map::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("tool arguments must look like KEY=VALUE, got {arg:?}"))?;
        let value = value.trim();
        let value = match value.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(value.to_string()),
        };
        map.insert(key.trim().to_string(), value);
    }
    Ok(Value::Object(map))
}

async fn chat() -> CliResult {
    let agent = hc_agent::build_agent(&agent_config()?).await?;
    let mut history: Vec<ChatMessage> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Clinical assistant ready. Empty line or \"exit\" to quit.");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() || question.eq_ignore_ascii_case("exit") {
            break;
        }

        match agent.respond(&mut history, question).await {
            Ok(answer) => println!("\n{}\n", answer),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
    Ok(())
}
