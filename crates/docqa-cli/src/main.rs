//! docqa CLI - Ask questions about a document from the command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use docqa_core::{
    Answer, DocQaConfig, DocumentChunk, ResponseMode, WebSearchProvider, WebStatus,
};
use docqa_providers::{ChatCompletions, TavilySearch};
use docqa_query::{web, IndexedCorpus};
use docqa_session::Session;

/// Questions generated by `/questions` when no count is given.
const DEFAULT_QUESTION_COUNT: usize = 3;

/// docqa - Conversational Q&A over a document
#[derive(Parser)]
#[command(name = "docqa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/docqa/config.toml, then ./docqa.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// JSON file with an array of document chunks
        corpus: PathBuf,

        /// Question to answer
        query: String,

        /// Response mode (concise or detailed)
        #[arg(short, long, default_value = "detailed")]
        mode: String,
    },

    /// Start an interactive conversation
    Chat {
        /// JSON file with an array of document chunks
        corpus: Option<PathBuf>,

        /// Response mode (concise or detailed)
        #[arg(short, long, default_value = "detailed")]
        mode: String,
    },

    /// Check whether a question would trigger a web search
    Trigger {
        /// Question to check
        query: String,
    },

    /// Print the effective configuration
    Config,
}

/// One line of input in the interactive chat.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Ask(String),
    Mode(Option<String>),
    Clear,
    Reset,
    Summary,
    Questions(usize),
    Quit,
    Unknown(String),
    Empty,
}

fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Ask(line.to_string());
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    match command {
        "/mode" => ChatInput::Mode(arg.map(str::to_string)),
        "/clear" => ChatInput::Clear,
        "/reset" => ChatInput::Reset,
        "/summary" => ChatInput::Summary,
        "/questions" => ChatInput::Questions(
            arg.and_then(|a| a.parse().ok())
                .unwrap_or(DEFAULT_QUESTION_COUNT),
        ),
        "/quit" | "/exit" => ChatInput::Quit,
        other => ChatInput::Unknown(other.to_string()),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ask {
            corpus,
            query,
            mode,
        } => {
            let mut session = build_session(config)?;
            session.load_corpus(load_corpus(&corpus)?);
            session.set_mode(ResponseMode::from_name(&mode));

            match session.ask(&query).await {
                Ok(answer) => print_answer(&answer),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Chat { corpus, mode } => {
            let mut session = build_session(config)?;
            if let Some(path) = corpus {
                session.load_corpus(load_corpus(&path)?);
            }
            session.set_mode(ResponseMode::from_name(&mode));
            chat(&mut session).await?;
        }
        Commands::Trigger { query } => {
            if web::should_trigger(&query) {
                println!("Web search: yes");
            } else {
                println!("Web search: no");
            }
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&redact_keys(config))?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DocQaConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => DocQaConfig::load(path)?,
        None => DocQaConfig::load_default()?,
    };
    Ok(config.with_env_keys())
}

/// Read a JSON array of chunks and index it. No dense index is attached.
fn load_corpus(path: &Path) -> Result<IndexedCorpus, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let chunks: Vec<DocumentChunk> = serde_json::from_str(&content)?;
    info!("Loaded {} chunks from {}", chunks.len(), path.display());
    Ok(IndexedCorpus::new(chunks, None))
}

fn build_session(config: DocQaConfig) -> Result<Session, Box<dyn std::error::Error>> {
    let generator = Arc::new(ChatCompletions::new(&config.generation)?);

    let web: Option<Arc<dyn WebSearchProvider>> =
        if config.web.enabled && !config.web.api_key.is_empty() {
            Some(Arc::new(TavilySearch::new(&config.web)?))
        } else {
            info!("Web search disabled");
            None
        };

    Ok(Session::new(config, generator, web))
}

fn redact_keys(mut config: DocQaConfig) -> DocQaConfig {
    for key in [&mut config.generation.api_key, &mut config.web.api_key] {
        if !key.is_empty() {
            *key = "********".to_string();
        }
    }
    config
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.text);
    if answer.cached {
        eprintln!("(cached)");
    }
    if let WebStatus::Failed(reason) = &answer.web {
        eprintln!("(web search failed: {})", reason);
    }
}

async fn chat(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!(
        "Mode: {}. Commands: /mode, /clear, /reset, /summary, /questions [n], /quit",
        session.mode()
    );

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Ask(query) => match session.ask(&query).await {
                Ok(answer) => print_answer(&answer),
                Err(e) => eprintln!("Error: {}", e),
            },
            ChatInput::Mode(None) => {
                println!("Current mode: {}", session.mode());
                for mode in ResponseMode::ALL {
                    let settings = session.config().modes.for_mode(mode);
                    println!("  {} - {}", mode, settings.description);
                }
            }
            ChatInput::Mode(Some(name)) => {
                session.set_mode(ResponseMode::from_name(&name));
                println!("Mode: {}", session.mode());
            }
            ChatInput::Clear => {
                session.clear_history();
                println!("Chat history cleared.");
            }
            ChatInput::Reset => {
                session.reset_corpus();
                println!("Knowledge base reset.");
            }
            ChatInput::Summary => match session.summarize().await {
                Ok(summary) => println!("{}", summary),
                Err(e) => eprintln!("Error: {}", e),
            },
            ChatInput::Questions(count) => match session.suggest_questions(count).await {
                Ok(questions) => {
                    for (idx, question) in questions.iter().enumerate() {
                        println!("{}. {}", idx + 1, question);
                    }
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            ChatInput::Unknown(command) => eprintln!("Unknown command: {}", command),
        }
    }

    Ok(())
}
