use clap::{Args, Parser, Subcommand};
use clipsage::llm::{GenAiClient, HistoryAi, DEFAULT_MODEL};
use clipsage::logger::initialize_logger;
use clipsage::storage::FileStore;
use clipsage::store::{HistoryStore, StoreConfig};
use clipsage::watch::{ArboardSink, ArboardSource, ClipboardSink, ClipboardWatcher, WatcherConfig};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::signal;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[arg(long, help = "Directory holding the persisted history")]
    data_dir: Option<PathBuf>,
    #[arg(short = 'n', long, default_value_t = 10, help = "Maximum number of history items")]
    limit: usize,
    #[arg(long, help = "Keep the history in memory only")]
    no_persist: bool,
    #[command(subcommand)]
    cmd: SubCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum SubCommands {
    Watch(WatchArgs),
    Add { text: String },
    List(ListArgs),
    Copy { id: String },
    Remove { id: String },
    Clear,
    Tag { id: String, tag: String },
    Untag { id: String, tag: String },
    Categorize { id: String, category: String },
    Favorite { id: String },
    Export(ExportArgs),
    Import { file: PathBuf },
    Analyze(AnalyzeArgs),
    Summarize(AiArgs),
    Find(FindArgs),
}

#[derive(Args, Debug, Clone)]
struct WatchArgs {
    #[arg(short = 'i', long, default_value_t = 1000)]
    interval_ms: u64,
}

#[derive(Args, Debug, Clone)]
struct ListArgs {
    #[arg(short = 'q', long, help = "Case-insensitive substring match on text or tags")]
    query: Option<String>,
    #[arg(short = 'c', long, help = "Exact category match")]
    category: Option<String>,
    #[arg(long, help = "Print the matching items as JSON")]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    #[arg(short = 'o', long, help = "Output path; defaults to clipboard-history-<timestamp>.json")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct AiArgs {
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,
    #[arg(short = 'M', long, default_value = DEFAULT_MODEL)]
    model: String,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    prompt: String,
    #[command(flatten)]
    ai: AiArgs,
}

#[derive(Args, Debug, Clone)]
struct FindArgs {
    query: String,
    #[command(flatten)]
    ai: AiArgs,
}

#[tokio::main]
async fn main() {
    let cli_args = CliArgs::parse();
    initialize_logger();

    let data_dir = cli_args
        .data_dir
        .clone()
        .unwrap_or_else(FileStore::default_dir);
    let config = StoreConfig {
        limit: cli_args.limit,
        persist: !cli_args.no_persist,
    };
    let mut store = HistoryStore::new(config, Box::new(FileStore::new(data_dir)));

    match cli_args.cmd {
        SubCommands::Watch(args) => {
            let source = match ArboardSource::new() {
                Ok(source) => source,
                Err(e) => {
                    error!("Cannot start watching: {}", e);
                    return;
                }
            };

            info!("Starting clipboard watcher");
            let shared = Arc::new(Mutex::new(store));
            let mut watcher = ClipboardWatcher::new(
                WatcherConfig {
                    interval_ms: args.interval_ms,
                },
                shared,
            );
            watcher.start_listening(source);

            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to wait for interrupt: {}", e);
            }
            watcher.stop_listening();
            info!("Clipboard watcher has stopped.");
        }
        SubCommands::Add { text } => {
            let item = store.add(&text);
            println!("{}", item.id);
        }
        SubCommands::List(args) => {
            let items = store.filtered(args.query.as_deref(), args.category.as_deref());
            if args.json {
                match serde_json::to_string_pretty(&items) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Failed to render history: {}", e),
                }
                return;
            }
            for item in items {
                let favorite = if item.favorite { " *" } else { "" };
                let category = item
                    .category
                    .as_deref()
                    .map(|c| format!(" [{}]", c))
                    .unwrap_or_default();
                let tags = if item.tags.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", item.tags.join(", "))
                };
                println!("{}{}{}{}  {}", item.id, favorite, category, tags, item.text);
            }
        }
        SubCommands::Copy { id } => {
            let Some(item) = store.get(&id) else {
                error!("No history item with id {}", id);
                return;
            };
            let mut sink = match ArboardSink::new() {
                Ok(sink) => sink,
                Err(e) => {
                    error!("Cannot reach the clipboard: {}", e);
                    return;
                }
            };
            if let Err(e) = sink.write_text(&item.text).await {
                error!("Failed to copy item: {}", e);
            }
        }
        SubCommands::Remove { id } => store.remove(&id),
        SubCommands::Clear => store.clear(),
        SubCommands::Tag { id, tag } => store.add_tag(&id, &tag),
        SubCommands::Untag { id, tag } => store.remove_tag(&id, &tag),
        SubCommands::Categorize { id, category } => store.set_category(&id, &category),
        SubCommands::Favorite { id } => store.toggle_favorite(&id),
        SubCommands::Export(args) => {
            let path = args
                .output
                .unwrap_or_else(|| PathBuf::from(HistoryStore::export_file_name()));
            match store.export_history() {
                Ok(json) => {
                    if let Err(e) = std::fs::write(&path, json) {
                        error!("Failed to write {}: {}", path.display(), e);
                    } else {
                        println!("{}", path.display());
                    }
                }
                Err(e) => error!("Failed to export history: {}", e),
            }
        }
        SubCommands::Import { file } => match std::fs::read_to_string(&file) {
            Ok(contents) => {
                store.import_history(&contents);
                store.flush();
            }
            Err(e) => error!("Failed to read {}: {}", file.display(), e),
        },
        SubCommands::Analyze(args) => {
            if let Some(mut ai) = build_ai(args.ai) {
                run_ai(ai.analyze(&store, &args.prompt).await.map(|r| r.output));
            }
        }
        SubCommands::Summarize(args) => {
            if let Some(mut ai) = build_ai(args) {
                run_ai(ai.summarize(&store).await.map(|r| r.output));
            }
        }
        SubCommands::Find(args) => {
            if let Some(mut ai) = build_ai(args.ai) {
                run_ai(ai.find_related(&store, &args.query).await.map(|r| r.output));
            }
        }
    }
}

fn build_ai(args: AiArgs) -> Option<HistoryAi<GenAiClient>> {
    match GenAiClient::new(args.api_key, args.model) {
        Ok(client) => Some(HistoryAi::new(client)),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

fn run_ai(result: Result<String, clipsage::HistoryError>) {
    match result {
        Ok(output) => println!("{}", output),
        Err(e) => error!("{}", e),
    }
}
