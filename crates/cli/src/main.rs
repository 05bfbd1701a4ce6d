//! Boardflow CLI
//!
//! Fetches a whiteboard and converts it into a Mermaid decision diagram.

mod config;

use anyhow::{Context, Result};
use boardflow_client::MiroClient;
use boardflow_core::document::{to_markdown, DEFAULT_TITLE};
use boardflow_core::{
    convert, BoardSnapshot, BoardSummary, DecisionTree, RenderOptions, StartStrategy,
};
use clap::{Args, Parser, Subcommand};
use config::BoardConfig;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_RAW_FILE: &str = "raw_miro_data.json";
const DEFAULT_DIAGRAM_FILE: &str = "decision_tree.mmd";

/// Boardflow - whiteboard decision trees as Mermaid flowcharts
#[derive(Parser)]
#[command(name = "boardflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board config file (defaults to ./board-details.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download all items and connectors of the configured board
    Fetch {
        /// Where to save the raw board data
        #[arg(short, long, default_value = DEFAULT_RAW_FILE)]
        output: PathBuf,
    },

    /// Summarize a saved board snapshot
    Inspect {
        /// Raw board data file
        #[arg(short, long, default_value = DEFAULT_RAW_FILE)]
        input: PathBuf,
    },

    /// Convert a saved board snapshot into a diagram
    Convert {
        /// Raw board data file
        #[arg(short, long, default_value = DEFAULT_RAW_FILE)]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch the configured board and convert it in one step
    Extract {
        /// Also save the raw board data here
        #[arg(long)]
        raw: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Mermaid output file
    #[arg(short, long, default_value = DEFAULT_DIAGRAM_FILE)]
    output: PathBuf,

    /// Also write a Markdown document embedding the diagram
    #[arg(long)]
    markdown: Option<PathBuf>,

    /// Also write the decision tree as YAML
    #[arg(long)]
    tree: Option<PathBuf>,

    /// Heading of the Markdown document
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Start-node strategy (no-incoming, topmost)
    #[arg(long, default_value = "no-incoming")]
    strategy: StartStrategy,

    /// Maximum node label length
    #[arg(long, default_value = "50")]
    node_label_max: usize,

    /// Maximum edge label length
    #[arg(long, default_value = "30")]
    edge_label_max: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = BoardConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch { output } => {
            cmd_fetch(&config, output).await?;
        }
        Commands::Inspect { input } => {
            cmd_inspect(input)?;
        }
        Commands::Convert { input, output } => {
            cmd_convert(&config, input, output)?;
        }
        Commands::Extract { raw, output } => {
            cmd_extract(&config, raw, output).await?;
        }
    }

    Ok(())
}

fn client_for(config: &BoardConfig) -> Result<(MiroClient, String)> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        anyhow::anyhow!("No API key: set api_key in the config file or MIRO_API_KEY")
    })?;
    let board_id = config.board_id.clone().ok_or_else(|| {
        anyhow::anyhow!("No board id: set board_id in the config file or MIRO_BOARD_ID")
    })?;

    let mut client = MiroClient::new(api_key);
    if let Some(ref url) = config.api_url {
        client = client.with_base_url(url);
    }
    Ok((client, board_id))
}

async fn download(config: &BoardConfig) -> Result<BoardSnapshot> {
    let (client, board_id) = client_for(config)?;
    client
        .fetch_board(&board_id)
        .await
        .with_context(|| format!("Failed to fetch board {}", board_id))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

fn read_snapshot(path: &Path) -> Result<BoardSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    BoardSnapshot::from_json(&content)
        .with_context(|| format!("Failed to parse board data from: {}", path.display()))
}

async fn cmd_fetch(config: &BoardConfig, output: PathBuf) -> Result<()> {
    let snapshot = download(config).await?;
    write_file(&output, &snapshot.to_json()?)?;

    println!("✓ Raw data saved to {}", output.display());
    println!();
    print_summary(&BoardSummary::from_snapshot(&snapshot));

    Ok(())
}

fn cmd_inspect(input: PathBuf) -> Result<()> {
    let snapshot = read_snapshot(&input)?;
    print_summary(&BoardSummary::from_snapshot(&snapshot));
    Ok(())
}

fn cmd_convert(config: &BoardConfig, input: PathBuf, output: OutputArgs) -> Result<()> {
    let snapshot = read_snapshot(&input)?;
    write_outputs(config, &snapshot, &output)
}

async fn cmd_extract(config: &BoardConfig, raw: Option<PathBuf>, output: OutputArgs) -> Result<()> {
    let snapshot = download(config).await?;

    if let Some(raw) = raw {
        write_file(&raw, &snapshot.to_json()?)?;
        println!("✓ Raw data saved to {}", raw.display());
    }

    write_outputs(config, &snapshot, &output)
}

fn write_outputs(config: &BoardConfig, snapshot: &BoardSnapshot, args: &OutputArgs) -> Result<()> {
    let options = RenderOptions {
        node_label_max: args.node_label_max,
        edge_label_max: args.edge_label_max,
        ..RenderOptions::default()
    };

    let result = convert(snapshot, &config.classifier, args.strategy.resolver(), &options);
    let graph = &result.graph;

    if graph.is_empty() {
        info!("No diagram nodes found; writing an empty diagram");
    }

    write_file(&args.output, &result.diagram.markup)?;
    println!("✓ Wrote diagram: {}", args.output.display());

    if let Some(ref md_path) = args.markdown {
        write_file(md_path, &to_markdown(&args.title, &result.diagram, graph))?;
        println!("✓ Wrote document: {}", md_path.display());
    }

    if let Some(ref tree_path) = args.tree {
        let board_id = snapshot.board_id.clone().or_else(|| config.board_id.clone());
        let tree = DecisionTree::from_graph(graph, board_id).extracted_at(chrono::Utc::now());
        write_file(tree_path, &tree.to_yaml()?)?;
        println!("✓ Wrote decision tree: {}", tree_path.display());
    }

    println!();
    println!("Nodes: {}, Connections: {}", graph.node_count(), graph.edge_count());
    if let Some(start) = graph.start_node() {
        println!("Start: {} ({})", start.label, start.id);
    }
    if result.malformed_items > 0 || result.malformed_connectors > 0 {
        println!(
            "Skipped: {} malformed items, {} malformed connectors",
            result.malformed_items, result.malformed_connectors
        );
    }
    let collisions = result.diagram.ids.collisions();
    if !collisions.is_empty() {
        println!("Identifier collisions ({}):", collisions.len());
        for c in collisions {
            println!("  • {} and {} both map to {}", c.first, c.second, c.canonical);
        }
    }

    Ok(())
}

fn print_summary(summary: &BoardSummary) {
    println!("Summary:");
    println!("Total items: {}", summary.total_items);
    println!("Total connectors: {}", summary.total_connectors);

    println!();
    println!("Item types:");
    for (kind, count) in &summary.item_types {
        println!("  {}: {}", kind, count);
    }

    println!();
    println!("Connector summary:");
    for (i, c) in summary.preview.iter().enumerate() {
        let label = if c.label.is_empty() { "no label" } else { c.label.as_str() };
        println!("  {}: {} -> {} ('{}')", i + 1, c.source, c.target, label);
    }
    if summary.total_connectors > summary.preview.len() {
        println!(
            "  ... and {} more connectors",
            summary.total_connectors - summary.preview.len()
        );
    }

    if !summary.missing_items.is_empty() {
        println!();
        println!(
            "WARNING: {} items referenced in connectors but not found:",
            summary.missing_items.len()
        );
        for id in summary.missing_items.iter().take(BoardSummary::PREVIEW_LEN) {
            println!("  {}", id);
        }
        if summary.missing_items.len() > BoardSummary::PREVIEW_LEN {
            println!(
                "  ... and {} more",
                summary.missing_items.len() - BoardSummary::PREVIEW_LEN
            );
        }
    }
}
