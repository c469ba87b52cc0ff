//! `glean` — command-line client for the glean insight server.
//!
//! # Usage
//!
//! ```
//! glean ask "How are sales trending this quarter?"
//! glean tables list
//! glean tables import data/regions.csv
//! glean --url http://localhost:8080 history
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;

use glean_core::{
  insight::{ChartType, InsightResult},
  table::{NewTable, TableOrigin},
};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "glean", about = "Ask questions of your data warehouse")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the glean server (default: http://localhost:8080).
  #[arg(long, env = "GLEAN_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Ask a natural-language question.
  Ask {
    /// The question text.
    question: String,
  },
  /// Manage the schema registry.
  Tables {
    #[command(subcommand)]
    command: TablesCommand,
  },
  /// Show past questions and answers, newest first.
  History,
  /// Print the exact context block sent with every question.
  Context,
  /// Download the current answer's chart data as CSV.
  Export,
}

#[derive(Subcommand, Debug)]
enum TablesCommand {
  /// List registered tables.
  List,
  /// Register a table by hand.
  Add {
    name:     String,
    database: String,
    /// Column description, one `- col (TYPE)` line per column.
    schema:   String,
  },
  /// Remove a table by id.
  Rm { id: uuid::Uuid },
  /// Infer a table definition from a local file's header row.
  Import { path: std::path::PathBuf },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Ask { question } => {
      let reply = client.ask(&question).await?;
      print_result(&reply.result);
    }
    Command::Tables { command } => match command {
      TablesCommand::List => {
        for table in client.list_tables().await? {
          let tag = match &table.origin {
            TableOrigin::Manual => "",
            TableOrigin::Imported { .. } => " (imported)",
          };
          println!("{}  {}.{}{}", table.id, table.database, table.name, tag);
        }
      }
      TablesCommand::Add { name, database, schema } => {
        let table = client
          .add_table(&NewTable {
            name,
            database,
            schema_text: schema,
            origin: TableOrigin::Manual,
          })
          .await?;
        println!("added {} ({})", table.name, table.id);
      }
      TablesCommand::Rm { id } => {
        client.remove_table(id).await?;
        println!("removed {id}");
      }
      TablesCommand::Import { path } => {
        let contents = std::fs::read_to_string(&path)
          .with_context(|| format!("reading {}", path.display()))?;
        let file_name = path
          .file_name()
          .map(|n| n.to_string_lossy().into_owned())
          .unwrap_or_default();
        let table = client.import_table(&file_name, &contents).await?;
        println!("imported {} ({})", table.name, table.id);
      }
    },
    Command::History => {
      for item in client.history().await? {
        println!("{}  {}  {}", item.id, item.timestamp.format("%Y-%m-%d %H:%M"), item.query);
      }
    }
    Command::Context => {
      println!("{}", client.context().await?);
    }
    Command::Export => {
      print!("{}", client.export_csv().await?);
    }
  }

  Ok(())
}

/// Pretty-print one answer: the text, then any chart data as aligned rows.
fn print_result(result: &InsightResult) {
  println!("{}", result.answer);

  if let Some(data) = result.data.as_deref().filter(|d| !d.is_empty()) {
    println!();
    if result.chart_type != ChartType::None {
      println!("[{} chart]", result.chart_type);
    }
    let width = data.iter().map(|p| p.label.len()).max().unwrap_or(0);
    for point in data {
      println!("  {:width$}  {}", point.label, point.value);
    }
  }

  if let Some(meta) = &result.metadata {
    let mut parts = Vec::new();
    if let Some(total) = meta.total {
      parts.push(format!("total {total}"));
    }
    if let Some(delta) = &meta.delta {
      parts.push(format!("delta {delta}"));
    }
    if let Some(trend) = meta.trend {
      parts.push(format!("trend {trend}"));
    }
    if !parts.is_empty() {
      println!("\n({})", parts.join(", "));
    }
  }

  if let Some(tables) = result.tables_used.as_deref().filter(|t| !t.is_empty()) {
    println!("\ntables: {}", tables.join(", "));
  }
}
