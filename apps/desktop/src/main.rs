use std::{
    io::{self, BufRead, BufReader, Write},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    Confirmation, DeleteOutcome, FormField, HttpRegistryClient, SubmitOutcome, TokenConsole,
    DEFAULT_SERVER_URL,
};
use shared::domain::{TokenId, TokenRecord};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "token-console", about = "Manage tokens in a token registry")]
struct Args {
    #[arg(long, env = "TOKEN_REGISTRY_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every token.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Create a token. Blank name or symbol submits nothing.
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        symbol: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        supply: String,
    },
    /// Edit a listed token; omitted fields keep their current value.
    Edit {
        token_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        supply: Option<String>,
    },
    /// Delete a token after confirmation.
    Delete {
        token_id: i64,
        #[arg(long)]
        yes: bool,
    },
}

/// Asks a y/N question on a line-oriented reader.
struct PromptConfirmation<R, W> {
    io: Mutex<(R, W)>,
}

impl<R, W> PromptConfirmation<R, W> {
    fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }
}

impl<R, W> Confirmation for PromptConfirmation<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&self, prompt: &str) -> bool {
        let Ok(mut guard) = self.io.lock() else {
            return false;
        };
        let (reader, writer) = &mut *guard;
        if write!(writer, "{prompt} [y/N] ").and_then(|_| writer.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if reader.read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();
    tracing::debug!(server_url = %args.server_url, "token console starting");

    let registry = HttpRegistryClient::new(&args.server_url)?;
    let confirmation: Arc<dyn Confirmation> = match &args.command {
        Command::Delete { yes: true, .. } => Arc::new(|_: &str| true),
        _ => Arc::new(PromptConfirmation::new(BufReader::new(io::stdin()), io::stdout())),
    };
    let mut console = TokenConsole::new(Arc::new(registry), confirmation);
    console
        .mount()
        .await
        .with_context(|| format!("failed to load tokens from {}", args.server_url))?;

    match args.command {
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(console.list().snapshot())?);
                return Ok(());
            }
        }
        Command::Add {
            name,
            symbol,
            supply,
        } => {
            console.update_field(FormField::Name, &name);
            console.update_field(FormField::Symbol, &symbol);
            console.update_field(FormField::InitialSupply, &supply);
            report_submit(console.submit().await?);
        }
        Command::Edit {
            token_id,
            name,
            symbol,
            supply,
        } => {
            console.begin_edit(TokenId(token_id))?;
            let edits = [
                (FormField::Name, name),
                (FormField::Symbol, symbol),
                (FormField::InitialSupply, supply),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    console.update_field(field, &value);
                }
            }
            report_submit(console.submit().await?);
        }
        Command::Delete { token_id, .. } => {
            match console.request_delete(TokenId(token_id)).await? {
                DeleteOutcome::Declined => println!("Delete cancelled."),
                DeleteOutcome::Deleted(token_id) => println!("Deleted token {token_id}."),
            }
        }
    }

    print!("{}", render_table(console.list().snapshot()));
    console.unmount();
    Ok(())
}

fn report_submit(outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Added(token_id) => println!("Added token {token_id}."),
        SubmitOutcome::Updated(token_id) => println!("Updated token {token_id}."),
        SubmitOutcome::Skipped => println!("Nothing submitted."),
    }
}

fn render_table(tokens: &[TokenRecord]) -> String {
    if tokens.is_empty() {
        return "No tokens.\n".to_string();
    }
    let rows: Vec<[String; 4]> = tokens
        .iter()
        .map(|t| {
            [
                t.token_id.to_string(),
                t.name.clone(),
                t.symbol.clone(),
                t.supply_label(),
            ]
        })
        .collect();
    let header = ["ID", "Name", "Symbol", "Supply"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: [&str; 4]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };
    push_row(header);
    for row in &rows {
        push_row([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()]);
    }
    out
}
