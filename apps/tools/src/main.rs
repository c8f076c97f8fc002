use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{TokenId, TokenRecord};
use storage::Storage;

/// Tokens inserted by `seed` when the store is empty.
const SEED_TOKENS: [(&str, &str, u64); 3] = [
    ("Gold", "GLD", 1000),
    ("Silver", "SLV", 25_000),
    ("Copper", "CPR", 0),
];

#[derive(Parser, Debug)]
#[command(about = "Operate on the token registry database directly")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/registry.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    ListTokens,
    ShowToken {
        token_id: i64,
    },
    CreateToken {
        name: String,
        symbol: String,
        #[arg(default_value_t = 0)]
        supply: u64,
    },
    DeleteToken {
        token_id: i64,
    },
    /// Insert a few demo tokens unless the store already has some.
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::ListTokens => {
            for token in storage.list_tokens().await? {
                println!("{}", describe(&token));
            }
        }
        Command::ShowToken { token_id } => match storage.get_token(TokenId(token_id)).await? {
            Some(token) => println!("{}", describe(&token)),
            None => bail!("token {token_id} not found"),
        },
        Command::CreateToken {
            name,
            symbol,
            supply,
        } => {
            if name.trim().is_empty() {
                bail!("token name must not be empty");
            }
            let token_id = storage.create_token(&name, &symbol, supply).await?;
            println!("created token_id={}", token_id.0);
        }
        Command::DeleteToken { token_id } => {
            if !storage.delete_token(TokenId(token_id)).await? {
                bail!("token {token_id} not found");
            }
            println!("deleted token_id={token_id}");
        }
        Command::Seed => {
            let created = seed(&storage).await?;
            println!("seeded {created} token(s)");
        }
    }

    Ok(())
}

async fn seed(storage: &Storage) -> Result<usize> {
    if !storage.list_tokens().await?.is_empty() {
        return Ok(0);
    }
    for (name, symbol, supply) in SEED_TOKENS {
        storage.create_token(name, symbol, supply).await?;
    }
    Ok(SEED_TOKENS.len())
}

fn describe(token: &TokenRecord) -> String {
    format!(
        "token_id={} name={} symbol={} supply={}",
        token.token_id.0,
        token.name,
        token.symbol,
        token.supply_label()
    )
}
