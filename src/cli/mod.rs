use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod auth;
pub mod call;
pub mod http;
pub mod serve;
pub mod tools;

#[derive(Subcommand)]
enum Command {
    /// Serve the calendar tools over MCP on stdio (default)
    Serve {},
    /// Run a single tool and print the result as JSON
    Call {
        /// Tool name, e.g. list_events
        operation: String,
        /// Tool arguments as a JSON object
        args: Option<String>,
    },
    /// Run the REST API server
    Http {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, env = "PORT", default_value = "3000")]
        port: String,
    },
    /// Print the tool definitions as JSON
    Tools {},
    /// Perform OAuth authentication and print a refresh token
    Auth {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    // A missing .env is fine, the variables may already be exported
    let _ = dotenvy::dotenv();

    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve {}) | None => {
            serve::run().await?;
        }
        Some(Command::Call { operation, args }) => {
            call::run(&operation, args.as_deref()).await?;
        }
        Some(Command::Http { host, port }) => {
            http::run(host, port).await?;
        }
        Some(Command::Tools {}) => {
            tools::run()?;
        }
        Some(Command::Auth {}) => {
            auth::run().await?;
        }
    }

    Ok(())
}
