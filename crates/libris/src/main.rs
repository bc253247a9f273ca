use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use libris::cli::commands;
use libris::config::DEFAULT_RECOMMENDATIONS;

#[derive(Parser)]
#[command(name = "libris")]
#[command(about = "Libris - Library Management\nCatalog, circulation and book recommendations from the local data store")]
#[command(version)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List every book with its loan state
  Books,
  /// Show the highest rated books
  Popular {
    /// Number of books to show
    #[arg(short = 'n', long, default_value_t = DEFAULT_RECOMMENDATIONS)]
    count: usize,
  },
  /// Recommend books from a user's borrowing history
  Recommend {
    username: String,
    /// Number of recommendations
    #[arg(short = 'n', long, default_value_t = DEFAULT_RECOMMENDATIONS)]
    count: usize,
  },
  /// Import books from a JSON or YAML file
  Import {
    /// File holding an array of books
    file: PathBuf,
  },
  /// Register a new account
  Register {
    username: String,
    password: String,
    /// Create a staff account instead of a member
    #[arg(long)]
    admin: bool,
  },
  /// Borrow a book for a user
  Borrow {
    username: String,
    book: String,
    /// Loan length in days
    #[arg(long)]
    days: Option<i64>,
  },
  /// Return a borrowed book
  Return { username: String, book: String },
  /// Query server logs
  Logs {
    /// Maximum number of log entries to return
    #[arg(short, long, default_value = "50")]
    limit: usize,
    /// Filter by log level (info, warn, error, success, all)
    #[arg(long, default_value = "all")]
    level: String,
  },
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Books => commands::list_books().await,
    Command::Popular { count } => commands::popular(count).await,
    Command::Recommend { username, count } => commands::recommend(&username, count).await,
    Command::Import { file } => commands::import(&file).await,
    Command::Register { username, password, admin } => {
      commands::register(&username, &password, admin).await
    }
    Command::Borrow { username, book, days } => commands::borrow(&username, &book, days).await,
    Command::Return { username, book } => commands::return_book(&username, &book).await,
    Command::Logs { limit, level } => commands::logs(limit, &level).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  handle(cli.command).await?;
  Ok(())
}
