//! CLI — stdin/stdout REPL driving the inbox pipeline.

use std::fmt::Write as _;
use std::path::PathBuf;

use futures::{StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::TransportMode;
use crate::error::{InboxError, Result};
use crate::inbox::{ImportFile, InboxItem, InboxPipeline};
use crate::ledger::{NetWorthPoint, SummaryResponse};

const HELP: &str = "\
Commands:
  list                       show the staged inbox
  import <path>              stage a statement file
  set <tempId> <category>    change an item's category
  commit                     move the inbox into the ledger
  mode <local|remote>        switch transport
  summary <YYYY-MM>          monthly spending summary
  networth                   twelve-month net-worth curve
  help                       this text
  quit                       exit";

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Import(PathBuf),
    SetCategory { temp_id: String, category: String },
    Commit,
    Mode(TransportMode),
    Summary(String),
    NetWorth,
    Help,
    Quit,
}

impl Command {
    /// Parse a trimmed, non-empty line. Errors are user-facing messages.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "list" | "ls" => Ok(Self::List),
            "import" if !rest.is_empty() => Ok(Self::Import(PathBuf::from(rest))),
            "import" => Err("usage: import <path>".to_string()),
            "set" => {
                let (temp_id, category) = rest
                    .split_once(char::is_whitespace)
                    .map(|(id, cat)| (id.trim(), cat.trim()))
                    .filter(|(_, cat)| !cat.is_empty())
                    .ok_or_else(|| "usage: set <tempId> <category>".to_string())?;
                Ok(Self::SetCategory {
                    temp_id: temp_id.to_string(),
                    category: category.to_string(),
                })
            }
            "commit" => Ok(Self::Commit),
            "mode" => rest
                .parse()
                .map(Self::Mode)
                .map_err(|_| "usage: mode <local|remote>".to_string()),
            "summary" if !rest.is_empty() => Ok(Self::Summary(rest.to_string())),
            "summary" => Err("usage: summary <YYYY-MM>".to_string()),
            "networth" => Ok(Self::NetWorth),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "/quit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}

/// Run one command against the pipeline and render the reply.
pub async fn execute(pipeline: &InboxPipeline, command: Command) -> Result<String> {
    let reply = match command {
        Command::List => render_items(&pipeline.get_inbox().await?),
        Command::Import(path) => {
            let file = ImportFile::read(&path).await.map_err(InboxError::from)?;
            render_items(&pipeline.import_batch(file).await?)
        }
        Command::SetCategory { temp_id, category } => {
            pipeline.set_category(&temp_id, &category).await?;
            format!("{temp_id} → {category}")
        }
        Command::Commit => {
            let result = pipeline.commit_batch().await?;
            format!("Committed {} item(s)", result.committed_count)
        }
        Command::Mode(mode) => {
            pipeline.switch_transport(mode).await;
            format!("Transport: {mode}")
        }
        Command::Summary(month) => render_summary(&pipeline.get_summary(&month).await?),
        Command::NetWorth => render_curve(&pipeline.get_networth_curve().await?),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(reply)
}

/// Read commands from stdin until EOF or `quit`.
pub async fn run(pipeline: &InboxPipeline) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });

    let mut lines = Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }));

    eprint!("> ");
    while let Some(line) = lines.next().await {
        if line.trim().is_empty() {
            eprint!("> ");
            continue;
        }
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => match execute(pipeline, command).await {
                Ok(reply) => println!("{reply}"),
                Err(e) => eprintln!("error: {e}"),
            },
            Err(message) => eprintln!("{message}"),
        }
        eprint!("> ");
    }
}

fn render_items(items: &[InboxItem]) -> String {
    if items.is_empty() {
        return "Inbox is empty".to_string();
    }
    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{:>4}  {}  {:>10}  {:<6}  {:<16}  {}",
            item.temp_id,
            item.date,
            item.amount,
            item.flow.as_str(),
            item.suggested_category.as_deref().unwrap_or("-"),
            item.description,
        );
    }
    let _ = write!(out, "{} item(s)", items.len());
    out
}

fn render_summary(summary: &SummaryResponse) -> String {
    let mut out = format!("{}: spent {}\n", summary.month, summary.total_spend);
    for row in &summary.by_category {
        let _ = writeln!(out, "  {:<16} {:>10}", row.category, row.amount);
    }
    for budget in &summary.budgets {
        let _ = writeln!(
            out,
            "  budget {:<16} {:>10} / {}",
            budget.category, budget.spent, budget.cap
        );
    }
    out.trim_end().to_string()
}

fn render_curve(points: &[NetWorthPoint]) -> String {
    points
        .iter()
        .map(|p| {
            format!(
                "{}  net {:>12}  cash {:>12}  invested {:>12}  debt {:>12}",
                p.date, p.net_worth, p.cash, p.invested, p.debt
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InboxConfig;
    use crate::error::Error;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("list"), Ok(Command::List));
        assert_eq!(
            Command::parse("import ~/Downloads/jan 2025.csv"),
            Ok(Command::Import(PathBuf::from("~/Downloads/jan 2025.csv")))
        );
        assert_eq!(
            Command::parse("set 3  Eating Out "),
            Ok(Command::SetCategory {
                temp_id: "3".into(),
                category: "Eating Out".into()
            })
        );
        assert_eq!(Command::parse("COMMIT"), Ok(Command::Commit));
        assert_eq!(
            Command::parse("mode remote"),
            Ok(Command::Mode(TransportMode::Remote))
        );
        assert_eq!(
            Command::parse("summary 2025-01"),
            Ok(Command::Summary("2025-01".into()))
        );
        assert_eq!(Command::parse("quit"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_incomplete_commands() {
        assert!(Command::parse("import").is_err());
        assert!(Command::parse("set 3").is_err());
        assert!(Command::parse("mode satellite").is_err());
        assert!(Command::parse("summary").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[tokio::test]
    async fn execute_runs_a_session() {
        let pipeline = InboxPipeline::disconnected(&InboxConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jan.csv");
        std::fs::write(&path, "date,description,amount\n").unwrap();

        let listing = execute(&pipeline, Command::Import(path)).await.unwrap();
        assert!(listing.contains("jan.csv Row 1"));
        assert!(listing.ends_with("1 item(s)"));

        let reply = execute(
            &pipeline,
            Command::SetCategory {
                temp_id: "1".into(),
                category: "Dining".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(reply, "1 → Dining");

        let reply = execute(&pipeline, Command::Commit).await.unwrap();
        assert_eq!(reply, "Committed 1 item(s)");
        assert_eq!(
            execute(&pipeline, Command::List).await.unwrap(),
            "Inbox is empty"
        );
    }

    #[tokio::test]
    async fn import_of_missing_file_is_io_error() {
        let pipeline = InboxPipeline::disconnected(&InboxConfig::default());
        let err = execute(&pipeline, Command::Import(PathBuf::from("/nonexistent/x.csv")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inbox(InboxError::Io(_))));
    }
}
