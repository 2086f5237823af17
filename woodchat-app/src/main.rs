use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use woodchat_common::observability::{LogConfig, LogFormat, init_logging};
use woodchat_config::{WoodchatConfig, WoodchatConfigLoader};

mod terminal;
mod tether;

#[derive(Parser, Debug)]
#[command(name = "woodchat", version, about = "Tesa wood-products FAQ assistant")]
struct Cli {
    /// YAML config file; ignored when missing.
    #[arg(long, short, global = true, env = "WOODCHAT_CONFIG", default_value = "woodchat.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Serve the chat API.
    Serve {
        /// Overrides `server.bind`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Open the terminal chat.
    Chat {
        /// Base URL of a running server; local actors are used otherwise.
        #[arg(long)]
        remote: Option<String>,
    },
    /// Answer a single question and exit.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
        #[arg(long)]
        remote: Option<String>,
    },
    /// Ask a running server to reload its FAQ files.
    Reload {
        /// Defaults to `server.base_url`.
        #[arg(long)]
        server: Option<String>,
    },
}

fn log_config(cfg: &WoodchatConfig, cmd: &Cmd) -> LogConfig {
    let mut log = LogConfig::default();
    log.log_dir = cfg.log.dir.clone();
    // The chat screen and `ask` output own the terminal.
    log.emit_stderr = cfg
        .log
        .stderr
        .unwrap_or(matches!(cmd, Cmd::Serve { .. }));
    if let Some(format) = cfg.log.format.as_deref() {
        match format.parse::<LogFormat>() {
            Ok(f) => log.format = f,
            Err(e) => eprintln!("warning: {e}; using text logs"),
        }
    }
    if let Some(filter) = &cfg.log.filter {
        log.default_filter = filter.clone();
    }
    log
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // env wins over the file
    let cfg = WoodchatConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    let log_path = init_logging(log_config(&cfg, &cli.command))?;
    tracing::info!(log = %log_path.display(), command = ?cli.command, "woodchat.start");

    match cli.command {
        Cmd::Serve { bind } => tether::serve(cfg, bind).await?,
        Cmd::Chat { remote } => tether::chat(cfg, remote).await?,
        Cmd::Ask { question, remote } => tether::ask(cfg, question.join(" "), remote).await?,
        Cmd::Reload { server } => {
            if !tether::reload(cfg, server).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_joins_words_and_reload_takes_a_server() {
        let cli = Cli::parse_from(["woodchat", "ask", "what", "is", "mdf", "--remote", "http://x"]);
        match cli.command {
            Cmd::Ask { question, remote } => {
                assert_eq!(question.join(" "), "what is mdf");
                assert_eq!(remote.as_deref(), Some("http://x"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = Cli::parse_from(["woodchat", "reload", "--server", "http://localhost:5000"]);
        assert!(matches!(cli.command, Cmd::Reload { server: Some(_) }));
        assert_eq!(cli.config, PathBuf::from("woodchat.yaml"));
    }

    #[test]
    fn only_serve_logs_to_stderr_by_default() {
        let cfg = WoodchatConfig::default();
        assert!(log_config(&cfg, &Cmd::Serve { bind: None }).emit_stderr);
        assert!(!log_config(&cfg, &Cmd::Chat { remote: None }).emit_stderr);
    }
}
