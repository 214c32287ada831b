use std::io;
use std::sync::Arc;

use docchat::render::RenderOptions;
use docchat::{logging, AuthContext, EnvConfig};
use docchat_cli::app::{App, PASSWORD_PROMPT};
use docchat_cli::services::Backend;
use docchat_cli::terminal::EchoGuard;
use token_store::TokenStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const DEFAULT_WIDTH: usize = 100;

#[tokio::main]
async fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    if let Err(error) = logging::init(&config) {
        eprintln!("docchat: logging disabled: {error}");
    }

    let backend = Backend::from_config(&config).map_err(io::Error::other)?;
    let store = match &config.token_path {
        Some(path) => TokenStore::new(path.clone()),
        None => TokenStore::at_default_location().map_err(io::Error::other)?,
    };
    let auth = AuthContext::new(Arc::clone(&backend.accounts), store);
    let mut app = App::new(backend, auth, RenderOptions::local(terminal_width()));

    let mut stdout = tokio::io::stdout();
    write_lines(&mut stdout, &app.start().await).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !app.should_exit() {
        stdout.write_all(app.prompt().as_bytes()).await?;
        stdout.flush().await?;

        let echo_guard = if app.prompt() == PASSWORD_PROMPT {
            match EchoGuard::stdin() {
                Ok(guard) => Some(guard),
                Err(error) => {
                    tracing::warn!(%error, "could not hide password input");
                    None
                }
            }
        } else {
            None
        };
        let line = lines.next_line().await;
        drop(echo_guard);
        let Some(line) = line? else {
            break;
        };
        write_lines(&mut stdout, &app.on_line(&line).await).await?;
    }

    Ok(())
}

async fn write_lines(stdout: &mut tokio::io::Stdout, lines: &[String]) -> io::Result<()> {
    for line in lines {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await
}

fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(DEFAULT_WIDTH)
}
