//! Utility functions for CLI operations.

use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use safeair_core::ApiClient;

use crate::config::{Config, resolve_base_url};
use crate::style;

/// Build an API client from the flag, environment, or config.
pub fn require_client(base_url: Option<String>, config: &Config) -> Result<ApiClient> {
    let url = resolve_base_url(base_url, config).ok_or_else(|| {
        anyhow!(
            "No backend configured. Use --base-url <URL> or set SAFEAIR_LIVE_URL.\n\
             To save it permanently: safeair config set base-url http://localhost:8080"
        )
    })?;
    ApiClient::new(&url).with_context(|| format!("Invalid backend URL: {}", url))
}

/// Whether stdin and stderr are both attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Await `request`, showing a spinner on interactive terminals.
pub async fn with_spinner<T, F>(what: &str, quiet: bool, request: F) -> Result<T>
where
    F: Future<Output = safeair_core::Result<T>>,
{
    let spinner = if !quiet && io::stderr().is_terminal() {
        Some(style::fetching_spinner(what))
    } else {
        None
    };

    let result = request.await;

    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    result.map_err(|e| {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let hint = match &e {
            safeair_core::Error::NotReachable { .. } => {
                "\n\nPossible causes:\n  \
                 - The backend may be down\n  \
                 - The base URL may be wrong -- check 'safeair config get base-url'"
            }
            _ => "",
        };
        anyhow!("Failed to fetch {}: {}{}\nTime: {}", what, e, hint, timestamp)
    })
}

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Append output to file, or write to stdout.
pub fn append_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
