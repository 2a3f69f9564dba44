//! `cylinder-worker`: terminal front end for the worker screens.
//!
//! Usage: `cylinder-worker <dispatch|receive|refill|complete-refill>`.
//! Configuration comes from the environment (see `ClientConfig`).

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use cylinder_client::console::parse_workflow;
use cylinder_client::{AppSession, Area, ClientConfig, Console, HttpBackend};
use cylinder_receipt::FileDocumentGenerator;
use cylinder_scanning::ChannelDecodeSource;
use cylinder_workflows::{NotificationLog, ScreenServices, WorkflowConfig, WorkflowScreen};

#[tokio::main]
async fn main() -> Result<()> {
    cylinder_observability::init();

    let workflow = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: cylinder-worker <dispatch|receive|refill|complete-refill>"))?;
    let kind = parse_workflow(&workflow).map_err(|e| anyhow!(e))?;
    let config = ClientConfig::from_env().context("invalid configuration")?;

    let session = AppSession::new();
    let Some(identity) = config.identity.clone() else {
        bail!("not signed in: set CYLINDER_AUTH_TOKEN");
    };
    if identity.role.area() == Area::Admin {
        tracing::info!(role = %identity.role, "admin account using the worker console");
    }
    session.sign_in(identity);

    tracing::info!(api_url = %config.api_url, workflow = %kind, "starting worker console");
    let notes = Arc::new(NotificationLog::new());
    let services = ScreenServices {
        backend: Arc::new(HttpBackend::new(config.api_url.clone(), session.clone())),
        documents: Arc::new(FileDocumentGenerator::new(&config.receipt_dir, config.receipt_format)),
        notifier: notes.clone(),
    };
    let (source, scanner) = ChannelDecodeSource::new();
    let screen = WorkflowScreen::new(WorkflowConfig::for_kind(kind), services, source);
    let mut console = Console::new(screen, scanner, notes);

    let mut stdout = tokio::io::stdout();
    print(&mut stdout, &console.start().await).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let prompt = if console.is_scanning() { "scan> " } else { "> " };
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        let reply = console.handle(&line).await;
        print(&mut stdout, &reply.lines).await?;
        if reply.quit {
            break;
        }
    }

    session.clear();
    Ok(())
}

async fn print(stdout: &mut tokio::io::Stdout, lines: &[String]) -> Result<()> {
    for line in lines {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;
    Ok(())
}
