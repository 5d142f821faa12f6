//! JSON-lines bridge between stdin/stdout and a [`TransportPeer`].
//!
//! Each stdin line is one [`ServerEvent`]; each stdout line is one
//! [`OutboundCommand`]. A wire adapter for the real server sits on the other
//! end of the pipe.
use anyhow::{Context, Result};
use runtime::{OutboundCommand, ServerEvent, TransportPeer};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Pumps stdio through `peer` until either side closes.
pub fn spawn_stdio(peer: TransportPeer) -> (JoinHandle<Result<()>>, JoinHandle<Result<()>>) {
    let TransportPeer { events, commands } = peer;
    let reader = tokio::spawn(pump_events(BufReader::new(tokio::io::stdin()), events));
    let writer = tokio::spawn(pump_commands(commands, tokio::io::stdout()));
    (reader, writer)
}

async fn pump_events<R>(input: R, events: mpsc::Sender<ServerEvent>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read event")? {
        if line.trim().is_empty() {
            continue;
        }
        let event = match serde_json::from_str::<ServerEvent>(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("skipping malformed event {:?}: {}", line, e);
                continue;
            }
        };
        if events.send(event).await.is_err() {
            break;
        }
    }
    tracing::info!("event stream closed");
    Ok(())
}

async fn pump_commands<W>(mut commands: mpsc::Receiver<OutboundCommand>, mut output: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(command) = commands.recv().await {
        let mut line = serde_json::to_string(&command)?;
        line.push('\n');
        output
            .write_all(line.as_bytes())
            .await
            .context("Failed to write command")?;
        output.flush().await?;
    }
    Ok(())
}
