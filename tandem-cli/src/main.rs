use anyhow::{Context, Result, bail};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tandem::RoomCode;
use tandem::model::IceServerConfig;
use tandem::peer::{
    ConnectionState, DEFAULT_STUN, PeerConfig, PeerError, Session, SessionHandle, SessionNotice,
    TransferDirection, TransferStatus,
};
use tandem::relay::{self, DEFAULT_BIND, RelayConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tandem", version, about = "Direct peer-to-peer chat and file sharing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rendezvous relay.
    Relay {
        #[arg(long, env = "TANDEM_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        #[arg(long, default_value_t = 600)]
        room_ttl_secs: u64,
    },
    /// Host a session through a relay room, or by hand-carried token with --manual.
    Host {
        #[command(flatten)]
        peer: PeerArgs,

        #[arg(long)]
        manual: bool,
    },
    /// Join with a room code, an offer token or a share link.
    Join {
        input: String,

        #[command(flatten)]
        peer: PeerArgs,
    },
}

#[derive(Args)]
struct PeerArgs {
    #[arg(long, env = "TANDEM_RELAY_URL")]
    relay: Option<String>,

    #[arg(long, env = "TANDEM_STUN", default_value = DEFAULT_STUN)]
    stun: String,
}

impl PeerArgs {
    fn config(&self) -> PeerConfig {
        let config =
            PeerConfig::default().with_ice_servers(vec![IceServerConfig::stun(&self.stun)]);
        match &self.relay {
            Some(url) => config.with_relay(url.clone()),
            None => config,
        }
    }
}

/// One line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Chat(&'a str),
    Send(&'a str),
    Quit,
    Help,
    Empty,
}

fn parse_line(line: &str) -> Line<'_> {
    let line = line.trim();
    match line.split_once(' ') {
        _ if line.is_empty() => Line::Empty,
        _ if line == "/quit" => Line::Quit,
        Some(("/send", path)) if !path.trim().is_empty() => Line::Send(path.trim()),
        _ if line.starts_with('/') => Line::Help,
        _ => Line::Chat(line),
    }
}

fn mime_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Relay {
            bind,
            room_ttl_secs,
        } => run_relay(bind, Duration::from_secs(room_ttl_secs)).await,

        Commands::Host { peer, manual } => {
            let session = Session::spawn(peer.config());
            if manual || peer.relay.is_none() {
                host_manual(&session).await?;
            } else {
                let code = session.host_room().await?;
                println!("{} {}", "Room code:".cyan().bold(), code.as_str().bold());
                println!("Waiting for your peer to join...");
            }
            chat_loop(session).await
        }

        Commands::Join { input, peer } => {
            let session = Session::spawn(peer.config());
            if peer.relay.is_some() && RoomCode::parse(&input).is_ok() {
                session.join_room(input).await?;
            } else {
                let answer = session.join_manual(input).await?;
                println!("{}", "Send this answer back to the host:".cyan().bold());
                println!("  {}", answer.link);
                println!("  {}", answer.token.dimmed());
            }
            chat_loop(session).await
        }
    }
}

async fn run_relay(bind: SocketAddr, room_ttl: Duration) -> Result<()> {
    let config = RelayConfig {
        bind,
        room_ttl,
        ..RelayConfig::default()
    };
    relay::run(config, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down relay");
    })
    .await
    .with_context(|| format!("Relay on {bind} failed"))
}

async fn host_manual(session: &SessionHandle) -> Result<()> {
    let offer = session.host_manual().await?;
    println!("{}", "Share this link (or token) with your peer:".cyan().bold());
    println!("  {}", offer.link);
    println!("  {}", offer.token.dimmed());

    loop {
        let answer = prompt("Paste the answer").await?;
        match session.accept_answer(answer).await {
            Ok(()) => return Ok(()),
            Err(PeerError::Description(e)) => {
                eprintln!("{} {}", "Not a usable answer:".red(), e);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn prompt(text: &'static str) -> Result<String> {
    tokio::task::spawn_blocking(move || Input::<String>::new().with_prompt(text).interact_text())
        .await?
        .context("Failed to read input")
}

async fn chat_loop(session: SessionHandle) -> Result<()> {
    let mut state = session.watch_state();
    let connected = state
        .wait_for(|s| matches!(s, ConnectionState::Connected | ConnectionState::Disconnected))
        .await
        .map(|s| *s == ConnectionState::Connected)
        .unwrap_or(false);
    if !connected {
        bail!("Connection could not be established");
    }

    tokio::spawn(print_notices(session.clone()));
    println!(
        "{}",
        "Connected. Type to chat, /send <path> to share a file, /quit to leave."
            .green()
            .bold()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Line::Quit => break,
                    Line::Empty => {}
                    Line::Help => println!("Commands: /send <path>, /quit"),
                    Line::Send(path) => send_path(&session, Path::new(path)).await,
                    Line::Chat(text) => {
                        if let Err(e) = session.send_chat(text).await {
                            eprintln!("{} {}", "Not sent:".red(), e);
                        }
                    }
                }
            }

            changed = state.changed() => {
                if changed.is_err() || *state.borrow() == ConnectionState::Disconnected {
                    println!("{}", "Peer disconnected.".yellow());
                    break;
                }
            }
        }
    }

    session.disconnect().await?;
    Ok(())
}

async fn send_path(session: &SessionHandle, path: &Path) {
    let data = match tokio::fs::read(path).await {
        Ok(data) => Bytes::from(data),
        Err(e) => {
            eprintln!("{} {}: {}", "Cannot read".red(), path.display(), e);
            return;
        }
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_owned());

    match session.send_file(name.clone(), mime_for(path), data).await {
        Ok(_) => println!("Sending {}...", name),
        Err(e) => eprintln!("{} {}", "Not sent:".red(), e),
    }
}

async fn print_notices(session: SessionHandle) {
    let mut notices = session.notices();
    loop {
        let notice = match notices.recv().await {
            Ok(notice) => notice,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };

        match notice {
            SessionNotice::ChatReceived(message) => {
                println!("{} {}", "peer>".green().bold(), message.text);
            }
            SessionNotice::TransferUpdated {
                id,
                direction,
                status,
                ..
            } => match (direction, status) {
                (TransferDirection::Receive, TransferStatus::Completed) => {
                    if let Err(e) = save_received(&session, id).await {
                        eprintln!("{} {}", "Could not save file:".red(), e);
                    }
                }
                (TransferDirection::Send, TransferStatus::Completed) => {
                    println!("{}", "File sent.".green());
                }
                (_, TransferStatus::Error) => eprintln!("{}", "File transfer failed.".red()),
                _ => {}
            },
            SessionNotice::RemoteTrack { kind, .. } => println!("Peer started sharing {kind}"),
            SessionNotice::PeerJoined => println!("{}", "Peer joined the room.".cyan()),
            SessionNotice::PeerLeft => println!("{}", "Peer left the room.".yellow()),
            SessionNotice::Error(e) => eprintln!("{} {}", "error:".red().bold(), e),
        }
    }
}

/// Writes a completed download into the working directory, keeping only the file name.
async fn save_received(session: &SessionHandle, id: tandem::model::TransferId) -> Result<()> {
    let snapshot = session.snapshot().await?;
    let Some(record) = snapshot.transfers.iter().find(|t| t.id == id) else {
        bail!("transfer {id} is gone");
    };
    let Some(payload) = record.payload() else {
        bail!("transfer {id} has no payload");
    };

    let name = Path::new(&record.name)
        .file_name()
        .map(|n| format!("received-{}", n.to_string_lossy()))
        .unwrap_or_else(|| format!("received-{id}"));
    tokio::fs::write(&name, payload).await?;
    println!(
        "{} {} ({}, {} bytes)",
        "Saved".green(),
        name,
        record.mime_type,
        payload.len()
    );
    Ok(())
}
