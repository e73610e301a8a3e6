//! Per-connection TCP handling
//!
//! Lines in, lines out: each connection reads newline-delimited JSON
//! commands and gets newline-delimited JSON events back through a
//! dedicated writer task. Malformed lines are dropped without closing
//! the connection.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::net::protocol::{ClientMsg, ServerMsg};
use crate::room::{JoinError, RoomCommand, RoomHandle};
use crate::util::rate_limit::PlayerRateLimiter;

/// Outbound queue depth per connection
const OUTBOUND_BUFFER: usize = 256;

/// Accept loop for the game port
pub async fn serve(listener: TcpListener, state: AppState) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(%addr, "connection accepted");
                tokio::spawn(handle_connection(stream, state.clone()));
            }
            Err(err) => {
                warn!(error = %err, "accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, state: AppState) {
    let conn_id = Uuid::new_v4();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let (tx, mut rx) = mpsc::channel::<ServerMsg>(OUTBOUND_BUFFER);
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let mut json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to encode outbound message");
                    continue;
                }
            };
            json.push('\n');
            if write_half.write_all(json.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    let rate_limiter = PlayerRateLimiter::new();
    let mut room: Option<RoomHandle> = None;

    info!(conn = %conn_id, "client connected");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                debug!(conn = %conn_id, error = %err, "read failed");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !rate_limiter.check_input() {
            warn!(conn = %conn_id, "inbound rate limit exceeded");
            continue;
        }
        let msg: ClientMsg = match serde_json::from_str(line) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(conn = %conn_id, error = %err, "malformed message dropped");
                continue;
            }
        };

        match msg {
            ClientMsg::CreateRoom { player_name } => {
                if room.is_some() {
                    warn!(conn = %conn_id, "create_room while already seated");
                    continue;
                }
                let handle = state.directory.create_room(conn_id, player_name, tx.clone());
                room = Some(handle);
            }
            ClientMsg::JoinRoom {
                room_id,
                player_name,
            } => {
                if room.is_some() {
                    warn!(conn = %conn_id, "join_room while already seated");
                    continue;
                }
                match state
                    .directory
                    .join_room(&room_id, conn_id, player_name, tx.clone())
                    .await
                {
                    Ok((handle, _slot)) => room = Some(handle),
                    Err(JoinError::RoomNotFound) => {
                        let _ = tx.send(ServerMsg::RoomNotFound {}).await;
                    }
                    Err(JoinError::RoomFull) => {
                        let _ = tx.send(ServerMsg::RoomFull {}).await;
                    }
                }
            }
            ClientMsg::PlayerAction { action } => {
                let Some(handle) = room.as_ref() else {
                    continue;
                };
                let cmd = RoomCommand::Action { conn_id, action };
                if handle.command_tx.send(cmd).await.is_err() {
                    room = None;
                }
            }
            ClientMsg::LeaveRoom {} => {
                if let Some(handle) = room.take() {
                    let _ = handle.command_tx.send(RoomCommand::Leave { conn_id }).await;
                }
            }
        }
    }

    if let Some(handle) = room.take() {
        let _ = handle.command_tx.send(RoomCommand::Leave { conn_id }).await;
    }
    writer.abort();
    info!(conn = %conn_id, "client disconnected");
}
