//! Line-oriented TCP client for the game protocol

use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::net::protocol::{Action, ClientMsg, ServerMsg};

/// Client-side connection failures
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed { addr: String, source: io::Error },
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to send message: {0}")]
    SendFailed(#[from] io::Error),
}

/// Connected game client. Server events arrive through `next_message`.
pub struct GameClient {
    writer: OwnedWriteHalf,
    events: mpsc::Receiver<ServerMsg>,
    pub room_id: Option<String>,
    pub player_id: Option<u8>,
}

impl GameClient {
    /// Connect and start the background read loop
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream =
            TcpStream::connect(addr)
                .await
                .map_err(|source| ClientError::ConnectFailed {
                    addr: addr.to_string(),
                    source,
                })?;
        let (read_half, writer) = stream.into_split();
        let (tx, events) = mpsc::channel(64);
        tokio::spawn(read_loop(read_half, tx));
        Ok(GameClient {
            writer,
            events,
            room_id: None,
            player_id: None,
        })
    }

    pub async fn create_room(&mut self, player_name: &str) -> Result<(), ClientError> {
        self.send(&ClientMsg::CreateRoom {
            player_name: player_name.to_string(),
        })
        .await
    }

    pub async fn join_room(&mut self, room_id: &str, player_name: &str) -> Result<(), ClientError> {
        self.send(&ClientMsg::JoinRoom {
            room_id: room_id.to_string(),
            player_name: player_name.to_string(),
        })
        .await
    }

    pub async fn send_action(&mut self, action: Action) -> Result<(), ClientError> {
        self.send(&ClientMsg::PlayerAction { action }).await
    }

    pub async fn leave_room(&mut self) -> Result<(), ClientError> {
        self.send(&ClientMsg::LeaveRoom {}).await
    }

    /// Next server event, or `None` once the connection is closed.
    /// Room membership fields track the confirmations as they arrive.
    pub async fn next_message(&mut self) -> Option<ServerMsg> {
        let msg = self.events.recv().await?;
        match &msg {
            ServerMsg::RoomCreated {
                room_id, player_id, ..
            }
            | ServerMsg::RoomJoined {
                room_id, player_id, ..
            } => {
                self.room_id = Some(room_id.clone());
                self.player_id = Some(*player_id);
            }
            _ => {}
        }
        Some(msg)
    }

    async fn send(&mut self, msg: &ClientMsg) -> Result<(), ClientError> {
        let mut json = serde_json::to_string(msg)?;
        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        Ok(())
    }
}

async fn read_loop(read_half: OwnedReadHalf, tx: mpsc::Sender<ServerMsg>) {
    let mut lines = BufReader::new(read_half).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let msg: ServerMsg = match serde_json::from_str(&line) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(error = %err, "malformed server message dropped");
                continue;
            }
        };
        if tx.send(msg).await.is_err() {
            break;
        }
    }
}
