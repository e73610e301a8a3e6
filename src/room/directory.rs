//! Room directory - join-code allocation and room lookup

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::game::constants::MAX_PLAYERS;
use crate::net::protocol::ServerMsg;

use super::session::{Room, RoomCommand, RoomHandle};
use super::JoinError;

/// Join codes skip lowercase to stay easy to read out loud
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 4;

/// Registry of live rooms, keyed by join code
#[derive(Debug, Clone, Default)]
pub struct RoomDirectory {
    rooms: Arc<DashMap<String, RoomHandle>>,
}

/// Summary row for the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RoomInfo {
    pub code: String,
    pub players_count: usize,
    pub max_players: usize,
    pub started: bool,
    pub created_at: DateTime<Utc>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh room with the caller seated at slot 0. The room task
    /// is spawned here and unregisters its own code when it ends.
    pub fn create_room(
        &self,
        conn_id: Uuid,
        name: String,
        tx: mpsc::Sender<ServerMsg>,
    ) -> RoomHandle {
        loop {
            let code = random_code();
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(entry) => {
                    let (room, handle) = Room::new(code.clone(), conn_id, name, tx);
                    entry.insert(handle.clone());

                    let rooms = self.rooms.clone();
                    tokio::spawn(async move {
                        room.run().await;
                        rooms.remove(&code);
                        debug!(room = %code, "room released");
                    });
                    info!(room = %handle.code, "room registered");
                    return handle;
                }
            }
        }
    }

    /// Ask a room to seat this connection. The room task is the authority
    /// on capacity, so the answer round-trips through its command queue.
    pub async fn join_room(
        &self,
        code: &str,
        conn_id: Uuid,
        name: String,
        tx: mpsc::Sender<ServerMsg>,
    ) -> Result<(RoomHandle, u8), JoinError> {
        let handle = match self.rooms.get(code) {
            Some(entry) => entry.value().clone(),
            None => return Err(JoinError::RoomNotFound),
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let cmd = RoomCommand::Join {
            conn_id,
            name,
            tx,
            reply: reply_tx,
        };
        if handle.command_tx.send(cmd).await.is_err() {
            return Err(JoinError::RoomNotFound);
        }
        match reply_rx.await {
            Ok(Ok(slot)) => Ok((handle, slot)),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(JoinError::RoomNotFound),
        }
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn total_participants(&self) -> usize {
        self.rooms.iter().map(|r| r.participant_count()).sum()
    }

    /// Listing for the status endpoint, oldest room first
    pub fn room_infos(&self) -> Vec<RoomInfo> {
        let mut infos: Vec<RoomInfo> = self
            .rooms
            .iter()
            .map(|r| RoomInfo {
                code: r.code.clone(),
                players_count: r.participant_count(),
                max_players: MAX_PLAYERS,
                started: r.is_started(),
                created_at: r.created_at,
            })
            .collect();
        infos.sort_by_key(|info| info.created_at);
        infos
    }
}

fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn codes_use_the_documented_alphabet() {
        for _ in 0..32 {
            let code = random_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn live_rooms_get_distinct_codes() {
        let directory = RoomDirectory::new();
        let mut receivers = Vec::new();
        let mut codes = HashSet::new();

        for _ in 0..12 {
            let (tx, rx) = mpsc::channel(256);
            let handle = directory.create_room(Uuid::new_v4(), "Ada".into(), tx);
            receivers.push(rx);
            assert!(codes.insert(handle.code.clone()), "code reissued while live");
        }

        assert_eq!(directory.active_rooms(), 12);
        assert_eq!(directory.total_participants(), 12);
        drop(receivers);
    }

    #[tokio::test]
    async fn create_then_fill_room() {
        let directory = RoomDirectory::new();
        let (creator_tx, creator_rx) = mpsc::channel(256);
        let handle = directory.create_room(Uuid::new_v4(), "Ada".into(), creator_tx);
        assert_eq!(directory.active_rooms(), 1);
        assert_eq!(handle.participant_count(), 1);

        // Receivers must stay alive or the room treats the seats as dead.
        let mut receivers = vec![creator_rx];
        for (i, name) in ["Bo", "Cy", "Dee"].iter().enumerate() {
            let (tx, rx) = mpsc::channel(256);
            let (_, slot) = directory
                .join_room(&handle.code, Uuid::new_v4(), name.to_string(), tx)
                .await
                .expect("join refused");
            assert_eq!(slot, i as u8 + 1);
            receivers.push(rx);
        }

        timeout(Duration::from_secs(5), async {
            while !handle.is_started() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("full room never started its game");

        let (tx, _extra) = mpsc::channel(256);
        let refused = directory
            .join_room(&handle.code, Uuid::new_v4(), "Eve".into(), tx)
            .await;
        assert!(matches!(refused, Err(JoinError::RoomFull)));
        drop(receivers);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let directory = RoomDirectory::new();
        let (tx, _rx) = mpsc::channel(256);
        let refused = directory
            .join_room("ZZZZ", Uuid::new_v4(), "Ada".into(), tx)
            .await;
        assert!(matches!(refused, Err(JoinError::RoomNotFound)));
    }

    #[tokio::test]
    async fn code_released_after_last_leave() {
        let directory = RoomDirectory::new();
        let (creator_tx, _creator_rx) = mpsc::channel(256);
        let conn_id = Uuid::new_v4();
        let handle = directory.create_room(conn_id, "Ada".into(), creator_tx);

        handle
            .command_tx
            .send(RoomCommand::Leave { conn_id })
            .await
            .expect("room task gone");

        timeout(Duration::from_secs(5), async {
            while directory.active_rooms() != 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("room code was never released");
    }
}
