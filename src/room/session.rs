//! Room session actor
//!
//! Each room runs as a single tokio task that owns the simulation and the
//! participant roster. All mutations come in through a bounded command
//! channel and are applied between ticks, so the game state never needs a
//! lock. The task ends when the last participant is gone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::constants::MAX_PLAYERS;
use crate::game::snapshot::build_game_state;
use crate::game::Simulation;
use crate::net::protocol::{Action, ServerMsg};
use crate::util::time::{tick_delta, TICK_DURATION_MICROS};

use super::JoinError;

/// Command queue depth per room
const COMMAND_BUFFER: usize = 256;

/// Commands routed to a room task
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        conn_id: Uuid,
        name: String,
        tx: mpsc::Sender<ServerMsg>,
        reply: oneshot::Sender<Result<u8, JoinError>>,
    },
    Action {
        conn_id: Uuid,
        action: Action,
    },
    Leave {
        conn_id: Uuid,
    },
}

/// A connection seated in the room
struct Participant {
    slot: u8,
    name: String,
    tx: mpsc::Sender<ServerMsg>,
}

/// Cloneable handle for addressing a room from outside its task
#[derive(Debug, Clone)]
pub struct RoomHandle {
    pub code: String,
    pub command_tx: mpsc::Sender<RoomCommand>,
    participant_count: Arc<AtomicUsize>,
    started: Arc<AtomicBool>,
    pub created_at: DateTime<Utc>,
}

impl RoomHandle {
    pub fn participant_count(&self) -> usize {
        self.participant_count.load(Ordering::Relaxed)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }
}

/// Room state, owned exclusively by the room task
pub struct Room {
    code: String,
    creator: Uuid,
    participants: HashMap<Uuid, Participant>,
    sim: Option<Simulation>,
    started: bool,
    finished: bool,
    abandoned: bool,
    command_rx: mpsc::Receiver<RoomCommand>,
    participant_count: Arc<AtomicUsize>,
    started_flag: Arc<AtomicBool>,
}

impl Room {
    /// Seat the creator at slot 0 and hand back the actor plus its handle
    pub fn new(
        code: String,
        creator_id: Uuid,
        creator_name: String,
        creator_tx: mpsc::Sender<ServerMsg>,
    ) -> (Self, RoomHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let participant_count = Arc::new(AtomicUsize::new(1));
        let started_flag = Arc::new(AtomicBool::new(false));

        let mut participants = HashMap::new();
        participants.insert(
            creator_id,
            Participant {
                slot: 0,
                name: creator_name,
                tx: creator_tx,
            },
        );

        let handle = RoomHandle {
            code: code.clone(),
            command_tx,
            participant_count: participant_count.clone(),
            started: started_flag.clone(),
            created_at: Utc::now(),
        };

        let room = Room {
            code,
            creator: creator_id,
            participants,
            sim: None,
            started: false,
            finished: false,
            abandoned: false,
            command_rx,
            participant_count,
            started_flag,
        };
        (room, handle)
    }

    /// Room task body: greet the creator, then tick until everyone is gone
    pub async fn run(mut self) {
        info!(room = %self.code, "room opened");
        self.send_to(
            self.creator,
            ServerMsg::RoomCreated {
                room_id: self.code.clone(),
                player_id: 0,
                players_count: 1,
            },
        );
        self.broadcast_room_update();

        let mut ticker = interval(Duration::from_micros(TICK_DURATION_MICROS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.process_commands();
            self.step();
            if self.participants.is_empty() {
                break;
            }
        }
        info!(room = %self.code, "room closed");
    }

    /// Drain every pending command without blocking the tick
    fn process_commands(&mut self) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            match cmd {
                RoomCommand::Join {
                    conn_id,
                    name,
                    tx,
                    reply,
                } => self.handle_join(conn_id, name, tx, reply),
                RoomCommand::Action { conn_id, action } => self.handle_action(conn_id, action),
                RoomCommand::Leave { conn_id } => self.remove_participant(conn_id),
            }
        }
    }

    fn handle_join(
        &mut self,
        conn_id: Uuid,
        name: String,
        tx: mpsc::Sender<ServerMsg>,
        reply: oneshot::Sender<Result<u8, JoinError>>,
    ) {
        if let Some(existing) = self.participants.get(&conn_id) {
            warn!(room = %self.code, conn = %conn_id, "duplicate join ignored");
            let _ = reply.send(Ok(existing.slot));
            return;
        }
        if self.started || self.participants.len() >= MAX_PLAYERS {
            let _ = reply.send(Err(JoinError::RoomFull));
            return;
        }
        let Some(slot) = self.next_free_slot() else {
            let _ = reply.send(Err(JoinError::RoomFull));
            return;
        };

        self.participants.insert(
            conn_id,
            Participant {
                slot,
                name: name.clone(),
                tx,
            },
        );
        self.participant_count
            .store(self.participants.len(), Ordering::Relaxed);
        let _ = reply.send(Ok(slot));

        self.send_to(
            conn_id,
            ServerMsg::RoomJoined {
                room_id: self.code.clone(),
                player_id: slot,
                players_count: self.participants.len(),
            },
        );
        self.broadcast_room_update();
        info!(room = %self.code, slot, name = %name, "participant joined");

        if self.participants.len() == MAX_PLAYERS {
            self.start_game();
        }
    }

    fn next_free_slot(&self) -> Option<u8> {
        (0..MAX_PLAYERS as u8).find(|slot| self.participants.values().all(|p| p.slot != *slot))
    }

    fn start_game(&mut self) {
        let seed = rand::random::<u64>();
        self.sim = Some(Simulation::new(seed));
        self.started = true;
        self.started_flag.store(true, Ordering::Relaxed);
        info!(room = %self.code, seed, "game started");
        self.broadcast(ServerMsg::GameStart {});
    }

    fn handle_action(&mut self, conn_id: Uuid, action: Action) {
        if !self.started || self.finished || self.abandoned {
            return;
        }
        let Some(participant) = self.participants.get(&conn_id) else {
            return;
        };
        let slot = participant.slot;
        if let Some(sim) = self.sim.as_mut() {
            sim.apply_action(slot, action);
        }
    }

    /// Drop a participant and tell the rest. A departure during a live
    /// round abandons it: the simulation freezes rather than play on
    /// with a ghost slot.
    fn remove_participant(&mut self, conn_id: Uuid) {
        let Some(participant) = self.participants.remove(&conn_id) else {
            return;
        };
        self.participant_count
            .store(self.participants.len(), Ordering::Relaxed);
        info!(room = %self.code, slot = participant.slot, name = %participant.name, "participant left");

        if self.started && !self.finished {
            if !self.abandoned {
                self.abandoned = true;
                warn!(room = %self.code, "room abandoned mid-game");
            }
            self.broadcast(ServerMsg::PlayerLeft {
                player_id: participant.slot,
            });
        }
        self.broadcast_room_update();
    }

    /// Advance the simulation one tick and broadcast the snapshot
    fn step(&mut self) {
        if !self.started || self.finished || self.abandoned {
            return;
        }
        let Some(sim) = self.sim.as_mut() else {
            return;
        };
        sim.update(tick_delta());
        let snapshot = build_game_state(sim);
        let game_over = sim.game_over;
        let winner = sim.winner;

        self.broadcast(snapshot);
        if game_over {
            self.finished = true;
            info!(room = %self.code, winner = ?winner, "game over");
            self.broadcast(ServerMsg::GameOver { winner_id: winner });
        }
    }

    /// Fan a message out to every participant. A full or closed outbound
    /// queue means the connection is dead or hopelessly behind, so those
    /// participants are removed.
    fn broadcast(&mut self, msg: ServerMsg) {
        let mut dead = Vec::new();
        for (conn_id, participant) in &self.participants {
            if participant.tx.try_send(msg.clone()).is_err() {
                dead.push(*conn_id);
            }
        }
        for conn_id in dead {
            self.remove_participant(conn_id);
        }
    }

    fn send_to(&mut self, conn_id: Uuid, msg: ServerMsg) {
        let Some(participant) = self.participants.get(&conn_id) else {
            return;
        };
        if participant.tx.try_send(msg).is_err() {
            debug!(room = %self.code, conn = %conn_id, "outbound queue unavailable, dropping participant");
            self.remove_participant(conn_id);
        }
    }

    fn broadcast_room_update(&mut self) {
        let mut seats: Vec<(u8, String)> = self
            .participants
            .values()
            .map(|p| (p.slot, p.name.clone()))
            .collect();
        seats.sort_by_key(|(slot, _)| *slot);

        let msg = ServerMsg::RoomUpdate {
            room_id: self.code.clone(),
            players_count: self.participants.len(),
            max_players: MAX_PLAYERS,
            player_names: seats.into_iter().map(|(_, name)| name).collect(),
        };
        self.broadcast(msg);
    }
}
