//! Headless test client for the game protocol
//!
//! Creates or joins a room from the command line, prints every server
//! event, and once the game starts plays random moves each second.
//! Useful for poking at a running server without the real client.

use std::time::Duration;

use clap::Parser;
use rand::Rng;
use tokio::time::interval;

use hit_dodge_server::game::PlayerState;
use hit_dodge_server::net::client::GameClient;
use hit_dodge_server::net::protocol::{Action, ServerMsg};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Create a new room instead of joining one
    #[clap(long)]
    create: bool,
    /// Room code to join
    #[clap(long, conflicts_with = "create")]
    join: Option<String>,
    /// Player name
    #[clap(long, default_value = "Player")]
    name: String,
    /// Server host
    #[clap(long, default_value = "localhost")]
    host: String,
    /// Server port
    #[clap(long, default_value = "12345")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let addr = format!("{}:{}", args.host, args.port);
    let mut client = GameClient::connect(&addr).await?;
    println!("Connected to {}", addr);

    if args.create {
        client.create_room(&args.name).await?;
    } else if let Some(code) = args.join.as_deref() {
        client.join_room(&code.to_uppercase(), &args.name).await?;
    } else {
        eprintln!("Pass --create or --join CODE");
        std::process::exit(2);
    }

    let mut playing = false;
    let mut ticker = interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            msg = client.next_message() => {
                let Some(msg) = msg else {
                    println!("Server closed the connection");
                    break;
                };
                match msg {
                    ServerMsg::RoomCreated { room_id, player_id, .. } => {
                        println!("Room {} created, playing as slot {}", room_id, player_id);
                        println!("Others can join with --join {}", room_id);
                    }
                    ServerMsg::RoomJoined { room_id, player_id, .. } => {
                        println!("Joined room {} as slot {}", room_id, player_id);
                    }
                    ServerMsg::RoomNotFound {} => {
                        println!("No room with that code");
                        break;
                    }
                    ServerMsg::RoomFull {} => {
                        println!("Room is full");
                        break;
                    }
                    ServerMsg::RoomUpdate { players_count, max_players, player_names, .. } => {
                        println!("Lobby {}/{}: {}", players_count, max_players, player_names.join(", "));
                    }
                    ServerMsg::GameStart {} => {
                        println!("Game on");
                        playing = true;
                    }
                    ServerMsg::GameState { players, .. } => {
                        // No point acting once we are off the arena
                        let my_state = client.player_id.and_then(|me| {
                            players
                                .iter()
                                .find(|p| p.id == me)
                                .and_then(|p| PlayerState::try_from(p.state).ok())
                        });
                        if playing
                            && matches!(
                                my_state,
                                Some(PlayerState::FlyingOff | PlayerState::Eliminated)
                            )
                        {
                            println!("Knocked off, watching the rest");
                            playing = false;
                        }
                    }
                    ServerMsg::PlayerLeft { player_id } => {
                        println!("Player {} left", player_id);
                    }
                    ServerMsg::GameOver { winner_id } => {
                        match winner_id {
                            Some(id) => println!("Game over, player {} wins", id),
                            None => println!("Game over, draw"),
                        }
                        break;
                    }
                }
            }
            _ = ticker.tick(), if playing => {
                let action = if rand::thread_rng().gen_bool(0.5) {
                    Action::Hit
                } else {
                    Action::Dodge
                };
                println!("Sending {:?}", action);
                client.send_action(action).await?;
            }
        }
    }

    client.leave_room().await.ok();
    Ok(())
}
