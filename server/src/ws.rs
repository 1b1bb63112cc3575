use crate::{game, state::AppState};
use axum::{
    extract::{
        ConnectInfo, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use drawman_shared::{ClientMessage, ErrorKind, PlayerName, RoomId, ServerMessage};
use futures_util::{Sink, SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::{select, sync::mpsc, time::timeout};
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

#[tracing::instrument(skip(socket, state), fields(client_addr = %addr))]
async fn handle_socket(mut socket: WebSocket, state: AppState, addr: SocketAddr) {
    let Some(member) = handshake_with_timeout(&state, &mut socket).await else {
        return;
    };
    let Member {
        room_id,
        player_name,
        mut outbound_rx,
    } = member;
    info!(room_id = %room_id, player = %player_name, "Connection joined room.");

    let (mut sender, mut ws_reader) = socket.split();

    loop {
        select! {
            biased;
            outbound = outbound_rx.recv() => match outbound {
                Some(msg) => send_ws_json(&mut sender, &msg).await,
                // Room destroyed; nothing more will ever arrive.
                None => break,
            },
            msg = ws_reader.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) if text.len() > 100_000 => {
                        warn!("Received excessively long message, disconnecting.");
                        break;
                    }
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_client_message(&text, &room_id, &player_name, &state).await {
                            error!("Error handling client message: {}", e);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Ping(_))) => {
                        continue;
                    }
                    msg => {
                        warn!("Invalid WebSocket message: {msg:?}");
                        break;
                    }
                }
            }
        }
    }

    game::remove_player(&state, &room_id, &player_name).await;
}

struct Member {
    room_id: RoomId,
    player_name: PlayerName,
    outbound_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

async fn handshake_with_timeout(state: &AppState, socket: &mut WebSocket) -> Option<Member> {
    const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

    match timeout(JOIN_TIMEOUT, handshake(state, socket)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Join timeout exceeded.");
            None
        }
    }
}

/// Wait for the opening `room-request` or `join-request`, seat the player and
/// answer with the public room view.
async fn handshake(state: &AppState, socket: &mut WebSocket) -> Option<Member> {
    loop {
        let text = match socket.next().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | None => return None,
            Some(Ok(other)) => {
                warn!("Unexpected message during handshake: {other:?}");
                return None;
            }
            Some(Err(e)) => {
                warn!("WebSocket error during handshake: {}", e);
                return None;
            }
        };

        let request = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(request) => request,
            Err(err) => {
                warn!("Failed to parse handshake message: {}", err);
                return None;
            }
        };

        let (tx, outbound_rx) = mpsc::unbounded_channel();
        match request {
            ClientMessage::RoomRequest { player_name } => {
                let (room_id, room) =
                    game::create_room_with_player(state, player_name.clone(), tx).await;
                send_ws_json(
                    socket,
                    &ServerMessage::RoomAnswer {
                        player_name: player_name.clone(),
                        room,
                    },
                )
                .await;
                return Some(Member {
                    room_id,
                    player_name,
                    outbound_rx,
                });
            }
            ClientMessage::JoinRequest { player_name, room_id } => {
                match game::join_room(state, &room_id, player_name.clone(), tx).await {
                    Ok(room) => {
                        send_ws_json(
                            socket,
                            &ServerMessage::JoinAnswer {
                                player_name: player_name.clone(),
                                room,
                            },
                        )
                        .await;
                        return Some(Member {
                            room_id,
                            player_name,
                            outbound_rx,
                        });
                    }
                    Err(error) => {
                        send_ws_error(socket, error).await;
                        return None;
                    }
                }
            }
            other => {
                warn!("Expected a room or join request during handshake, got: {other:?}");
                continue;
            }
        }
    }
}

async fn handle_client_message(
    text: &str,
    room_id: &RoomId,
    player_name: &PlayerName,
    state: &AppState,
) -> anyhow::Result<()> {
    let msg: ClientMessage = serde_json::from_str(text)?;

    match msg {
        ClientMessage::StartRequest => {
            game::start_game(state, room_id).await;
        }
        ClientMessage::WordRequest { word } => {
            game::choose_word(state, room_id, player_name, &word).await;
        }
        ClientMessage::Guess { guess } => {
            game::submit_guess(state, room_id, player_name, &guess).await;
        }
        ClientMessage::CanvasData { data } => {
            game::update_canvas(state, room_id, data).await;
        }
        // The seat is fixed for the connection's lifetime.
        ClientMessage::RoomRequest { .. } | ClientMessage::JoinRequest { .. } => {}
    }

    Ok(())
}

async fn send_ws_error(sender: &mut (impl Sink<Message> + Unpin), error: ErrorKind) {
    send_ws_json(sender, &ServerMessage::Error { error }).await;
}

async fn send_ws_json(sender: &mut (impl Sink<Message> + Unpin), msg: &ServerMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let _ = sender.send(Message::Text(json.into())).await;
        }
        Err(err) => {
            error!("Failed to serialize message '{msg:?}': {err}");
        }
    }
}
