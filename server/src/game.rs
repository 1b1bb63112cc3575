use crate::room::{PlayerSender, Room};
use crate::score;
use crate::state::AppState;
use crate::timer;
use drawman_shared::{ErrorKind, LogEntry, PlayerName, RoomId, RoomView, ServerMessage, TurnState};
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// A round needs at least one guesser besides the drawer.
const MIN_PLAYERS_TO_START: usize = 2;

/// Create a room and seat its first player. The requester gets the public
/// view back as the `room-answer` payload.
pub async fn create_room_with_player(
    state: &AppState,
    name: PlayerName,
    tx: PlayerSender,
) -> (RoomId, RoomView) {
    let (room_id, room) = state.create_room(state.max_rounds).await;
    let mut room = room.lock().await;
    // The room is empty, so the name cannot collide.
    let _ = room.add_player(name.clone(), tx);
    info!(room_id = %room_id, player = %name, "Player created room.");
    room.broadcast(&ServerMessage::Log(LogEntry::system(format!(
        "{name} created the room"
    ))));
    let view = room.public_view();
    (room_id, view)
}

/// Seat a player in an existing room.
pub async fn join_room(
    state: &AppState,
    room_id: &RoomId,
    name: PlayerName,
    tx: PlayerSender,
) -> Result<RoomView, ErrorKind> {
    let room = state.room(room_id).await.ok_or(ErrorKind::RoomNotFound)?;
    let mut room = room.lock().await;
    room.add_player(name.clone(), tx)?;
    info!(room_id = %room_id, player = %name, "Player joined room.");
    room.broadcast(&ServerMessage::Log(LogEntry::system(format!(
        "{name} joined the room"
    ))));
    room.broadcast_state();
    Ok(room.public_view())
}

/// Begin a game. Valid from INACTIVE or from the score screen of a finished
/// game; anything else is a stale or forged request and is dropped.
pub async fn start_game(state: &AppState, room_id: &RoomId) {
    let Some(room) = state.room(room_id).await else {
        return;
    };
    let mut room = room.lock().await;
    if !matches!(room.state, TurnState::Inactive | TurnState::ShowGameScore) {
        return;
    }
    if room.players.len() < MIN_PLAYERS_TO_START {
        debug!(room_id = %room_id, "Ignoring start request with too few players.");
        return;
    }
    room.round = 0;
    room.next_drawer = 0;
    for player in &mut room.players {
        player.score = Default::default();
    }
    info!(room_id = %room_id, players = room.players.len(), "Game started.");
    enter_state(state, &mut room, TurnState::StartOfRound);
}

/// The drawer picks a word from the offered set. Anything else — wrong
/// player, wrong phase, a word outside the offer — is dropped without a
/// reply, since it may be a forged or raced message.
pub async fn choose_word(state: &AppState, room_id: &RoomId, player: &PlayerName, word: &str) {
    let Some(room) = state.room(room_id).await else {
        return;
    };
    let mut room = room.lock().await;
    if room.state != TurnState::ChoosingWord {
        return;
    }
    let Some(drawer) = room.drawer_index() else {
        return;
    };
    if &room.players[drawer].name != player {
        return;
    }
    if !room.word_choices.iter().any(|w| w == word) {
        debug!(room_id = %room_id, player = %player, "Ignoring word outside the offered set.");
        return;
    }
    room.current_word = Some(word.to_string());
    enter_state(state, &mut room, TurnState::Drawing);
}

/// Evaluate a guess. The drawer and players who already scored this turn are
/// ignored. A correct guess scores by remaining time and may end the turn
/// early once only the drawer is left unscored.
pub async fn submit_guess(state: &AppState, room_id: &RoomId, player: &PlayerName, text: &str) {
    let Some(room) = state.room(room_id).await else {
        return;
    };
    let mut room = room.lock().await;
    if room.state != TurnState::Drawing {
        return;
    }
    let Some(idx) = room.player_index(player) else {
        return;
    };
    if room.players[idx].is_drawer || room.players[idx].score.turn != 0 {
        return;
    }

    if room.current_word.as_deref() == Some(text) {
        let remaining = room.time_remaining();
        room.players[idx].score.turn = score::guesser_score(remaining);
        info!(
            room_id = %room_id,
            player = %player,
            score = room.players[idx].score.turn,
            "Correct guess."
        );
        room.broadcast(&ServerMessage::Log(LogEntry::system(format!(
            "{player} guessed the word!"
        ))));
        let unscored = room.players.iter().filter(|p| p.score.turn == 0).count();
        if unscored <= 1 {
            enter_state(state, &mut room, TurnState::EndOfTurn);
            return;
        }
    } else {
        room.broadcast(&ServerMessage::Log(LogEntry::player(
            player.clone(),
            text.to_string(),
        )));
    }
    room.broadcast_state();
}

/// Store the latest canvas snapshot and fan it out. No phase change.
pub async fn update_canvas(state: &AppState, room_id: &RoomId, data: serde_json::Value) {
    let Some(room) = state.room(room_id).await else {
        return;
    };
    let mut room = room.lock().await;
    room.canvas_data = data;
    room.broadcast_state();
}

/// Remove a player, handing the drawer role backwards and force-ending the
/// turn if they were mid-turn, and destroying the room if it empties.
pub async fn remove_player(state: &AppState, room_id: &RoomId, player: &PlayerName) {
    let Some(room) = state.room(room_id).await else {
        return;
    };
    let mut room = room.lock().await;
    let Some(idx) = room.player_index(player) else {
        return;
    };
    let was_drawer = room.players[idx].is_drawer;
    let removed = room.players.remove(idx);
    info!(room_id = %room_id, player = %removed.name, "Player left room.");

    if room.players.is_empty() {
        room.cancel_timer();
        drop(room);
        state.remove_room(room_id).await;
        return;
    }

    if idx < room.next_drawer {
        room.next_drawer -= 1;
    }
    room.broadcast(&ServerMessage::Log(LogEntry::system(format!(
        "{} left the room",
        removed.name
    ))));

    if was_drawer && matches!(room.state, TurnState::ChoosingWord | TurnState::Drawing) {
        // The previous player in turn order inherits the role, so the
        // rotation resumes with the seat after the departed drawer.
        let len = room.players.len();
        let previous = (idx + len - 1) % len;
        room.players[previous].is_drawer = true;
        room.word_choices.clear();
        room.drawer_left = true;
        enter_state(state, &mut room, TurnState::EndOfTurn);
    } else if room.state == TurnState::Drawing
        && room.players.iter().filter(|p| p.score.turn == 0).count() <= 1
    {
        // The departed player was the last unscored guesser.
        enter_state(state, &mut room, TurnState::EndOfTurn);
    } else {
        room.broadcast_state();
    }
}

/// Timer expiry entry point. Re-checks the armed generation under the room
/// lock and nils the handle before applying the transition, so a manual
/// transition racing the deadline can never be applied twice.
pub(crate) async fn fire_expiry(state: &AppState, room_id: &RoomId, generation: u64) {
    let Some(room) = state.room(room_id).await else {
        return;
    };
    let mut room = room.lock().await;
    let next = match &room.timer {
        Some(timer) if timer.generation == generation && !timer.cancel.is_cancelled() => timer.next,
        _ => return,
    };
    room.timer = None;
    enter_state(state, &mut room, next);
}

/// The single transition function. Cancels the pending timer, runs the
/// entry hook for the new state, arms the next auto-advance where the state
/// graph has one, and broadcasts the updated public view.
fn enter_state(state: &AppState, room: &mut Room, next: TurnState) {
    room.cancel_timer();
    room.state = next;
    let rules = room.rules;

    let schedule = match next {
        TurnState::Inactive => None,
        TurnState::StartOfRound => {
            room.round += 1;
            for player in &mut room.players {
                player.score.turn = 0;
            }
            Some((rules.start_of_round, TurnState::ChoosingWord))
        }
        TurnState::ChoosingWord => {
            for player in &mut room.players {
                player.score.turn = 0;
                player.is_drawer = false;
            }
            let idx = room.next_drawer % room.players.len();
            room.players[idx].is_drawer = true;
            room.next_drawer = idx + 1;
            room.word_choices = state.words.pick(rules.word_choices);
            let drawer = room.players[idx].name.clone();
            room.send_to(
                &drawer,
                ServerMessage::ChooseWord {
                    words: room.word_choices.clone(),
                },
            );
            Some((rules.choosing_word, TurnState::Drawing))
        }
        TurnState::Drawing => {
            // Reached by choice or by the choosing timer running out, in
            // which case a word is drawn from the offer at random.
            if room.current_word.is_none() {
                room.current_word = room
                    .word_choices
                    .choose(&mut rand::thread_rng())
                    .cloned();
            }
            room.word_choices.clear();
            if let (Some(idx), Some(word)) = (room.drawer_index(), room.current_word.clone()) {
                let drawer = room.players[idx].name.clone();
                room.send_to(&drawer, ServerMessage::DrawWord { word });
            }
            Some((rules.drawing, TurnState::EndOfTurn))
        }
        TurnState::EndOfTurn => {
            // No drawer score when the drawer left mid-turn; the inheritor
            // keeps whatever guess score they already earned.
            if !room.drawer_left {
                let turn_scores: Vec<u32> = room.players.iter().map(|p| p.score.turn).collect();
                if let Some(idx) = room.drawer_index() {
                    room.players[idx].score.turn = score::drawer_score(&turn_scores);
                }
            }
            room.drawer_left = false;
            room.canvas_data = serde_json::Value::Null;
            room.current_word = None;
            Some((rules.end_of_turn, TurnState::ShowTurnScore))
        }
        TurnState::ShowTurnScore => {
            for player in &mut room.players {
                player.score.total += player.score.turn;
            }
            let drawer = room.drawer_index();
            let last_turn_of_round = drawer.is_none_or(|idx| idx + 1 >= room.players.len());
            let branch = if last_turn_of_round && room.round >= room.max_rounds {
                TurnState::ShowGameScore
            } else if last_turn_of_round {
                TurnState::StartOfRound
            } else {
                TurnState::ChoosingWord
            };
            if let Some(idx) = drawer {
                room.players[idx].is_drawer = false;
                room.next_drawer = idx + 1;
            }
            Some((rules.show_turn_score, branch))
        }
        TurnState::ShowGameScore => {
            info!(room_id = %room.id, "Game finished.");
            None
        }
    };

    if let Some((duration, to)) = schedule {
        timer::arm(state, room, duration, to);
    }
    room.broadcast_state();
}
