use crate::game;
use crate::room::{Room, TurnTimer};
use crate::state::AppState;
use drawman_shared::{RoomId, ServerMessage, TurnState};
use std::time::Duration;
use tokio::select;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Arm the room's single auto-advance. Any previously armed timer is
/// cancelled first, so the room never has two pending transitions. The
/// spawned task broadcasts the remaining seconds once per second, then hands
/// the expiry back to the state machine.
pub fn arm(state: &AppState, room: &mut Room, duration: Duration, next: TurnState) {
    room.cancel_timer();
    let generation = room.bump_timer_generation();
    let cancel = CancellationToken::new();
    let deadline = Instant::now() + duration;
    room.timer = Some(TurnTimer {
        deadline,
        next,
        generation,
        cancel: cancel.clone(),
    });
    tokio::spawn(run_countdown(
        state.clone(),
        room.id.clone(),
        deadline,
        generation,
        cancel,
    ));
}

async fn run_countdown(
    state: AppState,
    room_id: RoomId,
    deadline: Instant,
    generation: u64,
    cancel: CancellationToken,
) {
    loop {
        let now = Instant::now();
        if now >= deadline {
            game::fire_expiry(&state, &room_id, generation).await;
            return;
        }

        {
            // Stop quietly if the room is gone or the timer was replaced.
            let Some(room) = state.room(&room_id).await else {
                return;
            };
            let room = room.lock().await;
            match &room.timer {
                Some(timer) if timer.generation == generation => {}
                _ => return,
            }
            let remaining = deadline.saturating_duration_since(Instant::now()).as_secs();
            room.broadcast(&ServerMessage::Timer { time: remaining });
        }

        let next_tick = Instant::min(deadline, now + Duration::from_secs(1));
        select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep_until(next_tick) => {}
        }
    }
}
