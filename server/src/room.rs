use drawman_shared::{
    ErrorKind, PlayerName, PlayerView, RoomId, RoomView, Score, ServerMessage, TurnState,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-player outbound channel. Sends are fire-and-forget; a closed receiver
/// never aborts delivery to the rest of the room.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Durations of the timed turn phases plus the size of the word offer.
#[derive(Debug, Clone, Copy)]
pub struct TurnRules {
    pub start_of_round: Duration,
    pub choosing_word: Duration,
    pub drawing: Duration,
    pub end_of_turn: Duration,
    pub show_turn_score: Duration,
    pub word_choices: usize,
}

impl Default for TurnRules {
    fn default() -> Self {
        Self {
            start_of_round: Duration::from_secs(2),
            choosing_word: Duration::from_secs(1500),
            drawing: Duration::from_secs(1200),
            end_of_turn: Duration::from_secs(2),
            show_turn_score: Duration::from_secs(5),
            word_choices: 9,
        }
    }
}

/// The armed auto-advance for a room. Owned exclusively by the room and
/// cancelled before any manual transition, so a stale fire can never
/// double-apply a transition.
pub struct TurnTimer {
    pub deadline: Instant,
    pub next: TurnState,
    pub generation: u64,
    pub cancel: CancellationToken,
}

pub struct Room {
    pub id: RoomId,
    /// Insertion order is turn order; stable except for removal.
    pub players: Vec<Player>,
    pub round: u32,
    pub max_rounds: u32,
    pub state: TurnState,
    /// Set only while drawing. Never serialized into the public view.
    pub current_word: Option<String>,
    /// Offered to the drawer while choosing; validates the later selection.
    pub word_choices: Vec<String>,
    /// Opaque snapshot owned by the drawing surface, passed through unchanged.
    pub canvas_data: serde_json::Value,
    /// Rotation cursor for the next drawer, taken modulo the roster length.
    pub next_drawer: usize,
    /// Set when the drawer disconnects mid-turn. The forced end of turn then
    /// skips the drawer score, since the player who drew is gone and the
    /// inheritor only holds the flag for the rotation.
    pub drawer_left: bool,
    pub timer: Option<TurnTimer>,
    timer_generation: u64,
    pub rules: TurnRules,
}

impl Room {
    pub fn new(max_rounds: u32, rules: TurnRules) -> Self {
        Self {
            id: Uuid::new_v4().to_string().parse().unwrap(),
            players: Vec::new(),
            round: 0,
            max_rounds,
            state: TurnState::Inactive,
            current_word: None,
            word_choices: Vec::new(),
            canvas_data: serde_json::Value::Null,
            next_drawer: 0,
            drawer_left: false,
            timer: None,
            timer_generation: 0,
            rules,
        }
    }

    pub fn is_name_taken(&self, name: &PlayerName) -> bool {
        self.players.iter().any(|p| &p.name == name)
    }

    pub fn add_player(&mut self, name: PlayerName, tx: PlayerSender) -> Result<(), ErrorKind> {
        if self.is_name_taken(&name) {
            return Err(ErrorKind::NameTaken);
        }
        self.players.push(Player {
            name,
            tx,
            is_drawer: false,
            score: Score::default(),
        });
        Ok(())
    }

    pub fn player_index(&self, name: &PlayerName) -> Option<usize> {
        self.players.iter().position(|p| &p.name == name)
    }

    pub fn drawer_index(&self) -> Option<usize> {
        self.players.iter().position(|p| p.is_drawer)
    }

    pub fn bump_timer_generation(&mut self) -> u64 {
        self.timer_generation += 1;
        self.timer_generation
    }

    /// Cancel the pending auto-advance and its countdown broadcast.
    /// Safe to call when nothing is armed.
    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
        }
    }

    pub fn seconds_remaining(&self) -> Option<u64> {
        self.timer
            .as_ref()
            .map(|t| t.deadline.saturating_duration_since(Instant::now()).as_secs())
    }

    /// Time left until the armed deadline; zero when nothing is armed.
    pub fn time_remaining(&self) -> Duration {
        self.timer
            .as_ref()
            .map(|t| t.deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Project the room into its broadcast-safe form. Fields are copied one
    /// by one: the current word, the word choices and the senders are simply
    /// not part of the view type.
    pub fn public_view(&self) -> RoomView {
        RoomView {
            id: self.id.clone(),
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    name: p.name.clone(),
                    is_drawer: p.is_drawer,
                    score: p.score,
                })
                .collect(),
            round: self.round,
            max_rounds: self.max_rounds,
            state: self.state,
            canvas_data: self.canvas_data.clone(),
            seconds_remaining: self.seconds_remaining(),
        }
    }

    pub fn broadcast(&self, msg: &ServerMessage) {
        for player in &self.players {
            let _ = player.tx.send(msg.clone());
        }
    }

    pub fn broadcast_state(&self) {
        self.broadcast(&ServerMessage::State {
            room: self.public_view(),
        });
    }

    pub fn send_to(&self, name: &PlayerName, msg: ServerMessage) {
        if let Some(player) = self.players.iter().find(|p| &p.name == name) {
            let _ = player.tx.send(msg);
        }
    }
}

pub struct Player {
    pub name: PlayerName,
    pub tx: PlayerSender,
    pub is_drawer: bool,
    pub score: Score,
}
