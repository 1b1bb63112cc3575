use crate::room::{Room, TurnRules};
use crate::words::WordList;
use drawman_shared::RoomId;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// The room registry. The outer lock is held only for lookup, insert and
/// remove; each room's `Mutex` is the serialization point for all of that
/// room's mutation, player-driven and timer-driven alike.
pub type Rooms = Arc<RwLock<HashMap<RoomId, Arc<Mutex<Room>>>>>;

#[derive(Clone)]
pub struct AppState {
    pub rooms: Rooms,
    pub words: Arc<WordList>,
    pub max_rounds: u32,
    pub rules: TurnRules,
}

impl AppState {
    pub fn new(words: WordList, max_rounds: u32, rules: TurnRules) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            words: Arc::new(words),
            max_rounds,
            rules,
        }
    }

    /// Create an empty room in the INACTIVE state.
    pub async fn create_room(&self, max_rounds: u32) -> (RoomId, Arc<Mutex<Room>>) {
        let room = Room::new(max_rounds, self.rules);
        let id = room.id.clone();
        let room = Arc::new(Mutex::new(room));
        self.rooms.write().await.insert(id.clone(), Arc::clone(&room));
        info!(room_id = %id, "Created room.");
        (id, room)
    }

    pub async fn room(&self, id: &RoomId) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(id).cloned()
    }

    pub async fn remove_room(&self, id: &RoomId) {
        if self.rooms.write().await.remove(id).is_some() {
            info!(room_id = %id, "Destroyed room.");
        }
    }
}
