//! Storage keys used by the game.

use backstreet_core::types::PlayerId;

/// Session blob for the signed-in user.
pub const USER_KEY: &str = "user";

pub fn stamina_key(player_id: &PlayerId) -> String {
    format!("stamina_{player_id}")
}

pub fn members_key(player_id: &PlayerId) -> String {
    format!("members_{player_id}")
}

pub fn missions_key(player_id: &PlayerId) -> String {
    format!("missions_{player_id}")
}
