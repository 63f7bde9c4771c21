use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{GameEntity, GameId};

pub const GAME_PREFIX: &str = "game::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[allow(dead_code)]
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Game aggregate wrapped with CouchDB's bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: GameEntity,
}

impl CouchGameDocument {
    pub fn new(game: GameEntity, rev: Option<String>) -> Self {
        Self {
            id: game_doc_id(game.id),
            rev,
            game,
        }
    }

    pub fn into_entity(self) -> GameEntity {
        self.game
    }
}

pub fn game_doc_id(id: GameId) -> String {
    format!("{GAME_PREFIX}{id}")
}
