use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use super::error::MongoDaoError;
use crate::dao::models::{
    BadgeEntity, CategoryEntity, GameEntity, GameId, MissionEntity, PlayerEntity, Settings, UserId,
};

/// Game aggregate as stored in the `games` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    revision: i64,
    name: String,
    email: Option<String>,
    desc: Option<String>,
    owners: Vec<UserId>,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    badges: Vec<BadgeEntity>,
    #[serde(default)]
    missions: Vec<MissionEntity>,
    #[serde(default)]
    players: Vec<PlayerEntity>,
    #[serde(default)]
    categories: Vec<CategoryEntity>,
    #[serde(default)]
    is_email_verified: bool,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id.to_string(),
            revision: value.revision as i64,
            name: value.name,
            email: value.email,
            desc: value.desc,
            owners: value.owners,
            settings: value.settings,
            badges: value.badges,
            missions: value.missions,
            players: value.players,
            categories: value.categories,
            is_email_verified: value.is_email_verified,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> Result<Self, Self::Error> {
        let id = value
            .id
            .parse::<GameId>()
            .map_err(|source| MongoDaoError::InvalidDocumentId {
                id: value.id.clone(),
                source,
            })?;

        Ok(Self {
            id,
            revision: value.revision.max(0) as u64,
            name: value.name,
            email: value.email,
            desc: value.desc,
            owners: value.owners,
            settings: value.settings,
            badges: value.badges,
            missions: value.missions,
            players: value.players,
            categories: value.categories,
            is_email_verified: value.is_email_verified,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

pub fn doc_id(id: GameId) -> Document {
    doc! { "_id": id.to_string() }
}
