//! Response projections of the nested collections.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::models::{
        BadgeEntity, CategoryEntity, DataBag, Gain, ItemId, MissionEntity, PlayerEntity,
        Statement, Task, UserId,
    },
    dto::format_system_time,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeResponse {
    pub id: ItemId,
    pub name: String,
    pub categories: Vec<ItemId>,
    pub hash: String,
    pub desc: Option<String>,
    pub url: Option<String>,
    #[schema(value_type = Object)]
    pub data: DataBag,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BadgeEntity> for BadgeResponse {
    fn from(badge: BadgeEntity) -> Self {
        Self {
            id: badge.id,
            name: badge.name,
            categories: badge.categories,
            hash: badge.hash,
            desc: badge.desc,
            url: badge.url,
            data: badge.data,
            created_at: format_system_time(badge.created_at),
            updated_at: format_system_time(badge.updated_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MissionResponse {
    pub id: ItemId,
    pub name: Option<String>,
    pub title: Option<String>,
    pub hash: String,
    pub desc: Option<String>,
    #[schema(value_type = Object)]
    pub data: DataBag,
    pub statement: Vec<Statement>,
    pub tasks: Vec<Task>,
    pub gain: Vec<Gain>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MissionEntity> for MissionResponse {
    fn from(mission: MissionEntity) -> Self {
        Self {
            id: mission.id,
            name: mission.name,
            title: mission.title,
            hash: mission.hash,
            desc: mission.desc,
            data: mission.data,
            statement: mission.statement,
            tasks: mission.tasks,
            gain: mission.gain,
            created_at: format_system_time(mission.created_at),
            updated_at: format_system_time(mission.updated_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: ItemId,
    pub user: Option<UserId>,
    pub nick: String,
    pub points: i64,
    pub xp: i64,
    pub level: u32,
    /// Badges earned by the player.
    pub badges: Vec<ItemId>,
    pub available_missions: Vec<ItemId>,
    pub finish_missions: Vec<ItemId>,
    pub inprogress_missions: Vec<ItemId>,
    #[schema(value_type = Object)]
    pub data: DataBag,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PlayerEntity> for PlayerResponse {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            user: player.user,
            nick: player.nick,
            points: player.points,
            xp: player.xp,
            level: player.level,
            badges: player.badges,
            available_missions: player.available_missions,
            finish_missions: player.finish_missions,
            inprogress_missions: player.inprogress_missions,
            data: player.data,
            created_at: format_system_time(player.created_at),
            updated_at: format_system_time(player.updated_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: ItemId,
    pub name: String,
    pub desc: Option<String>,
    #[schema(value_type = Object)]
    pub data: DataBag,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CategoryEntity> for CategoryResponse {
    fn from(category: CategoryEntity) -> Self {
        Self {
            id: category.id,
            name: category.name,
            desc: category.desc,
            data: category.data,
            created_at: format_system_time(category.created_at),
            updated_at: format_system_time(category.updated_at),
        }
    }
}
