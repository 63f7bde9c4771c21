use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    config::PaginationConfig,
    dao::{
        models::{GameEntity, GameId, Settings, UserId},
        query::{GameFilter, Page, PageRequest},
    },
    dto::{
        format_system_time,
        items::{BadgeResponse, CategoryResponse, MissionResponse, PlayerResponse},
    },
};

/// Full game aggregate as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: GameId,
    pub name: String,
    pub email: Option<String>,
    pub desc: Option<String>,
    pub owners: Vec<UserId>,
    pub settings: Settings,
    pub badges: Vec<BadgeResponse>,
    pub missions: Vec<MissionResponse>,
    pub players: Vec<PlayerResponse>,
    pub categories: Vec<CategoryResponse>,
    pub is_email_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameEntity> for GameResponse {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            name: game.name,
            email: game.email,
            desc: game.desc,
            owners: game.owners,
            settings: game.settings,
            badges: game.badges.into_iter().map(Into::into).collect(),
            missions: game.missions.into_iter().map(Into::into).collect(),
            players: game.players.into_iter().map(Into::into).collect(),
            categories: game.categories.into_iter().map(Into::into).collect(),
            is_email_verified: game.is_email_verified,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
        }
    }
}

/// One page of a game listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GamePage {
    pub results: Vec<GameResponse>,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_results: u64,
}

impl From<Page<GameEntity>> for GamePage {
    fn from(page: Page<GameEntity>) -> Self {
        let page = page.map(GameResponse::from);
        Self {
            results: page.results,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
            total_results: page.total_results,
        }
    }
}

/// Query string accepted by the game listing.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GameQueryParams {
    /// Exact game name.
    pub name: Option<String>,
    /// Role criterion; games carry no role so any value yields an empty page.
    pub role: Option<String>,
    /// Comma separated `field:(asc|desc)` list over name, email, createdAt, updatedAt.
    #[validate(length(max = 256))]
    pub sort_by: Option<String>,
    /// Page size; non-positive values fall back to the default.
    pub limit: Option<i64>,
    /// One-based page number; non-positive values fall back to 1.
    pub page: Option<i64>,
}

impl GameQueryParams {
    /// Split into the store filter and the resolved page request.
    pub fn into_query(self, pagination: &PaginationConfig) -> (GameFilter, PageRequest) {
        let request =
            PageRequest::resolve(self.sort_by.as_deref(), self.limit, self.page, pagination);
        let filter = GameFilter {
            name: self.name,
            role: self.role,
        };
        (filter, request)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    #[test]
    fn game_serializes_camel_case_with_rfc3339_timestamps() {
        let created = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let game = GameEntity {
            id: GameId::new(),
            revision: 4,
            name: "Quest".into(),
            email: None,
            desc: None,
            owners: vec![UserId::parse("u1").unwrap()],
            settings: Settings::default(),
            badges: Vec::new(),
            missions: Vec::new(),
            players: Vec::new(),
            categories: Vec::new(),
            is_email_verified: false,
            created_at: created,
            updated_at: created,
        };

        let value = serde_json::to_value(GameResponse::from(game)).unwrap();
        assert_eq!(value["createdAt"], "2023-11-14T22:13:20Z");
        assert_eq!(value["isEmailVerified"], false);
        assert_eq!(value["owners"], serde_json::json!(["u1"]));
        assert!(value.get("revision").is_none());
    }

    #[test]
    fn query_params_resolve_defaults() {
        let params = GameQueryParams {
            name: Some("Quest".into()),
            ..GameQueryParams::default()
        };
        let (filter, request) = params.into_query(&PaginationConfig::default());
        assert_eq!(filter.name.as_deref(), Some("Quest"));
        assert_eq!(request.limit, 10);
        assert_eq!(request.page, 1);
    }
}
