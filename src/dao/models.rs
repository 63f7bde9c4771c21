use std::{fmt, str::FromStr, time::SystemTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Open-ended payload attached to several entities; keys keep their insertion order.
pub type DataBag = IndexMap<String, Value>;

/// Identifier of a game aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Allocate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for GameId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier of an entity nested inside a game (badge, mission, player, category).
///
/// Unique within its parent game and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Allocate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ItemId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Opaque identity of an external user, as handed over by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identity; blank values are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Borrow the raw identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declarative rule triple attached to missions and tasks, e.g. `(user, level, ">= 10")`.
///
/// Stored as-is; nothing evaluates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Statement {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub value: String,
}

/// Step of a mission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub statement: Vec<Statement>,
}

/// Reward granted when a mission completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Gain {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: DataBag,
}

/// Experience required to reach a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LevelStep {
    pub level: u32,
    pub xp: u64,
}

/// Leveling curve of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Levels {
    #[serde(default = "default_start_level")]
    pub start: u32,
    #[serde(default)]
    pub max: Option<u32>,
    #[serde(default)]
    pub stepxp: Vec<LevelStep>,
}

/// Level assigned to a game's players when nothing else is specified.
pub const DEFAULT_START_LEVEL: u32 = 1;

fn default_start_level() -> u32 {
    DEFAULT_START_LEVEL
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_LEVEL,
            max: None,
            stepxp: Vec::new(),
        }
    }
}

/// Who may discover a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Settings object embedded in every game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Settings {
    #[serde(default)]
    pub levels: Levels,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: DataBag,
}

/// Badge nested in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeEntity {
    pub id: ItemId,
    pub name: String,
    /// References into the owning game's categories.
    #[serde(default)]
    pub categories: Vec<ItemId>,
    /// Random opaque token generated at creation.
    pub hash: String,
    pub desc: Option<String>,
    /// Image URL.
    pub url: Option<String>,
    #[serde(default)]
    pub data: DataBag,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Mission nested in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionEntity {
    pub id: ItemId,
    pub name: Option<String>,
    pub title: Option<String>,
    /// Random opaque token generated at creation.
    pub hash: String,
    pub desc: Option<String>,
    #[serde(default)]
    pub data: DataBag,
    #[serde(default)]
    pub statement: Vec<Statement>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub gain: Vec<Gain>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Player enrolled in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntity {
    pub id: ItemId,
    /// External user behind this player, if any.
    pub user: Option<UserId>,
    pub nick: String,
    pub points: i64,
    pub xp: i64,
    pub level: u32,
    /// Badges earned by the player.
    #[serde(default)]
    pub badges: Vec<ItemId>,
    #[serde(default)]
    pub available_missions: Vec<ItemId>,
    #[serde(default)]
    pub finish_missions: Vec<ItemId>,
    #[serde(default)]
    pub inprogress_missions: Vec<ItemId>,
    #[serde(default)]
    pub data: DataBag,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Category used to group badges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntity {
    pub id: ItemId,
    pub name: String,
    pub desc: Option<String>,
    #[serde(default)]
    pub data: DataBag,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Aggregate game entity persisted by the storage layer as a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: GameId,
    /// Write counter maintained by the store; every successful replace bumps it.
    pub revision: u64,
    pub name: String,
    pub email: Option<String>,
    pub desc: Option<String>,
    /// Identities allowed to modify or delete the game, creator first.
    pub owners: Vec<UserId>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub badges: Vec<BadgeEntity>,
    #[serde(default)]
    pub missions: Vec<MissionEntity>,
    #[serde(default)]
    pub players: Vec<PlayerEntity>,
    #[serde(default)]
    pub categories: Vec<CategoryEntity>,
    #[serde(default)]
    pub is_email_verified: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// Whether `user` is listed among the owners.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owners.iter().any(|owner| owner == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_blank_values() {
        assert!(UserId::parse("").is_none());
        assert!(UserId::parse("   ").is_none());
        assert_eq!(UserId::parse(" u1 ").unwrap().as_str(), "u1");
    }

    #[test]
    fn item_id_round_trips_through_its_string_form() {
        let id = ItemId::new();
        let parsed: ItemId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ItemId>().is_err());
    }

    #[test]
    fn settings_fill_defaults_from_partial_json() {
        let settings: Settings =
            serde_json::from_value(serde_json::json!({ "type": "quest", "levels": { "max": 50 } }))
                .unwrap();
        assert_eq!(settings.kind.as_deref(), Some("quest"));
        assert_eq!(settings.levels.start, DEFAULT_START_LEVEL);
        assert_eq!(settings.levels.max, Some(50));
        assert_eq!(settings.visibility, Visibility::Public);
    }
}
