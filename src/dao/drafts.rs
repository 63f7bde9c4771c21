//! Validated inputs accepted by the aggregate: creation drafts and shallow patches.
//!
//! Patch fields left out of the payload keep their current value. Clearable text
//! fields use a double option so an explicit `null` removes the stored value.

use serde::Deserialize;
use serde_with::rust::double_option;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::dao::models::{DataBag, Gain, ItemId, Settings, Statement, Task, UserId};

/// Payload creating a game.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewGame {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    #[validate(nested)]
    pub categories: Vec<NewCategory>,
    #[serde(default)]
    #[validate(nested)]
    pub badges: Vec<NewBadge>,
    #[serde(default)]
    #[validate(nested)]
    pub missions: Vec<NewMission>,
}

/// Shallow patch applied to a game.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct GameChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub desc: Option<Option<String>>,
    /// Replaces the owner list; must stay non-empty.
    #[serde(default)]
    pub owners: Option<Vec<UserId>>,
    #[serde(default)]
    pub settings: Option<Settings>,
    /// Replaces the whole collection; every entry gets a fresh identifier.
    #[serde(default)]
    pub categories: Option<Vec<NewCategory>>,
    /// Replaces the whole collection; every entry gets a fresh identifier.
    #[serde(default)]
    pub badges: Option<Vec<NewBadge>>,
    /// Replaces the whole collection; every entry gets a fresh identifier.
    #[serde(default)]
    pub missions: Option<Vec<NewMission>>,
}

impl GameChanges {
    /// New email requested by this patch, if it sets one.
    pub fn requested_email(&self) -> Option<&str> {
        self.email.as_ref().and_then(|email| email.as_deref())
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.desc.is_none()
            && self.owners.is_none()
            && self.settings.is_none()
            && self.categories.is_none()
            && self.badges.is_none()
            && self.missions.is_none()
    }
}

impl Validate for GameChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.is_empty() {
            errors.add("__all__", empty_patch());
        }

        if let Some(name) = &self.name {
            if let Err(err) = not_blank(name) {
                errors.add("name", err);
            }
        }

        if let Some(email) = self.requested_email() {
            if !email.validate_email() {
                errors.add("email", ValidationError::new("email"));
            }
        }

        if let Some(owners) = &self.owners {
            if owners.is_empty() {
                let mut err = ValidationError::new("owners_empty");
                err.message = Some("a game must keep at least one owner".into());
                errors.add("owners", err);
            }
        }

        for badge in self.badges.iter().flatten() {
            errors.merge_self("badges", badge.validate());
        }
        for category in self.categories.iter().flatten() {
            errors.merge_self("categories", category.validate());
        }
        for mission in self.missions.iter().flatten() {
            errors.merge_self("missions", mission.validate());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload creating a badge.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewBadge {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub categories: Vec<ItemId>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: DataBag,
}

/// Shallow patch applied to a badge.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BadgeChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub desc: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub url: Option<Option<String>>,
    #[serde(default)]
    pub categories: Option<Vec<ItemId>>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub data: Option<DataBag>,
}

impl Validate for BadgeChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.is_none()
            && self.desc.is_none()
            && self.url.is_none()
            && self.categories.is_none()
            && self.data.is_none()
        {
            errors.add("__all__", empty_patch());
        }
        if let Some(Err(err)) = self.name.as_deref().map(not_blank) {
            errors.add("name", err);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload creating a mission. At least one field must be provided.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewMission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: DataBag,
    #[serde(default)]
    pub statement: Vec<Statement>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub gain: Vec<Gain>,
}

impl Validate for NewMission {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let empty = self.name.is_none()
            && self.title.is_none()
            && self.desc.is_none()
            && self.data.is_empty()
            && self.statement.is_empty()
            && self.tasks.is_empty()
            && self.gain.is_empty();

        let mut errors = ValidationErrors::new();
        if empty {
            errors.add("__all__", empty_patch());
            return Err(errors);
        }
        Ok(())
    }
}

/// Shallow patch applied to a mission.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct MissionChanges {
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub desc: Option<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub data: Option<DataBag>,
    #[serde(default)]
    pub statement: Option<Vec<Statement>>,
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
    #[serde(default)]
    pub gain: Option<Vec<Gain>>,
}

impl Validate for MissionChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let empty = self.name.is_none()
            && self.title.is_none()
            && self.desc.is_none()
            && self.data.is_none()
            && self.statement.is_none()
            && self.tasks.is_none()
            && self.gain.is_none();

        let mut errors = ValidationErrors::new();
        if empty {
            errors.add("__all__", empty_patch());
            return Err(errors);
        }
        Ok(())
    }
}

/// Payload enrolling a player.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPlayer {
    #[serde(default)]
    pub user: Option<UserId>,
    #[validate(custom(function = "not_blank"))]
    pub nick: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub xp: i64,
    /// Defaults to the first level of the leveling curve.
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub badges: Vec<ItemId>,
    #[serde(default, alias = "avaibleMissions")]
    pub available_missions: Vec<ItemId>,
    #[serde(default)]
    pub finish_missions: Vec<ItemId>,
    #[serde(default)]
    pub inprogress_missions: Vec<ItemId>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: DataBag,
}

/// Shallow patch applied to a player.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlayerChanges {
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub user: Option<Option<UserId>>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub xp: Option<i64>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub badges: Option<Vec<ItemId>>,
    #[serde(default, alias = "avaibleMissions")]
    pub available_missions: Option<Vec<ItemId>>,
    #[serde(default)]
    pub finish_missions: Option<Vec<ItemId>>,
    #[serde(default)]
    pub inprogress_missions: Option<Vec<ItemId>>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub data: Option<DataBag>,
}

impl Validate for PlayerChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let empty = self.user.is_none()
            && self.nick.is_none()
            && self.points.is_none()
            && self.xp.is_none()
            && self.level.is_none()
            && self.badges.is_none()
            && self.available_missions.is_none()
            && self.finish_missions.is_none()
            && self.inprogress_missions.is_none()
            && self.data.is_none();
        if empty {
            errors.add("__all__", empty_patch());
        }
        if let Some(Err(err)) = self.nick.as_deref().map(not_blank) {
            errors.add("nick", err);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload creating a category.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewCategory {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: DataBag,
}

/// Shallow patch applied to a category.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CategoryChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub desc: Option<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub data: Option<DataBag>,
}

impl Validate for CategoryChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.is_none() && self.desc.is_none() && self.data.is_none() {
            errors.add("__all__", empty_patch());
        }
        if let Some(Err(err)) = self.name.as_deref().map(not_blank) {
            errors.add("name", err);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn empty_patch() -> ValidationError {
    let mut err = ValidationError::new("empty_body");
    err.message = Some("at least one field must be provided".into());
    err
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_patches_are_rejected() {
        let changes: GameChanges = serde_json::from_value(json!({})).unwrap();
        assert!(changes.validate().is_err());

        let changes: BadgeChanges = serde_json::from_value(json!({})).unwrap();
        assert!(changes.validate().is_err());

        let changes: PlayerChanges = serde_json::from_value(json!({})).unwrap();
        assert!(changes.validate().is_err());
    }

    #[test]
    fn explicit_null_clears_while_missing_keeps() {
        let changes: GameChanges = serde_json::from_value(json!({ "desc": null })).unwrap();
        assert_eq!(changes.desc, Some(None));
        assert_eq!(changes.email, None);
        assert!(changes.validate().is_ok());
    }

    #[test]
    fn game_patch_checks_email_format_and_owner_list() {
        let changes: GameChanges =
            serde_json::from_value(json!({ "email": "not-an-email" })).unwrap();
        assert!(changes.validate().is_err());

        let changes: GameChanges = serde_json::from_value(json!({ "owners": [] })).unwrap();
        assert!(changes.validate().is_err());

        let changes: GameChanges =
            serde_json::from_value(json!({ "email": "quest@example.com" })).unwrap();
        assert!(changes.validate().is_ok());
        assert_eq!(changes.requested_email(), Some("quest@example.com"));
    }

    #[test]
    fn new_game_requires_a_name() {
        let game: NewGame = serde_json::from_value(json!({ "name": "  " })).unwrap();
        assert!(game.validate().is_err());

        assert!(serde_json::from_value::<NewGame>(json!({ "desc": "no name" })).is_err());
    }

    #[test]
    fn unknown_fields_are_refused() {
        assert!(
            serde_json::from_value::<NewBadge>(json!({ "name": "b", "color": "red" })).is_err()
        );
    }

    #[test]
    fn player_accepts_legacy_mission_spelling() {
        let id = ItemId::new();
        let player: NewPlayer = serde_json::from_value(json!({
            "nick": "neo",
            "avaibleMissions": [id],
        }))
        .unwrap();
        assert_eq!(player.available_missions, vec![id]);
        assert!(player.validate().is_ok());
    }

    #[test]
    fn mission_needs_at_least_one_field() {
        let mission: NewMission = serde_json::from_value(json!({})).unwrap();
        assert!(mission.validate().is_err());

        let mission: NewMission = serde_json::from_value(json!({ "title": "Slay" })).unwrap();
        assert!(mission.validate().is_ok());
    }
}
