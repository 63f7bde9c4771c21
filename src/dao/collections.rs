//! Nested collections embedded in a game aggregate.
//!
//! Badges, missions, players and categories share one shape: they live in a vector
//! on [`GameEntity`], are created from a draft, merged with a shallow patch and
//! removed by filtering. [`NestedCollection`] selects the vector, [`NestedItem`]
//! knows how to build and patch one entry. Every function here is pure; persisting
//! the aggregate is the repository's job.

use std::time::SystemTime;

use rand::{Rng, distr::Alphanumeric};

use crate::dao::{
    drafts::{
        BadgeChanges, CategoryChanges, MissionChanges, NewBadge, NewCategory, NewMission,
        NewPlayer, PlayerChanges,
    },
    models::{
        BadgeEntity, CategoryEntity, DEFAULT_START_LEVEL, GameEntity, ItemId, MissionEntity,
        PlayerEntity,
    },
};

/// Entity that can be stored in a nested collection.
pub trait NestedItem: Clone + Send + Sync + 'static {
    /// Draft used to create the entity.
    type Draft: Clone + Send + 'static;
    /// Shallow patch merged into the entity.
    type Changes: Clone + Send + 'static;

    /// Build a new entity with a fresh identifier.
    fn create(draft: Self::Draft, options: &ItemOptions) -> Self;
    /// Identifier of the entity within its game.
    fn id(&self) -> ItemId;
    /// Overwrite the fields present in `changes`, leaving the others untouched.
    fn merge(&mut self, changes: Self::Changes);
}

/// Selects one nested vector of a game.
pub trait NestedCollection: Send + Sync + 'static {
    /// Entity stored in the collection.
    type Item: NestedItem;
    /// Plural name, used as the route segment and in messages.
    const NAME: &'static str;
    /// Singular name, used in messages.
    const SINGULAR: &'static str;

    /// Borrow the collection.
    fn items(game: &GameEntity) -> &[Self::Item];
    /// Borrow the collection mutably.
    fn items_mut(game: &mut GameEntity) -> &mut Vec<Self::Item>;
}

/// Knobs used when building new entities.
#[derive(Debug, Clone, Copy)]
pub struct ItemOptions {
    /// Length of the generated `hash` token.
    pub hash_length: usize,
}

/// Badges of a game.
pub struct Badges;
/// Missions of a game.
pub struct Missions;
/// Players of a game.
pub struct Players;
/// Categories of a game.
pub struct Categories;

impl NestedCollection for Badges {
    type Item = BadgeEntity;
    const NAME: &'static str = "badges";
    const SINGULAR: &'static str = "badge";

    fn items(game: &GameEntity) -> &[BadgeEntity] {
        &game.badges
    }

    fn items_mut(game: &mut GameEntity) -> &mut Vec<BadgeEntity> {
        &mut game.badges
    }
}

impl NestedCollection for Missions {
    type Item = MissionEntity;
    const NAME: &'static str = "missions";
    const SINGULAR: &'static str = "mission";

    fn items(game: &GameEntity) -> &[MissionEntity] {
        &game.missions
    }

    fn items_mut(game: &mut GameEntity) -> &mut Vec<MissionEntity> {
        &mut game.missions
    }
}

impl NestedCollection for Players {
    type Item = PlayerEntity;
    const NAME: &'static str = "players";
    const SINGULAR: &'static str = "player";

    fn items(game: &GameEntity) -> &[PlayerEntity] {
        &game.players
    }

    fn items_mut(game: &mut GameEntity) -> &mut Vec<PlayerEntity> {
        &mut game.players
    }
}

impl NestedCollection for Categories {
    type Item = CategoryEntity;
    const NAME: &'static str = "categories";
    const SINGULAR: &'static str = "category";

    fn items(game: &GameEntity) -> &[CategoryEntity] {
        &game.categories
    }

    fn items_mut(game: &mut GameEntity) -> &mut Vec<CategoryEntity> {
        &mut game.categories
    }
}

/// Find the first entry carrying `id`.
pub fn find_item<I: NestedItem>(items: &[I], id: ItemId) -> Option<&I> {
    items.iter().find(|item| item.id() == id)
}

/// Merge `changes` into every entry carrying `id`; returns how many entries matched.
pub fn merge_matching<I: NestedItem>(items: &mut [I], id: ItemId, changes: &I::Changes) -> usize {
    let mut matched = 0;
    for item in items.iter_mut().filter(|item| item.id() == id) {
        item.merge(changes.clone());
        matched += 1;
    }
    matched
}

/// Drop every entry carrying `id`; returns how many entries were removed.
pub fn remove_matching<I: NestedItem>(items: &mut Vec<I>, id: ItemId) -> usize {
    let before = items.len();
    items.retain(|item| item.id() != id);
    before - items.len()
}

/// Generate the opaque token stored in badge and mission `hash` fields.
pub fn random_hash(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

impl NestedItem for BadgeEntity {
    type Draft = NewBadge;
    type Changes = BadgeChanges;

    fn create(draft: NewBadge, options: &ItemOptions) -> Self {
        let now = SystemTime::now();
        Self {
            id: ItemId::new(),
            name: draft.name.trim().to_owned(),
            categories: draft.categories,
            hash: random_hash(options.hash_length),
            desc: draft.desc,
            url: draft.url,
            data: draft.data,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> ItemId {
        self.id
    }

    fn merge(&mut self, changes: BadgeChanges) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_owned();
        }
        if let Some(desc) = changes.desc {
            self.desc = desc;
        }
        if let Some(url) = changes.url {
            self.url = url;
        }
        if let Some(categories) = changes.categories {
            self.categories = categories;
        }
        if let Some(data) = changes.data {
            self.data = data;
        }
        self.updated_at = SystemTime::now();
    }
}

impl NestedItem for MissionEntity {
    type Draft = NewMission;
    type Changes = MissionChanges;

    fn create(draft: NewMission, options: &ItemOptions) -> Self {
        let now = SystemTime::now();
        Self {
            id: ItemId::new(),
            name: draft.name,
            title: draft.title,
            hash: random_hash(options.hash_length),
            desc: draft.desc,
            data: draft.data,
            statement: draft.statement,
            tasks: draft.tasks,
            gain: draft.gain,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> ItemId {
        self.id
    }

    fn merge(&mut self, changes: MissionChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(desc) = changes.desc {
            self.desc = desc;
        }
        if let Some(data) = changes.data {
            self.data = data;
        }
        if let Some(statement) = changes.statement {
            self.statement = statement;
        }
        if let Some(tasks) = changes.tasks {
            self.tasks = tasks;
        }
        if let Some(gain) = changes.gain {
            self.gain = gain;
        }
        self.updated_at = SystemTime::now();
    }
}

impl NestedItem for PlayerEntity {
    type Draft = NewPlayer;
    type Changes = PlayerChanges;

    fn create(draft: NewPlayer, _options: &ItemOptions) -> Self {
        let now = SystemTime::now();
        Self {
            id: ItemId::new(),
            user: draft.user,
            nick: draft.nick.trim().to_owned(),
            points: draft.points,
            xp: draft.xp,
            level: draft.level.unwrap_or(DEFAULT_START_LEVEL),
            badges: draft.badges,
            available_missions: draft.available_missions,
            finish_missions: draft.finish_missions,
            inprogress_missions: draft.inprogress_missions,
            data: draft.data,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> ItemId {
        self.id
    }

    fn merge(&mut self, changes: PlayerChanges) {
        if let Some(user) = changes.user {
            self.user = user;
        }
        if let Some(nick) = changes.nick {
            self.nick = nick.trim().to_owned();
        }
        if let Some(points) = changes.points {
            self.points = points;
        }
        if let Some(xp) = changes.xp {
            self.xp = xp;
        }
        if let Some(level) = changes.level {
            self.level = level;
        }
        if let Some(badges) = changes.badges {
            self.badges = badges;
        }
        if let Some(missions) = changes.available_missions {
            self.available_missions = missions;
        }
        if let Some(missions) = changes.finish_missions {
            self.finish_missions = missions;
        }
        if let Some(missions) = changes.inprogress_missions {
            self.inprogress_missions = missions;
        }
        if let Some(data) = changes.data {
            self.data = data;
        }
        self.updated_at = SystemTime::now();
    }
}

impl NestedItem for CategoryEntity {
    type Draft = NewCategory;
    type Changes = CategoryChanges;

    fn create(draft: NewCategory, _options: &ItemOptions) -> Self {
        let now = SystemTime::now();
        Self {
            id: ItemId::new(),
            name: draft.name.trim().to_owned(),
            desc: draft.desc,
            data: draft.data,
            created_at: now,
            updated_at: now,
        }
    }

    fn id(&self) -> ItemId {
        self.id
    }

    fn merge(&mut self, changes: CategoryChanges) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_owned();
        }
        if let Some(desc) = changes.desc {
            self.desc = desc;
        }
        if let Some(data) = changes.data {
            self.data = data;
        }
        self.updated_at = SystemTime::now();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const OPTIONS: ItemOptions = ItemOptions { hash_length: 32 };

    fn badge(name: &str) -> BadgeEntity {
        BadgeEntity::create(
            serde_json::from_value(json!({ "name": name, "desc": "d" })).unwrap(),
            &OPTIONS,
        )
    }

    #[test]
    fn created_badges_get_distinct_ids_and_hashes() {
        let first = badge("First Blood");
        let second = badge("First Blood");
        assert_ne!(first.id, second.id);
        assert_ne!(first.hash, second.hash);
        assert_eq!(first.hash.len(), 32);
        assert!(first.hash.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn merge_only_touches_matching_entry() {
        let mut items = vec![badge("a"), badge("b"), badge("c")];
        let untouched = items.clone();
        let target = items[1].id;

        let changes: BadgeChanges = serde_json::from_value(json!({ "desc": "updated" })).unwrap();
        assert_eq!(merge_matching(&mut items, target, &changes), 1);

        assert_eq!(items[1].desc.as_deref(), Some("updated"));
        assert_eq!(items[1].name, "b");
        assert_eq!(items[0], untouched[0]);
        assert_eq!(items[2], untouched[2]);
    }

    #[test]
    fn merge_replaces_data_bag_wholesale() {
        let mut items = vec![BadgeEntity::create(
            serde_json::from_value(json!({ "name": "b", "data": { "a": 1, "b": 2 } })).unwrap(),
            &OPTIONS,
        )];
        let id = items[0].id;

        let changes: BadgeChanges =
            serde_json::from_value(json!({ "data": { "c": 3 } })).unwrap();
        merge_matching(&mut items, id, &changes);

        assert_eq!(items[0].data.len(), 1);
        assert_eq!(items[0].data["c"], json!(3));
    }

    #[test]
    fn merge_with_unknown_id_is_a_no_op() {
        let mut items = vec![badge("a")];
        let before = items.clone();
        let changes: BadgeChanges = serde_json::from_value(json!({ "name": "z" })).unwrap();
        assert_eq!(merge_matching(&mut items, ItemId::new(), &changes), 0);
        assert_eq!(items, before);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut items = vec![badge("a"), badge("b")];
        let target = items[0].id;

        assert_eq!(remove_matching(&mut items, target), 1);
        assert_eq!(items.len(), 1);
        assert!(find_item(&items, target).is_none());

        assert_eq!(remove_matching(&mut items, target), 0);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn player_defaults_to_first_level() {
        let player = PlayerEntity::create(
            serde_json::from_value(json!({ "nick": "neo" })).unwrap(),
            &OPTIONS,
        );
        assert_eq!(player.level, DEFAULT_START_LEVEL);
        assert_eq!(player.points, 0);
    }

    #[test]
    fn explicit_null_clears_player_user() {
        let mut player = PlayerEntity::create(
            serde_json::from_value(json!({ "nick": "neo", "user": "u-42" })).unwrap(),
            &OPTIONS,
        );
        let id = player.id;
        let changes: PlayerChanges = serde_json::from_value(json!({ "user": null })).unwrap();
        merge_matching(std::slice::from_mut(&mut player), id, &changes);
        assert!(player.user.is_none());
        assert_eq!(player.nick, "neo");
    }
}
