//! Aggregate access for games and their nested collections.
//!
//! Every write follows the same cycle: load the game, apply a pure mutation to the
//! loaded copy, then replace the stored document conditionally on the revision
//! that was loaded. A lost race restarts the cycle from a fresh load.

use std::{sync::Arc, time::SystemTime};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    dao::{
        collections::{
            ItemOptions, NestedCollection, NestedItem, find_item, merge_matching,
            remove_matching,
        },
        drafts::{GameChanges, NewGame},
        game_store::GameStore,
        models::{
            BadgeEntity, CategoryEntity, GameEntity, GameId, ItemId, MissionEntity, UserId,
        },
        query::{GameFilter, Page, PageRequest},
        storage::StorageError,
    },
};

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures surfaced by [`GameRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("game `{0}` not found")]
    NotFound(GameId),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for RepositoryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Missing { id } => RepositoryError::NotFound(id),
            StorageError::RevisionConflict { id, .. } => {
                RepositoryError::Conflict(format!("game `{id}` was modified concurrently"))
            }
            err @ StorageError::EmailTaken { .. } => RepositoryError::Conflict(err.to_string()),
            other => RepositoryError::Storage(other),
        }
    }
}

/// Repository for game aggregates on top of a [`GameStore`].
#[derive(Clone)]
pub struct GameRepository {
    store: Arc<dyn GameStore>,
    config: AppConfig,
}

impl GameRepository {
    pub fn new(store: Arc<dyn GameStore>, config: AppConfig) -> Self {
        Self { store, config }
    }

    fn item_options(&self) -> ItemOptions {
        ItemOptions {
            hash_length: self.config.hash_length,
        }
    }

    /// Create a game owned by `actor`.
    pub async fn create(
        &self,
        draft: NewGame,
        actor: Option<&UserId>,
    ) -> RepositoryResult<GameEntity> {
        let actor = actor.ok_or(RepositoryError::Unauthorized(
            "an acting user is required to create a game",
        ))?;
        if let Some(email) = &draft.email {
            self.ensure_email_free(email, None).await?;
        }

        let options = self.item_options();
        let now = SystemTime::now();
        let game = GameEntity {
            id: GameId::new(),
            revision: 0,
            name: draft.name.trim().to_owned(),
            email: draft.email,
            desc: draft.desc,
            owners: vec![actor.clone()],
            settings: draft.settings.unwrap_or_default(),
            badges: draft
                .badges
                .into_iter()
                .map(|badge| BadgeEntity::create(badge, &options))
                .collect(),
            missions: draft
                .missions
                .into_iter()
                .map(|mission| MissionEntity::create(mission, &options))
                .collect(),
            players: Vec::new(),
            categories: draft
                .categories
                .into_iter()
                .map(|category| CategoryEntity::create(category, &options))
                .collect(),
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_game(game.clone()).await?;
        debug!(game_id = %game.id, owner = %actor, "game created");
        Ok(game)
    }

    /// One page of games matching `filter`.
    pub async fn query(
        &self,
        filter: GameFilter,
        request: PageRequest,
    ) -> RepositoryResult<Page<GameEntity>> {
        Ok(self.store.query_games(filter, request).await?)
    }

    pub async fn get_by_id(&self, id: GameId) -> RepositoryResult<Option<GameEntity>> {
        Ok(self.store.find_game(id).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> RepositoryResult<Option<GameEntity>> {
        Ok(self.store.find_game_by_email(email.to_owned()).await?)
    }

    /// Games listing `owner` among their owners, oldest first.
    pub async fn get_by_owner(&self, owner: &UserId) -> RepositoryResult<Vec<GameEntity>> {
        Ok(self.store.find_games_by_owner(owner.clone()).await?)
    }

    /// Apply `changes` to a game owned by `actor`.
    pub async fn update(
        &self,
        actor: Option<&UserId>,
        id: GameId,
        changes: GameChanges,
    ) -> RepositoryResult<GameEntity> {
        let game = self.load(id).await?;
        ensure_owner(&game, actor)?;
        if let Some(email) = changes.requested_email() {
            self.ensure_email_free(email, Some(id)).await?;
        }

        let options = self.item_options();
        self.modify(id, |game| {
            ensure_owner(game, actor)?;
            apply_changes(game, changes.clone(), &options);
            Ok(())
        })
        .await
    }

    /// Remove a game owned by `actor`, returning its last stored state.
    pub async fn delete(
        &self,
        actor: Option<&UserId>,
        id: GameId,
    ) -> RepositoryResult<GameEntity> {
        let game = self.load(id).await?;
        ensure_owner(&game, actor)?;

        if !self.store.delete_game(id).await? {
            return Err(RepositoryError::NotFound(id));
        }
        debug!(game_id = %id, "game deleted");
        Ok(game)
    }

    /// Append a new entry built from `draft` to collection `C`.
    pub async fn create_item<C: NestedCollection>(
        &self,
        game_id: GameId,
        draft: <C::Item as NestedItem>::Draft,
    ) -> RepositoryResult<GameEntity> {
        self.push_item::<C>(Access::Open, game_id, draft).await
    }

    /// Like [`create_item`](Self::create_item), for an owner of the game only.
    pub async fn create_item_as<C: NestedCollection>(
        &self,
        actor: Option<&UserId>,
        game_id: GameId,
        draft: <C::Item as NestedItem>::Draft,
    ) -> RepositoryResult<GameEntity> {
        self.push_item::<C>(Access::Owner(actor), game_id, draft)
            .await
    }

    /// Entry `item_id` of collection `C`, if present.
    pub async fn get_item<C: NestedCollection>(
        &self,
        game_id: GameId,
        item_id: ItemId,
    ) -> RepositoryResult<Option<C::Item>> {
        let game = self.load(game_id).await?;
        Ok(find_item(C::items(&game), item_id).cloned())
    }

    /// Every entry of collection `C`, in stored order.
    pub async fn list_items<C: NestedCollection>(
        &self,
        game_id: GameId,
    ) -> RepositoryResult<Vec<C::Item>> {
        let game = self.load(game_id).await?;
        Ok(C::items(&game).to_vec())
    }

    /// Merge `changes` into every entry of `C` carrying `item_id`.
    pub async fn update_item<C: NestedCollection>(
        &self,
        game_id: GameId,
        item_id: ItemId,
        changes: <C::Item as NestedItem>::Changes,
    ) -> RepositoryResult<GameEntity> {
        self.merge_item::<C>(Access::Open, game_id, item_id, changes)
            .await
    }

    /// Like [`update_item`](Self::update_item), for an owner of the game only.
    pub async fn update_item_as<C: NestedCollection>(
        &self,
        actor: Option<&UserId>,
        game_id: GameId,
        item_id: ItemId,
        changes: <C::Item as NestedItem>::Changes,
    ) -> RepositoryResult<GameEntity> {
        self.merge_item::<C>(Access::Owner(actor), game_id, item_id, changes)
            .await
    }

    /// Drop every entry of `C` carrying `item_id`. Removing an absent entry is a no-op.
    pub async fn delete_item<C: NestedCollection>(
        &self,
        game_id: GameId,
        item_id: ItemId,
    ) -> RepositoryResult<GameEntity> {
        self.remove_item::<C>(Access::Open, game_id, item_id).await
    }

    /// Like [`delete_item`](Self::delete_item), for an owner of the game only.
    pub async fn delete_item_as<C: NestedCollection>(
        &self,
        actor: Option<&UserId>,
        game_id: GameId,
        item_id: ItemId,
    ) -> RepositoryResult<GameEntity> {
        self.remove_item::<C>(Access::Owner(actor), game_id, item_id)
            .await
    }

    async fn push_item<C: NestedCollection>(
        &self,
        access: Access<'_>,
        game_id: GameId,
        draft: <C::Item as NestedItem>::Draft,
    ) -> RepositoryResult<GameEntity> {
        let options = self.item_options();
        self.modify(game_id, |game| {
            access.check(game)?;
            C::items_mut(game).push(C::Item::create(draft.clone(), &options));
            Ok(())
        })
        .await
    }

    async fn merge_item<C: NestedCollection>(
        &self,
        access: Access<'_>,
        game_id: GameId,
        item_id: ItemId,
        changes: <C::Item as NestedItem>::Changes,
    ) -> RepositoryResult<GameEntity> {
        self.modify(game_id, |game| {
            access.check(game)?;
            let matched = merge_matching(C::items_mut(game), item_id, &changes);
            if matched == 0 {
                debug!(%game_id, %item_id, collection = C::NAME, "update matched no entry");
            }
            Ok(())
        })
        .await
    }

    async fn remove_item<C: NestedCollection>(
        &self,
        access: Access<'_>,
        game_id: GameId,
        item_id: ItemId,
    ) -> RepositoryResult<GameEntity> {
        self.modify(game_id, |game| {
            access.check(game)?;
            remove_matching(C::items_mut(game), item_id);
            Ok(())
        })
        .await
    }

    async fn load(&self, id: GameId) -> RepositoryResult<GameEntity> {
        self.store
            .find_game(id)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn ensure_email_free(
        &self,
        email: &str,
        exclude: Option<GameId>,
    ) -> RepositoryResult<()> {
        if self.store.email_taken(email.to_owned(), exclude).await? {
            return Err(RepositoryError::Conflict(format!(
                "email `{email}` is already used by another game"
            )));
        }
        Ok(())
    }

    /// Load, mutate and conditionally replace a game, retrying when another writer
    /// got in between. `mutate` runs once per attempt on a fresh copy.
    async fn modify<F>(&self, id: GameId, mut mutate: F) -> RepositoryResult<GameEntity>
    where
        F: FnMut(&mut GameEntity) -> RepositoryResult<()>,
    {
        let attempts = self.config.max_write_attempts.max(1);
        for attempt in 1..=attempts {
            let mut game = self.load(id).await?;
            mutate(&mut game)?;
            game.updated_at = SystemTime::now();

            match self.store.replace_game(game).await {
                Ok(stored) => return Ok(stored),
                Err(StorageError::RevisionConflict { expected, .. }) => {
                    warn!(
                        game_id = %id,
                        attempt,
                        expected,
                        "concurrent write detected; reloading game"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(RepositoryError::Conflict(format!(
            "game `{id}` kept changing; gave up after {attempts} attempt(s)"
        )))
    }
}

/// Who may perform a nested write.
#[derive(Clone, Copy)]
enum Access<'a> {
    Open,
    Owner(Option<&'a UserId>),
}

impl Access<'_> {
    fn check(self, game: &GameEntity) -> RepositoryResult<()> {
        match self {
            Access::Open => Ok(()),
            Access::Owner(actor) => ensure_owner(game, actor),
        }
    }
}

fn ensure_owner(game: &GameEntity, actor: Option<&UserId>) -> RepositoryResult<()> {
    match actor {
        None => Err(RepositoryError::Unauthorized("an acting user is required")),
        Some(user) if game.is_owned_by(user) => Ok(()),
        Some(_) => Err(RepositoryError::Unauthorized(
            "only an owner of the game may modify it",
        )),
    }
}

fn apply_changes(game: &mut GameEntity, changes: GameChanges, options: &ItemOptions) {
    if let Some(name) = changes.name {
        game.name = name.trim().to_owned();
    }
    if let Some(email) = changes.email {
        if email != game.email {
            game.is_email_verified = false;
        }
        game.email = email;
    }
    if let Some(desc) = changes.desc {
        game.desc = desc;
    }
    if let Some(owners) = changes.owners {
        game.owners = owners;
    }
    if let Some(settings) = changes.settings {
        game.settings = settings;
    }
    if let Some(categories) = changes.categories {
        game.categories = categories
            .into_iter()
            .map(|category| CategoryEntity::create(category, options))
            .collect();
    }
    if let Some(badges) = changes.badges {
        game.badges = badges
            .into_iter()
            .map(|badge| BadgeEntity::create(badge, options))
            .collect();
    }
    if let Some(missions) = changes.missions {
        game.missions = missions
            .into_iter()
            .map(|mission| MissionEntity::create(mission, options))
            .collect();
    }
}
