//! Process-local game store, used for development and tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GameId, UserId},
    query::{GameFilter, Page, PageRequest, paginate},
    storage::{StorageError, StorageResult},
};

/// Game store keeping every aggregate in a concurrent map.
#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    games: Arc<DashMap<GameId, GameEntity>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Vec<GameEntity> {
        self.games.iter().map(|entry| entry.value().clone()).collect()
    }

    fn replace(&self, game: GameEntity) -> StorageResult<GameEntity> {
        let id = game.id;
        // The shard lock held by `get_mut` makes the revision check and the swap atomic.
        let Some(mut slot) = self.games.get_mut(&id) else {
            return Err(StorageError::Missing { id });
        };
        if slot.revision != game.revision {
            return Err(StorageError::RevisionConflict {
                id,
                expected: game.revision,
            });
        }

        let mut stored = game;
        stored.revision += 1;
        *slot = stored.clone();
        Ok(stored)
    }
}

impl GameStore for InMemoryGameStore {
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.games.insert(game.id, game);
        Box::pin(async { Ok(()) })
    }

    fn replace_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let result = self.replace(game);
        Box::pin(async move { result })
    }

    fn delete_game(&self, id: GameId) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.games.remove(&id).is_some();
        Box::pin(async move { Ok(removed) })
    }

    fn find_game(&self, id: GameId) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let game = self.games.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(game) })
    }

    fn find_game_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let game = self
            .games
            .iter()
            .find(|entry| entry.email.as_deref() == Some(email.as_str()))
            .map(|entry| entry.value().clone());
        Box::pin(async move { Ok(game) })
    }

    fn find_games_by_owner(
        &self,
        owner: UserId,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let mut games = self
            .games
            .iter()
            .filter(|entry| entry.is_owned_by(&owner))
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        games.sort_by_key(|game| game.created_at);
        Box::pin(async move { Ok(games) })
    }

    fn email_taken(
        &self,
        email: String,
        exclude: Option<GameId>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let taken = self.games.iter().any(|entry| {
            entry.email.as_deref() == Some(email.as_str()) && Some(entry.id) != exclude
        });
        Box::pin(async move { Ok(taken) })
    }

    fn query_games(
        &self,
        filter: GameFilter,
        request: PageRequest,
    ) -> BoxFuture<'static, StorageResult<Page<GameEntity>>> {
        let page = paginate(self.snapshot(), &filter, &request);
        Box::pin(async move { Ok(page) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::Settings;

    fn game(email: Option<&str>) -> GameEntity {
        let now = SystemTime::now();
        GameEntity {
            id: GameId::new(),
            revision: 0,
            name: "Quest".into(),
            email: email.map(Into::into),
            desc: None,
            owners: vec![UserId::parse("u1").unwrap()],
            settings: Settings::default(),
            badges: Vec::new(),
            missions: Vec::new(),
            players: Vec::new(),
            categories: Vec::new(),
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn replace_bumps_revision_and_rejects_stale_writes() {
        let store = InMemoryGameStore::new();
        let original = game(None);
        store.insert_game(original.clone()).await.unwrap();

        let mut first = original.clone();
        first.name = "first".into();
        let stored = store.replace_game(first).await.unwrap();
        assert_eq!(stored.revision, 1);

        let mut stale = original;
        stale.name = "stale".into();
        let err = store.replace_game(stale).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::RevisionConflict { expected: 0, .. }
        ));

        let current = store.find_game(stored.id).await.unwrap().unwrap();
        assert_eq!(current.name, "first");
    }

    #[tokio::test]
    async fn replace_of_deleted_game_reports_missing() {
        let store = InMemoryGameStore::new();
        let game = game(None);
        store.insert_game(game.clone()).await.unwrap();
        assert!(store.delete_game(game.id).await.unwrap());
        assert!(!store.delete_game(game.id).await.unwrap());

        let err = store.replace_game(game).await.unwrap_err();
        assert!(matches!(err, StorageError::Missing { .. }));
    }

    #[tokio::test]
    async fn email_taken_ignores_excluded_game() {
        let store = InMemoryGameStore::new();
        let game = game(Some("quest@example.com"));
        store.insert_game(game.clone()).await.unwrap();

        assert!(
            store
                .email_taken("quest@example.com".into(), None)
                .await
                .unwrap()
        );
        assert!(
            !store
                .email_taken("quest@example.com".into(), Some(game.id))
                .await
                .unwrap()
        );
        assert!(
            !store
                .email_taken("other@example.com".into(), None)
                .await
                .unwrap()
        );
    }
}
