use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, doc_id},
};
use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GameId, UserId},
    query::{GameFilter, Page, PageRequest, SortDirection, SortField},
    storage::{StorageError, StorageResult},
};

const GAME_COLLECTION_NAME: &str = "games";
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Game store persisting each aggregate as one document in MongoDB.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

fn sort_document(request: &PageRequest) -> Document {
    let mut sort = Document::new();
    for key in &request.sort {
        let field = match key.field {
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        };
        let direction = match key.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        sort.insert(field, direction);
    }
    sort
}

fn filter_document(filter: &GameFilter) -> Document {
    let mut query = Document::new();
    if let Some(name) = &filter.name {
        query.insert("name", name.clone());
    }
    query
}

fn into_entities(documents: Vec<MongoGameDocument>) -> MongoResult<Vec<GameEntity>> {
    documents.into_iter().map(GameEntity::try_from).collect()
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        for (field, index) in game_indexes() {
            collection
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: GAME_COLLECTION_NAME,
                    index: field,
                    source,
                })?;
        }

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn insert_game(&self, game: GameEntity) -> StorageResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        self.collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| save_error(id, source))?;
        Ok(())
    }

    async fn replace_game(&self, game: GameEntity) -> StorageResult<GameEntity> {
        let id = game.id;
        let expected = game.revision;
        let mut stored = game;
        stored.revision = expected + 1;

        let collection = self.collection().await;
        let document: MongoGameDocument = stored.clone().into();
        let result = collection
            .replace_one(
                doc! { "_id": id.to_string(), "revision": expected as i64 },
                &document,
            )
            .await
            .map_err(|source| save_error(id, source))?;

        if result.matched_count > 0 {
            return Ok(stored);
        }

        let still_there = collection
            .count_documents(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;
        if still_there > 0 {
            Err(StorageError::RevisionConflict { id, expected })
        } else {
            Err(StorageError::Missing { id })
        }
    }

    async fn delete_game(&self, id: GameId) -> MongoResult<bool> {
        let result = self
            .collection()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn find_game(&self, id: GameId) -> MongoResult<Option<GameEntity>> {
        let document = self
            .collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        document.map(GameEntity::try_from).transpose()
    }

    async fn find_one_matching(&self, query: Document) -> MongoResult<Option<GameEntity>> {
        let document = self
            .collection()
            .await
            .find_one(query)
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;

        document.map(GameEntity::try_from).transpose()
    }

    async fn find_games_by_owner(&self, owner: UserId) -> MongoResult<Vec<GameEntity>> {
        let documents: Vec<MongoGameDocument> = self
            .collection()
            .await
            .find(doc! { "owners": owner.as_str() })
            .sort(doc! { "created_at": 1 })
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;

        into_entities(documents)
    }

    async fn email_taken(&self, email: String, exclude: Option<GameId>) -> MongoResult<bool> {
        let mut query = doc! { "email": email };
        if let Some(id) = exclude {
            query.insert("_id", doc! { "$ne": id.to_string() });
        }

        let count = self
            .collection()
            .await
            .count_documents(query)
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;
        Ok(count > 0)
    }

    async fn query_games(
        &self,
        filter: GameFilter,
        request: PageRequest,
    ) -> MongoResult<Page<GameEntity>> {
        if filter.role.is_some() {
            return Ok(Page::new(Vec::new(), &request, 0));
        }

        let collection = self.collection().await;
        let query = filter_document(&filter);
        let total = collection
            .count_documents(query.clone())
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;

        let documents: Vec<MongoGameDocument> = collection
            .find(query)
            .sort(sort_document(&request))
            .skip(request.offset())
            .limit(request.limit as i64)
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;

        Ok(Page::new(into_entities(documents)?, &request, total))
    }
}

impl GameStore for MongoGameStore {
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await })
    }

    fn replace_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.replace_game(game).await })
    }

    fn delete_game(&self, id: GameId) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn find_game(&self, id: GameId) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn find_game_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_one_matching(doc! { "email": email })
                .await
                .map_err(Into::into)
        })
    }

    fn find_games_by_owner(
        &self,
        owner: UserId,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_games_by_owner(owner).await.map_err(Into::into) })
    }

    fn email_taken(
        &self,
        email: String,
        exclude: Option<GameId>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.email_taken(email, exclude).await.map_err(Into::into) })
    }

    fn query_games(
        &self,
        filter: GameFilter,
        request: PageRequest,
    ) -> BoxFuture<'static, StorageResult<Page<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.query_games(filter, request).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

/// Indexes of the games collection; emails are unique among games that have one.
fn game_indexes() -> Vec<(&'static str, IndexModel)> {
    let plain = |field: &'static str, name: &str| {
        let mut keys = Document::new();
        keys.insert(field, 1);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(Some(name.to_owned())).build())
            .build();
        (field, index)
    };

    let email = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(
            IndexOptions::builder()
                .name(Some("game_email_unique_idx".to_owned()))
                .unique(Some(true))
                .partial_filter_expression(Some(doc! { "email": { "$type": "string" } }))
                .build(),
        )
        .build();

    vec![
        plain("name", "game_name_idx"),
        ("email", email),
        plain("owners", "game_owners_idx"),
    ]
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

fn save_error(id: GameId, source: MongoError) -> StorageError {
    if is_duplicate_key(&source) {
        StorageError::EmailTaken { id }
    } else {
        MongoDaoError::SaveGame { id, source }.into()
    }
}
