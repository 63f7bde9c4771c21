#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::{
    models::{GameEntity, GameId, UserId},
    query::{GameFilter, Page, PageRequest},
    storage::StorageResult,
};

/// Abstraction over the document store holding game aggregates.
///
/// A game is always read and written as one document. Writes are conditional on the
/// revision the caller loaded so concurrent read-modify-write cycles cannot silently
/// overwrite each other.
pub trait GameStore: Send + Sync {
    /// Persist a brand-new game as-is.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace a stored game if its revision still equals `game.revision`.
    ///
    /// Returns the stored document, whose revision has been bumped by one. Fails with
    /// `RevisionConflict` when another write happened in between and with `Missing`
    /// when the game has been deleted.
    fn replace_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Remove a game, reporting whether it existed.
    fn delete_game(&self, id: GameId) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_game(&self, id: GameId) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn find_game_by_email(
        &self,
        email: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn find_games_by_owner(
        &self,
        owner: UserId,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Whether a game other than `exclude` already uses `email`.
    ///
    /// Only MongoDB backs this with a unique index and reports `EmailTaken` on write;
    /// elsewhere two writers racing for the same email may both pass this check.
    fn email_taken(
        &self,
        email: String,
        exclude: Option<GameId>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn query_games(
        &self,
        filter: GameFilter,
        request: PageRequest,
    ) -> BoxFuture<'static, StorageResult<Page<GameEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
