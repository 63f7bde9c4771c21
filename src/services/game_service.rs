use tracing::info;

use crate::{
    dao::{
        drafts::{GameChanges, NewGame},
        models::{GameId, UserId},
    },
    dto::game::{GamePage, GameQueryParams, GameResponse},
    error::ServiceError,
    state::SharedState,
};

/// Create a game owned by the acting user.
pub async fn create_game(
    state: &SharedState,
    actor: Option<UserId>,
    draft: NewGame,
) -> Result<GameResponse, ServiceError> {
    let repository = state.repository().await?;
    let game = repository.create(draft, actor.as_ref()).await?;
    info!(game_id = %game.id, name = %game.name, "game created");
    Ok(game.into())
}

/// List games matching the query, one page at a time.
pub async fn query_games(
    state: &SharedState,
    params: GameQueryParams,
) -> Result<GamePage, ServiceError> {
    let repository = state.repository().await?;
    let (filter, request) = params.into_query(&state.config().pagination);
    let page = repository.query(filter, request).await?;
    Ok(page.into())
}

pub async fn get_game(state: &SharedState, id: GameId) -> Result<GameResponse, ServiceError> {
    let repository = state.repository().await?;
    repository
        .get_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))
}

pub async fn get_game_by_email(
    state: &SharedState,
    email: &str,
) -> Result<GameResponse, ServiceError> {
    let repository = state.repository().await?;
    repository
        .get_by_email(email)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("no game uses email `{email}`")))
}

/// Games the given user owns, oldest first.
pub async fn get_games_by_owner(
    state: &SharedState,
    owner: &str,
) -> Result<Vec<GameResponse>, ServiceError> {
    let owner = UserId::parse(owner)
        .ok_or_else(|| ServiceError::InvalidInput("user id must not be blank".into()))?;
    let repository = state.repository().await?;
    let games = repository.get_by_owner(&owner).await?;
    Ok(games.into_iter().map(Into::into).collect())
}

pub async fn update_game(
    state: &SharedState,
    actor: Option<UserId>,
    id: GameId,
    changes: GameChanges,
) -> Result<GameResponse, ServiceError> {
    let repository = state.repository().await?;
    let game = repository.update(actor.as_ref(), id, changes).await?;
    info!(game_id = %id, revision = game.revision, "game updated");
    Ok(game.into())
}

pub async fn delete_game(
    state: &SharedState,
    actor: Option<UserId>,
    id: GameId,
) -> Result<(), ServiceError> {
    let repository = state.repository().await?;
    let removed = repository.delete(actor.as_ref(), id).await?;
    info!(game_id = %id, name = %removed.name, "game deleted");
    Ok(())
}
