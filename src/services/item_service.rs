//! Operations on the nested collections of a game.
//!
//! Reads are open to anyone. Writes require the acting user to own the parent game,
//! checked against the same copy of the game the write is based on.

use tracing::info;

use crate::{
    dao::{
        collections::{NestedCollection, NestedItem},
        models::{GameId, ItemId, UserId},
    },
    dto::game::GameResponse,
    error::ServiceError,
    state::SharedState,
};

/// Append an entry to collection `C`; returns the whole game.
pub async fn create_item<C: NestedCollection>(
    state: &SharedState,
    actor: Option<UserId>,
    game_id: GameId,
    draft: <C::Item as NestedItem>::Draft,
) -> Result<GameResponse, ServiceError> {
    let repository = state.repository().await?;
    let game = repository
        .create_item_as::<C>(actor.as_ref(), game_id, draft)
        .await?;
    info!(%game_id, collection = C::NAME, "{} created", C::SINGULAR);
    Ok(game.into())
}

pub async fn list_items<C: NestedCollection>(
    state: &SharedState,
    game_id: GameId,
) -> Result<Vec<C::Item>, ServiceError> {
    let repository = state.repository().await?;
    Ok(repository.list_items::<C>(game_id).await?)
}

/// Entry `item_id` of collection `C`; absent entries are `NotFound`.
pub async fn get_item<C: NestedCollection>(
    state: &SharedState,
    game_id: GameId,
    item_id: ItemId,
) -> Result<C::Item, ServiceError> {
    let repository = state.repository().await?;
    repository
        .get_item::<C>(game_id, item_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "{} `{item_id}` not found in game `{game_id}`",
                C::SINGULAR
            ))
        })
}

pub async fn update_item<C: NestedCollection>(
    state: &SharedState,
    actor: Option<UserId>,
    game_id: GameId,
    item_id: ItemId,
    changes: <C::Item as NestedItem>::Changes,
) -> Result<GameResponse, ServiceError> {
    let repository = state.repository().await?;
    let game = repository
        .update_item_as::<C>(actor.as_ref(), game_id, item_id, changes)
        .await?;
    info!(%game_id, %item_id, collection = C::NAME, "{} updated", C::SINGULAR);
    Ok(game.into())
}

pub async fn delete_item<C: NestedCollection>(
    state: &SharedState,
    actor: Option<UserId>,
    game_id: GameId,
    item_id: ItemId,
) -> Result<(), ServiceError> {
    let repository = state.repository().await?;
    repository
        .delete_item_as::<C>(actor.as_ref(), game_id, item_id)
        .await?;
    info!(%game_id, %item_id, collection = C::NAME, "{} deleted", C::SINGULAR);
    Ok(())
}
