use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dao::{
        drafts::{GameChanges, NewGame},
        models::GameId,
    },
    dto::game::{GamePage, GameQueryParams, GameResponse},
    error::AppError,
    routes::{
        extract::{PathParams, ValidJson, ValidQuery},
        identity::ActingUser,
    },
    services::game_service,
    state::SharedState,
};

/// Routes exposing the game aggregate.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(query_games).post(create_game))
        .route(
            "/games/{game_id}",
            get(get_game).patch(update_game).delete(delete_game),
        )
        .route("/games/email/{email}", get(get_game_by_email))
        .route("/owners/{user_id}/games", get(get_games_by_owner))
}

/// Create a game owned by the caller.
#[utoipa::path(
    post,
    path = "/v1/games",
    tag = "games",
    request_body = NewGame,
    params(("x-user-id" = String, Header, description = "Acting user")),
    responses(
        (status = 201, description = "Game created", body = GameResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing acting user"),
        (status = 409, description = "Email already used by another game")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    ActingUser(actor): ActingUser,
    ValidJson(payload): ValidJson<NewGame>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    let game = game_service::create_game(&state, actor, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// List games, filtered and paginated.
#[utoipa::path(
    get,
    path = "/v1/games",
    tag = "games",
    params(GameQueryParams),
    responses(
        (status = 200, description = "One page of games", body = GamePage),
        (status = 400, description = "Invalid query parameters")
    )
)]
pub async fn query_games(
    State(state): State<SharedState>,
    ValidQuery(params): ValidQuery<GameQueryParams>,
) -> Result<Json<GamePage>, AppError> {
    let page = game_service::query_games(&state, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/v1/games/{game_id}",
    tag = "games",
    params(("game_id" = GameId, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game found", body = GameResponse),
        (status = 404, description = "No such game")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    PathParams(game_id): PathParams<GameId>,
) -> Result<Json<GameResponse>, AppError> {
    let game = game_service::get_game(&state, game_id).await?;
    Ok(Json(game))
}

#[utoipa::path(
    get,
    path = "/v1/games/email/{email}",
    tag = "games",
    params(("email" = String, Path, description = "Contact email of the game")),
    responses(
        (status = 200, description = "Game found", body = GameResponse),
        (status = 404, description = "No game uses this email")
    )
)]
pub async fn get_game_by_email(
    State(state): State<SharedState>,
    PathParams(email): PathParams<String>,
) -> Result<Json<GameResponse>, AppError> {
    let game = game_service::get_game_by_email(&state, &email).await?;
    Ok(Json(game))
}

/// Games the given user owns, oldest first.
#[utoipa::path(
    get,
    path = "/v1/owners/{user_id}/games",
    tag = "games",
    params(("user_id" = String, Path, description = "Owner identity")),
    responses(
        (status = 200, description = "Owned games", body = [GameResponse]),
        (status = 400, description = "Blank user id")
    )
)]
pub async fn get_games_by_owner(
    State(state): State<SharedState>,
    PathParams(user_id): PathParams<String>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let games = game_service::get_games_by_owner(&state, &user_id).await?;
    Ok(Json(games))
}

/// Shallow-merge a patch into a game the caller owns.
#[utoipa::path(
    patch,
    path = "/v1/games/{game_id}",
    tag = "games",
    request_body = GameChanges,
    params(
        ("game_id" = GameId, Path, description = "Game identifier"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 200, description = "Game updated", body = GameResponse),
        (status = 400, description = "Invalid or empty patch"),
        (status = 401, description = "Caller does not own the game"),
        (status = 404, description = "No such game"),
        (status = 409, description = "Email taken or concurrent modification")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    ActingUser(actor): ActingUser,
    PathParams(game_id): PathParams<GameId>,
    ValidJson(changes): ValidJson<GameChanges>,
) -> Result<Json<GameResponse>, AppError> {
    let game = game_service::update_game(&state, actor, game_id, changes).await?;
    Ok(Json(game))
}

#[utoipa::path(
    delete,
    path = "/v1/games/{game_id}",
    tag = "games",
    params(
        ("game_id" = GameId, Path, description = "Game identifier"),
        ("x-user-id" = String, Header, description = "Acting user")
    ),
    responses(
        (status = 204, description = "Game deleted"),
        (status = 401, description = "Caller does not own the game"),
        (status = 404, description = "No such game")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    ActingUser(actor): ActingUser,
    PathParams(game_id): PathParams<GameId>,
) -> Result<StatusCode, AppError> {
    game_service::delete_game(&state, actor, game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
