//! Route generator shared by the collections nested in a game.

/// Expands to a `router()` plus the five handlers of one nested collection.
///
/// Paths are passed as literals so every handler keeps its own `utoipa::path`.
macro_rules! nested_item_routes {
    (
        collection: $collection:ident,
        draft: $draft:ident,
        changes: $changes:ident,
        response: $response:ident,
        tag: $tag:tt,
        route: ($list_route:tt, $item_route:tt),
        doc_path: ($list_doc:tt, $item_doc:tt),
        item_param: $item_param:tt,
        handlers: {
            create: $create:ident,
            list: $list:ident,
            get: $get:ident,
            update: $update:ident,
            delete: $delete:ident $(,)?
        } $(,)?
    ) => {
        use axum::{
            Json, Router,
            extract::State,
            http::StatusCode,
            routing::get,
        };

        use $crate::{
            dao::models::{GameId, ItemId},
            dto::game::GameResponse,
            error::AppError,
            routes::{
                extract::{PathParams, ValidJson},
                identity::ActingUser,
            },
            services::item_service,
            state::SharedState,
        };

        /// Routes for this collection, relative to `/v1`.
        pub fn router() -> Router<SharedState> {
            Router::new()
                .route($list_route, get($list).post($create))
                .route($item_route, get($get).patch($update).delete($delete))
        }

        /// Add an entry to a game the caller owns.
        #[utoipa::path(
            post,
            path = $list_doc,
            tag = $tag,
            request_body = $draft,
            params(
                ("game_id" = GameId, Path, description = "Game identifier"),
                ("x-user-id" = String, Header, description = "Acting user")
            ),
            responses(
                (status = 200, description = "Entry added; returns the whole game", body = GameResponse),
                (status = 400, description = "Invalid payload"),
                (status = 401, description = "Caller does not own the game"),
                (status = 404, description = "No such game")
            )
        )]
        pub async fn $create(
            State(state): State<SharedState>,
            ActingUser(actor): ActingUser,
            PathParams(game_id): PathParams<GameId>,
            ValidJson(payload): ValidJson<$draft>,
        ) -> Result<Json<GameResponse>, AppError> {
            let game =
                item_service::create_item::<$collection>(&state, actor, game_id, payload).await?;
            Ok(Json(game))
        }

        /// Entries of the collection, in stored order.
        #[utoipa::path(
            get,
            path = $list_doc,
            tag = $tag,
            params(("game_id" = GameId, Path, description = "Game identifier")),
            responses(
                (status = 200, description = "Entries of the game", body = [$response]),
                (status = 404, description = "No such game")
            )
        )]
        pub async fn $list(
            State(state): State<SharedState>,
            PathParams(game_id): PathParams<GameId>,
        ) -> Result<Json<Vec<$response>>, AppError> {
            let items = item_service::list_items::<$collection>(&state, game_id).await?;
            Ok(Json(items.into_iter().map(Into::into).collect()))
        }

        /// Single entry; absent entries are `404`.
        #[utoipa::path(
            get,
            path = $item_doc,
            tag = $tag,
            params(
                ("game_id" = GameId, Path, description = "Game identifier"),
                ($item_param = ItemId, Path, description = "Entry identifier")
            ),
            responses(
                (status = 200, description = "Entry found", body = $response),
                (status = 404, description = "No such game or entry")
            )
        )]
        pub async fn $get(
            State(state): State<SharedState>,
            PathParams((game_id, item_id)): PathParams<(GameId, ItemId)>,
        ) -> Result<Json<$response>, AppError> {
            let item = item_service::get_item::<$collection>(&state, game_id, item_id).await?;
            Ok(Json(item.into()))
        }

        /// Merge a patch into the entry; unknown entry ids leave the game unchanged.
        #[utoipa::path(
            patch,
            path = $item_doc,
            tag = $tag,
            request_body = $changes,
            params(
                ("game_id" = GameId, Path, description = "Game identifier"),
                ($item_param = ItemId, Path, description = "Entry identifier"),
                ("x-user-id" = String, Header, description = "Acting user")
            ),
            responses(
                (status = 200, description = "Entry updated; returns the whole game", body = GameResponse),
                (status = 400, description = "Invalid or empty patch"),
                (status = 401, description = "Caller does not own the game"),
                (status = 404, description = "No such game")
            )
        )]
        pub async fn $update(
            State(state): State<SharedState>,
            ActingUser(actor): ActingUser,
            PathParams((game_id, item_id)): PathParams<(GameId, ItemId)>,
            ValidJson(changes): ValidJson<$changes>,
        ) -> Result<Json<GameResponse>, AppError> {
            let game = item_service::update_item::<$collection>(
                &state, actor, game_id, item_id, changes,
            )
            .await?;
            Ok(Json(game))
        }

        /// Remove the entry from a game the caller owns.
        #[utoipa::path(
            delete,
            path = $item_doc,
            tag = $tag,
            params(
                ("game_id" = GameId, Path, description = "Game identifier"),
                ($item_param = ItemId, Path, description = "Entry identifier"),
                ("x-user-id" = String, Header, description = "Acting user")
            ),
            responses(
                (status = 204, description = "Entry removed (or already absent)"),
                (status = 401, description = "Caller does not own the game"),
                (status = 404, description = "No such game")
            )
        )]
        pub async fn $delete(
            State(state): State<SharedState>,
            ActingUser(actor): ActingUser,
            PathParams((game_id, item_id)): PathParams<(GameId, ItemId)>,
        ) -> Result<StatusCode, AppError> {
            item_service::delete_item::<$collection>(&state, actor, game_id, item_id).await?;
            Ok(StatusCode::NO_CONTENT)
        }
    };
}

pub(crate) use nested_item_routes;
