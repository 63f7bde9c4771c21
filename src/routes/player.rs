//! Routes for the players of a game.

use crate::{
    dao::{
        collections::Players,
        drafts::{PlayerChanges, NewPlayer},
    },
    dto::items::PlayerResponse,
    routes::nested::nested_item_routes,
};

nested_item_routes! {
    collection: Players,
    draft: NewPlayer,
    changes: PlayerChanges,
    response: PlayerResponse,
    tag: "players",
    route: ("/games/{game_id}/players", "/games/{game_id}/players/{player_id}"),
    doc_path: ("/v1/games/{game_id}/players", "/v1/games/{game_id}/players/{player_id}"),
    item_param: "player_id",
    handlers: {
        create: create_player,
        list: list_players,
        get: get_player,
        update: update_player,
        delete: delete_player,
    },
}
