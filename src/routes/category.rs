//! Routes for the categories of a game.

use crate::{
    dao::{
        collections::Categories,
        drafts::{CategoryChanges, NewCategory},
    },
    dto::items::CategoryResponse,
    routes::nested::nested_item_routes,
};

nested_item_routes! {
    collection: Categories,
    draft: NewCategory,
    changes: CategoryChanges,
    response: CategoryResponse,
    tag: "categories",
    route: ("/games/{game_id}/categories", "/games/{game_id}/categories/{category_id}"),
    doc_path: ("/v1/games/{game_id}/categories", "/v1/games/{game_id}/categories/{category_id}"),
    item_param: "category_id",
    handlers: {
        create: create_category,
        list: list_categories,
        get: get_category,
        update: update_category,
        delete: delete_category,
    },
}
