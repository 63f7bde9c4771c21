//! Routes for the badges of a game.

use crate::{
    dao::{
        collections::Badges,
        drafts::{BadgeChanges, NewBadge},
    },
    dto::items::BadgeResponse,
    routes::nested::nested_item_routes,
};

nested_item_routes! {
    collection: Badges,
    draft: NewBadge,
    changes: BadgeChanges,
    response: BadgeResponse,
    tag: "badges",
    route: ("/games/{game_id}/badges", "/games/{game_id}/badges/{badge_id}"),
    doc_path: ("/v1/games/{game_id}/badges", "/v1/games/{game_id}/badges/{badge_id}"),
    item_param: "badge_id",
    handlers: {
        create: create_badge,
        list: list_badges,
        get: get_badge,
        update: update_badge,
        delete: delete_badge,
    },
}
