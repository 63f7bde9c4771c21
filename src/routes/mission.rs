//! Routes for the missions of a game.

use crate::{
    dao::{
        collections::Missions,
        drafts::{MissionChanges, NewMission},
    },
    dto::items::MissionResponse,
    routes::nested::nested_item_routes,
};

nested_item_routes! {
    collection: Missions,
    draft: NewMission,
    changes: MissionChanges,
    response: MissionResponse,
    tag: "missions",
    route: ("/games/{game_id}/missions", "/games/{game_id}/missions/{mission_id}"),
    doc_path: ("/v1/games/{game_id}/missions", "/v1/games/{game_id}/missions/{mission_id}"),
    item_param: "mission_id",
    handlers: {
        create: create_mission,
        list: list_missions,
        get: get_mission,
        update: update_mission,
        delete: delete_mission,
    },
}
