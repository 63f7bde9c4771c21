use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the gamification backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::create_game,
        crate::routes::game::query_games,
        crate::routes::game::get_game,
        crate::routes::game::get_game_by_email,
        crate::routes::game::get_games_by_owner,
        crate::routes::game::update_game,
        crate::routes::game::delete_game,
        crate::routes::badge::create_badge,
        crate::routes::badge::list_badges,
        crate::routes::badge::get_badge,
        crate::routes::badge::update_badge,
        crate::routes::badge::delete_badge,
        crate::routes::mission::create_mission,
        crate::routes::mission::list_missions,
        crate::routes::mission::get_mission,
        crate::routes::mission::update_mission,
        crate::routes::mission::delete_mission,
        crate::routes::player::create_player,
        crate::routes::player::list_players,
        crate::routes::player::get_player,
        crate::routes::player::update_player,
        crate::routes::player::delete_player,
        crate::routes::category::create_category,
        crate::routes::category::list_categories,
        crate::routes::category::get_category,
        crate::routes::category::update_category,
        crate::routes::category::delete_category,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::GameResponse,
            crate::dto::game::GamePage,
            crate::dto::items::BadgeResponse,
            crate::dto::items::MissionResponse,
            crate::dto::items::PlayerResponse,
            crate::dto::items::CategoryResponse,
            crate::dao::drafts::NewGame,
            crate::dao::drafts::GameChanges,
            crate::dao::drafts::NewBadge,
            crate::dao::drafts::BadgeChanges,
            crate::dao::drafts::NewMission,
            crate::dao::drafts::MissionChanges,
            crate::dao::drafts::NewPlayer,
            crate::dao::drafts::PlayerChanges,
            crate::dao::drafts::NewCategory,
            crate::dao::drafts::CategoryChanges,
            crate::dao::models::Settings,
            crate::dao::models::Levels,
            crate::dao::models::LevelStep,
            crate::dao::models::Visibility,
            crate::dao::models::Statement,
            crate::dao::models::Task,
            crate::dao::models::Gain,
            crate::dao::models::GameId,
            crate::dao::models::ItemId,
            crate::dao::models::UserId,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game aggregates"),
        (name = "badges", description = "Badges nested in a game"),
        (name = "missions", description = "Missions nested in a game"),
        (name = "players", description = "Players enrolled in a game"),
        (name = "categories", description = "Badge categories of a game"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_nested_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/games/{game_id}/badges/{badge_id}"));
        assert!(doc.paths.paths.contains_key("/v1/owners/{user_id}/games"));
        assert!(doc.paths.paths.contains_key("/healthcheck"));
    }
}
