use axum::Router;

use crate::state::SharedState;

pub mod badge;
pub mod category;
pub mod docs;
pub mod extract;
pub mod game;
pub mod health;
pub mod identity;
pub mod mission;
mod nested;
pub mod player;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let v1 = game::router()
        .merge(badge::router())
        .merge(mission::router())
        .merge(player::router())
        .merge(category::router());

    let api_router = health::router().nest("/v1", v1);
    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
