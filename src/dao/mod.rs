/// Nested collection plumbing shared by badges, missions, players and categories.
pub mod collections;
/// Validated creation drafts and patches.
pub mod drafts;
/// Repository implementing game and nested-collection operations.
pub mod game;
/// Game state storage and retrieval operations.
pub mod game_store;
/// Database model definitions.
pub mod models;
/// Listing filters, sort criteria and pages.
pub mod query;
/// Storage abstraction layer for database operations.
pub mod storage;
