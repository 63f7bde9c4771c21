/// OpenAPI documentation generation.
pub mod documentation;
/// Game aggregate operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Nested collection operations with owner checks.
pub mod item_service;
/// Storage connection supervision and degraded mode.
pub mod storage_supervisor;
