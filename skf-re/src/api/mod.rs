//! HTTP API handlers for skf-re
//!
//! Handlers are thin: they parse the request shape, resolve the identity,
//! and delegate to the db/scoring modules. Every operation here is callable
//! as a plain library function without the HTTP layer.

pub mod auth;
pub mod health;
pub mod organizations;
pub mod reports;
pub mod twofactor;
pub mod votes;

pub use auth::auth_routes;
pub use health::health_routes;
pub use organizations::organization_routes;
pub use reports::report_routes;
pub use twofactor::twofactor_routes;
pub use votes::vote_routes;
