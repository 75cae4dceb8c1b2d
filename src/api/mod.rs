//! API endpoint modules.

pub mod github;
pub mod health;
pub mod openapi;
pub mod views;

pub use github::configure_routes as configure_github_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use views::configure_routes as configure_view_routes;
