// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod html_snapshot;
pub mod http_client;
