// Module file for server integration tests
// Each test file in server/ subdirectory is explicitly included with #[path] attribute

#[path = "server/render_integration.rs"]
mod render_integration;

#[path = "server/static_assets_integration.rs"]
mod static_assets_integration;

#[path = "server/listener_integration.rs"]
mod listener_integration;
