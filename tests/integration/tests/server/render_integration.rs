//! Rendering through the dispatcher the binary builds.

use hyper::StatusCode;
use rstest::rstest;
use theresa::app::MovieApp;
use theresa_conf::RunMode;
use theresa_http::{Handler, Request};
use theresa_integration_tests::{OfflineCatalog, TestProject, body_text, content_type};
use theresa_pages::ssr::{MARKUP_MARKER, ROUTE_MARKER};
use theresa_server::STREAM_ERROR_MARKUP;

#[rstest]
#[case(RunMode::Production)]
#[case(RunMode::Development)]
#[tokio::test]
async fn test_movie_route_renders_document(#[case] mode: RunMode) {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(mode).await;

	let response = dispatcher.handle(Request::get("/movie/19")).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(content_type(&response), Some("text/html"));

	let body = body_text(response).await;
	assert_eq!(
		body.matches(r#"<script>window.__INITIAL_ROUTE__ = "/movie/19";</script>"#).count(),
		1
	);
	assert!(body.contains(r#"<div id="root"><div class="app" data-route="movie-detail:19">"#));
	assert!(body.contains("Metropolis"));
	assert!(!body.contains(ROUTE_MARKER));
	assert!(!body.contains(MARKUP_MARKER));
	assert!(body.ends_with("</html>"));
}

#[rstest]
#[tokio::test]
async fn test_unknown_movie_is_a_page_not_a_failure() {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Production).await;

	let response = dispatcher.handle(Request::get("/movie/42")).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);

	let body = body_text(response).await;
	assert!(body.contains(r#"window.__INITIAL_ROUTE__ = "/movie/42";"#));
	assert!(body.contains("Movie not found"));
	assert!(!body.contains(STREAM_ERROR_MARKUP));
}

#[rstest]
#[case("/does-not-exist")]
#[case("/movie/")]
#[case("/movies")]
#[tokio::test]
async fn test_unknown_path_renders_fallback_with_404(#[case] path: &str) {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Production).await;

	let response = dispatcher.handle(Request::get(path)).await.unwrap();
	assert_eq!(response.status, StatusCode::NOT_FOUND);

	let body = body_text(response).await;
	assert!(body.contains(r#"data-route="home""#));
	assert!(body.contains("Page not found"));
	assert!(body.contains(r#"window.__INITIAL_ROUTE__ = "/";"#));
}

#[rstest]
#[tokio::test]
async fn test_query_string_does_not_change_route() {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Production).await;

	let response = dispatcher.handle(Request::get("/wishlist?sort=recent")).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);
	assert!(body_text(response).await.contains(r#"data-route="wishlist""#));
}

#[rstest]
#[tokio::test]
async fn test_streamed_home_sends_fallbacks_then_rows() {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Production).await;

	let body = body_text(dispatcher.handle(Request::get("/")).await.unwrap()).await;
	let fallback = body.find("carousel--loading").unwrap();
	let card = body.find(r#"<a class="movie-card" href="/movie/19">"#).unwrap();
	assert!(fallback < card);
	assert!(body.contains(r#"$RC("B:0","S:0")"#));
}

#[rstest]
#[tokio::test]
async fn test_buffered_mode_inlines_resolved_content() {
	let project = TestProject::new();
	let dispatcher = project
		.dispatcher(RunMode::Production)
		.await
		.with_streaming(false);

	let response = dispatcher.handle(Request::get("/")).await.unwrap();
	assert!(!response.body.is_stream());

	let body = body_text(response).await;
	assert!(!body.contains("carousel--loading"));
	assert!(!body.contains("$RC("));
	assert!(body.contains(r#"<a class="movie-card" href="/movie/19">"#));
}

#[rstest]
#[tokio::test]
async fn test_catalog_failure_after_shell_is_reported_inline() {
	let project = TestProject::new();
	let dispatcher =
		project.dispatcher_for(RunMode::Production, MovieApp::new(OfflineCatalog));

	let response = dispatcher.handle(Request::get("/movie/19")).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);

	let body = body_text(response).await;
	assert!(body.contains("Loading movie..."));
	assert!(body.ends_with(STREAM_ERROR_MARKUP));
	assert!(!body.contains("</html>"));
}

#[rstest]
#[tokio::test]
async fn test_broken_template_fails_production_startup() {
	let project = TestProject::new();
	std::fs::write(project.root().join("dist/client/index.html"), "<html></html>").unwrap();

	let result = theresa::serve::build_dispatcher(&project.settings(RunMode::Production)).await;
	assert!(result.is_err());
}

#[rstest]
#[tokio::test]
async fn test_development_reports_broken_template_per_request() {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Development).await;
	std::fs::write(project.root().join("index.html"), "<html></html>").unwrap();

	let response = dispatcher.handle(Request::get("/")).await.unwrap();
	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(content_type(&response), Some("text/plain"));
	assert!(body_text(response).await.contains("<!--initial-route-->"));
}
