//! Static asset serving from the client build output.

use hyper::StatusCode;
use rstest::rstest;
use theresa_conf::RunMode;
use theresa_http::{Handler, Request};
use theresa_integration_tests::{
	APP_JS, DEV_CLIENT_JS, SECRET, TestProject, body_text, content_type,
};

#[rstest]
#[case("/app.js")]
#[case("/app.js?v=3")]
#[tokio::test]
async fn test_production_serves_client_bundle(#[case] target: &str) {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Production).await;

	let response = dispatcher.handle(Request::get(target)).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(content_type(&response), Some("text/javascript"));

	let body = response.body.collect().await.unwrap();
	assert_eq!(body.as_ref(), APP_JS);
}

#[rstest]
#[tokio::test]
async fn test_development_serves_wasm_client_build() {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Development).await;

	let response = dispatcher.handle(Request::get("/theresa.js")).await.unwrap();
	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(content_type(&response), Some("text/javascript"));
	let body = response.body.collect().await.unwrap();
	assert_eq!(body.as_ref(), DEV_CLIENT_JS);
}

#[rstest]
#[tokio::test]
async fn test_development_does_not_serve_production_bundle() {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Development).await;

	let response = dispatcher.handle(Request::get("/app.js")).await.unwrap();
	assert_eq!(response.status, StatusCode::NOT_FOUND);
	assert_eq!(content_type(&response), Some("text/html"));
}

#[rstest]
#[case("/../secret.txt")]
#[case("/../../secret.txt")]
#[case("/%2e%2e/secret.txt")]
#[case("/..%2Fsecret.txt")]
#[case("/%2e%2e%2f%2e%2e%2fsecret.txt")]
#[tokio::test]
async fn test_traversal_never_reaches_outside_files(
	#[case] target: &str,
	#[values(RunMode::Production, RunMode::Development)] mode: RunMode,
) {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(mode).await;

	let response = dispatcher.handle(Request::get(target)).await.unwrap();
	assert_eq!(content_type(&response), Some("text/html"));
	assert!(!body_text(response).await.contains(SECRET));
}

#[rstest]
#[tokio::test]
async fn test_directory_is_not_an_asset() {
	let project = TestProject::new();
	std::fs::create_dir_all(project.root().join("dist/client/assets")).unwrap();
	let dispatcher = project.dispatcher(RunMode::Production).await;

	let response = dispatcher.handle(Request::get("/assets")).await.unwrap();
	assert_eq!(content_type(&response), Some("text/html"));
}
