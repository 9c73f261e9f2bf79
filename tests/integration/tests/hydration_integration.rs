//! Server output checked against what the client renders for the same URL.

use futures::StreamExt;
use rstest::rstest;
use theresa::app::MovieApp;
use std::cell::Cell;
use std::rc::Rc;
use theresa_pages::hydration::{
	HydrationError, InitialRouteHandoff, MarkupRoot, bootstrap_route, hydrate,
	init_hydration_state, is_hydration_complete, on_hydration_complete,
};
use theresa_pages::ssr::{AppRenderer, HtmlTemplate, RenderEvent, SsrEntry};
use theresa_integration_tests::TEMPLATE;
use theresa_urls::{Route, resolve};

/// Pulls the JSON value assigned to the initial-route global out of a document.
fn handed_off_json(document: &str) -> &str {
	let start = document.find("__INITIAL_ROUTE__ = ").unwrap() + "__INITIAL_ROUTE__ = ".len();
	let end = start + document[start..].find(";</script>").unwrap();
	&document[start..end]
}

/// Markup between `<div id="root">` and the closing tag before the bundle script.
fn root_markup(document: &str) -> &str {
	let start = document.find("<div id=\"root\">").unwrap() + "<div id=\"root\">".len();
	let end = document.rfind("</div><script").unwrap();
	&document[start..end]
}

/// Removes the streaming boundary wrappers, leaving each fallback in place.
fn strip_boundary_markers(shell: &str) -> String {
	const OPEN: &str = "<!--$?--><template id=\"B:";
	const OPEN_END: &str = "\"></template>";

	let mut out = String::with_capacity(shell.len());
	let mut rest = shell;
	while let Some(start) = rest.find(OPEN) {
		out.push_str(&rest[..start]);
		let after = &rest[start + OPEN.len()..];
		let end = after.find(OPEN_END).unwrap();
		assert!(after[..end].chars().all(|c| c.is_ascii_digit()));
		rest = &after[end + OPEN_END.len()..];
	}
	out.push_str(rest);
	out.replace("<!--/$-->", "")
}

async fn streamed_shell(path: &str) -> String {
	let mut render = SsrEntry::new(MovieApp::sample()).render_stream(path);
	assert_eq!(render.stream.next().await, Some(RenderEvent::ShellReady));
	let Some(RenderEvent::Chunk(shell)) = render.stream.next().await else {
		panic!("shell chunk expected after ShellReady");
	};
	String::from_utf8(shell.to_vec()).unwrap()
}

#[rstest]
#[case("/")]
#[case("/wishlist")]
#[case("/wishlist/shared")]
#[case("/movie/19")]
#[case("/movie/abc")]
#[case("/nope")]
#[tokio::test]
async fn test_client_markup_matches_streamed_shell(#[case] path: &str) {
	let shell = streamed_shell(path).await;
	let client = MovieApp::sample()
		.render_route(&resolve(path))
		.unwrap()
		.into_html();

	assert_eq!(client, strip_boundary_markers(&shell));
}

#[rstest]
#[tokio::test]
async fn test_hydrating_server_document_notifies_listeners() {
	init_hydration_state();
	let notified = Rc::new(Cell::new(false));
	let seen = notified.clone();
	on_hydration_complete(move |done| seen.set(done));

	let output = SsrEntry::new(MovieApp::sample()).render("/").await.unwrap();
	let document = HtmlTemplate::parse(TEMPLATE)
		.unwrap()
		.compose(&output.route, &output.markup);
	let client = MovieApp::sample().render_route(&resolve("/")).unwrap();
	let mut root = MarkupRoot::new(root_markup(&document));
	hydrate(&client, &mut root).unwrap();

	assert!(is_hydration_complete());
	assert!(notified.get());
}

#[rstest]
#[case("/", Route::Home)]
#[case("/wishlist", Route::Wishlist)]
#[case("/movie/653", Route::MovieDetail("653".to_string()))]
#[case("/movie/42", Route::MovieDetail("42".to_string()))]
#[case("/not-a-page", Route::Home)]
#[tokio::test]
async fn test_client_hydrates_server_document(#[case] path: &str, #[case] expected: Route) {
	let entry = SsrEntry::new(MovieApp::sample());
	let output = entry.render(path).await.unwrap();
	let document = HtmlTemplate::parse(TEMPLATE)
		.unwrap()
		.compose(&output.route, &output.markup);

	let mut handoff = InitialRouteHandoff::from_json(handed_off_json(&document)).unwrap();
	let route = bootstrap_route(&mut handoff, path);
	assert_eq!(route, expected);
	assert!(!handoff.is_pending());

	let client = MovieApp::sample()
		.render_route(&resolve(path))
		.unwrap();
	let mut root = MarkupRoot::new(root_markup(&document));
	hydrate(&client, &mut root).unwrap();
	assert!(root.is_hydrated());
}

#[rstest]
#[tokio::test]
async fn test_client_on_wrong_route_refuses_to_hydrate() {
	let output = SsrEntry::new(MovieApp::sample())
		.render("/wishlist")
		.await
		.unwrap();

	let client = MovieApp::sample().render_route(&resolve("/")).unwrap();
	let mut root = MarkupRoot::new(output.markup);
	let err = hydrate(&client, &mut root).unwrap_err();

	assert_eq!(
		err,
		HydrationError::RouteMismatch {
			expected: "home".to_string(),
			actual: "wishlist".to_string(),
		}
	);
	assert!(!root.is_hydrated());
}

#[rstest]
#[tokio::test]
async fn test_streamed_shell_hydrates_before_boundaries_resolve() {
	let shell = streamed_shell("/movie/19").await;
	assert!(shell.contains("Loading movie..."));

	let client = MovieApp::sample().render_route(&resolve("/movie/19")).unwrap();
	let mut root = MarkupRoot::new(shell);
	hydrate(&client, &mut root).unwrap();
}
