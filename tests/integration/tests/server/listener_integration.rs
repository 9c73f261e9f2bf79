//! Real sockets: a listener bound to an ephemeral port.

use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use theresa_conf::RunMode;
use theresa_integration_tests::TestProject;
use theresa_server::{HttpServer, ShutdownCoordinator};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn get(addr: std::net::SocketAddr, target: &str) -> String {
	let mut stream = TcpStream::connect(addr).await.unwrap();
	let request = format!(
		"GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
		target
	);
	stream.write_all(request.as_bytes()).await.unwrap();

	let mut response = Vec::new();
	stream.read_to_end(&mut response).await.unwrap();
	String::from_utf8(response).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_streamed_page_over_tcp() {
	let project = TestProject::new();
	let dispatcher = project.dispatcher(RunMode::Production).await;

	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
	let server = tokio::spawn(
		HttpServer::new(Arc::new(dispatcher)).serve_listener(listener, coordinator.clone()),
	);

	let page = get(addr, "/wishlist").await;
	assert!(page.starts_with("HTTP/1.1 200 OK"));
	assert!(page.to_ascii_lowercase().contains("transfer-encoding: chunked"));
	assert!(page.contains(r#"data-route="wishlist""#));

	let missing = get(addr, "/nowhere").await;
	assert!(missing.starts_with("HTTP/1.1 404 Not Found"));

	let asset = get(addr, "/app.js").await;
	assert!(asset.to_ascii_lowercase().contains("content-type: text/javascript"));

	coordinator.shutdown();
	assert!(coordinator.wait_for_shutdown().await);
	server.await.unwrap().unwrap();
}
