use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version};
use std::net::SocketAddr;

/// HTTP Request representation
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub remote_addr: Option<SocketAddr>,
}

impl Request {
	/// Create a new Request
	///
	/// # Examples
	///
	/// ```
	/// use theresa_http::Request;
	/// use hyper::{HeaderMap, Method, Uri, Version};
	/// use bytes::Bytes;
	///
	/// let request = Request::new(
	///     Method::GET,
	///     "/movie/42?ref=home".parse::<Uri>().unwrap(),
	///     Version::HTTP_11,
	///     HeaderMap::new(),
	///     Bytes::new(),
	/// );
	/// assert_eq!(request.path(), "/movie/42");
	/// ```
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			remote_addr: None,
		}
	}

	/// Create a bodiless GET request for the given path, mostly useful in tests.
	///
	/// An unparsable target falls back to `/`.
	pub fn get(target: &str) -> Self {
		let uri = target.parse::<Uri>().unwrap_or_else(|_| Uri::from_static("/"));
		Self::new(Method::GET, uri, Version::HTTP_11, HeaderMap::new(), Bytes::new())
	}

	/// Returns the request path with the query string removed.
	pub fn path(&self) -> &str {
		theresa_urls::strip_query(self.uri.path())
	}

	/// Returns the path plus query string, as received.
	pub fn path_and_query(&self) -> &str {
		self.uri
			.path_and_query()
			.map(|pq| pq.as_str())
			.unwrap_or_else(|| self.uri.path())
	}
}
