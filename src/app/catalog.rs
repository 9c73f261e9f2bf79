//! Movie catalog collaborator.
//!
//! The page tree only depends on [`MovieCatalog`]; [`StaticCatalog`] is the
//! implementation the binary ships with, backed by a JSON fixture or a small
//! built-in sample.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of movies per catalog page.
pub const PAGE_SIZE: usize = 20;

/// Curated movie lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieCategory {
	Popular,
	TopRated,
	Upcoming,
	NowPlaying,
}

impl MovieCategory {
	/// Every category, in display order.
	pub const ALL: [MovieCategory; 4] = [
		Self::Popular,
		Self::TopRated,
		Self::Upcoming,
		Self::NowPlaying,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Popular => "popular",
			Self::TopRated => "top_rated",
			Self::Upcoming => "upcoming",
			Self::NowPlaying => "now_playing",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Popular => "Popular",
			Self::TopRated => "Top Rated",
			Self::Upcoming => "Upcoming",
			Self::NowPlaying => "Now Playing",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			Self::Popular => "Most popular movies trending now",
			Self::TopRated => "Highest rated movies of all time",
			Self::Upcoming => "Coming soon to theaters",
			Self::NowPlaying => "Currently playing in theaters",
		}
	}
}

impl fmt::Display for MovieCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for MovieCategory {
	type Err = CatalogError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|category| category.as_str() == s)
			.ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
	}
}

/// A movie as listed in category rows and search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
	pub id: u64,
	pub title: String,
	#[serde(default)]
	pub overview: String,
	#[serde(default)]
	pub poster_path: Option<String>,
	#[serde(default)]
	pub release_date: Option<String>,
	#[serde(default)]
	pub vote_average: f64,
	#[serde(default)]
	pub vote_count: u64,
}

/// A named genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
	pub id: u32,
	pub name: String,
}

/// Everything the detail page shows about one movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
	#[serde(flatten)]
	pub movie: Movie,
	#[serde(default)]
	pub tagline: Option<String>,
	#[serde(default)]
	pub backdrop_path: Option<String>,
	#[serde(default)]
	pub runtime: Option<u32>,
	#[serde(default)]
	pub genres: Vec<Genre>,
}

/// One page of a movie listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
	pub page: u32,
	pub results: Vec<Movie>,
	pub total_pages: u32,
	pub total_results: u32,
}

impl MoviePage {
	fn paginate(movies: Vec<Movie>, page: u32) -> Self {
		let page = page.max(1);
		let total_results = movies.len();
		let total_pages = total_results.div_ceil(PAGE_SIZE).max(1);
		let results = movies
			.into_iter()
			.skip((page as usize - 1) * PAGE_SIZE)
			.take(PAGE_SIZE)
			.collect();
		Self {
			page,
			results,
			total_pages: total_pages as u32,
			total_results: total_results as u32,
		}
	}
}

/// Errors raised by catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
	#[error("Movie not found: {0}")]
	NotFound(String),
	#[error("Invalid movie id: {0}")]
	InvalidId(String),
	#[error("Unknown category: {0}")]
	UnknownCategory(String),
	#[error("Invalid catalog fixture: {0}")]
	Fixture(String),
	#[error("Catalog unavailable: {0}")]
	Unavailable(String),
}

impl CatalogError {
	/// True for lookups that simply have no result.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_) | Self::InvalidId(_))
	}
}

/// Asynchronous movie data source.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
	async fn movies_by_category(
		&self,
		category: MovieCategory,
		page: u32,
	) -> Result<MoviePage, CatalogError>;

	async fn movie_details(&self, id: &str) -> Result<MovieDetails, CatalogError>;

	async fn search(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogEntry {
	#[serde(flatten)]
	details: MovieDetails,
	#[serde(default)]
	categories: Vec<MovieCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFixture {
	movies: Vec<CatalogEntry>,
}

/// In-memory catalog.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
	entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
	/// Parses a JSON fixture of the form `{"movies": [{..., "categories": [...]}]}`.
	///
	/// ```
	/// use theresa::app::{MovieCatalog, StaticCatalog};
	///
	/// let catalog = StaticCatalog::from_json(
	///     r#"{"movies": [{"id": 7, "title": "Metropolis", "categories": ["popular"]}]}"#,
	/// ).unwrap();
	/// # tokio_test::block_on(async {
	/// assert_eq!(catalog.movie_details("7").await.unwrap().movie.title, "Metropolis");
	/// # });
	/// ```
	pub fn from_json(json: &str) -> Result<Self, CatalogError> {
		let fixture: CatalogFixture =
			serde_json::from_str(json).map_err(|e| CatalogError::Fixture(e.to_string()))?;
		Ok(Self {
			entries: fixture.movies,
		})
	}

	/// Reads a JSON fixture from disk.
	#[cfg(not(target_arch = "wasm32"))]
	pub fn from_path(path: &std::path::Path) -> Result<Self, CatalogError> {
		let json = std::fs::read_to_string(path)
			.map_err(|e| CatalogError::Fixture(format!("{}: {}", path.display(), e)))?;
		Self::from_json(&json)
	}

	/// The fixture at `path` when given, the built-in sample otherwise.
	#[cfg(not(target_arch = "wasm32"))]
	pub fn load(path: Option<&std::path::Path>) -> Result<Self, CatalogError> {
		match path {
			Some(path) => {
				tracing::debug!(path = %path.display(), "loading catalog fixture");
				Self::from_path(path)
			}
			None => Ok(Self::sample()),
		}
	}

	/// A few silent-era and classic films, enough to render every page.
	pub fn sample() -> Self {
		use MovieCategory::*;

		let entries = vec![
			sample_entry(19, "Metropolis", "1927-01-10", 8.1, 2_634, 153, &[Popular, TopRated]),
			sample_entry(653, "Nosferatu", "1922-03-04", 7.7, 1_879, 94, &[Popular]),
			sample_entry(961, "The General", "1926-12-31", 8.0, 1_004, 79, &[TopRated]),
			sample_entry(992, "Sherlock Jr.", "1924-04-21", 8.0, 822, 45, &[TopRated, NowPlaying]),
			sample_entry(10331, "Night of the Living Dead", "1968-10-04", 7.5, 2_070, 96, &[Popular, Upcoming]),
			sample_entry(4808, "Charade", "1963-12-05", 7.6, 1_094, 113, &[NowPlaying]),
			sample_entry(3085, "His Girl Friday", "1940-01-18", 7.4, 588, 92, &[Upcoming]),
			sample_entry(10098, "The Kid", "1921-01-21", 8.1, 1_737, 68, &[Popular, NowPlaying]),
		];
		Self { entries }
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn sample_entry(
	id: u64,
	title: &str,
	release_date: &str,
	vote_average: f64,
	vote_count: u64,
	runtime: u32,
	categories: &[MovieCategory],
) -> CatalogEntry {
	CatalogEntry {
		details: MovieDetails {
			movie: Movie {
				id,
				title: title.to_string(),
				overview: String::new(),
				poster_path: None,
				release_date: Some(release_date.to_string()),
				vote_average,
				vote_count,
			},
			tagline: None,
			backdrop_path: None,
			runtime: Some(runtime),
			genres: Vec::new(),
		},
		categories: categories.to_vec(),
	}
}

#[async_trait]
impl MovieCatalog for StaticCatalog {
	async fn movies_by_category(
		&self,
		category: MovieCategory,
		page: u32,
	) -> Result<MoviePage, CatalogError> {
		let movies = self
			.entries
			.iter()
			.filter(|entry| entry.categories.contains(&category))
			.map(|entry| entry.details.movie.clone())
			.collect();
		Ok(MoviePage::paginate(movies, page))
	}

	async fn movie_details(&self, id: &str) -> Result<MovieDetails, CatalogError> {
		let id: u64 = id.parse().map_err(|_| CatalogError::InvalidId(id.to_string()))?;
		self.entries
			.iter()
			.find(|entry| entry.details.movie.id == id)
			.map(|entry| entry.details.clone())
			.ok_or_else(|| CatalogError::NotFound(id.to_string()))
	}

	async fn search(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
		let needle = query.trim().to_lowercase();
		if needle.is_empty() {
			return Ok(MoviePage::paginate(Vec::new(), page));
		}
		let movies = self
			.entries
			.iter()
			.filter(|entry| entry.details.movie.title.to_lowercase().contains(&needle))
			.map(|entry| entry.details.movie.clone())
			.collect();
		Ok(MoviePage::paginate(movies, page))
	}
}
