//! Route pages and the pieces they are built from.

use std::sync::Arc;
use theresa_pages::RenderError;
use theresa_pages::component::{Component, IntoPage, Page};

use super::catalog::{Movie, MovieCatalog, MovieCategory, MovieDetails};
use super::format::{
	backdrop_url, format_rating, format_runtime, format_vote_count, poster_url, release_year,
};
use super::wishlist::WISHLIST_STORAGE_KEY;

/// Category rows, each streamed in as its data arrives.
pub struct HomePage {
	pub catalog: Arc<dyn MovieCatalog>,
}

impl HomePage {
	fn category_section(&self, category: MovieCategory) -> Page {
		let catalog = self.catalog.clone();
		let row = Page::suspense(
			Page::element("div")
				.attr("class", "carousel carousel--loading")
				.child(format!("Loading {} movies...", category.label().to_lowercase())),
			async move {
				let page = catalog
					.movies_by_category(category, 1)
					.await
					.map_err(RenderError::data)?;
				CategoryRow {
					movies: page.results,
				}
				.render()
			},
		);

		Page::element("section")
			.attr("class", "category")
			.attr("data-category", category.as_str())
			.child(Page::element("h2").attr("class", "category__title").child(category.label()))
			.child(
				Page::element("p")
					.attr("class", "category__description")
					.child(category.description()),
			)
			.child(row)
			.into_page()
	}
}

impl Component for HomePage {
	fn render(&self) -> Result<Page, RenderError> {
		Ok(Page::element("div")
			.attr("class", "home")
			.children(MovieCategory::ALL.map(|category| self.category_section(category)))
			.into_page())
	}

	fn name() -> &'static str {
		"HomePage"
	}
}

/// A horizontal list of movie cards.
pub struct CategoryRow {
	pub movies: Vec<Movie>,
}

impl Component for CategoryRow {
	fn render(&self) -> Result<Page, RenderError> {
		if self.movies.is_empty() {
			return Ok(Page::element("p")
				.attr("class", "carousel__empty")
				.child("No movies found")
				.into_page());
		}

		let cards = self
			.movies
			.iter()
			.map(|movie| {
				Ok(Page::element("li")
					.attr("class", "carousel__item")
					.child(MovieCard { movie }.render()?))
			})
			.collect::<Result<Vec<_>, RenderError>>()?;

		Ok(Page::element("div")
			.attr("class", "carousel")
			.child(Page::element("ul").attr("class", "carousel__track").children(cards))
			.into_page())
	}

	fn name() -> &'static str {
		"CategoryRow"
	}
}

/// Poster, title, year and rating linking to the detail page.
pub struct MovieCard<'a> {
	pub movie: &'a Movie,
}

// Not a `Component`: the card borrows its movie from the row.
impl MovieCard<'_> {
	pub fn render(&self) -> Result<Page, RenderError> {
		let movie = self.movie;
		let year = release_year(movie.release_date.as_deref())
			.map(|year| year.to_string())
			.unwrap_or_default();

		Ok(Page::element("a")
			.attr("class", "movie-card")
			.attr("href", format!("/movie/{}", movie.id))
			.child(
				Page::element("img")
					.attr("class", "movie-card__poster")
					.attr("src", poster_url(movie.poster_path.as_deref()))
					.attr("alt", movie.title.clone())
					.attr("loading", "lazy"),
			)
			.child(
				Page::element("div")
					.attr("class", "movie-card__content")
					.child(
						Page::element("h3")
							.attr("class", "movie-card__title")
							.attr("title", movie.title.clone())
							.child(movie.title.clone()),
					)
					.child(
						Page::element("div")
							.attr("class", "movie-card__meta")
							.child(Page::element("span").attr("class", "movie-card__year").child(year))
							.child(
								Page::element("span")
									.attr("class", "movie-card__rating")
									.child(format_rating(movie.vote_average)),
							),
					),
			)
			.into_page())
	}
}

/// One movie, with its details streamed in.
pub struct MovieDetailPage {
	pub id: String,
	pub catalog: Arc<dyn MovieCatalog>,
}

impl Component for MovieDetailPage {
	fn render(&self) -> Result<Page, RenderError> {
		let catalog = self.catalog.clone();
		let id = self.id.clone();
		let details = Page::suspense(
			Page::element("div")
				.attr("class", "movie-detail__loading")
				.child("Loading movie..."),
			async move {
				match catalog.movie_details(&id).await {
					Ok(details) => MovieDetailView { details }.render(),
					Err(err) if err.is_not_found() => Ok(missing_movie()),
					Err(err) => Err(RenderError::data(err)),
				}
			},
		);

		Ok(Page::element("article")
			.attr("class", "movie-detail")
			.attr("data-movie-id", self.id.clone())
			.child(details)
			.into_page())
	}

	fn name() -> &'static str {
		"MovieDetailPage"
	}
}

fn missing_movie() -> Page {
	Page::element("section")
		.attr("class", "movie-detail__missing")
		.child(Page::element("h2").child("Movie not found"))
		.child(Page::element("a").attr("href", "/").child("Back to home"))
		.into_page()
}

/// The resolved content of a detail page.
pub struct MovieDetailView {
	pub details: MovieDetails,
}

impl Component for MovieDetailView {
	fn render(&self) -> Result<Page, RenderError> {
		let details = &self.details;
		let movie = &details.movie;
		let payload = serde_json::to_string(movie).map_err(RenderError::data)?;

		let mut meta = Vec::new();
		if let Some(year) = release_year(movie.release_date.as_deref()) {
			meta.push(Page::element("span").attr("class", "movie-detail__year").child(year.to_string()));
		}
		if let Some(runtime) = details.runtime {
			meta.push(
				Page::element("span")
					.attr("class", "movie-detail__runtime")
					.child(format_runtime(runtime)),
			);
		}
		meta.push(Page::element("span").attr("class", "movie-detail__rating").child(format!(
			"{} ({} votes)",
			format_rating(movie.vote_average),
			format_vote_count(movie.vote_count)
		)));

		let backdrop = backdrop_url(details.backdrop_path.as_deref()).map(|src| {
			Page::element("img")
				.attr("class", "movie-detail__backdrop")
				.attr("src", src)
				.attr("alt", "")
		});
		let tagline = details
			.tagline
			.clone()
			.map(|tagline| Page::element("p").attr("class", "movie-detail__tagline").child(tagline));
		let genres = (!details.genres.is_empty()).then(|| {
			Page::element("ul").attr("class", "movie-detail__genres").children(
				details
					.genres
					.iter()
					.map(|genre| Page::element("li").child(genre.name.clone())),
			)
		});

		Ok(Page::fragment(vec![
			backdrop.into_page(),
			Page::element("img")
				.attr("class", "movie-detail__poster")
				.attr("src", poster_url(movie.poster_path.as_deref()))
				.attr("alt", movie.title.clone())
				.into_page(),
			Page::element("div")
				.attr("class", "movie-detail__info")
				.child(Page::element("h2").attr("class", "movie-detail__title").child(movie.title.clone()))
				.child(tagline)
				.child(Page::element("div").attr("class", "movie-detail__meta").children(meta))
				.child(genres)
				.child(Page::element("p").attr("class", "movie-detail__overview").child(movie.overview.clone()))
				.child(
					Page::element("button")
						.attr("class", "wishlist-button")
						.attr("type", "button")
						.attr("data-movie-id", movie.id.to_string())
						.attr("data-movie", payload)
						.child("Add to wishlist"),
				)
				.into_page(),
		]))
	}

	fn name() -> &'static str {
		"MovieDetailView"
	}
}

/// Placeholder the browser fills from the persisted wishlist.
pub struct WishlistPage;

impl Component for WishlistPage {
	fn render(&self) -> Result<Page, RenderError> {
		Ok(Page::element("section")
			.attr("class", "wishlist")
			.child(Page::element("h2").attr("class", "wishlist__title").child("Your wishlist"))
			.child(
				Page::element("ul")
					.attr("class", "wishlist__items")
					.attr("data-storage-key", WISHLIST_STORAGE_KEY),
			)
			.child(
				Page::element("p")
					.attr("class", "wishlist__empty")
					.child("Your wishlist is empty"),
			)
			.into_page())
	}

	fn name() -> &'static str {
		"WishlistPage"
	}
}

/// Fallback UI for unknown paths.
pub struct NotFoundPage;

impl Component for NotFoundPage {
	fn render(&self) -> Result<Page, RenderError> {
		Ok(Page::element("section")
			.attr("class", "not-found")
			.child(Page::element("h2").child("Page not found"))
			.child(Page::element("p").child("The page you are looking for does not exist."))
			.child(Page::element("a").attr("href", "/").child("Back to home"))
			.into_page())
	}

	fn name() -> &'static str {
		"NotFoundPage"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::app::{CatalogError, MoviePage, StaticCatalog};
	use async_trait::async_trait;
	use rstest::rstest;
	use theresa_pages::ssr::render_to_string;

	fn sample() -> Arc<dyn MovieCatalog> {
		Arc::new(StaticCatalog::sample())
	}

	#[rstest]
	fn test_home_shell_shows_fallbacks() {
		let html = HomePage { catalog: sample() }.render().unwrap().into_html();
		assert_eq!(html.matches("carousel--loading").count(), 4);
		assert!(html.contains("Loading top rated movies..."));
		assert!(!html.contains("movie-card"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_home_resolves_cards() {
		let page = HomePage { catalog: sample() }.render().unwrap();
		let html = render_to_string(page).await.unwrap();
		assert!(html.contains("<a class=\"movie-card\" href=\"/movie/19\">"));
		assert!(html.contains("<span class=\"movie-card__year\">1927</span>"));
		assert!(!html.contains("carousel--loading"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_detail_page_resolves() {
		let page = MovieDetailPage {
			id: "19".to_string(),
			catalog: sample(),
		}
		.render()
		.unwrap();
		let html = render_to_string(page).await.unwrap();
		assert!(html.starts_with("<article class=\"movie-detail\" data-movie-id=\"19\">"));
		assert!(html.contains("<h2 class=\"movie-detail__title\">Metropolis</h2>"));
		assert!(html.contains("2h 33m"));
		assert!(html.contains("8.1 (2.6k votes)"));
		assert!(html.contains("data-movie=\"{&quot;id&quot;:19,&quot;title&quot;:&quot;Metropolis&quot;"));
	}

	#[rstest]
	#[case("404")]
	#[case("not-a-number")]
	#[tokio::test]
	async fn test_detail_page_missing_movie(#[case] id: &str) {
		let page = MovieDetailPage {
			id: id.to_string(),
			catalog: sample(),
		}
		.render()
		.unwrap();
		let html = render_to_string(page).await.unwrap();
		assert!(html.contains("Movie not found"));
	}

	struct OfflineCatalog;

	#[async_trait]
	impl MovieCatalog for OfflineCatalog {
		async fn movies_by_category(
			&self,
			_category: MovieCategory,
			_page: u32,
		) -> Result<MoviePage, CatalogError> {
			Err(CatalogError::Unavailable("offline".to_string()))
		}

		async fn movie_details(&self, _id: &str) -> Result<MovieDetails, CatalogError> {
			Err(CatalogError::Unavailable("offline".to_string()))
		}

		async fn search(&self, _query: &str, _page: u32) -> Result<MoviePage, CatalogError> {
			Err(CatalogError::Unavailable("offline".to_string()))
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_catalog_failure_fails_boundary() {
		let page = MovieDetailPage {
			id: "19".to_string(),
			catalog: Arc::new(OfflineCatalog),
		}
		.render()
		.unwrap();
		let err = render_to_string(page).await.unwrap_err();
		assert_eq!(err, RenderError::Data("Catalog unavailable: offline".to_string()));
	}

	#[rstest]
	fn test_empty_row() {
		let html = CategoryRow { movies: Vec::new() }.render().unwrap().into_html();
		assert_eq!(html, "<p class=\"carousel__empty\">No movies found</p>");
	}

	#[rstest]
	fn test_card_escapes_title() {
		let movie = Movie {
			id: 1,
			title: "Tom & Jerry <3".to_string(),
			overview: String::new(),
			poster_path: None,
			release_date: None,
			vote_average: 6.0,
			vote_count: 10,
		};
		let html = MovieCard { movie: &movie }.render().unwrap().into_html();
		assert!(html.contains("alt=\"Tom &amp; Jerry &lt;3\""));
		assert!(html.contains(">Tom &amp; Jerry &lt;3</h3>"));
		assert!(html.contains("src=\"/placeholder-movie.jpg\""));
	}
}
