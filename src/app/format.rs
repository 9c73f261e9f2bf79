//! Display formatting for movie data.

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Shown when a movie has no poster.
pub const PLACEHOLDER_POSTER: &str = "/placeholder-movie.jpg";

/// Rating with one decimal.
pub fn format_rating(rating: f64) -> String {
	format!("{:.1}", rating)
}

/// Vote count, abbreviated from a thousand upward (`1.2k`).
pub fn format_vote_count(votes: u64) -> String {
	if votes >= 1000 {
		format!("{:.1}k", votes as f64 / 1000.0)
	} else {
		votes.to_string()
	}
}

/// Year of an ISO `YYYY-MM-DD` release date.
pub fn release_year(release_date: Option<&str>) -> Option<u16> {
	let date = release_date?.trim();
	let year = date.split('-').next()?;
	if year.len() != 4 {
		return None;
	}
	year.parse().ok()
}

/// Runtime as `2h 13m`, or `45m` below an hour.
pub fn format_runtime(minutes: u32) -> String {
	match (minutes / 60, minutes % 60) {
		(0, m) => format!("{}m", m),
		(h, 0) => format!("{}h", h),
		(h, m) => format!("{}h {}m", h, m),
	}
}

pub fn poster_url(poster_path: Option<&str>) -> String {
	match poster_path {
		Some(path) if !path.is_empty() => format!("{}/w500{}", IMAGE_BASE_URL, path),
		_ => PLACEHOLDER_POSTER.to_string(),
	}
}

pub fn backdrop_url(backdrop_path: Option<&str>) -> Option<String> {
	backdrop_path
		.filter(|path| !path.is_empty())
		.map(|path| format!("{}/w1280{}", IMAGE_BASE_URL, path))
}
