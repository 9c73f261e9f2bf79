//! Browser entry point.
//!
//! Hydrates the server markup. Once hydration completes, the stored theme
//! is applied and the wishlist UI is wired to `localStorage`.

use theresa_pages::hydration::{hydrate_document, on_hydration_complete};
use theresa_pages::ssr::AppRenderer;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MediaQueryList};

use crate::app::{
	ClientStorage, LocalStorage, Movie, MovieApp, MovieCard, THEME_CLASSES, ThemeStore,
	WishlistStore,
};

const PREFERS_DARK_QUERY: &str = "(prefers-color-scheme: dark)";

fn to_js(err: impl std::fmt::Display) -> JsValue {
	JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
	on_hydration_complete(|_| {
		if let Err(err) = after_hydration() {
			tracing::warn!(error = ?err, "client setup failed after hydration");
		}
	});

	let app = MovieApp::sample();
	let route = hydrate_document(|resolution| app.render_route(resolution)).map_err(to_js)?;
	tracing::debug!(route = %route, "client started");
	Ok(())
}

fn after_hydration() -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let storage = LocalStorage::from_window().map_err(to_js)?;

	let theme = ThemeStore::load(storage.clone());
	let prefers_dark = window.match_media(PREFERS_DARK_QUERY)?;
	apply_theme(&document, &theme, prefers_dark.as_ref());
	watch_system_theme(prefers_dark)?;

	let store = WishlistStore::load(storage);
	update_badge(&document, store.count());
	render_wishlist(&document, &store)?;
	bind_wishlist_buttons(&document, &store)?;
	Ok(())
}

fn apply_theme<S: ClientStorage>(
	document: &Document,
	theme: &ThemeStore<S>,
	prefers_dark: Option<&MediaQueryList>,
) {
	let Some(root) = document
		.document_element()
		.and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok())
	else {
		return;
	};
	let attrs = theme.attributes(prefers_dark.is_some_and(|query| query.matches()));

	let _ = root.remove_attribute("data-theme");
	for class in THEME_CLASSES {
		let _ = root.class_list().remove_1(class);
	}
	if let Some(data_theme) = attrs.data_theme {
		let _ = root.set_attribute("data-theme", data_theme);
	}
	if let Some(class) = attrs.class {
		let _ = root.class_list().add_1(class);
	}
	let _ = root.style().set_property("--theme-mode", attrs.theme_mode);
}

/// Re-applies the stored theme when the system colour scheme flips.
fn watch_system_theme(query: Option<MediaQueryList>) -> Result<(), JsValue> {
	let Some(query) = query else {
		return Ok(());
	};
	let on_change = Closure::<dyn FnMut()>::new(move || {
		let (Some(document), Ok(storage)) = (
			web_sys::window().and_then(|window| window.document()),
			LocalStorage::from_window(),
		) else {
			return;
		};
		let theme = ThemeStore::load(storage);
		let prefers_dark = web_sys::window()
			.and_then(|window| window.match_media(PREFERS_DARK_QUERY).ok().flatten());
		apply_theme(&document, &theme, prefers_dark.as_ref());
	});
	query.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
	on_change.forget();
	Ok(())
}

fn update_badge(document: &Document, count: usize) {
	let Ok(Some(badge)) = document.query_selector(".header__wishlist-count") else {
		return;
	};
	badge.set_text_content(Some(&count.to_string()));
	if count > 0 {
		let _ = badge.remove_attribute("hidden");
	} else {
		let _ = badge.set_attribute("hidden", "");
	}
}

fn render_wishlist<S: ClientStorage>(
	document: &Document,
	store: &WishlistStore<S>,
) -> Result<(), JsValue> {
	let Some(list) = document.query_selector(".wishlist__items")? else {
		return Ok(());
	};

	let mut markup = String::new();
	for item in store.items() {
		markup.push_str("<li class=\"wishlist__item\">");
		markup.push_str(&MovieCard { movie: &item.movie }.render().map_err(to_js)?.into_html());
		markup.push_str("</li>");
	}
	list.set_inner_html(&markup);

	if let Some(empty) = document.query_selector(".wishlist__empty")? {
		if store.count() > 0 {
			empty.set_attribute("hidden", "")?;
		} else {
			empty.remove_attribute("hidden")?;
		}
	}
	Ok(())
}

fn sync_button(button: &Element, listed: bool) {
	let label = if listed {
		"Remove from wishlist"
	} else {
		"Add to wishlist"
	};
	button.set_text_content(Some(label));
	let _ = button.set_attribute("aria-pressed", if listed { "true" } else { "false" });
}

fn bind_wishlist_buttons<S: ClientStorage>(
	document: &Document,
	store: &WishlistStore<S>,
) -> Result<(), JsValue> {
	let buttons = document.query_selector_all(".wishlist-button")?;
	for index in 0..buttons.length() {
		let Some(button) = buttons.item(index).and_then(|node| node.dyn_into::<Element>().ok()) else {
			continue;
		};
		let Some(movie) = button
			.get_attribute("data-movie")
			.and_then(|json| serde_json::from_str::<Movie>(&json).ok())
		else {
			continue;
		};
		sync_button(&button, store.contains(movie.id));

		let target = button.clone();
		let document = document.clone();
		let on_click = Closure::<dyn FnMut()>::new(move || {
			let storage = match LocalStorage::from_window() {
				Ok(storage) => storage,
				Err(err) => {
					tracing::warn!(error = %err, "wishlist storage unavailable");
					return;
				}
			};
			let mut store = WishlistStore::load(storage);
			match store.toggle(movie.clone()) {
				Ok(listed) => {
					sync_button(&target, listed);
					update_badge(&document, store.count());
				}
				Err(err) => tracing::warn!(error = %err, "failed to update wishlist"),
			}
		});
		button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
		// The listener lives as long as the page.
		on_click.forget();
	}
	Ok(())
}
