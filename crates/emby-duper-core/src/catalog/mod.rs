pub mod emby;

use serde_json::Value;

use crate::error::Error;
use crate::model::{Library, LibraryKind};

pub use emby::{EmbyClient, SystemInfo};

/// Source of raw catalog records and target of API deletions.
///
/// The scan engine only talks to this trait, so the pipeline runs the same
/// against a live server or an in-memory fixture.
pub trait Catalog {
    fn libraries(&self) -> Result<Vec<Library>, Error>;

    /// Every raw item record of a library. `on_page` receives the running
    /// count of fetched records and the server's total when known.
    fn library_items(
        &self,
        library: &Library,
        on_page: &dyn Fn(usize, Option<usize>),
    ) -> Result<Vec<Value>, Error>;

    fn delete_item(&self, item_id: &str) -> Result<(), Error>;
}

/// Infer a library's content type from its `CollectionType`, falling back to
/// well-known folder names.
pub fn detect_library_kind(collection_type: Option<&str>, name: &str) -> LibraryKind {
    match collection_type.map(str::to_ascii_lowercase).as_deref() {
        Some("movies") => return LibraryKind::Movies,
        Some("tvshows") => return LibraryKind::Shows,
        _ => {}
    }

    let name = name.trim().to_lowercase();
    match name.as_str() {
        "movies" | "movie" | "films" | "电影" => LibraryKind::Movies,
        "tv" | "series" | "shows" | "tv shows" | "剧集" | "电视剧" => LibraryKind::Shows,
        _ => LibraryKind::Mixed,
    }
}
