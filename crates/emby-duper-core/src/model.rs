use std::fmt;
use std::path::Path;

/// Sentinel used when an episode carries no season or episode number.
pub const UNKNOWN_INDEX: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Movie,
    Episode,
}

/// Declared content type of a catalog library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    Movies,
    Shows,
    /// Unknown or mixed content; item kind comes from each record's `Type`.
    Mixed,
}

impl LibraryKind {
    /// Value for the `IncludeItemTypes` query parameter.
    pub fn include_item_types(&self) -> &'static str {
        match self {
            LibraryKind::Movies => "Movie",
            LibraryKind::Shows => "Episode",
            LibraryKind::Mixed => "Movie,Episode",
        }
    }
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LibraryKind::Movies => "movies",
            LibraryKind::Shows => "shows",
            LibraryKind::Mixed => "mixed",
        };
        f.write_str(label)
    }
}

/// A top-level media folder on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub id: String,
    pub name: String,
    pub kind: LibraryKind,
}

/// Series/season/episode identity of an episode file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeInfo {
    pub series_name: String,
    pub season: i32,
    pub episode: i32,
}

/// One physical file as known to the catalog.
///
/// `id` is the catalog identifier and is not unique per file: a merged entry
/// exposes several files under one id. `path` is what tells physical copies
/// apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    pub media_source_id: Option<String>,
    pub kind: MediaKind,
    pub name: String,
    pub path: String,
    pub size: u64,
    pub episode: Option<EpisodeInfo>,
    /// Resolution/codec/HDR description, display only.
    pub info: String,
}

impl MediaItem {
    pub fn base_name(&self) -> &str {
        file_name_of(&self.path)
    }
}

/// Last path component, accepting both `/` and `\` separators since the
/// catalog may run on a different platform than this tool.
pub fn file_name_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// File name without its extension.
pub fn file_stem_of(path: &str) -> String {
    Path::new(file_name_of(path))
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
