use serde_json::Value;

use crate::model::{file_stem_of, EpisodeInfo, LibraryKind, MediaItem, MediaKind, UNKNOWN_INDEX};

/// Convert one raw catalog record into a `MediaItem`.
///
/// Returns `None` for anything unusable: no id, no path, no positive size, or
/// an item type that does not belong in the library. Never fails.
pub fn normalize(record: &Value, library: LibraryKind) -> Option<MediaItem> {
    let kind = item_kind(record, library)?;
    let id = string_field(record, "Id")?;
    let first_source = record
        .get("MediaSources")
        .and_then(Value::as_array)
        .and_then(|sources| sources.first());

    let path = string_field(record, "Path")
        .or_else(|| first_source.and_then(|s| string_field(s, "Path")))?;
    let size = positive_size(record)
        .or_else(|| first_source.and_then(positive_size))?;

    Some(build_item(
        record,
        kind,
        id,
        first_source.and_then(|s| string_field(s, "Id")),
        path,
        size,
        first_source,
    ))
}

/// Like `normalize`, but expands a record with several media sources into
/// one item per source. All items share the record's catalog id, which is
/// exactly the merged-entry shape the safety check guards against.
pub fn normalize_sources(record: &Value, library: LibraryKind) -> Vec<MediaItem> {
    let sources = match record.get("MediaSources").and_then(Value::as_array) {
        Some(sources) if sources.len() > 1 => sources,
        _ => return normalize(record, library).into_iter().collect(),
    };

    let (Some(kind), Some(id)) = (item_kind(record, library), string_field(record, "Id")) else {
        return Vec::new();
    };

    sources
        .iter()
        .filter_map(|source| {
            let path = string_field(source, "Path")?;
            let size = positive_size(source)?;
            Some(build_item(
                record,
                kind,
                id.clone(),
                string_field(source, "Id"),
                path,
                size,
                Some(source),
            ))
        })
        .collect()
}

fn build_item(
    record: &Value,
    kind: MediaKind,
    id: String,
    media_source_id: Option<String>,
    path: String,
    size: u64,
    source: Option<&Value>,
) -> MediaItem {
    let name = string_field(record, "Name").unwrap_or_else(|| file_stem_of(&path));
    let episode = match kind {
        MediaKind::Movie => None,
        MediaKind::Episode => Some(EpisodeInfo {
            series_name: string_field(record, "SeriesName")
                .or_else(|| string_field(record, "SeriesId"))
                .unwrap_or_default(),
            season: index_field(record, "ParentIndexNumber"),
            episode: index_field(record, "IndexNumber"),
        }),
    };

    MediaItem {
        id,
        media_source_id,
        kind,
        name,
        path,
        size,
        episode,
        info: source.map(quality_info).unwrap_or_default(),
    }
}

fn item_kind(record: &Value, library: LibraryKind) -> Option<MediaKind> {
    let declared = record.get("Type").and_then(Value::as_str);
    match (library, declared) {
        (LibraryKind::Movies, None | Some("Movie")) => Some(MediaKind::Movie),
        (LibraryKind::Shows, None | Some("Episode")) => Some(MediaKind::Episode),
        (LibraryKind::Mixed, Some("Movie")) => Some(MediaKind::Movie),
        (LibraryKind::Mixed, Some("Episode")) => Some(MediaKind::Episode),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn positive_size(value: &Value) -> Option<u64> {
    value.get("Size").and_then(Value::as_u64).filter(|size| *size > 0)
}

fn index_field(value: &Value, key: &str) -> i32 {
    value
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
        .filter(|n| *n >= 0)
        .unwrap_or(UNKNOWN_INDEX)
}

/// Short quality label from the first video stream, e.g. `1080p HEVC HDR10`.
fn quality_info(source: &Value) -> String {
    let Some(video) = source
        .get("MediaStreams")
        .and_then(Value::as_array)
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.get("Type").and_then(Value::as_str) == Some("Video"))
        })
    else {
        return String::new();
    };

    let mut parts = Vec::new();
    if let Some(height) = video.get("Height").and_then(Value::as_u64) {
        parts.push(resolution_label(height, video.get("Width").and_then(Value::as_u64)));
    }
    if let Some(codec) = video.get("Codec").and_then(Value::as_str) {
        parts.push(codec.to_uppercase());
    }
    if let Some(range) = video.get("VideoRange").and_then(Value::as_str) {
        if !range.eq_ignore_ascii_case("SDR") {
            parts.push(range.to_string());
        }
    }
    parts.join(" ")
}

fn resolution_label(height: u64, width: Option<u64>) -> String {
    let width = width.unwrap_or(0);
    if height >= 2000 || width >= 3800 {
        "2160p".to_string()
    } else if height >= 1000 || width >= 1900 {
        "1080p".to_string()
    } else if height >= 700 || width >= 1260 {
        "720p".to_string()
    } else {
        format!("{}p", height)
    }
}
