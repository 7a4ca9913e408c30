use emby_duper_core::analysis::filter::filter_duplicates;
use emby_duper_core::analysis::grouping::{group_items, GroupKey};
use emby_duper_core::analysis::normalize::normalize;
use emby_duper_core::analysis::selection::{longest_name_first, select};
use emby_duper_core::analysis::{classify, Collision, KeepPolicy, PlanStatus};
use emby_duper_core::model::{EpisodeInfo, LibraryKind, MediaItem, MediaKind, UNKNOWN_INDEX};
use serde_json::json;

fn movie(id: &str, path: &str, size: u64) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        media_source_id: None,
        kind: MediaKind::Movie,
        name: id.to_string(),
        path: path.to_string(),
        size,
        episode: None,
        info: String::new(),
    }
}

fn episode(id: &str, path: &str, series: &str, season: i32, number: i32, size: u64) -> MediaItem {
    MediaItem {
        kind: MediaKind::Episode,
        episode: Some(EpisodeInfo {
            series_name: series.to_string(),
            season,
            episode: number,
        }),
        ..movie(id, path, size)
    }
}

fn keep_paths(items: Vec<MediaItem>) -> Vec<String> {
    classify(items, &KeepPolicy::LongestName)
        .iter()
        .map(|plan| plan.keep().path.clone())
        .collect()
}

#[test]
fn test_scenario_a_equal_size_movies_form_one_group() {
    let groups = filter_duplicates(group_items(vec![
        movie("1", "/movies/a.mkv", 1000),
        movie("2", "/movies/b.mkv", 1000),
    ]));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].items.len(), 2);
    assert_eq!(groups[0].key, GroupKey::Movie { size: 1000 });
}

#[test]
fn test_scenario_b_same_path_is_not_a_duplicate() {
    let groups = filter_duplicates(group_items(vec![
        movie("1", "/movies/a.mkv", 1000),
        movie("2", "/movies/a.mkv", 1000),
    ]));
    assert!(groups.is_empty());
}

#[test]
fn test_folder_alias_of_kept_file_leaves_distinct_copy_removable() {
    let plans = classify(
        vec![
            movie("1", "/m/a.mkv", 1000),
            movie("2", "/m/a.mkv", 1000),
            movie("3", "/m/b.mkv", 1000),
        ],
        &KeepPolicy::LongestName,
    );
    assert_eq!(plans.len(), 1);
    let plan = &plans[0];
    assert!(plan.is_safe());
    assert_eq!(plan.keep().path, "/m/a.mkv");
    let removed: Vec<(&str, &str)> = plan
        .candidates()
        .iter()
        .map(|c| (c.id.as_str(), c.path.as_str()))
        .collect();
    assert_eq!(removed, vec![("3", "/m/b.mkv")]);
    assert!(plan.candidates().iter().all(|c| c.path != plan.keep().path));
    assert_eq!(plan.aliases().len(), 1);
}

#[test]
fn test_scenario_c_different_episodes_same_size_not_grouped() {
    let plans = classify(
        vec![
            episode("1", "/tv/Dark/S01E01.mkv", "Dark", 1, 1, 500),
            episode("2", "/tv/Dark/S01E02.mkv", "Dark", 1, 2, 500),
        ],
        &KeepPolicy::LongestName,
    );
    assert!(plans.is_empty());
}

#[test]
fn test_scenario_d_shared_id_is_unsafe_and_forwards_nothing() {
    let plans = classify(
        vec![
            movie("42", "/movies/Blade.Runner.Final.Cut.mkv", 700),
            movie("42", "/movies/Blade.Runner.mkv", 700),
        ],
        &KeepPolicy::LongestName,
    );
    assert_eq!(plans.len(), 1);
    let plan = &plans[0];
    assert!(!plan.is_safe());
    assert!(plan.candidates().is_empty());
    assert_eq!(plan.held_back().len(), 1);
    assert_eq!(
        plan.status(),
        &PlanStatus::Unsafe(vec![Collision::SharedId("42".to_string())])
    );
}

#[test]
fn test_scenario_e_richer_file_name_is_kept() {
    let plans = classify(
        vec![
            movie("1", "/media/Show.2020.mkv", 2048),
            movie("2", "/media/Show.2020.1080p.BluRay.x265.mkv", 2048),
        ],
        &KeepPolicy::LongestName,
    );
    assert_eq!(plans.len(), 1);
    assert!(plans[0].is_safe());
    assert_eq!(plans[0].keep().base_name(), "Show.2020.1080p.BluRay.x265.mkv");
    assert_eq!(plans[0].candidates().len(), 1);
    assert_eq!(plans[0].candidates()[0].base_name(), "Show.2020.mkv");
}

#[test]
fn test_movies_share_key_iff_sizes_match() {
    let sizes = [1u64, 1000, 1000, 4096, 1 << 40];
    for (i, a) in sizes.iter().enumerate() {
        for (j, b) in sizes.iter().enumerate() {
            let ka = GroupKey::for_item(&movie("a", &format!("/x/{}", i), *a));
            let kb = GroupKey::for_item(&movie("b", &format!("/y/{}", j), *b));
            assert_eq!(ka == kb, a == b, "sizes {} and {}", a, b);
        }
    }
}

#[test]
fn test_episodes_share_key_iff_identity_and_size_match() {
    let variants = [
        ("Dark", 1, 1, 500u64),
        ("Dark", 1, 1, 501),
        ("Dark", 1, 2, 500),
        ("Dark", 2, 1, 500),
        ("Lost", 1, 1, 500),
        ("Dark", UNKNOWN_INDEX, 1, 500),
        ("Dark", 1, UNKNOWN_INDEX, 500),
    ];
    for a in &variants {
        for b in &variants {
            let ka = GroupKey::for_item(&episode("a", "/a.mkv", a.0, a.1, a.2, a.3));
            let kb = GroupKey::for_item(&episode("b", "/b.mkv", b.0, b.1, b.2, b.3));
            assert_eq!(ka == kb, a == b, "{:?} vs {:?}", a, b);
        }
    }
}

#[test]
fn test_selection_is_order_independent() {
    let items = vec![
        movie("1", "/m/Heat.mkv", 10),
        movie("2", "/m/Heat.1995.mkv", 10),
        movie("3", "/n/Heat.1995.mkv", 10),
        movie("4", "/m/Heat.1995.Remux.mkv", 10),
        movie("5", "/m/Heat.1996.mkv", 10),
    ];
    let mut reversed = items.clone();
    reversed.reverse();
    let mut rotated = items.clone();
    rotated.rotate_left(2);

    let expected = keep_paths(items);
    assert_eq!(expected, vec!["/m/Heat.1995.Remux.mkv".to_string()]);
    assert_eq!(keep_paths(reversed), expected);
    assert_eq!(keep_paths(rotated), expected);
}

#[test]
fn test_safe_plans_never_hold_keep_id() {
    let items = vec![
        movie("1", "/a/one.long.name.mkv", 100),
        movie("1", "/b/one.mkv", 100),
        movie("2", "/a/two.long.name.mkv", 200),
        movie("3", "/b/two.mkv", 200),
        movie("4", "/c/two.x.mkv", 200),
        movie("4", "/d/two.y.mkv", 200),
        movie("5", "/a/three.mkv", 300),
        movie("5", "/a/three.mkv", 300),
    ];
    let plans = classify(items, &KeepPolicy::LongestName);
    assert_eq!(plans.len(), 2);
    for plan in plans.iter().filter(|p| p.is_safe()) {
        assert!(plan.candidates().iter().all(|c| c.id != plan.keep().id));
        assert!(plan.candidates().iter().all(|c| c.path != plan.keep().path));
    }
    assert!(!plans[0].is_safe());
    assert!(plans[1].is_safe());
    assert_eq!(plans[1].candidates().len(), 3);
}

#[test]
fn test_merged_entry_spanning_groups_is_held_back() {
    // Catalog entry 9 carries two cuts of different sizes. Its 700-byte cut
    // duplicates entry 8, but deleting entry 9 would also remove the 900-byte cut.
    let plans = classify(
        vec![
            movie("8", "/m/Alien.1979.Directors.Cut.mkv", 700),
            movie("9", "/m/Alien.mkv", 700),
            movie("9", "/m/Alien.Theatrical.mkv", 900),
        ],
        &KeepPolicy::LongestName,
    );
    assert_eq!(plans.len(), 1);
    assert_eq!(
        plans[0].status(),
        &PlanStatus::Unsafe(vec![Collision::MergedEntry("9".to_string())])
    );
}

#[test]
fn test_pipeline_is_idempotent() {
    let records = vec![
        json!({"Id": "1", "Type": "Movie", "Path": "/m/Heat.1995.1080p.mkv", "Size": 100}),
        json!({"Id": "2", "Type": "Movie", "Path": "/m/Heat.mkv", "Size": 100}),
        json!({"Id": "3", "Type": "Movie", "Path": "/m/Alien.mkv", "Size": 300}),
        json!({"Id": "4", "Type": "Movie", "Path": "/m/Alien.4K.mkv", "Size": 300}),
        json!({"Id": "5", "Type": "Movie", "Path": "/m/NoSize.mkv"}),
    ];
    let run = || {
        let items = records
            .iter()
            .filter_map(|r| normalize(r, LibraryKind::Movies));
        format!("{:?}", classify(items, &KeepPolicy::LongestName))
    };
    assert_eq!(run(), run());
}

#[test]
fn test_records_without_size_never_group() {
    let records = vec![
        json!({"Id": "1", "Path": "/m/a.mkv", "Size": 0}),
        json!({"Id": "2", "Path": "/m/b.mkv", "Size": 0}),
        json!({"Id": "3", "Path": "/m/c.mkv"}),
    ];
    let items: Vec<MediaItem> = records
        .iter()
        .filter_map(|r| normalize(r, LibraryKind::Movies))
        .collect();
    assert!(items.is_empty());
}

#[test]
fn test_custom_policy_changes_keep_without_touching_grouping() {
    let group = group_items(vec![
        movie("1", "/m/short.mkv", 10),
        movie("2", "/m/a.much.longer.name.mkv", 10),
    ])
    .remove(0);

    let shortest_first = |a: &MediaItem, b: &MediaItem| longest_name_first(b, a);
    let default_keep = select(group.clone(), &KeepPolicy::LongestName).unwrap().keep;
    let custom_keep = select(group, &shortest_first).unwrap().keep;
    assert_eq!(default_keep.id, "2");
    assert_eq!(custom_keep.id, "1");
}
