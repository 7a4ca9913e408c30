use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::analysis::normalize::normalize_sources;
use crate::analysis::{classify, DeletionPlan, KeepPolicy, PlanSummary};
use crate::catalog::Catalog;
use crate::error::Error;
use crate::model::{Library, MediaItem};
use crate::progress::ProgressReporter;

pub struct ScanEngine<C: Catalog> {
    catalog: C,
    policy: KeepPolicy,
    library_filter: Vec<String>,
}

/// Outcome of scanning one library.
#[derive(Debug)]
pub struct LibraryScan {
    pub library: Library,
    pub records_fetched: usize,
    pub usable_items: usize,
    pub records_skipped: usize,
    /// Fetched records per catalog item type (`Movie`, `Episode`, ...).
    pub type_counts: BTreeMap<String, usize>,
    pub fetch_duration: Duration,
    pub plans: Vec<DeletionPlan>,
}

impl LibraryScan {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary::from_plans(&self.plans)
    }
}

#[derive(Debug)]
pub struct ScanResult {
    pub libraries: Vec<LibraryScan>,
    pub failed_libraries: Vec<String>,
    pub scan_duration: Duration,
}

impl ScanResult {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary::from_plans(self.plans())
    }

    pub fn plans(&self) -> impl Iterator<Item = &DeletionPlan> {
        self.libraries.iter().flat_map(|lib| lib.plans.iter())
    }

    pub fn total_records(&self) -> usize {
        self.libraries.iter().map(|lib| lib.records_fetched).sum()
    }

    /// Record counts per item type across every scanned library.
    pub fn type_totals(&self) -> BTreeMap<String, usize> {
        let mut totals = BTreeMap::new();
        for (item_type, count) in self.libraries.iter().flat_map(|lib| &lib.type_counts) {
            *totals.entry(item_type.clone()).or_insert(0) += count;
        }
        totals
    }
}

impl<C: Catalog> ScanEngine<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            policy: KeepPolicy::default(),
            library_filter: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: KeepPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Restrict the scan to libraries with these names (case-insensitive).
    /// An empty list scans everything.
    pub fn with_library_filter(mut self, names: Vec<String>) -> Self {
        self.library_filter = names;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Fetch every selected library in turn and classify its items.
    ///
    /// A library whose fetch fails is logged and recorded in
    /// `failed_libraries`; the scan carries on with the rest.
    pub fn scan(&self, reporter: &dyn ProgressReporter) -> Result<ScanResult, Error> {
        let scan_start = Instant::now();
        let libraries: Vec<Library> = self
            .catalog
            .libraries()?
            .into_iter()
            .filter(|lib| self.is_selected(lib))
            .collect();
        info!("Scanning {} libraries", libraries.len());

        let mut scans = Vec::with_capacity(libraries.len());
        let mut failed_libraries = Vec::new();

        for library in libraries {
            reporter.on_library_start(&library.name);
            let fetch_start = Instant::now();
            let records = match self
                .catalog
                .library_items(&library, &|fetched, total| reporter.on_fetch_progress(fetched, total))
            {
                Ok(records) => records,
                Err(err) => {
                    error!("Failed to fetch items of library '{}': {}", library.name, err);
                    failed_libraries.push(library.name.clone());
                    continue;
                }
            };
            let fetch_duration = fetch_start.elapsed();

            let scan = classify_library(library, &records, &self.policy, fetch_duration);
            reporter.on_library_complete(
                &scan.library.name,
                scan.records_fetched,
                scan.plans.len(),
                fetch_duration.as_secs_f64(),
            );
            scans.push(scan);
        }

        Ok(ScanResult {
            libraries: scans,
            failed_libraries,
            scan_duration: scan_start.elapsed(),
        })
    }

    fn is_selected(&self, library: &Library) -> bool {
        self.library_filter.is_empty()
            || self
                .library_filter
                .iter()
                .any(|name| name.trim().eq_ignore_ascii_case(library.name.trim()))
    }
}

fn classify_library(
    library: Library,
    records: &[serde_json::Value],
    policy: &KeepPolicy,
    fetch_duration: Duration,
) -> LibraryScan {
    let mut skipped = 0usize;
    let mut type_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut items: Vec<MediaItem> = Vec::with_capacity(records.len());
    for record in records {
        let item_type = record
            .get("Type")
            .and_then(|t| t.as_str())
            .unwrap_or("Unknown");
        *type_counts.entry(item_type.to_string()).or_insert(0) += 1;

        let expanded = normalize_sources(record, library.kind);
        if expanded.is_empty() {
            skipped += 1;
        }
        items.extend(expanded);
    }
    if skipped > 0 {
        debug!("Skipped {} records without usable path or size in '{}'", skipped, library.name);
    }

    let usable_items = items.len();
    let plans = classify(items, policy);
    let unsafe_groups = plans.iter().filter(|p| !p.is_safe()).count();
    if unsafe_groups > 0 {
        warn!(
            "{} duplicate group(s) in '{}' collide with the kept copy and will not be removed",
            unsafe_groups, library.name
        );
    }
    info!(
        "Library '{}': {} records, {} duplicate groups",
        library.name,
        records.len(),
        plans.len()
    );

    LibraryScan {
        records_fetched: records.len(),
        usable_items,
        records_skipped: skipped,
        type_counts,
        fetch_duration,
        plans,
        library,
    }
}
