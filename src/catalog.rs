//! Catalog classification and ordering.
//!
//! Every eligible file in the input directory is tagged as cover, inner page
//! or back cover, and the plan lists them in output order: the cover first,
//! inner pages sorted by the chosen key, then the back cover. Previously
//! generated catalogs are excluded so a re-run never ingests its own output.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::config::{CatalogPatterns, SortMode};
use crate::error::{CatalogError, Result};
use crate::scan::{self, CATALOG_EXTENSIONS, ScannedFile, SourceFormat};

/// Position class of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// First page source.
    Cover,
    /// Content page source.
    Inner,
    /// Last page source.
    BackCover,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cover => "cover",
            Self::Inner => "inner",
            Self::BackCover => "back_cover",
        };
        f.write_str(name)
    }
}

/// A classified file of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Full path.
    pub path: PathBuf,
    /// Bare file name, used for sorting.
    pub name: String,
    /// Position class.
    pub kind: EntryKind,
    /// PDF or image.
    pub format: SourceFormat,
    /// Modification time, when available.
    pub modified: Option<SystemTime>,
}

/// A file left out of the plan and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetAside {
    /// Full path.
    pub path: PathBuf,
    /// Human readable reason.
    pub reason: String,
}

/// Ordered catalog contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPlan {
    /// Entries in output order.
    pub entries: Vec<CatalogEntry>,
    /// Files excluded as previous outputs.
    pub excluded: Vec<SetAside>,
    /// Additional cover or back-cover matches that were dropped.
    pub ignored: Vec<SetAside>,
}

impl CatalogPlan {
    /// The cover entry, if any.
    pub fn cover(&self) -> Option<&CatalogEntry> {
        self.entries.first().filter(|e| e.kind == EntryKind::Cover)
    }

    /// The back-cover entry, if any.
    pub fn back_cover(&self) -> Option<&CatalogEntry> {
        self.entries.last().filter(|e| e.kind == EntryKind::BackCover)
    }

    /// Inner entries in order.
    pub fn inner(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Inner)
    }

    /// Number of entries in the plan.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of classifying a single file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The file takes part in the catalog.
    Include(EntryKind),
    /// The file is never part of the catalog.
    Exclude(String),
}

/// Compiled classification patterns.
#[derive(Debug, Clone)]
pub struct Classifier {
    cover: GlobSet,
    back_cover: GlobSet,
    exclude: GlobSet,
    output_name: Option<String>,
}

fn compile(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|e| CatalogError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.kind().to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| CatalogError::InvalidPattern {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })
}

impl Classifier {
    /// Compile `patterns`. `output_name` is the file name of the catalog
    /// being produced; a file with that name is always excluded.
    pub fn new(patterns: &CatalogPatterns, output_name: Option<&str>) -> Result<Self> {
        Ok(Self {
            cover: compile(&patterns.cover)?,
            back_cover: compile(&patterns.back_cover)?,
            exclude: compile(&patterns.exclude)?,
            output_name: output_name.map(str::to_lowercase),
        })
    }

    /// Classify a bare file name.
    ///
    /// Exclusion wins over everything; back-cover patterns are tried before
    /// cover patterns.
    pub fn classify(&self, name: &str) -> Classification {
        if self
            .output_name
            .as_deref()
            .is_some_and(|out| out.chars().eq(name.chars().flat_map(char::to_lowercase)))
        {
            return Classification::Exclude("output file of this run".to_string());
        }

        if self.exclude.is_match(name) {
            return Classification::Exclude("matches an exclusion pattern".to_string());
        }

        if self.back_cover.is_match(name) {
            Classification::Include(EntryKind::BackCover)
        } else if self.cover.is_match(name) {
            Classification::Include(EntryKind::Cover)
        } else {
            Classification::Include(EntryKind::Inner)
        }
    }

    /// Classify and order `files`, given in directory-listing order.
    ///
    /// Files without a recognised extension are expected to have been
    /// filtered out already and are treated as images.
    pub fn plan(&self, files: Vec<ScannedFile>, sort: SortMode) -> CatalogPlan {
        let mut cover: Option<CatalogEntry> = None;
        let mut back_cover: Option<CatalogEntry> = None;
        let mut inner = Vec::new();
        let mut excluded = Vec::new();
        let mut ignored = Vec::new();

        for file in files {
            let kind = match self.classify(&file.name) {
                Classification::Exclude(reason) => {
                    debug!(path = %file.path.display(), %reason, "excluding file");
                    excluded.push(SetAside {
                        path: file.path,
                        reason,
                    });
                    continue;
                }
                Classification::Include(kind) => kind,
            };

            let entry = CatalogEntry {
                format: SourceFormat::from_path(&file.path).unwrap_or(SourceFormat::Image),
                path: file.path,
                name: file.name,
                kind,
                modified: file.modified,
            };

            let slot = match kind {
                EntryKind::Inner => {
                    inner.push(entry);
                    continue;
                }
                EntryKind::Cover => &mut cover,
                EntryKind::BackCover => &mut back_cover,
            };

            if let Some(chosen) = slot.as_ref() {
                let reason = format!("another {kind} match; using {}", chosen.name);
                warn!(path = %entry.path.display(), %reason, "ignoring duplicate match");
                ignored.push(SetAside {
                    path: entry.path,
                    reason,
                });
            } else {
                *slot = Some(entry);
            }
        }

        sort_entries(&mut inner, sort);

        let mut entries = Vec::with_capacity(inner.len() + 2);
        entries.extend(cover);
        entries.extend(inner);
        entries.extend(back_cover);

        CatalogPlan {
            entries,
            excluded,
            ignored,
        }
    }
}

fn name_order(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    scan::compare_names(&a.name, &b.name)
}

/// Sort inner entries in place.
///
/// By name: case-insensitive, ties broken byte-wise. By date: oldest first,
/// ties by name, entries without a modification time last.
pub fn sort_entries(entries: &mut [CatalogEntry], sort: SortMode) {
    match sort {
        SortMode::Name => entries.sort_by(name_order),
        SortMode::Date => entries.sort_by(|a, b| match (a.modified, b.modified) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| name_order(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => name_order(a, b),
        }),
    }
}

/// Scan `dir` and build the catalog plan for it.
pub fn plan_directory(
    dir: &Path,
    patterns: &CatalogPatterns,
    output_name: Option<&str>,
    sort: SortMode,
) -> Result<CatalogPlan> {
    let classifier = Classifier::new(patterns, output_name)?;
    let files = scan::list_with_extensions(dir, CATALOG_EXTENSIONS)?;
    Ok(classifier.plan(files, sort))
}
