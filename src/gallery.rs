//! Gallery presentation state
//!
//! `project` derives the filtered, sorted and grouped view of the result list
//! that a gallery renders. It is a pure function of its inputs: it borrows
//! the results, never mutates them, and returns the same projection for the
//! same arguments.

use crate::types::ProcessedResult;
use chrono::{DateTime, FixedOffset, Offset as _, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Order of results by completion timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    #[default]
    Ascending,
    /// Newest first
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(format!("Unknown sort order: {s}. Use 'asc' or 'desc'")),
        }
    }
}

/// How results are partitioned into sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    #[default]
    None,
    ByDate,
}

/// Thumbnail grid density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridDensity {
    Compact,
    #[default]
    Comfortable,
    Spacious,
}

impl GridDensity {
    /// Number of thumbnail columns at this density
    #[must_use]
    pub fn columns(self) -> usize {
        match self {
            Self::Compact => 5,
            Self::Comfortable => 4,
            Self::Spacious => 3,
        }
    }
}

impl FromStr for GridDensity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "comfortable" => Ok(Self::Comfortable),
            "spacious" => Ok(Self::Spacious),
            _ => Err(format!(
                "Unknown grid density: {s}. Use 'compact', 'comfortable' or 'spacious'"
            )),
        }
    }
}

impl fmt::Display for GridDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compact => "compact",
            Self::Comfortable => "comfortable",
            Self::Spacious => "spacious",
        };
        f.write_str(name)
    }
}

/// View configuration for a gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    pub sort_order: SortOrder,
    pub grouping: Grouping,
    pub density: GridDensity,
    /// Offset used to render human-readable dates, for search and grouping
    pub utc_offset: FixedOffset,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_order: SortOrder::default(),
            grouping: Grouping::default(),
            density: GridDensity::default(),
            utc_offset: utc(),
        }
    }
}

impl ViewState {
    #[must_use]
    pub fn with_search<S: Into<String>>(mut self, term: S) -> Self {
        self.search_term = term.into();
        self
    }

    #[must_use]
    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    #[must_use]
    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    #[must_use]
    pub fn with_density(mut self, density: GridDensity) -> Self {
        self.density = density;
        self
    }

    #[must_use]
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// One section of the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryGroup<'a> {
    /// Calendar date label for date groups, `None` when ungrouped
    pub label: Option<String>,
    pub items: Vec<&'a ProcessedResult>,
}

/// The renderable structure derived from a result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryProjection<'a> {
    pub groups: Vec<GalleryGroup<'a>>,
    pub columns: usize,
    /// Loading slots for files still in flight
    pub placeholders: usize,
}

impl<'a> GalleryProjection<'a> {
    /// Reserve `pending` loading slots ahead of the results
    #[must_use]
    pub fn with_placeholders(mut self, pending: usize) -> Self {
        self.placeholders = pending;
        self
    }

    /// Number of results across all groups
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All results in display order
    pub fn items(&self) -> impl Iterator<Item = &'a ProcessedResult> + '_ {
        self.groups.iter().flat_map(|g| g.items.iter().copied())
    }
}

/// Completion time as shown to the user, e.g. `3/7/2024, 2:05:09 PM`
#[must_use]
pub fn display_timestamp(completed_at: DateTime<Utc>, offset: FixedOffset) -> String {
    completed_at
        .with_timezone(&offset)
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// Calendar date label used for date grouping, e.g. `3/7/2024`
#[must_use]
pub fn date_label(completed_at: DateTime<Utc>, offset: FixedOffset) -> String {
    completed_at
        .with_timezone(&offset)
        .format(DATE_FORMAT)
        .to_string()
}

/// Project `results` through `view`
///
/// Filters on a case-insensitive substring of the file name or the displayed
/// completion time, sorts by completion time (stable on ties), then groups.
/// Date groups appear in encounter order and keep the sort order inside.
#[must_use]
pub fn project<'a>(results: &'a [ProcessedResult], view: &ViewState) -> GalleryProjection<'a> {
    let needle = view.search_term.to_lowercase();

    let mut items: Vec<&ProcessedResult> = results
        .iter()
        .filter(|result| {
            needle.is_empty()
                || result.file_name().to_lowercase().contains(&needle)
                || display_timestamp(result.completed_at(), view.utc_offset)
                    .to_lowercase()
                    .contains(&needle)
        })
        .collect();

    match view.sort_order {
        SortOrder::Ascending => items.sort_by_key(|r| r.completed_at()),
        SortOrder::Descending => items.sort_by(|a, b| b.completed_at().cmp(&a.completed_at())),
    }

    let groups = match view.grouping {
        Grouping::None => vec![GalleryGroup { label: None, items }],
        Grouping::ByDate => {
            let mut groups: Vec<GalleryGroup<'a>> = Vec::new();
            for item in items {
                let label = date_label(item.completed_at(), view.utc_offset);
                match groups
                    .iter_mut()
                    .find(|g| g.label.as_deref() == Some(label.as_str()))
                {
                    Some(group) => group.items.push(item),
                    None => groups.push(GalleryGroup {
                        label: Some(label),
                        items: vec![item],
                    }),
                }
            }
            groups
        },
    };

    GalleryProjection {
        groups,
        columns: view.density.columns(),
        placeholders: 0,
    }
}
