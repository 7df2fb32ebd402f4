use std::str::FromStr;

use crate::core::error::AppError;
use crate::features::databases::dtos::DatabaseListEntry;
use crate::features::databases::models::Sector;

/// Sector selector of the home list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectorFilter {
    #[default]
    All,
    Only(Sector),
}

impl SectorFilter {
    fn accepts(&self, sector: Option<Sector>) -> bool {
        match self {
            SectorFilter::All => true,
            SectorFilter::Only(wanted) => sector == Some(*wanted),
        }
    }
}

impl FromStr for SectorFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(SectorFilter::All)
        } else {
            s.parse().map(SectorFilter::Only)
        }
    }
}

/// Entries whose name or description contains `search` (case-insensitive) and
/// whose sector passes `sector`, in their original order
pub fn filter_databases<'a>(
    databases: &'a [DatabaseListEntry],
    search: &str,
    sector: SectorFilter,
) -> Vec<&'a DatabaseListEntry> {
    let needle = search.trim().to_lowercase();

    databases
        .iter()
        .filter(|db| {
            needle.is_empty()
                || db.name.to_lowercase().contains(&needle)
                || db
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .filter(|db| sector.accepts(db.sector))
        .collect()
}
