#![deny(warnings)]

//! Persistence layer: saved niches with full version history.
//!
//! The whole collection is written through a [`KeyValueStore`] after every
//! mutation. Write failures are logged and the in-memory collection stays
//! authoritative for the rest of the session.

mod backend;

pub use backend::{FileStore, KeyValueStore, MemoryStore};

use chrono::{DateTime, Utc};
use niche_core::{EbookData, GlobalData, PaperbackData};
use niche_score::ScoreBreakdown;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Key holding the serialized niche collection.
pub const NICHES_KEY: &str = "niche-calc.saved-niches";
/// Key holding the collapsed/expanded state of UI sections.
pub const SECTIONS_KEY: &str = "niche-calc.collapsed-sections";

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// All inputs and derived results captured when a niche is saved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicheSnapshot {
    pub global: GlobalData,
    /// Ebook inputs; `None` when never filled in.
    pub ebook: Option<EbookData>,
    /// Printed edition inputs; `None` when never filled in.
    pub paperback: Option<PaperbackData>,
    /// Breakeven clicks of the active format.
    pub max_clicks_per_sale: Option<u64>,
    /// BACOS of the active format, in percent.
    pub bacos: Option<Decimal>,
    /// Daily spend needed to match the competitor.
    pub daily_investment: Option<Decimal>,
    pub list_price: Option<Decimal>,
    /// Lowest price meeting the target margin, printed editions only.
    pub min_recommended_price: Option<Decimal>,
    pub royalty: Option<Decimal>,
    pub score: Option<ScoreBreakdown>,
}

impl NicheSnapshot {
    pub fn total_score(&self) -> u32 {
        self.score.as_ref().map_or(0, |s| s.total_score)
    }
}

/// Immutable point-in-time copy of a niche.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicheVersion {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Free text from the user, or the restore provenance.
    pub note: Option<String>,
    pub snapshot: NicheSnapshot,
}

impl NicheVersion {
    fn new(snapshot: NicheSnapshot, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            note,
            snapshot,
        }
    }
}

/// A named scenario. `snapshot` always mirrors the last entry of `versions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNiche {
    pub id: Uuid,
    /// Trimmed, non-empty.
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Creation time of the newest version.
    pub updated_at: DateTime<Utc>,
    pub snapshot: NicheSnapshot,
    /// Chronological; never empty.
    pub versions: Vec<NicheVersion>,
}

impl SavedNiche {
    pub fn current_version(&self) -> Option<&NicheVersion> {
        self.versions.last()
    }

    pub fn version(&self, id: Uuid) -> Option<&NicheVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    fn push_version(&mut self, version: NicheVersion) {
        self.snapshot = version.snapshot.clone();
        self.updated_at = version.created_at;
        self.versions.push(version);
    }
}

/// Owner of the saved niche collection.
pub struct NicheStore<S: KeyValueStore> {
    backend: S,
    niches: Vec<SavedNiche>,
}

impl<S: KeyValueStore> NicheStore<S> {
    /// Load the collection from `backend`. Missing or unreadable data yields an
    /// empty store.
    pub fn load(backend: S) -> Self {
        let niches = match backend.get(NICHES_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<SavedNiche>>(&bytes) {
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "discarding unreadable saved niches");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read saved niches");
                Vec::new()
            }
        };
        info!(count = niches.len(), "niche store loaded");
        Self { backend, niches }
    }

    fn persist(&mut self) {
        let result = serde_json::to_vec(&self.niches)
            .map_err(StorageError::from)
            .and_then(|bytes| self.backend.set(NICHES_KEY, &bytes));
        if let Err(e) = result {
            error!(error = %e, "failed to persist saved niches");
        }
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.niches.iter().position(|n| n.id == id)
    }

    /// Create a niche with a single initial version.
    ///
    /// Name validation is the caller's job; see `niche_core::validate_name`.
    pub fn save(&mut self, name: &str, snapshot: NicheSnapshot) -> SavedNiche {
        let version = NicheVersion::new(snapshot, None);
        let niche = SavedNiche {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            created_at: version.created_at,
            updated_at: version.created_at,
            snapshot: version.snapshot.clone(),
            versions: vec![version],
        };
        info!(id = %niche.id, name = %niche.name, "niche saved");
        self.niches.push(niche.clone());
        self.persist();
        niche
    }

    /// Append a version to an existing niche. `None` if the id is unknown.
    pub fn update(
        &mut self,
        id: Uuid,
        snapshot: NicheSnapshot,
        note: Option<String>,
    ) -> Option<SavedNiche> {
        let idx = self.position(id)?;
        let niche = &mut self.niches[idx];
        niche.push_version(NicheVersion::new(snapshot, note));
        info!(%id, versions = niche.versions.len(), "niche updated");
        let updated = niche.clone();
        self.persist();
        Some(updated)
    }

    /// Copy a past version forward as the newest one. History is never
    /// truncated. `None` if either id is unknown.
    pub fn restore_version(&mut self, niche_id: Uuid, version_id: Uuid) -> Option<SavedNiche> {
        let idx = self.position(niche_id)?;
        let niche = &mut self.niches[idx];
        let source = niche.version(version_id)?;
        let note = format!(
            "Restored from version of {}",
            source.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        let snapshot = source.snapshot.clone();
        niche.push_version(NicheVersion::new(snapshot, Some(note)));
        info!(%niche_id, %version_id, "niche version restored");
        let restored = niche.clone();
        self.persist();
        Some(restored)
    }

    /// Remove a niche. Returns whether it existed.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.niches.remove(idx);
        info!(%id, "niche deleted");
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.niches.clear();
        info!("niche store cleared");
        self.persist();
    }

    /// Niches in insertion order.
    pub fn list(&self) -> &[SavedNiche] {
        &self.niches
    }

    pub fn get(&self, id: Uuid) -> Option<&SavedNiche> {
        self.niches.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.niches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.niches.is_empty()
    }

    /// Highest scoring niche; the earliest saved wins ties.
    pub fn find_best(&self) -> Option<&SavedNiche> {
        best_niche(&self.niches)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }
}

/// Highest scoring niche in `niches`; the first one wins ties. Niches without
/// a score count as zero.
pub fn best_niche(niches: &[SavedNiche]) -> Option<&SavedNiche> {
    let mut best: Option<&SavedNiche> = None;
    for n in niches {
        match best {
            Some(b) if n.snapshot.total_score() <= b.snapshot.total_score() => {}
            _ => best = Some(n),
        }
    }
    best
}

/// Read the collapsed-section map; unreadable data yields an empty map.
pub fn load_collapsed_sections<S: KeyValueStore>(backend: &S) -> BTreeMap<String, bool> {
    match backend.get(SECTIONS_KEY) {
        Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(error = %e, "discarding unreadable section state");
            BTreeMap::new()
        }),
        Ok(None) => BTreeMap::new(),
        Err(e) => {
            warn!(error = %e, "could not read section state");
            BTreeMap::new()
        }
    }
}

/// Write the collapsed-section map, logging failures.
pub fn save_collapsed_sections<S: KeyValueStore>(backend: &mut S, sections: &BTreeMap<String, bool>) {
    let result = serde_json::to_vec(sections)
        .map_err(StorageError::from)
        .and_then(|bytes| backend.set(SECTIONS_KEY, &bytes));
    if let Err(e) = result {
        error!(error = %e, "failed to persist section state");
    }
}
