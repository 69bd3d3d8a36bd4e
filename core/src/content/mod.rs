//! Encounter and roster documents.
//!
//! A [`ContentProvider`] serves JSON documents by identifier. Rosters are
//! entity lists in either the canonical or the flat legacy schema. The
//! shared party lives in the `players` document and is prepended to every
//! encounter loaded with [`load_encounter_roster`].

mod directory;
mod error;

pub use directory::DirectoryContent;
pub use error::ContentError;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;
use stormclock_types::Entity;
use tracing::info;

use crate::codec::parse_entity_list;
use crate::encounter::roster::new_id;

/// Identifier of the party roster document
pub const PLAYERS_ID: &str = "players";

/// One document known to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub slug: String,
    /// Name of the folder holding the document
    pub folder: String,
    pub path: PathBuf,
}

pub trait ContentProvider: Send + Sync {
    /// Document for `id`, or None if there is none.
    fn fetch_by_identifier(&self, id: &str) -> Result<Option<Value>, ContentError>;

    /// Encounter documents grouped by folder. The players roster is excluded.
    fn list_encounters(&self) -> Result<BTreeMap<String, Vec<ContentEntry>>, ContentError>;
}

fn fetch_roster(provider: &dyn ContentProvider, id: &str) -> Result<Vec<Entity>, ContentError> {
    let value = provider
        .fetch_by_identifier(id)?
        .ok_or_else(|| ContentError::MissingDocument { id: id.to_string() })?;
    parse_entity_list(&value).map_err(|source| ContentError::InvalidRoster {
        id: id.to_string(),
        source,
    })
}

/// Party followed by the encounter's combatants, as fresh entities.
///
/// Every entity gets a new id, an unused reaction and no status effects,
/// so loading the same encounter twice never shares state.
pub fn load_encounter_roster(
    provider: &dyn ContentProvider,
    encounter_id: &str,
) -> Result<Vec<Entity>, ContentError> {
    let mut entities = fetch_roster(provider, PLAYERS_ID)?;
    entities.extend(fetch_roster(provider, encounter_id)?);

    for entity in &mut entities {
        entity.id = new_id();
        entity.reaction_used = false;
        entity.status_effects.clear();
    }

    info!(encounter = encounter_id, count = entities.len(), "Encounter roster assembled");
    Ok(entities)
}
