use std::error::Error;

use clap::ValueEnum;
use stormclock_core::encounter::{EntityPatch, NewEntity, NewStatus, ResetMode};
use stormclock_core::{
    ContentProvider, DEFAULT_CONDITIONS, INVESTITURE_SUGGESTIONS, Polarity, condition_polarity,
    load_encounter_roster,
};
use stormclock_types::{EncounterState, EntityKind, PersistenceMode, Segment, StatusCategory};

use crate::CliContext;
use crate::view;

// ─────────────────────────────────────────────────────────────────────────────
// Argument Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Player,
    Enemy,
    Ally,
    Boss,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Player => EntityKind::Player,
            KindArg::Enemy => EntityKind::Enemy,
            KindArg::Ally => EntityKind::Ally,
            KindArg::Boss => EntityKind::Boss,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SegmentArg {
    Fast,
    Slow,
}

impl From<SegmentArg> for Segment {
    fn from(segment: SegmentArg) -> Self {
        match segment {
            SegmentArg::Fast => Segment::Fast,
            SegmentArg::Slow => Segment::Slow,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Durable,
    Volatile,
}

impl From<ModeArg> for PersistenceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Durable => PersistenceMode::Durable,
            ModeArg::Volatile => PersistenceMode::Volatile,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    fn enabled(self) -> bool {
        matches!(self, Switch::On)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Error message including every source in the chain
fn describe(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Resolve an entity by exact id, id prefix, or case-insensitive name.
pub fn resolve_entity(state: &EncounterState, query: &str) -> Result<String, String> {
    if let Some(entity) = state.entity(query) {
        return Ok(entity.id.clone());
    }

    let by_prefix: Vec<_> = state.entities.iter().filter(|e| e.id.starts_with(query)).collect();
    let candidates = if by_prefix.is_empty() {
        state
            .entities
            .iter()
            .filter(|e| e.name.eq_ignore_ascii_case(query))
            .collect()
    } else {
        by_prefix
    };

    match candidates.as_slice() {
        [entity] => Ok(entity.id.clone()),
        [] => Err(format!("no entity matches '{query}'")),
        _ => Err(format!("'{query}' matches {} entities, use the id", candidates.len())),
    }
}

/// Resolve a status on `entity_id` by id prefix or case-insensitive name.
fn resolve_status(state: &EncounterState, entity_id: &str, query: &str) -> Result<String, String> {
    let entity = state
        .entity(entity_id)
        .ok_or_else(|| format!("no entity '{entity_id}'"))?;
    entity
        .status_effects
        .iter()
        .find(|s| s.id.starts_with(query))
        .or_else(|| entity.status_effects.iter().find(|s| s.name.eq_ignore_ascii_case(query)))
        .map(|s| s.id.clone())
        .ok_or_else(|| format!("{} has no status '{query}'", entity.name))
}

async fn entity_id(ctx: &CliContext, query: &str) -> Result<String, String> {
    ctx.read(|t| resolve_entity(t.state(), query)).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Turn Order
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show(ctx: &CliContext) -> Result<(), String> {
    println!("{}", ctx.read(view::render).await);
    Ok(())
}

pub async fn next_phase(ctx: &CliContext) -> Result<(), String> {
    ctx.apply(|t| t.next_phase()).await;
    show(ctx).await
}

pub async fn previous_phase(ctx: &CliContext) -> Result<(), String> {
    ctx.apply(|t| t.previous_phase()).await;
    show(ctx).await
}

pub async fn reset_reactions(ctx: &CliContext) -> Result<(), String> {
    ctx.apply(|t| t.reset_reactions()).await;
    Ok(())
}

pub async fn reset_round(ctx: &CliContext) -> Result<(), String> {
    ctx.apply(|t| t.reset_round()).await;
    show(ctx).await
}

pub async fn reset(ctx: &CliContext, sample: bool) -> Result<(), String> {
    let mode = if sample { ResetMode::Sample } else { ResetMode::Empty };
    ctx.apply(|t| t.reset_encounter(mode)).await;
    show(ctx).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Roster
// ─────────────────────────────────────────────────────────────────────────────

pub async fn add(
    ctx: &CliContext,
    name: &str,
    kind: KindArg,
    slow: bool,
    unconscious: bool,
    notes: Option<String>,
) -> Result<(), String> {
    let segment = if slow { Segment::Slow } else { Segment::Fast };
    let mut new = NewEntity::new(name, kind.into())
        .default_segment(segment)
        .unconscious(unconscious);
    if let Some(notes) = notes {
        new = new.notes(notes);
    }
    ctx.apply(|t| t.add_entity(new)).await.map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn remove(ctx: &CliContext, entity: &str) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    ctx.apply(|t| t.remove_entity(&id)).await;
    Ok(())
}

async fn apply_patch(ctx: &CliContext, entity: &str, patch: EntityPatch) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    ctx.apply(|t| t.update_entity(&id, patch))
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn rename(ctx: &CliContext, entity: &str, name: String) -> Result<(), String> {
    let update = EntityPatch {
        name: Some(name),
        ..Default::default()
    };
    apply_patch(ctx, entity, update).await
}

pub async fn set_notes(ctx: &CliContext, entity: &str, notes: Option<String>) -> Result<(), String> {
    let update = EntityPatch {
        notes: Some(notes),
        ..Default::default()
    };
    apply_patch(ctx, entity, update).await
}

pub async fn set_kind(ctx: &CliContext, entity: &str, kind: KindArg) -> Result<(), String> {
    let update = EntityPatch {
        kind: Some(kind.into()),
        ..Default::default()
    };
    apply_patch(ctx, entity, update).await
}

pub async fn toggle_segment(ctx: &CliContext, entity: &str) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    ctx.apply(|t| t.toggle_segment(&id)).await;
    Ok(())
}

pub async fn move_entity(ctx: &CliContext, entity: &str, segment: SegmentArg) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    ctx.apply(|t| t.move_to_segment(&id, segment.into())).await;
    Ok(())
}

pub async fn set_default_segment(ctx: &CliContext, entity: &str, segment: SegmentArg) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    ctx.apply(|t| t.set_default_segment(&id, segment.into())).await;
    Ok(())
}

pub async fn toggle_reaction(ctx: &CliContext, entity: &str) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    ctx.apply(|t| t.toggle_reaction(&id)).await;
    Ok(())
}

pub async fn toggle_unconscious(ctx: &CliContext, entity: &str) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    ctx.apply(|t| t.toggle_unconscious(&id)).await;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Status Effects
// ─────────────────────────────────────────────────────────────────────────────

pub async fn add_status(
    ctx: &CliContext,
    entity: &str,
    name: &str,
    investiture: bool,
    duration: Option<i32>,
) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    let status = if investiture {
        NewStatus::investiture(name, duration)
    } else {
        NewStatus {
            duration,
            ..NewStatus::condition(name)
        }
    };
    ctx.apply(|t| t.add_status_effect(&id, status))
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn remove_status(ctx: &CliContext, entity: &str, status: &str) -> Result<(), String> {
    let id = entity_id(ctx, entity).await?;
    let status_id = ctx.read(|t| resolve_status(t.state(), &id, status)).await?;
    ctx.apply(|t| t.remove_status_effect(&id, &status_id)).await;
    Ok(())
}

/// List the standard conditions. With an entity, hide the ones it already has.
pub async fn list_conditions(ctx: &CliContext, entity: Option<&str>) -> Result<(), String> {
    let carried: Vec<String> = match entity {
        Some(query) => {
            ctx.read(|t| -> Result<Vec<String>, String> {
                let id = resolve_entity(t.state(), query)?;
                Ok(t.entity(&id)
                    .map(|e| {
                        e.status_effects
                            .iter()
                            .filter(|s| s.category == StatusCategory::Condition)
                            .map(|s| s.name.clone())
                            .collect()
                    })
                    .unwrap_or_default())
            })
            .await?
        }
        None => Vec::new(),
    };

    println!("Conditions:");
    for name in DEFAULT_CONDITIONS {
        if carried.iter().any(|n| n == name) {
            continue;
        }
        let polarity = match condition_polarity(name) {
            Some(Polarity::Positive) => "+",
            _ => "-",
        };
        println!("  {polarity} {name}");
    }
    println!("Investiture: {}", INVESTITURE_SUGGESTIONS.join(", "));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshots & Content
// ─────────────────────────────────────────────────────────────────────────────

pub async fn export(ctx: &CliContext, path: Option<String>) -> Result<(), String> {
    let path = path.unwrap_or_else(|| {
        format!("stormclock-encounter-{}.json", chrono::Local::now().timestamp_millis())
    });
    let bytes = ctx
        .read(|t| t.export_snapshot())
        .await
        .map_err(|e| describe(&e))?;
    std::fs::write(&path, bytes).map_err(|e| format!("failed to write {path}: {e}"))?;
    println!("Exported to {path}");
    Ok(())
}

pub async fn import(ctx: &CliContext, path: &str) -> Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    ctx.apply(|t| t.import_snapshot(&bytes))
        .await
        .map_err(|e| format!("import failed, encounter unchanged: {}", describe(&e)))?;
    show(ctx).await
}

pub async fn list_content(ctx: &CliContext) -> Result<(), String> {
    let listing = ctx.content().list_encounters().map_err(|e| describe(&e))?;
    if listing.is_empty() {
        println!("No encounters in {}", ctx.content().root().display());
        return Ok(());
    }
    for (folder, entries) in listing {
        let folder = if folder.is_empty() { "(root)" } else { folder.as_str() };
        println!("{folder}:");
        for entry in entries {
            println!("  {}", entry.slug);
        }
    }
    Ok(())
}

pub async fn load_encounter(ctx: &CliContext, id: &str) -> Result<(), String> {
    let roster = load_encounter_roster(ctx.content(), id).map_err(|e| describe(&e))?;
    ctx.apply(|t| t.load_roster(roster)).await;
    show(ctx).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_settings(ctx: &CliContext) -> Result<(), String> {
    let settings = ctx.read(|t| t.settings().clone()).await;
    let config = ctx.config.read().await;
    println!("Persistence:        {}", settings.persistence_mode.label());
    println!("Storage key:        {}", settings.storage_key);
    println!("Reset segments:     {}", settings.reset_segments_each_round);
    println!("Skip empty phases:  {}", settings.skip_empty_phases);
    println!("Autosave debounce:  {}ms", config.autosave_debounce_ms);
    println!("Content directory:  {}", config.content_directory);
    Ok(())
}

pub async fn set_persistence_mode(ctx: &CliContext, mode: ModeArg) -> Result<(), String> {
    let mode: PersistenceMode = mode.into();
    ctx.apply(|t| t.update_settings(|s| s.persistence_mode = mode))
        .await;
    ctx.update_config(|c| c.persistence_mode = mode)
        .await
        .map_err(|e| describe(&e))?;
    println!("Persistence mode takes effect the next time the encounter is opened");
    Ok(())
}

/// Switch storage key. Saves go to the new key from now on; an encounter
/// already stored there replaces the current one. The next session opens
/// the same key.
pub async fn set_storage_key(ctx: &CliContext, key: &str) -> Result<(), String> {
    let key = key.trim();
    if key.is_empty() {
        return Err("storage key cannot be empty".to_string());
    }
    if ctx.reload(key).await {
        println!("Loaded encounter stored under '{key}'");
    }
    let key = key.to_string();
    let stored_key = key.clone();
    ctx.apply(|t| t.update_settings(|s| s.storage_key = key)).await;
    ctx.update_config(|c| c.storage_key = stored_key)
        .await
        .map_err(|e| describe(&e))?;
    Ok(())
}

pub async fn set_reset_segments(ctx: &CliContext, value: Switch) -> Result<(), String> {
    ctx.apply(|t| t.update_settings(|s| s.reset_segments_each_round = value.enabled()))
        .await;
    Ok(())
}

pub async fn set_skip_empty(ctx: &CliContext, value: Switch) -> Result<(), String> {
    ctx.apply(|t| t.update_settings(|s| s.skip_empty_phases = value.enabled()))
        .await;
    Ok(())
}

/// Store the current encounter settings as the defaults for new sessions
pub async fn save_defaults(ctx: &CliContext) -> Result<(), String> {
    let settings = ctx.read(|t| t.settings().clone()).await;
    ctx.update_config(|config| {
        config.persistence_mode = settings.persistence_mode;
        config.storage_key = settings.storage_key;
        config.reset_segments_each_round = settings.reset_segments_each_round;
        config.skip_empty_phases = settings.skip_empty_phases;
    })
    .await
    .map_err(|e| describe(&e))?;
    println!("Defaults saved");
    Ok(())
}

pub async fn exit(ctx: &CliContext) {
    ctx.shutdown().await;
    println!("quitting...");
}
