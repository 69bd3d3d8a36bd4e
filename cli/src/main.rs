use clap::{Parser, Subcommand};
use std::io::Write;
use stormclock_cli::commands::{self, KindArg, ModeArg, SegmentArg, Switch};
use stormclock_cli::logging;
use stormclock_cli::readline;
use stormclock_cli::{CliContext, SessionPaths};

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();

    let ctx = CliContext::open(SessionPaths::platform());
    commands::show(&ctx).await?;

    loop {
        let Some(line) = readline()? else {
            commands::exit(&ctx).await;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Stormclock encounter tracker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Advance to the next phase
    #[command(alias = "n")]
    Next,
    /// Go back one phase
    #[command(alias = "prev")]
    Back,
    /// Print the lanes
    #[command(alias = "ls")]
    Show,
    Add {
        name: String,
        #[arg(short, long, value_enum, default_value = "player")]
        kind: KindArg,
        /// Act in the slow segment by default
        #[arg(short, long)]
        slow: bool,
        #[arg(long)]
        unconscious: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    #[command(alias = "rm")]
    Remove { entity: String },
    Rename { entity: String, name: String },
    /// Set or clear an entity's notes
    Notes { entity: String, text: Option<String> },
    Kind {
        entity: String,
        #[arg(value_enum)]
        kind: KindArg,
    },
    /// Flip an entity between fast and slow
    #[command(alias = "dash")]
    Toggle { entity: String },
    /// Put an entity in a segment's lane
    Move {
        entity: String,
        #[arg(value_enum)]
        segment: SegmentArg,
    },
    /// Change the segment restored at each round when segment reset is on
    #[command(name = "default")]
    SetDefault {
        entity: String,
        #[arg(value_enum)]
        segment: SegmentArg,
    },
    Reaction { entity: String },
    /// Toggle unconsciousness
    Ko { entity: String },
    Status {
        #[command(subcommand)]
        action: StatusAction,
    },
    /// List standard conditions, hiding those the entity already has
    Conditions { entity: Option<String> },
    ResetReactions,
    /// Back to round 1, keeping the roster
    ResetRound,
    /// Clear the encounter
    Reset {
        /// Start from the sample roster instead of an empty one
        #[arg(long)]
        sample: bool,
    },
    Export { path: Option<String> },
    Import { path: String },
    /// Replace the roster with the party plus an encounter's combatants
    LoadEncounter { id: String },
    ListContent,
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    #[command(alias = "quit")]
    Exit,
}

#[derive(Subcommand)]
enum StatusAction {
    Add {
        entity: String,
        name: String,
        /// Investiture instead of a condition
        #[arg(short, long)]
        investiture: bool,
        /// Rounds before it expires
        #[arg(short, long)]
        duration: Option<i32>,
    },
    #[command(alias = "rm")]
    Remove { entity: String, status: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },
    Key { key: String },
    ResetSegments {
        #[arg(value_enum)]
        value: Switch,
    },
    SkipEmpty {
        #[arg(value_enum)]
        value: Switch,
    },
    /// Save the current settings as defaults for new sessions
    SaveDefaults,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "stormclock".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Next) => commands::next_phase(ctx).await?,
        Some(Commands::Back) => commands::previous_phase(ctx).await?,
        Some(Commands::Show) => commands::show(ctx).await?,
        Some(Commands::Add {
            name,
            kind,
            slow,
            unconscious,
            notes,
        }) => commands::add(ctx, &name, kind, slow, unconscious, notes).await?,
        Some(Commands::Remove { entity }) => commands::remove(ctx, &entity).await?,
        Some(Commands::Rename { entity, name }) => commands::rename(ctx, &entity, name).await?,
        Some(Commands::Notes { entity, text }) => commands::set_notes(ctx, &entity, text).await?,
        Some(Commands::Kind { entity, kind }) => commands::set_kind(ctx, &entity, kind).await?,
        Some(Commands::Toggle { entity }) => commands::toggle_segment(ctx, &entity).await?,
        Some(Commands::Move { entity, segment }) => commands::move_entity(ctx, &entity, segment).await?,
        Some(Commands::SetDefault { entity, segment }) => {
            commands::set_default_segment(ctx, &entity, segment).await?
        }
        Some(Commands::Reaction { entity }) => commands::toggle_reaction(ctx, &entity).await?,
        Some(Commands::Ko { entity }) => commands::toggle_unconscious(ctx, &entity).await?,
        Some(Commands::Status { action }) => match action {
            StatusAction::Add {
                entity,
                name,
                investiture,
                duration,
            } => commands::add_status(ctx, &entity, &name, investiture, duration).await?,
            StatusAction::Remove { entity, status } => commands::remove_status(ctx, &entity, &status).await?,
        },
        Some(Commands::Conditions { entity }) => commands::list_conditions(ctx, entity.as_deref()).await?,
        Some(Commands::ResetReactions) => commands::reset_reactions(ctx).await?,
        Some(Commands::ResetRound) => commands::reset_round(ctx).await?,
        Some(Commands::Reset { sample }) => commands::reset(ctx, sample).await?,
        Some(Commands::Export { path }) => commands::export(ctx, path).await?,
        Some(Commands::Import { path }) => commands::import(ctx, &path).await?,
        Some(Commands::LoadEncounter { id }) => commands::load_encounter(ctx, &id).await?,
        Some(Commands::ListContent) => commands::list_content(ctx).await?,
        Some(Commands::Settings { action }) => match action {
            None | Some(SettingsAction::Show) => commands::show_settings(ctx).await?,
            Some(SettingsAction::Mode { mode }) => commands::set_persistence_mode(ctx, mode).await?,
            Some(SettingsAction::Key { key }) => commands::set_storage_key(ctx, &key).await?,
            Some(SettingsAction::ResetSegments { value }) => commands::set_reset_segments(ctx, value).await?,
            Some(SettingsAction::SkipEmpty { value }) => commands::set_skip_empty(ctx, value).await?,
            Some(SettingsAction::SaveDefaults) => commands::save_defaults(ctx).await?,
        },
        Some(Commands::Exit) => {
            commands::exit(ctx).await;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
