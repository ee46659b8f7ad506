mod config;
mod wizard;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::{ConfigMerger, MergedConfig};
use fs_err as fs;
use scf_core::Staleness;
use scf_detect::{FsProjectView, detect_project};
use scf_render::render_buildstate_md;
use scf_store::{MarkdownState, SaveOptions, StoreError};
use scf_types::buildstate::{Buildstate, ProjectInfo, ToolInfo};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "scf",
    version,
    about = "Session continuity buildstates: project context that survives between agent sessions."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Initialize buildstate files for a project.
    Init(InitArgs),
    /// Show a buildstate summary.
    Status(StatusArgs),
    /// Start or end a work session.
    #[command(subcommand)]
    Session(SessionCommand),
    /// Record and complete tasks.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Record decisions with rationale.
    #[command(subcommand)]
    Decision(DecisionCommand),
    /// Record, promote, and list learned patterns.
    #[command(subcommand)]
    Pattern(PatternCommand),
    /// Re-render buildstate.md from buildstate.json.
    Sync(SyncArgs),
    /// Validate buildstate.json against the v1 schema.
    Validate(ValidateArgs),
    /// Discover buildstates across projects.
    List(ListArgs),
}

#[derive(Debug, Parser)]
struct InitArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,

    /// Prompt for project details instead of taking detection defaults.
    #[arg(long, default_value_t = false)]
    interactive: bool,

    /// Project name (default: detected from the manifest or directory).
    #[arg(long)]
    name: Option<String>,

    /// One-line project description.
    #[arg(long)]
    description: Option<String>,

    /// Skip seeding patterns from the global store.
    #[arg(long, default_value_t = false)]
    no_seed: bool,

    /// Reinitialize even if a buildstate already exists.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Debug, Parser)]
struct StatusArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Open a new session.
    Start(SessionStartArgs),
    /// Close the open session.
    End(SessionEndArgs),
}

#[derive(Debug, Parser)]
struct SessionStartArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct SessionEndArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,

    /// What the session accomplished.
    #[arg(long)]
    summary: Option<String>,

    /// Notable outcomes (repeatable).
    #[arg(long = "highlight")]
    highlights: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Record an open task.
    Add(TaskAddArgs),
    /// Complete a task by id prefix or exact title.
    Done(TaskDoneArgs),
}

#[derive(Debug, Parser)]
struct TaskAddArgs {
    title: String,

    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,

    #[arg(long)]
    note: Option<String>,
}

#[derive(Debug, Parser)]
struct TaskDoneArgs {
    /// Task id prefix or exact title.
    reference: String,

    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,
}

#[derive(Debug, Subcommand)]
enum DecisionCommand {
    /// Record a decision.
    Add(DecisionAddArgs),
}

#[derive(Debug, Parser)]
struct DecisionAddArgs {
    title: String,

    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,

    #[arg(long)]
    rationale: Option<String>,
}

#[derive(Debug, Subcommand)]
enum PatternCommand {
    /// Record a local pattern (re-recording bumps its counter).
    Add(PatternAddArgs),
    /// Copy a local pattern into the global store.
    Promote(PatternPromoteArgs),
    /// List patterns, local or global.
    List(PatternListArgs),
}

#[derive(Debug, Parser)]
struct PatternAddArgs {
    name: String,

    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Debug, Parser)]
struct PatternPromoteArgs {
    /// Pattern id prefix or exact name.
    reference: String,

    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct PatternListArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,

    /// List the global store instead of the project.
    #[arg(long, default_value_t = false)]
    global: bool,
}

#[derive(Debug, Parser)]
struct SyncArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,

    /// Overwrite buildstate.md even if it has hand edits.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Debug, Parser)]
struct ValidateArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    path: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct ListArgs {
    /// Directory holding projects (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        eprintln!("error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Status(args) => cmd_status(args),
        Command::Session(SessionCommand::Start(args)) => cmd_session_start(args),
        Command::Session(SessionCommand::End(args)) => cmd_session_end(args),
        Command::Task(TaskCommand::Add(args)) => cmd_task_add(args),
        Command::Task(TaskCommand::Done(args)) => cmd_task_done(args),
        Command::Decision(DecisionCommand::Add(args)) => cmd_decision_add(args),
        Command::Pattern(PatternCommand::Add(args)) => cmd_pattern_add(args),
        Command::Pattern(PatternCommand::Promote(args)) => cmd_pattern_promote(args),
        Command::Pattern(PatternCommand::List(args)) => cmd_pattern_list(args),
        Command::Sync(args) => cmd_sync(args),
        Command::Validate(args) => cmd_validate(args),
        Command::List(args) => cmd_list(args),
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let root = args.path;
    let file_config = config::load_or_default(&root).context("load scf.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_init_args(args.no_seed);

    if scf_store::buildstate_path(&root).exists() && !args.force {
        anyhow::bail!(
            "buildstate already exists at {}; use --force to reinitialize",
            scf_store::buildstate_path(&root)
        );
    }

    let detection = detect_project(&FsProjectView::new(root.clone()));

    let (name, description, focus) = if args.interactive {
        match wizard::run_init_wizard(&detection)? {
            Some(answers) => (answers.name, answers.description, answers.focus),
            None => {
                println!("init cancelled");
                return Ok(());
            }
        }
    } else {
        (
            args.name.unwrap_or_else(|| detection.name.clone()),
            args.description,
            None,
        )
    };

    let now = Utc::now();
    let project = ProjectInfo {
        name,
        kind: detection.kind,
        description,
        root: root.to_string(),
        created_at: now,
    };
    let mut bs = Buildstate::new(tool_info(), project, now);

    if let Some(focus) = focus {
        scf_core::set_focus(&mut bs, &focus);
    }

    if merged.seed_patterns {
        let store_path = pattern_store_path()?;
        let mut store = scf_store::load_or_new_pattern_store(&store_path, tool_info(), now)
            .context("load global pattern store")?;
        let seeded = scf_core::seed_patterns(&mut bs, &mut store, now);
        if seeded > 0 {
            scf_store::save_pattern_store(&store_path, &mut store, now)
                .context("save global pattern store")?;
            println!(
                "seeded {seeded} pattern(s) from the global store for {} projects",
                bs.project.kind.label()
            );
        }
    }

    persist(&root, &mut bs, &merged)?;
    info!("initialized buildstate at {}", root);
    println!(
        "initialized {} and {}",
        scf_store::buildstate_path(&root),
        scf_store::markdown_path(&root)
    );
    Ok(())
}

fn cmd_status(args: StatusArgs) -> anyhow::Result<()> {
    let root = args.path;
    let merged = merged_config(&root)?;
    let bs = load(&root)?;

    let now = Utc::now();
    let staleness = scf_core::staleness(&bs, now, merged.staleness_days);
    let drift = scf_store::markdown_drift(&root, &bs)?;
    let open_tasks = bs.open_tasks().count();

    match args.format {
        OutputFormat::Text => {
            println!("Project:  {} ({})", bs.project.name, bs.project.kind.label());
            match &bs.focus.current {
                Some(focus) => println!("Focus:    {focus}"),
                None => println!("Focus:    (none)"),
            }
            println!("Tasks:    {open_tasks} open");
            match bs.open_session() {
                Some(s) => println!(
                    "Session:  open since {}",
                    s.started_at.format("%Y-%m-%d %H:%M UTC")
                ),
                None => println!("Session:  none open"),
            }
            match staleness {
                Staleness::Fresh => println!(
                    "Updated:  {}",
                    bs.integrity.updated_at.format("%Y-%m-%d %H:%M UTC")
                ),
                Staleness::Stale { days } => println!(
                    "Updated:  {} (stale, {days} days ago)",
                    bs.integrity.updated_at.format("%Y-%m-%d %H:%M UTC")
                ),
            }
            println!("Markdown: {}", drift.label());
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "project": bs.project.name,
                "kind": bs.project.kind.label(),
                "focus": bs.focus.current,
                "open_tasks": open_tasks,
                "session_open": bs.open_session().is_some(),
                "updated_at": bs.integrity.updated_at,
                "stale": matches!(staleness, Staleness::Stale { .. }),
                "markdown": drift.label(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn cmd_session_start(args: SessionStartArgs) -> anyhow::Result<()> {
    let root = args.path;
    let merged = merged_config(&root)?;
    let mut bs = load(&root)?;

    let id = scf_core::start_session(&mut bs, Utc::now())?;
    persist(&root, &mut bs, &merged)?;
    println!("started session {id}");
    Ok(())
}

fn cmd_session_end(args: SessionEndArgs) -> anyhow::Result<()> {
    let root = args.path;
    let merged = merged_config(&root)?;
    let mut bs = load(&root)?;

    let id = scf_core::end_session(&mut bs, Utc::now(), args.summary, args.highlights)?;
    persist(&root, &mut bs, &merged)?;
    println!("ended session {id}");
    Ok(())
}

fn cmd_task_add(args: TaskAddArgs) -> anyhow::Result<()> {
    let root = args.path;
    let merged = merged_config(&root)?;
    let mut bs = load(&root)?;

    let id = scf_core::add_task(&mut bs, &args.title, args.note, Utc::now());
    persist(&root, &mut bs, &merged)?;
    println!("task {id}");
    Ok(())
}

fn cmd_task_done(args: TaskDoneArgs) -> anyhow::Result<()> {
    let root = args.path;
    let merged = merged_config(&root)?;
    let mut bs = load(&root)?;

    let id = scf_core::complete_task(&mut bs, &args.reference, Utc::now())?;
    persist(&root, &mut bs, &merged)?;
    println!("completed task {id}");
    Ok(())
}

fn cmd_decision_add(args: DecisionAddArgs) -> anyhow::Result<()> {
    let root = args.path;
    let merged = merged_config(&root)?;
    let mut bs = load(&root)?;

    let id = scf_core::add_decision(&mut bs, &args.title, args.rationale, Utc::now());
    persist(&root, &mut bs, &merged)?;
    println!("decision {id}");
    Ok(())
}

fn cmd_pattern_add(args: PatternAddArgs) -> anyhow::Result<()> {
    let root = args.path;
    let merged = merged_config(&root)?;
    let mut bs = load(&root)?;

    let id = scf_core::add_pattern(&mut bs, &args.name, args.description, Utc::now());
    persist(&root, &mut bs, &merged)?;
    println!("pattern {id}");
    Ok(())
}

fn cmd_pattern_promote(args: PatternPromoteArgs) -> anyhow::Result<()> {
    let root = args.path;
    let bs = load(&root)?;

    let now = Utc::now();
    let store_path = pattern_store_path()?;
    let mut store = scf_store::load_or_new_pattern_store(&store_path, tool_info(), now)
        .context("load global pattern store")?;

    let id = scf_core::promote_pattern(&bs, &mut store, &args.reference, now)?;
    scf_store::save_pattern_store(&store_path, &mut store, now)
        .context("save global pattern store")?;
    println!("promoted pattern {id} to {store_path}");
    Ok(())
}

fn cmd_pattern_list(args: PatternListArgs) -> anyhow::Result<()> {
    let patterns = if args.global {
        let store_path = pattern_store_path()?;
        let store = scf_store::load_or_new_pattern_store(&store_path, tool_info(), Utc::now())
            .context("load global pattern store")?;
        store.patterns
    } else {
        load(&args.path)?.patterns
    };

    if patterns.is_empty() {
        println!("no patterns recorded");
        return Ok(());
    }

    println!("  {:<36} {:<10} {:<8} NAME", "ID", "ORIGIN", "APPLIED");
    for p in &patterns {
        println!(
            "  {:<36} {:<10} {:<8} {}",
            p.id,
            p.origin.label(),
            p.times_applied,
            p.name
        );
    }
    Ok(())
}

fn cmd_sync(args: SyncArgs) -> anyhow::Result<()> {
    let root = args.path;
    let merged = merged_config(&root)?;
    let mut bs = load(&root)?;

    let drift = scf_store::markdown_drift(&root, &bs)?;
    if drift == MarkdownState::Drifted && !args.force {
        anyhow::bail!(
            "buildstate.md has hand edits; fold them into buildstate.json first, \
             or rerun with --force to overwrite"
        );
    }

    persist(&root, &mut bs, &merged)?;
    println!("synced {}", scf_store::markdown_path(&root));
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let path = scf_store::buildstate_path(&args.path);
    let contents = fs::read_to_string(&path).with_context(|| format!("read {}", path))?;
    let instance: serde_json::Value =
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path))?;

    let schema: serde_json::Value = serde_json::from_str(include_str!(
        "../schemas/buildstate.v1.json"
    ))
    .context("parse embedded schema")?;
    let validator = jsonschema::validator_for(&schema).context("compile buildstate schema")?;

    let errors: Vec<String> = validator
        .iter_errors(&instance)
        .map(|e| format!("{} (at {})", e, e.instance_path()))
        .collect();

    if !errors.is_empty() {
        for err in &errors {
            eprintln!("schema violation: {err}");
        }
        anyhow::bail!("{} failed validation ({} error(s))", path, errors.len());
    }

    let declared = instance.get("schema").and_then(|s| s.as_str());
    if declared != Some(scf_types::schema::SCF_BUILDSTATE_V1) {
        anyhow::bail!(
            "unexpected schema id {:?}; expected {}",
            declared,
            scf_types::schema::SCF_BUILDSTATE_V1
        );
    }

    println!("{path} is valid {}", scf_types::schema::SCF_BUILDSTATE_V1);
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let found = scf_store::discover_buildstates(&args.root)?;

    match args.format {
        OutputFormat::Text => {
            if found.is_empty() {
                println!("no buildstates under {}", args.root);
                return Ok(());
            }
            println!("  {:<20} {:<8} {:<6} FOCUS", "PROJECT", "KIND", "TASKS");
            for entry in &found {
                match &entry.buildstate {
                    Ok(bs) => println!(
                        "  {:<20} {:<8} {:<6} {}",
                        bs.project.name,
                        bs.project.kind.label(),
                        bs.open_tasks().count(),
                        bs.focus.current.as_deref().unwrap_or("-")
                    ),
                    Err(e) => println!("  {:<20} (unreadable: {e})", entry.project_dir),
                }
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = found
                .iter()
                .map(|entry| match &entry.buildstate {
                    Ok(bs) => serde_json::json!({
                        "path": entry.path.as_str(),
                        "project": bs.project.name,
                        "kind": bs.project.kind.label(),
                        "open_tasks": bs.open_tasks().count(),
                    }),
                    Err(e) => serde_json::json!({
                        "path": entry.path.as_str(),
                        "error": e.to_string(),
                    }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}

fn merged_config(root: &Utf8Path) -> anyhow::Result<MergedConfig> {
    let file_config = config::load_or_default(root).context("load scf.toml config")?;
    Ok(ConfigMerger::new(file_config).merged())
}

fn load(dir: &Utf8Path) -> anyhow::Result<Buildstate> {
    scf_store::load_buildstate(dir).map_err(|e| match e {
        StoreError::NotFound { path } => {
            anyhow::anyhow!("no buildstate at {}; run 'scf init' first", path)
        }
        other => anyhow::Error::new(other),
    })
}

/// Re-render the markdown and save the buildstate so both files stay in
/// step. Retention runs on every save.
///
/// One timestamp covers the whole persist: the rendered `Updated:` line
/// must match the `integrity.updated_at` saved next to it.
fn persist(dir: &Utf8Path, bs: &mut Buildstate, merged: &MergedConfig) -> anyhow::Result<()> {
    let now = Utc::now();
    scf_core::apply_retention(bs, &merged.caps);
    bs.integrity.updated_at = now;
    let md = render_buildstate_md(bs, &merged.render);
    scf_store::write_markdown(dir, bs, &md).context("write buildstate.md")?;
    scf_store::save_buildstate(
        dir,
        bs,
        now,
        &SaveOptions {
            backup: merged.backup,
        },
    )
    .context("write buildstate.json")?;
    Ok(())
}

fn pattern_store_path() -> anyhow::Result<Utf8PathBuf> {
    let base = match std::env::var_os("SCF_DATA_DIR") {
        Some(dir) => std::path::PathBuf::from(dir),
        None => dirs::data_dir()
            .context("no user data directory on this platform")?
            .join("scf"),
    };
    let utf8 = Utf8PathBuf::from_path_buf(base)
        .map_err(|p| anyhow::anyhow!("non-utf8 data directory: {}", p.display()))?;
    Ok(utf8.join("patterns.json"))
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "scf".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        commit: None,
    }
}
