use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_model::{EditorConfig, EditsDocument};
use pdf_studio_core::{EditorSession, LayoutBox, SyncStatus, Tool, ToolSetting};
use pdf_studio_scheduler::{Clock, ManualClock};
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::{EditsBackend, FileBackend, HttpBackend, Storage, WriteWorker};
use tracing_subscriber::EnvFilter;

const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Letter page at 96 dpi, used when a script gives no layout.
const DEFAULT_LAYOUT: LayoutBox = LayoutBox { left: 0.0, top: 0.0, width: 816.0, height: 1056.0 };

#[derive(Debug, Parser)]
#[command(name = "pdf-studio-cli")]
#[command(about = "PDF Studio annotation CLI")]
pub struct Cli {
    /// Base URL of the edits service; overrides the configured one.
    #[arg(long, global = true, value_name = "URL", conflicts_with = "dir")]
    api: Option<String>,

    /// Keep edits as JSON files in this directory instead of the service.
    #[arg(long, global = true, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Editor config file; defaults to the one in the user data directory.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the edits document of a file as JSON.
    Get {
        #[arg(value_name = "FILE_ID")]
        file_id: String,
    },
    /// Check an edits document JSON file for geometric problems.
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run a scripted pointer session against a file's edits and save the result.
    Replay {
        #[arg(value_name = "FILE_ID")]
        file_id: String,
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },
    /// Print CLI version.
    Version,
}

/// Scripted editor session read by `replay`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplayScript {
    #[serde(default)]
    layout: Option<LayoutBox>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum Step {
    Tool { tool: Tool },
    Setting { change: ToolSetting },
    Zoom { zoom: f32 },
    Page { page: u32 },
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Cancel,
    Click { x: f32, y: f32 },
    DoubleClick { x: f32, y: f32 },
    Type { text: String },
    Backspace,
    Blur,
    DeleteSelected,
    /// Advance the session clock, letting debounced writes come due.
    Wait { ms: u64 },
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ =
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match &cli.command {
        Commands::Get { file_id } => run_get(&cli, file_id),
        Commands::Validate { file } => run_validate(file),
        Commands::Replay { file_id, script } => run_replay(&cli, file_id, script),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<EditorConfig> {
    let config = match &cli.config {
        Some(path) => Storage::load_config_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match Storage::from_default_project() {
            Ok(storage) => storage.load_config().context("failed to load config")?,
            Err(error) => {
                tracing::debug!(%error, "no data directory; using default config");
                EditorConfig::default()
            }
        },
    };

    Ok(match &cli.api {
        Some(url) => config.with_api_base_url(url.clone()),
        None => config,
    })
}

fn backend(cli: &Cli, config: &EditorConfig) -> Box<dyn EditsBackend> {
    match &cli.dir {
        Some(dir) => Box::new(FileBackend::new(dir.clone())),
        None => Box::new(HttpBackend::new(config.api_base_url.clone())),
    }
}

fn run_get(cli: &Cli, file_id: &str) -> Result<()> {
    let config = load_config(cli)?;
    let document = backend(cli, &config)
        .load(file_id)
        .with_context(|| format!("failed to load edits for {file_id}"))?;

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn run_validate(file: &Path) -> Result<()> {
    ensure_file_exists(file)?;

    let raw =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let document: EditsDocument = serde_json::from_str(&raw)
        .with_context(|| format!("not an edits document: {}", file.display()))?;

    let issues = document.validate();
    if issues.is_empty() {
        println!("ok: {} items on {} pages", document.item_count(), document.pages.len());
        return Ok(());
    }

    for issue in &issues {
        eprintln!("{issue}");
    }
    anyhow::bail!("{} validation issue(s) in {}", issues.len(), file.display())
}

fn run_replay(cli: &Cli, file_id: &str, script_path: &Path) -> Result<()> {
    ensure_file_exists(script_path)?;

    let raw = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read {}", script_path.display()))?;
    let script: ReplayScript = serde_json::from_str(&raw)
        .with_context(|| format!("invalid replay script: {}", script_path.display()))?;

    let config = load_config(cli)?;
    let backend = backend(cli, &config);
    let document =
        backend.load(file_id).with_context(|| format!("failed to load edits for {file_id}"))?;
    let worker = WriteWorker::spawn(backend).context("failed to start edits writer")?;

    let clock = ManualClock::new();
    let mut session = EditorSession::new(file_id, config, clock.clone());
    session.open(file_id, document);
    session.set_layout(Some(script.layout.unwrap_or(DEFAULT_LAYOUT)));

    let mut writes = 0;
    for step in script.steps {
        if let Step::Wait { ms } = step {
            clock.advance(Duration::from_millis(ms));
        } else {
            apply_step(&mut session, step);
        }
        session.begin_frame();
        writes += drain(&mut session, &worker, false)?;
    }

    session.end_editing();
    writes += drain(&mut session, &worker, true)?;
    worker.shutdown();

    println!("{}", serde_json::to_string_pretty(&*session.document())?);
    eprintln!("{writes} writes");

    if let SyncStatus::Failed(error) = session.sync_status() {
        anyhow::bail!("edits were not saved: {error}");
    }
    Ok(())
}

fn apply_step<C: Clock>(session: &mut EditorSession<C>, step: Step) {
    match step {
        Step::Tool { tool } => session.set_tool(tool),
        Step::Setting { change } => session.set_tool_setting(&change),
        Step::Zoom { zoom } => session.set_zoom(zoom),
        Step::Page { page } => session.set_page(page),
        Step::Down { x, y } => session.pointer_down(x, y),
        Step::Move { x, y } => session.pointer_move(x, y),
        Step::Up { x, y } => session.pointer_up(x, y),
        Step::Cancel => session.pointer_cancel(None),
        Step::Click { x, y } => session.click(x, y),
        Step::DoubleClick { x, y } => session.double_click(x, y),
        Step::Type { text } => session.type_text(&text),
        Step::Backspace => session.backspace(),
        Step::Blur => session.end_editing(),
        Step::DeleteSelected => {
            session.delete_selected();
        }
        Step::Wait { .. } => {}
    }
}

/// Hand due writes to the worker one at a time, returning how many ran.
fn drain<C: Clock>(
    session: &mut EditorSession<C>,
    worker: &WriteWorker,
    flush: bool,
) -> Result<usize> {
    let mut writes = 0;
    loop {
        let job = if flush { session.flush_persistence() } else { session.poll_persistence() };
        let Some(job) = job else {
            return Ok(writes);
        };

        worker.submit(job).context("edits writer stopped")?;
        let outcome =
            worker.wait_outcome(WRITE_TIMEOUT).context("timed out waiting for edits write")?;
        session.complete_write(outcome);
        writes += 1;
    }
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
