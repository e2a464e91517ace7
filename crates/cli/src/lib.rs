use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdf_annotator_core::{
    Key, MemoryHost, Painter, PainterConfig, PointerEvent, PointerPhase, SelectionRange,
    TextSelection,
};
use pdf_annotator_model::{
    AnnotationKind, AnnotationSpec, ContainerId, DataUrl, GroupId, HostPayload, PageView,
    PageViewport, PainterMode, Point, Transform,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const TEXT_LAYER_ROOT: ContainerId = ContainerId(0);

#[derive(Debug, Parser)]
#[command(name = "pdf-annotator")]
#[command(about = "PDF annotation layer tooling")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON event script and print the resulting annotation storage.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Painter configuration file (JSON).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Also print the store records.
        #[arg(long)]
        records: bool,
    },
    /// List annotation kinds and the mode each one switches into.
    Kinds,
    /// Print CLI version.
    Version,
}

/// Viewer events driving a replay
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Step {
    InitCanvas {
        page: u32,
        #[serde(default = "default_scale")]
        scale: f64,
        /// Page rotation in degrees
        #[serde(default)]
        rotation: u16,
        #[serde(default)]
        css_only: bool,
    },
    DestroyCanvas {
        page: u32,
    },
    Activate {
        kind: Option<AnnotationKind>,
        #[serde(default)]
        once: bool,
        transfer: Option<String>,
        /// Image file turned into the transfer payload, relative to the script
        transfer_file: Option<PathBuf>,
    },
    Pointer {
        page: u32,
        phase: PointerPhase,
        x: f64,
        y: f64,
    },
    Key {
        key: Key,
    },
    Text {
        page: u32,
        text: String,
    },
    Selection {
        ranges: Vec<SelectionRange>,
    },
    Transform {
        transform: Transform,
    },
    /// Delete by ID, or the most recently added annotation
    Delete {
        id: Option<GroupId>,
    },
    Refresh,
    Flush,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct Script {
    steps: Vec<Step>,
}

#[derive(Debug, Serialize)]
struct ReplayOutput<'a> {
    added: Vec<GroupId>,
    mode: PainterMode,
    storage: &'a BTreeMap<String, HostPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct KindOutput {
    kind: AnnotationKind,
    mode: PainterMode,
    marker: String,
    text_markup: bool,
    transfer_payload: bool,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing();

    match cli.command {
        Commands::Replay {
            script,
            config,
            records,
        } => run_replay(&script, config.as_deref(), records),
        Commands::Kinds => run_kinds(),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init in the same process is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<PainterConfig> {
    let config = match path {
        Some(path) => PainterConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .apply_env()?,
        None => PainterConfig::from_env()?,
    };
    Ok(config)
}

fn run_replay(script_path: &Path, config: Option<&Path>, with_records: bool) -> Result<()> {
    ensure_file_exists(script_path)?;

    let contents = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&contents).context("failed to parse script")?;
    let base_dir = script_path.parent().unwrap_or_else(|| Path::new("."));

    let mut painter = Painter::new(MemoryHost::new(), load_config(config)?);
    painter.init_web_selection(TEXT_LAYER_ROOT);
    let mut added = Vec::new();
    for (index, step) in script.steps.into_iter().enumerate() {
        apply_step(&mut painter, step, base_dir, &mut added)
            .with_context(|| format!("step {} failed", index + 1))?;
    }
    painter.process_pending_refreshes();
    painter.reset_pdfjs_annotation_storage();

    let records = if with_records {
        Some(serde_json::from_str(&painter.store().export_json()?)?)
    } else {
        None
    };
    let output = ReplayOutput {
        added,
        mode: painter.mode(),
        storage: painter.host().storage(),
        records,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn apply_step(
    painter: &mut Painter<MemoryHost>,
    step: Step,
    base_dir: &Path,
    added: &mut Vec<GroupId>,
) -> Result<()> {
    match step {
        Step::InitCanvas {
            page,
            scale,
            rotation,
            css_only,
        } => {
            let container = ContainerId(u64::from(page));
            painter.host_mut().attach(container);
            let viewport = PageViewport::letter(scale).with_rotation(rotation);
            painter.init_canvas(PageView::new(container, viewport), css_only, page);
        }
        Step::DestroyCanvas { page } => {
            painter.host_mut().detach(ContainerId(u64::from(page)));
            painter.destroy_canvas(page);
        }
        Step::Activate {
            kind,
            once,
            transfer,
            transfer_file,
        } => {
            let transfer = match transfer_file {
                Some(file) => Some(read_data_url(&base_dir.join(file))?),
                None => transfer,
            };
            let spec = kind.map(|kind| {
                let spec = AnnotationSpec::new(kind);
                if once {
                    spec.once()
                } else {
                    spec
                }
            });
            painter.activate(spec, transfer);
        }
        Step::Pointer { page, phase, x, y } => {
            let event = PointerEvent {
                phase,
                position: Point::new(x, y),
            };
            added.extend(painter.handle_pointer(page, event));
        }
        Step::Key { key } => painter.handle_key(&key),
        Step::Text { page, text } => added.extend(painter.submit_free_text(page, &text)),
        Step::Selection { ranges } => {
            added.extend(painter.handle_text_selection(&TextSelection { ranges }));
        }
        Step::Transform { transform } => {
            if !painter.transform_selected(transform) {
                tracing::warn!("transform step without a selection");
            }
        }
        Step::Delete { id } => {
            let Some(id) = id.or_else(|| added.last().cloned()) else {
                anyhow::bail!("nothing to delete");
            };
            painter.delete_annotation(&id);
        }
        Step::Refresh => {
            painter.process_pending_refreshes();
        }
        Step::Flush => painter.reset_pdfjs_annotation_storage(),
    }
    Ok(())
}

fn read_data_url(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    let is_svg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    let mime = if is_svg {
        "image/svg+xml"
    } else {
        image::ImageFormat::from_path(path)
            .with_context(|| format!("unsupported image type: {}", path.display()))?
            .to_mime_type()
    };
    Ok(DataUrl::encode(mime, &bytes))
}

fn run_kinds() -> Result<()> {
    let kinds: Vec<KindOutput> = AnnotationKind::ALL
        .into_iter()
        .map(|kind| KindOutput {
            kind,
            mode: kind.mode(),
            marker: kind.css_marker(),
            text_markup: kind.is_text_markup(),
            transfer_payload: kind.accepts_transfer_payload(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&kinds)?);
    Ok(())
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
