//! Subcommand arguments and handlers.
//!
//! Every handler writes one pretty-printed JSON document to `out`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use multistream::{
    ContainerMetrics, CustomLayoutStore, FileStorage, GestureError, LayoutConfig, LayoutSession,
    MemoryStorage, Platform, Rect, Sides, Size, Stream, StreamSetSignature, TileId,
    compute_tile_sizing,
};
use serde::Serialize;
use tracing::debug;

use crate::error::{CliError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Argument parsing
// ─────────────────────────────────────────────────────────────────────────────

/// A stream named on the command line: `platform:channel[:instance]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamArg {
    pub platform: Platform,
    pub channel: String,
    pub instance: Option<String>,
}

impl StreamArg {
    /// The stream, using its position on the command line as the instance
    /// when none was given.
    fn into_stream(self, index: usize) -> Stream {
        match self.instance {
            Some(instance) => Stream::new(self.platform, self.channel, instance),
            None => Stream::new(self.platform, self.channel, index),
        }
    }
}

pub fn parse_stream_arg(raw: &str) -> std::result::Result<StreamArg, String> {
    let mut parts = raw.splitn(3, ':');
    let platform = parts.next().unwrap_or_default();
    let channel = parts.next().unwrap_or_default().trim();
    if channel.is_empty() {
        return Err(format!("expected platform:channel, got {raw:?}"));
    }
    let platform: Platform = platform.parse().map_err(|e| format!("{e}"))?;
    Ok(StreamArg {
        platform,
        channel: channel.to_owned(),
        instance: parts.next().map(str::to_owned),
    })
}

fn parse_numbers<const N: usize>(raw: &str, shape: &str) -> std::result::Result<[f64; N], String> {
    let values: Vec<f64> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("expected {shape}, got {raw:?}: {e}"))?;
    let values: [f64; N] = values
        .try_into()
        .map_err(|_| format!("expected {shape}, got {raw:?}"))?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(format!("expected finite numbers in {raw:?}"));
    }
    Ok(values)
}

pub fn parse_rect(raw: &str) -> std::result::Result<Rect, String> {
    let [x, y, w, h] = parse_numbers::<4>(raw, "x,y,w,h")?;
    Ok(Rect::new(x, y, w, h))
}

pub fn parse_point(raw: &str) -> std::result::Result<(f64, f64), String> {
    let [x, y] = parse_numbers::<2>(raw, "x,y")?;
    Ok((x, y))
}

pub fn parse_size(raw: &str) -> std::result::Result<Size, String> {
    let normalized = raw.replace(['x', 'X'], ",");
    let [w, h] = parse_numbers::<2>(&normalized, "WxH")?;
    Ok(Size::new(w, h))
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared arguments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct ContainerArgs {
    /// Container client width in pixels.
    #[arg(long)]
    pub width: f64,

    /// Container client height in pixels.
    #[arg(long)]
    pub height: f64,

    /// Padding on every side of the container.
    #[arg(long, default_value_t = 0.0)]
    pub padding: f64,

    /// Column count (defaults to the configured initial count).
    #[arg(long)]
    pub cols: Option<usize>,
}

impl ContainerArgs {
    fn metrics(&self) -> Result<ContainerMetrics> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("padding", self.padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CliError::invalid(format!("{name} must be >= 0, got {value}")));
            }
        }
        Ok(ContainerMetrics::new(
            Size::new(self.width, self.height),
            Sides::all(self.padding),
        ))
    }
}

#[derive(Debug, Clone, Args)]
pub struct StreamArgs {
    /// Active stream as platform:channel[:instance]; repeat for each tile.
    #[arg(long = "stream", value_parser = parse_stream_arg, required = true)]
    pub streams: Vec<StreamArg>,

    /// JSON layout file holding customizations; accepted placements are saved here.
    #[arg(long)]
    pub store: Option<PathBuf>,
}

impl StreamArgs {
    fn streams(&self) -> Vec<Stream> {
        self.streams
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, spec)| spec.into_stream(index))
            .collect()
    }

    fn layout_store(&self, config: &LayoutConfig) -> CustomLayoutStore {
        let prefix = config.storage_key_prefix.clone();
        match &self.store {
            Some(path) => CustomLayoutStore::with_prefix(Box::new(FileStorage::new(path)), prefix),
            None => CustomLayoutStore::with_prefix(Box::new(MemoryStorage::new()), prefix),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading layout config");
            Ok(LayoutConfig::load(path)?)
        }
        None => Ok(LayoutConfig::default()),
    }
}

fn open_session(
    config: LayoutConfig,
    container: &ContainerArgs,
    streams: &StreamArgs,
) -> Result<LayoutSession> {
    let metrics = container.metrics()?;
    let cols = container.cols.unwrap_or(config.initial_cols);
    let store = streams.layout_store(&config);
    debug!(backend = store.backend_name(), cols, "opening layout session");
    let mut session = LayoutSession::new(config, store);
    session.set_streams(streams.streams());
    session.set_cols(cols);
    session.observe_container(metrics);
    Ok(session)
}

fn emit<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// size
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct SizeArgs {
    /// Container content width in pixels.
    #[arg(long)]
    pub width: f64,

    /// Container content height in pixels.
    #[arg(long)]
    pub height: f64,

    /// Number of tiles.
    #[arg(long)]
    pub tiles: usize,

    /// Column count (defaults to the configured initial count).
    #[arg(long)]
    pub cols: Option<usize>,

    /// Tile size currently on screen, as WxH.
    #[arg(long, value_parser = parse_size)]
    pub current: Option<Size>,

    /// Always recompute instead of keeping a fitting current size.
    #[arg(long)]
    pub no_stability: bool,
}

#[derive(Debug, Serialize)]
struct SizeReport {
    tile: Size,
    rows: usize,
    cols: usize,
    available_height: f64,
    branch: &'static str,
}

pub fn run_size<W: Write>(config: &LayoutConfig, args: SizeArgs, out: &mut W) -> Result<()> {
    if !(args.width.is_finite() && args.height.is_finite())
        || args.width < 0.0
        || args.height < 0.0
    {
        return Err(CliError::invalid("width and height must be >= 0"));
    }
    let cols = args.cols.unwrap_or(config.initial_cols);
    let params = config
        .tile_size_params(Size::new(args.width, args.height), args.tiles, cols)
        .current_size(args.current)
        .prevent_shrink_on_row_add(config.prevent_shrink_on_row_add && !args.no_stability);
    let sizing = compute_tile_sizing(&params);
    emit(
        out,
        &SizeReport {
            tile: sizing.size,
            rows: sizing.rows,
            cols: sizing.cols,
            available_height: sizing.available_height,
            branch: sizing.branch.as_str(),
        },
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// layout
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(flatten)]
    pub streams: StreamArgs,
}

#[derive(Debug, Serialize)]
struct TileReport {
    id: TileId,
    #[serde(flatten)]
    rect: Rect,
    customized: bool,
}

#[derive(Debug, Serialize)]
struct LayoutReport {
    signature: String,
    cols: usize,
    tile: Size,
    bounds: Size,
    tiles: Vec<TileReport>,
    stale: Vec<TileId>,
}

pub fn run_layout<W: Write>(config: LayoutConfig, args: LayoutArgs, out: &mut W) -> Result<()> {
    let session = open_session(config, &args.container, &args.streams)?;
    let positions = session.positions();
    let tiles = session
        .order()
        .into_iter()
        .filter_map(|id| {
            let rect = *positions.get(id.as_str())?;
            let customized = session.custom_layout().contains(id.as_str());
            Some(TileReport { id, rect, customized })
        })
        .collect();
    emit(
        out,
        &LayoutReport {
            signature: StreamSetSignature::from_streams(session.streams()).to_string(),
            cols: session.cols().get(),
            tile: session.tile_size(),
            bounds: session.bounds(),
            tiles,
            stale: session.stale_tiles(),
        },
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// validate
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(flatten)]
    pub streams: StreamArgs,

    /// Tile to move: its id or its 0-based position among --stream.
    #[arg(long)]
    pub target: String,

    /// Resize the target to x,y,w,h (height is snapped to the aspect ratio).
    #[arg(long, value_parser = parse_rect, conflicts_with = "to", required_unless_present = "to")]
    pub rect: Option<Rect>,

    /// Drag the target to x,y keeping its size.
    #[arg(long, value_parser = parse_point)]
    pub to: Option<(f64, f64)>,
}

#[derive(Debug, Serialize)]
struct ValidateReport {
    target: TileId,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rect: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn resolve_target(session: &LayoutSession, target: &str) -> Result<TileId> {
    if let Some(stream) = session.streams().iter().find(|s| s.id.as_str() == target) {
        return Ok(stream.id.clone());
    }
    target
        .parse::<usize>()
        .ok()
        .and_then(|index| session.streams().get(index))
        .map(|stream| stream.id.clone())
        .ok_or_else(|| CliError::invalid(format!("unknown target {target:?}")))
}

pub fn run_validate<W: Write>(
    config: LayoutConfig,
    args: ValidateArgs,
    out: &mut W,
) -> Result<()> {
    let mut session = open_session(config, &args.container, &args.streams)?;
    session.set_autosave(false);
    let target = resolve_target(&session, &args.target)?;

    let outcome = match (args.rect, args.to) {
        (Some(rect), _) => session.handle_resize_stop(target.as_str(), rect),
        (None, Some((x, y))) => session.handle_drag_stop(target.as_str(), x, y),
        (None, None) => return Err(CliError::invalid("one of --rect or --to is required")),
    };
    if outcome.is_ok() {
        session.persist()?;
    }

    let report = match &outcome {
        Ok(rect) => ValidateReport {
            target: target.clone(),
            accepted: true,
            rect: Some(*rect),
            reason: None,
        },
        Err(error) => ValidateReport {
            target: target.clone(),
            accepted: false,
            rect: None,
            reason: Some(match error {
                GestureError::Rejected { reason, .. } => reason.to_string(),
                other => other.to_string(),
            }),
        },
    };
    emit(out, &report)?;

    match (outcome, report.reason) {
        (Err(_), Some(reason)) => Err(CliError::Rejected {
            tile: target.to_string(),
            reason,
        }),
        _ => Ok(()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// signature / reset
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct SignatureArgs {
    /// Active stream as platform:channel[:instance]; repeat for each tile.
    #[arg(long = "stream", value_parser = parse_stream_arg, required = true)]
    pub streams: Vec<StreamArg>,
}

#[derive(Debug, Serialize)]
struct SignatureReport {
    signature: String,
    key: String,
}

pub fn run_signature<W: Write>(
    config: &LayoutConfig,
    args: SignatureArgs,
    out: &mut W,
) -> Result<()> {
    let streams: Vec<Stream> = args
        .streams
        .into_iter()
        .enumerate()
        .map(|(index, spec)| spec.into_stream(index))
        .collect();
    let signature = StreamSetSignature::from_streams(&streams);
    emit(
        out,
        &SignatureReport {
            key: signature.storage_key(&config.storage_key_prefix),
            signature: signature.to_string(),
        },
    )
}

#[derive(Debug, Clone, Args)]
pub struct ResetArgs {
    /// Active stream as platform:channel[:instance]; repeat for each tile.
    #[arg(long = "stream", value_parser = parse_stream_arg, required = true)]
    pub streams: Vec<StreamArg>,

    /// JSON layout file to clear the entry from.
    #[arg(long)]
    pub store: PathBuf,
}

#[derive(Debug, Serialize)]
struct ResetReport {
    key: String,
    cleared: bool,
}

pub fn run_reset<W: Write>(config: &LayoutConfig, args: ResetArgs, out: &mut W) -> Result<()> {
    let streams: Vec<Stream> = args
        .streams
        .into_iter()
        .enumerate()
        .map(|(index, spec)| spec.into_stream(index))
        .collect();
    let store = CustomLayoutStore::with_prefix(
        Box::new(FileStorage::new(&args.store)),
        config.storage_key_prefix.clone(),
    );
    let key = store.key_for(&streams);
    let cleared = store.keys()?.contains(&key);
    store.clear(&streams)?;
    emit(out, &ResetReport { key, cleared })
}
