use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use rapidmock::{
    BatchExportPipeline, BatchJob, CompositorStage, CropRect, ExportFormat, ExportPreset, FsHost,
    HostIo, LoggingConfig, RenderSettings, RgbColor, SettingsStore, TextureCache,
    TransformEngine,
    assets::decode::decode_image,
    render::DesignLayer,
};

#[derive(Parser, Debug)]
#[command(name = "rapidmock", version)]
struct Cli {
    /// Log filter (overridden by `RUST_LOG`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite one design onto one mockup.
    Render(RenderArgs),
    /// Composite every design in a folder onto every mockup in another.
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Mockup photo.
    #[arg(long)]
    mockup: PathBuf,

    /// Design image.
    #[arg(long)]
    design: PathBuf,

    /// Output file.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(flatten)]
    placement: PlacementArgs,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Folder of mockup photos.
    #[arg(long)]
    mockups: PathBuf,

    /// Folder of designs.
    #[arg(long)]
    designs: PathBuf,

    /// Output folder, created if missing.
    #[arg(long)]
    out: PathBuf,

    /// Pause between pairs, in milliseconds.
    #[arg(long, default_value_t = 0)]
    yield_ms: u64,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(flatten)]
    placement: PlacementArgs,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    /// Settings JSON; individual flags override its fields.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Design opacity, percent.
    #[arg(long)]
    opacity: Option<u8>,

    /// Displacement strength in pixels (-100..=100).
    #[arg(long, allow_hyphen_values = true)]
    warp: Option<i32>,

    /// Realism overlay strength, percent.
    #[arg(long)]
    texture: Option<u8>,

    /// Hide the realism overlays.
    #[arg(long)]
    no_overlay: bool,

    /// Mockup tint as `#rrggbb`.
    #[arg(long, value_parser = parse_color)]
    color: Option<RgbColor>,

    /// jpg, png or webp.
    #[arg(long, value_parser = parse_format)]
    format: Option<ExportFormat>,

    /// original, etsy, shopify or custom.
    #[arg(long, value_parser = parse_preset)]
    preset: Option<ExportPreset>,

    /// Output width for the custom preset.
    #[arg(long)]
    width: Option<u32>,
}

#[derive(Args, Debug)]
struct PlacementArgs {
    /// Design center x as a fraction of the mockup width.
    #[arg(long, default_value_t = 0.5)]
    x: f64,

    /// Design center y as a fraction of the mockup height.
    #[arg(long, default_value_t = 0.5)]
    y: f64,

    /// Scale percent (10..=200).
    #[arg(long, default_value_t = 100.0)]
    scale: f64,

    /// Rotation in degrees.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    rotation: f64,

    /// Crop in design pixels as `x,y,w,h`.
    #[arg(long, value_parser = parse_crop)]
    crop: Option<CropRect>,
}

fn parse_color(s: &str) -> Result<RgbColor, String> {
    RgbColor::from_hex(s).map_err(|e| e.to_string())
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(s).map_err(|e| e.to_string())
}

fn parse_preset(s: &str) -> Result<ExportPreset, String> {
    ExportPreset::parse(s).map_err(|e| e.to_string())
}

fn parse_crop(s: &str) -> Result<CropRect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("crop '{s}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(CropRect::new(*x, *y, *w, *h)),
        _ => Err(format!("crop '{s}': expected x,y,w,h")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    rapidmock::init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        ..LoggingConfig::default()
    });
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn resolve_settings(args: &SettingsArgs) -> anyhow::Result<RenderSettings> {
    let store = match &args.settings {
        Some(path) => SettingsStore::load(path)?,
        None => SettingsStore::default(),
    };
    let mut settings = store.snapshot();
    if let Some(v) = args.opacity {
        settings.opacity = v;
    }
    if let Some(v) = args.warp {
        settings.warp_strength = v;
    }
    if let Some(v) = args.texture {
        settings.texture_strength = v;
    }
    if args.no_overlay {
        settings.show_overlay = false;
    }
    if let Some(v) = args.color {
        settings.mockup_color = v;
    }
    if let Some(v) = args.format {
        settings.export_format = v;
    }
    if let Some(v) = args.preset {
        settings.export_preset = v;
    }
    if let Some(v) = args.width {
        settings.custom_export_width = v;
        if args.preset.is_none() {
            settings.export_preset = ExportPreset::Custom;
        }
    }
    settings.validate()?;
    Ok(settings)
}

fn placement(args: &PlacementArgs) -> TransformEngine {
    let mut engine = TransformEngine::new();
    engine.set_position(args.x, args.y);
    engine.set_scale_percent(args.scale);
    engine.set_rotation_degrees(args.rotation);
    engine
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let settings = resolve_settings(&args.settings)?;
    let mut host = FsHost;

    let mockup_bytes = host.load_file_bytes(&args.mockup)?;
    let mockup = decode_image(&mockup_bytes)
        .with_context(|| format!("decode mockup '{}'", args.mockup.display()))?;
    let design_bytes = host.load_file_bytes(&args.design)?;
    let design = decode_image(&design_bytes)
        .with_context(|| format!("decode design '{}'", args.design.display()))?;

    let mut engine = placement(&args.placement);
    engine.reapply_design(design.width, design.height);
    if let Some(crop) = args.placement.crop {
        engine.set_crop(crop);
    }

    let stage = CompositorStage::export(&mockup, &settings)?;
    let surface = stage.render(Some(DesignLayer {
        texture: &design,
        placement: &engine,
    }))?;
    let intermediate = rapidmock::encode_png(&surface)?;
    let custom_width = (settings.export_preset == ExportPreset::Custom)
        .then_some(settings.custom_export_width);
    let bytes = rapidmock::resize_image(
        &intermediate,
        settings.export_preset,
        custom_width,
        settings.export_format,
    )?;
    host.write_image_bytes(&args.out, &bytes)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let settings = resolve_settings(&args.settings)?;
    let mut host = FsHost;

    let mockups = host.scan_folder(&args.mockups)?.files;
    let designs = host.scan_folder(&args.designs)?.files;
    anyhow::ensure!(!mockups.is_empty(), "no mockups in '{}'", args.mockups.display());
    anyhow::ensure!(!designs.is_empty(), "no designs in '{}'", args.designs.display());

    let mut engine = placement(&args.placement);
    if let Some(crop) = args.placement.crop {
        engine.set_crop(crop);
    }
    let mut job = BatchJob::new(mockups, designs, &args.out, engine, settings);
    job.yield_delay = std::time::Duration::from_millis(args.yield_ms);

    let report = BatchExportPipeline::new().run(
        &job,
        &mut host,
        &mut TextureCache::new(),
        |p| {
            eprintln!(
                "[{}/{}] {} x {}",
                p.completed,
                p.total,
                display_name(&p.design),
                display_name(&p.mockup)
            );
        },
    )?;

    for skipped in &report.skipped {
        eprintln!(
            "skipped {} x {}: {}",
            display_name(&skipped.design),
            display_name(&skipped.mockup),
            skipped.reason
        );
    }
    eprintln!(
        "wrote {} of {} into {}",
        report.written.len(),
        report.total,
        args.out.display()
    );
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
