use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "mockup-canvas", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print native and proxy dimensions of an image.
    Info(InfoArgs),
    /// Cut a polygon out of an image into a PNG.
    Extract(ExtractArgs),
    /// Convert a pixel extent into physical units.
    Measure(MeasureArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Proxy ceiling; defaults to `MOCKUP_MAX_RENDER_SIZE` or 4096.
    #[arg(long)]
    max_render_size: Option<u32>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Polygon in image pixels: "x,y x,y x,y ...".
    #[arg(long)]
    points: String,

    /// Output PNG with the extracted region.
    #[arg(long)]
    out: PathBuf,

    /// Optional output PNG of the input with the region erased.
    #[arg(long)]
    erase_out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct MeasureArgs {
    /// Reference image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Reference DPI.
    #[arg(long)]
    dpi: f64,

    /// Extent width in image pixels.
    #[arg(long)]
    width_px: f64,

    /// Extent height in image pixels.
    #[arg(long)]
    height_px: f64,

    /// Output unit.
    #[arg(long, value_enum, default_value_t = UnitChoice::Cm)]
    unit: UnitChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UnitChoice {
    Px,
    Cm,
    Mm,
    In,
}

impl From<UnitChoice> for mockup_canvas::RulerUnit {
    fn from(u: UnitChoice) -> Self {
        match u {
            UnitChoice::Px => Self::Px,
            UnitChoice::Cm => Self::Cm,
            UnitChoice::Mm => Self::Mm,
            UnitChoice::In => Self::In,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Extract(args) => cmd_extract(args),
        Command::Measure(args) => cmd_measure(args),
    }
}

fn read_surface(path: &Path) -> anyhow::Result<mockup_canvas::Surface> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let surface = mockup_canvas::decode_raster(&bytes)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(surface)
}

fn write_png(path: &Path, surface: &mockup_canvas::Surface) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let img = surface.to_rgba_image();
    image::save_buffer_with_format(
        path,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn parse_points(s: &str) -> anyhow::Result<Vec<mockup_canvas::Point>> {
    s.split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .with_context(|| format!("point '{pair}' is not 'x,y'"))?;
            let x: f64 = x.trim().parse().with_context(|| format!("bad x in '{pair}'"))?;
            let y: f64 = y.trim().parse().with_context(|| format!("bad y in '{pair}'"))?;
            Ok(mockup_canvas::Point::new(x, y))
        })
        .collect()
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let settings = mockup_canvas::EngineSettings::from_env();
    let ceiling = args.max_render_size.unwrap_or(settings.max_render_size);
    let full = read_surface(&args.in_path)?;
    let set = mockup_canvas::build_raster_set(full, ceiling)?;
    let ratio = mockup_canvas::proxy_ratio(set.full.width, set.full.height, ceiling);

    if args.json {
        let out = serde_json::json!({
            "native": { "width": set.full.width, "height": set.full.height },
            "proxy": { "width": set.proxy.width, "height": set.proxy.height },
            "ratio": ratio,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("native: {}x{}", set.full.width, set.full.height);
        println!("proxy:  {}x{}", set.proxy.width, set.proxy.height);
        match ratio {
            Some(r) => println!("ratio:  {r:.6}"),
            None => println!("ratio:  1 (not down-sampled)"),
        }
    }
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let points = parse_points(&args.points)?;
    let Some(clip) = mockup_canvas::ClipPath::from_layer_points(&points) else {
        anyhow::bail!(
            "need at least {} finite points, got {}",
            mockup_canvas::MIN_CLIP_POINTS,
            points.len()
        );
    };

    let full = read_surface(&args.in_path)?;
    let piece = mockup_canvas::extract_to_surface(&full, &clip)?;
    write_png(&args.out, &piece)?;

    if let Some(erase_out) = &args.erase_out {
        let mut set = mockup_canvas::build_raster_set(full, mockup_canvas::MAX_RENDER_SIZE)?;
        mockup_canvas::erase_in_place(&mut set, &clip)?;
        write_png(erase_out, &set.full)?;
    }
    Ok(())
}

fn cmd_measure(args: MeasureArgs) -> anyhow::Result<()> {
    if !(args.dpi.is_finite() && args.dpi > 0.0) {
        anyhow::bail!("--dpi must be > 0");
    }
    let full = read_surface(&args.in_path)?;
    let set = mockup_canvas::build_raster_set(full, mockup_canvas::MAX_RENDER_SIZE)?;
    let reference = mockup_canvas::Layer::new(
        "reference",
        mockup_canvas::LayerKind::Mockup,
        set,
        args.dpi,
    );

    let dims = mockup_canvas::workspace_extent_physical_size(
        args.width_px,
        args.height_px,
        Some(&reference),
    );
    let unit = mockup_canvas::RulerUnit::from(args.unit);
    let (w, h) = dims.in_unit(unit);
    let label = match args.unit {
        UnitChoice::Px => "px",
        UnitChoice::Cm => "cm",
        UnitChoice::Mm => "mm",
        UnitChoice::In => "in",
    };
    println!("{w:.4} x {h:.4} {label}");
    Ok(())
}
