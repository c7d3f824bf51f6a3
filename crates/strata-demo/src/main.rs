//! Headless strata host.
//!
//! Drives the demo game with a deterministic clock and writes painted frames
//! as PNG files.

mod game;
mod source;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use strata_engine::core::{Platform, PlatformConfig};
use strata_engine::logging::{LoggingConfig, init_logging};
use strata_engine::text::FontSystem;
use strata_engine::time::{GameLoop, LoopConfig, ManualClock};

use game::{Demo, TILE_KEY};
use source::FsImageSource;

#[derive(Parser, Debug)]
#[command(name = "strata-demo", version)]
struct DemoConfig {
    /// Number of frames to run.
    #[arg(long, env = "STRATA_FRAMES", default_value_t = 60)]
    frames: u32,

    /// Write every n-th frame; 0 writes only the last one.
    #[arg(long, default_value_t = 15)]
    every: u32,

    /// Directory for frame PNGs and generated assets.
    #[arg(long, env = "STRATA_OUT", default_value = "strata-frames")]
    out: PathBuf,

    #[arg(long, default_value_t = 480)]
    width: u32,

    #[arg(long, default_value_t = 320)]
    height: u32,

    /// Simulated frame rate of the deterministic clock.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// TrueType/OpenType font for the HUD; common system fonts are tried otherwise.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Log filter in `env_logger` syntax (overrides RUST_LOG).
    #[arg(long)]
    log: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let config = DemoConfig::parse();
    init_logging(LoggingConfig { env_filter: config.log.clone(), ..LoggingConfig::default() });

    std::fs::create_dir_all(&config.out)
        .with_context(|| format!("create output dir '{}'", config.out.display()))?;
    write_tile(&config.out.join(TILE_KEY))?;

    let mut fonts = FontSystem::new();
    let font = match load_font(config.font.as_deref())? {
        Some(bytes) => Some(fonts.load_font(&bytes).context("load HUD font")?),
        None => {
            log::warn!("no font found; the HUD will stay empty");
            None
        }
    };

    let mut platform = Platform::new(PlatformConfig {
        width: config.width,
        height: config.height,
        ..PlatformConfig::default()
    })
    .with_image_source(FsImageSource::new(&config.out));
    platform.set_fonts(fonts);

    let clock = ManualClock::new();
    let loop_config = LoopConfig { target_fps: 0, log_fps: false, ..LoopConfig::default() };
    let mut game_loop =
        GameLoop::with_clock(Demo::new(config.width, config.height, font), platform, clock.clone(), loop_config);

    let step_ms = 1000.0 / f64::from(config.fps.max(1));
    let mut frame = 0u32;
    game_loop.run_with(|lp| {
        frame += 1;
        let last = frame >= config.frames;
        let due = config.every > 0 && frame % config.every == 0;
        if (due || last) && lp.game().painted() > 0 {
            let path = config.out.join(format!("frame-{frame:04}.png"));
            write_frame(lp.game(), &path)?;
            log::info!("wrote {}", path.display());
        }
        if last {
            lp.stop();
        }
        clock.advance(step_ms);
        Ok(())
    })?;

    log::info!("ran {frame} frame(s), {} painted", game_loop.game().painted());
    Ok(())
}

fn write_frame(demo: &Demo, path: &Path) -> anyhow::Result<()> {
    let (width, height, rgba) = demo.frame_rgba();
    image::save_buffer_with_format(path, &rgba, width, height, image::ColorType::Rgba8, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))
}

/// Writes the 16×16 checker tile the floor layer repeats.
fn write_tile(path: &Path) -> anyhow::Result<()> {
    let tile = image::RgbaImage::from_fn(16, 16, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            image::Rgba([0x4a, 0x8c, 0x5c, 0xff])
        } else {
            image::Rgba([0x2f, 0x5e, 0x3d, 0xff])
        }
    });
    tile.save(path).with_context(|| format!("write tile '{}'", path.display()))
}

fn load_font(explicit: Option<&Path>) -> anyhow::Result<Option<Vec<u8>>> {
    if let Some(path) = explicit {
        let bytes = std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        return Ok(Some(bytes));
    }
    Ok([
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok()))
}
