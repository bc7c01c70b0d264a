//! Demo client for the canvas library: a shape reference card, a typeface
//! showcase, rotated text, random shapes, and JPEG display.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rand::Rng;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use shapecanvas::{config, display, Canvas, Color, FontSet, Scene};

#[derive(Debug, Parser)]
#[command(name = "shapedemo", about = "Canvas demo scenes")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render headless, dumping raw RGBA frames to stdout
    #[arg(long)]
    offscreen: bool,

    /// Number of frames to render in offscreen mode
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    demo: Demo,
}

#[derive(Debug, Subcommand)]
enum Demo {
    /// Shape reference card
    Shapes,
    /// Three-typeface text showcase
    Text,
    /// Text rotated around the canvas center
    Rotext,
    /// Random translucent circles
    Rand,
    /// Show a JPEG with a caption
    Image { path: PathBuf },
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("shapecanvas={level}").parse()?)
        .add_directive(format!("shapedemo={level}").parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    // Logs go to stderr so offscreen raster dumps own stdout.
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => config::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => config::Config::default(),
    };
    cfg.validate().context("validating configuration")?;

    let fonts = FontSet::load(&cfg.fonts).context("loading typefaces")?;

    let mut scene: Box<dyn Scene> = match cli.demo {
        Demo::Shapes => Box::new(ShapesScene),
        Demo::Text => Box::new(TextScene),
        Demo::Rotext => Box::new(RotextScene),
        Demo::Rand => Box::new(RandScene),
        Demo::Image { path } => Box::new(ImageScene { path }),
    };

    let offscreen = cli.offscreen || cfg.surface.mode == config::SurfaceMode::Offscreen;
    if offscreen {
        let mut out = std::io::stdout().lock();
        display::run_offscreen(&cfg, &fonts, scene.as_mut(), cli.frames.max(1), &mut out)?;
        info!(frames = cli.frames.max(1), "offscreen render complete");
    } else {
        display::run(&cfg, fonts, scene)?;
    }
    Ok(())
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba8(r, g, b, 255)
}

struct ShapesScene;

impl Scene for ShapesScene {
    fn frame(&mut self, canvas: &mut Canvas, fonts: &FontSet, _frame_no: u64) -> Result<()> {
        let (w, h) = (canvas.width(), canvas.height());
        let (fw, fh) = (w as f32, h as f32);
        canvas.begin_frame(w, h, Color::WHITE);

        let top = fh * 0.93;
        canvas.draw_text_mid(fw / 2.0, top, "shape reference", &fonts.sans, fh / 25.0, rgb(0, 0, 0));

        let cw = fw / 6.0;
        let cy = fh * 0.62;
        let side = cw * 0.7;

        canvas.set_fill(rgb(202, 40, 40));
        canvas.rect(cw * 0.5, cy, side, side);
        canvas.set_fill(rgb(40, 120, 202));
        canvas.round_rect(cw * 1.7, cy, side, side, side / 4.0, side / 4.0);
        canvas.set_fill(rgb(40, 160, 80));
        canvas.circle(cw * 3.3, cy + side / 2.0, side);
        canvas.set_fill(rgb(230, 160, 30));
        canvas.ellipse(cw * 4.5, cy + side / 2.0, side, side / 2.0);

        canvas.set_fill(rgb(120, 60, 180));
        canvas.set_stroke(rgb(120, 60, 180));
        canvas.set_stroke_width(fh / 200.0);
        canvas.arc(cw * 5.5, cy + side / 2.0, side, side, 0.0, 180.0);

        let base = fh * 0.3;
        canvas.set_stroke(rgb(60, 60, 60));
        canvas.set_stroke_width(fh / 150.0);
        canvas.line(cw * 0.5, base, cw * 0.5 + side, base + side);

        let xs = [cw * 1.7, cw * 1.7 + side / 2.0, cw * 1.7 + side];
        let ys = [base, base + side, base];
        canvas.set_fill(rgb(10, 90, 160));
        canvas.polygon(&xs, &ys);

        let pxs = [cw * 3.0, cw * 3.0 + side / 3.0, cw * 3.0 + 2.0 * side / 3.0, cw * 3.0 + side];
        let pys = [base, base + side, base, base + side];
        canvas.polyline(&pxs, &pys);

        canvas.set_fill(Color::from_rgba8(180, 40, 140, 120));
        canvas.qbezier(cw * 4.2, base, cw * 4.5, base + side, cw * 4.2 + side, base);
        canvas.cbezier(
            cw * 5.2,
            base,
            cw * 5.3,
            base + side,
            cw * 5.5,
            base - side / 2.0,
            cw * 5.2 + side,
            base,
        );

        Ok(())
    }
}

struct TextScene;

impl Scene for TextScene {
    fn frame(&mut self, canvas: &mut Canvas, fonts: &FontSet, _frame_no: u64) -> Result<()> {
        let (w, h) = (canvas.width(), canvas.height());
        let (fw, fh) = (w as f32, h as f32);
        canvas.begin_frame(w, h, rgb(30, 30, 36));

        let size = fh / 12.0;
        let sample = "The quick brown fox";
        canvas.draw_text_mid(fw / 2.0, fh * 0.68, sample, &fonts.sans, size, Color::WHITE);
        canvas.draw_text_mid(fw / 2.0, fh * 0.45, sample, &fonts.serif, size, Color::WHITE);
        canvas.draw_text_mid(fw / 2.0, fh * 0.22, sample, &fonts.mono, size, Color::WHITE);
        Ok(())
    }
}

struct RotextScene;

impl Scene for RotextScene {
    fn frame(&mut self, canvas: &mut Canvas, fonts: &FontSet, frame_no: u64) -> Result<()> {
        let (w, h) = (canvas.width(), canvas.height());
        canvas.begin_frame(w, h, Color::BLACK);
        canvas.translate(w as f32 / 2.0, h as f32 / 2.0);
        canvas.rotate(frame_no as f32 % 360.0);
        let ink = Color::from_rgba8(255, 255, 255, 64);
        for _ in 0..12 {
            canvas.rotate(30.0);
            canvas.draw_text(0.0, 0.0, "shapecanvas", &fonts.sans, h as f32 / 14.0, ink);
        }
        Ok(())
    }
}

struct RandScene;

impl Scene for RandScene {
    fn frame(&mut self, canvas: &mut Canvas, _fonts: &FontSet, _frame_no: u64) -> Result<()> {
        let (w, h) = (canvas.width(), canvas.height());
        canvas.begin_frame(w, h, Color::WHITE);
        let mut rng = rand::rng();
        for _ in 0..200 {
            canvas.set_fill(Color::from_rgba8(
                rng.random_range(0..=255),
                rng.random_range(0..=255),
                rng.random_range(0..=255),
                128,
            ));
            let r = rng.random_range(0.0..h as f32 / 4.0);
            canvas.circle(
                rng.random_range(0.0..w as f32),
                rng.random_range(0.0..h as f32),
                r,
            );
        }
        Ok(())
    }
}

struct ImageScene {
    path: PathBuf,
}

impl Scene for ImageScene {
    fn frame(&mut self, canvas: &mut Canvas, fonts: &FontSet, _frame_no: u64) -> Result<()> {
        let (w, h) = (canvas.width(), canvas.height());
        canvas.begin_frame(w, h, Color::BLACK);
        canvas.draw_image(0, 0, w, h, &self.path);
        let caption = self.path.display().to_string();
        canvas.draw_text_mid(
            w as f32 / 2.0,
            h as f32 / 20.0,
            &caption,
            &fonts.mono,
            h as f32 / 40.0,
            Color::WHITE,
        );
        Ok(())
    }
}
