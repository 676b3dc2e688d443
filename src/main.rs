//! `senseled` command line tool.
//!
//! Drives the Sense HAT LED matrix from the shell, or previews it in the terminal.
//!
//! ```bash
//! # fill the matrix with dark blue
//! senseled clear 0 0 64
//!
//! # light one pixel, with the board mounted upside down
//! senseled --rotation 180 set-pixel 0 0 255 0 0
//!
//! # scroll a message in the terminal instead of on the hardware, and record it
//! senseled --preview --font-atlas font.png --font-order font.txt \
//!     message "Hello" --color 255,0,0 --record hello.bin
//!
//! # play the recording back onto the real matrix
//! senseled replay hello.bin
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use senseled::device::{FrameDevice, FramebufferDevice, Recording, RecordingDevice, TerminalDevice};
use senseled::{
    FontConfig, GlyphStore, LedMatrix, MatrixConfig, MatrixSurface, Pixel, Rotation, ScrollOptions,
    ValidationError,
};
use std::fmt::Write as _;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "senseled")]
#[command(version)]
#[command(about = "Draw pixels and scroll text on the Sense HAT LED matrix")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Framebuffer device of the matrix (overrides the config)
    #[arg(short, long, global = true)]
    device: Option<PathBuf>,

    /// Mounting rotation in degrees: 0, 90, 180 or 270 (overrides the config)
    #[arg(short, long, global = true)]
    rotation: Option<i64>,

    /// Draw the matrix in this terminal instead of on the device
    #[arg(short, long, global = true)]
    preview: bool,

    /// Font atlas image (overrides the config, needs --font-order)
    #[arg(long, global = true, requires = "font_order")]
    font_atlas: Option<PathBuf>,

    /// Character order of the font atlas (overrides the config, needs --font-atlas)
    #[arg(long, global = true, requires = "font_atlas")]
    font_order: Option<PathBuf>,

    /// Log what is happening
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Fill the matrix with one colour, black by default
    Clear {
        #[arg(num_args = 3, value_names = ["R", "G", "B"])]
        color: Option<Vec<i64>>,
    },

    /// Set a single pixel
    SetPixel {
        x: i64,
        y: i64,
        r: i64,
        g: i64,
        b: i64,
    },

    /// Print the colour of a single pixel
    GetPixel { x: i64, y: i64 },

    /// Print all 64 pixels, one matrix row per line
    Dump,

    /// Mirror the picture on the matrix
    Flip { axis: Axis },

    /// Redraw the current picture under a different rotation
    Rotate {
        #[arg(allow_negative_numbers = true)]
        degrees: i64,
    },

    /// Show an 8x8 image file; larger square images are scaled down
    Image { path: PathBuf },

    /// Show a single character
    Letter {
        #[arg(default_value = "")]
        letter: String,

        /// Text colour as R,G,B
        #[arg(long, value_parser = parse_color)]
        color: Option<Pixel>,

        /// Background colour as R,G,B
        #[arg(long, value_parser = parse_color)]
        background: Option<Pixel>,
    },

    /// Scroll a message across the matrix
    Message {
        text: String,

        /// Pause between frames in milliseconds
        #[arg(long)]
        speed_ms: Option<u64>,

        /// Text colour as R,G,B
        #[arg(long, value_parser = parse_color)]
        color: Option<Pixel>,

        /// Background colour as R,G,B
        #[arg(long, value_parser = parse_color)]
        background: Option<Pixel>,

        /// Save every frame written to this file for `replay`
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Play back a recording made with `message --record`
    Replay { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Axis {
    /// Left to right
    H,
    /// Top to bottom
    V,
}

fn parse_color(s: &str) -> Result<Pixel, String> {
    let channels: Vec<i64> = s
        .split(',')
        .map(|c| c.trim().parse::<i64>().map_err(|e| format!("{c:?}: {e}")))
        .collect::<Result<_, _>>()?;
    let channels: [i64; 3] = channels
        .try_into()
        .map_err(|_| "expected three channels as R,G,B".to_owned())?;
    Pixel::from_channels(channels).map_err(|e| e.to_string())
}

fn coordinate(value: i64, error: fn(i64) -> ValidationError) -> senseled::Result<usize> {
    usize::try_from(value).map_err(|_| error(value).into())
}

/// Builds the effective config: defaults, then the config file, then command line flags.
fn load_config(cli: &Cli) -> anyhow::Result<MatrixConfig> {
    let mut config = match &cli.config {
        Some(path) => MatrixConfig::from_file(path)?,
        None => MatrixConfig::default(),
    };
    if let Some(device) = &cli.device {
        config.device = device.clone();
    }
    if let Some(degrees) = cli.rotation {
        config.rotation = Rotation::from_degrees(degrees)?;
    }
    if let (Some(atlas), Some(order)) = (&cli.font_atlas, &cli.font_order) {
        config.font = Some(FontConfig {
            atlas: atlas.clone(),
            order: order.clone(),
        });
    }
    Ok(config)
}

fn open_surface<D: FrameDevice>(config: &MatrixConfig, device: D) -> anyhow::Result<MatrixSurface<D>> {
    let mut surface = MatrixSurface::new(device);
    surface.set_rotation(config.rotation.into(), false)?;
    Ok(surface)
}

fn open_matrix<D: FrameDevice>(config: &MatrixConfig, device: D) -> anyhow::Result<LedMatrix<D>> {
    let Some(font) = &config.font else {
        bail!("text needs a font: pass --font-atlas and --font-order or set `font` in the config");
    };
    let glyphs = GlyphStore::from_files(&font.atlas, &font.order)
        .with_context(|| format!("cannot load font {}", font.atlas.display()))?;
    let mut matrix = LedMatrix::new(device, glyphs);
    matrix.set_rotation(config.rotation.into(), false)?;
    Ok(matrix)
}

fn format_pixel(pixel: Pixel) -> String {
    format!("{},{},{}", pixel.r, pixel.g, pixel.b)
}

/// Whether the user asked to stop, checked without blocking.
///
/// Only meaningful in preview mode, where the terminal is in raw mode and Ctrl-C arrives as
/// a key event instead of a signal.
fn quit_requested() -> bool {
    while let Ok(true) = crossterm::event::poll(Duration::ZERO) {
        if let Ok(Event::Key(key)) = crossterm::event::read() {
            if is_quit_key(key) {
                return true;
            }
        }
    }
    false
}

fn is_quit_key(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Runs `command` against `device` and returns what should be printed once it is done.
fn execute<D: FrameDevice>(
    command: &Command,
    config: &MatrixConfig,
    device: D,
    preview: bool,
) -> anyhow::Result<Option<String>> {
    match command {
        Command::Clear { color } => {
            let color = match color.as_deref() {
                Some(&[r, g, b]) => Pixel::from_channels([r, g, b])?,
                _ => Pixel::BLACK,
            };
            open_surface(config, device)?.clear(color)?;
        }
        Command::SetPixel { x, y, r, g, b } => {
            let x = coordinate(*x, ValidationError::XRange)?;
            let y = coordinate(*y, ValidationError::YRange)?;
            open_surface(config, device)?.set_pixel_channels(x, y, [*r, *g, *b])?;
        }
        Command::GetPixel { x, y } => {
            let x = coordinate(*x, ValidationError::XRange)?;
            let y = coordinate(*y, ValidationError::YRange)?;
            let pixel = open_surface(config, device)?.get_pixel(x, y)?;
            return Ok(Some(format_pixel(pixel)));
        }
        Command::Dump => {
            let pixels = open_surface(config, device)?.get_pixels()?;
            let mut out = String::new();
            for y in 0..senseled::rendering::rotation::MATRIX_SIZE {
                let row: Vec<String> = pixels.row(y).iter().map(|p| format_pixel(*p)).collect();
                let _ = writeln!(out, "{}", row.join(" "));
            }
            return Ok(Some(out.trim_end().to_owned()));
        }
        Command::Flip { axis } => {
            let mut surface = open_surface(config, device)?;
            match axis {
                Axis::H => surface.flip_h(true)?,
                Axis::V => surface.flip_v(true)?,
            };
        }
        Command::Rotate { degrees } => {
            open_surface(config, device)?.set_rotation(*degrees, true)?;
        }
        Command::Image { path } => {
            open_surface(config, device)?
                .load_image(path, true)
                .with_context(|| format!("cannot show {}", path.display()))?;
        }
        Command::Letter {
            letter,
            color,
            background,
        } => {
            open_matrix(config, device)?.show_letter(
                letter,
                color.unwrap_or(config.text_color),
                background.unwrap_or(config.back_color),
            )?;
        }
        Command::Message {
            text,
            speed_ms,
            color,
            background,
            record,
        } => {
            let mut options: ScrollOptions = config.scroll_options();
            if let Some(ms) = speed_ms {
                options = options.with_speed(Duration::from_millis(*ms));
            }
            if let Some(color) = color {
                options = options.with_text_color(*color);
            }
            if let Some(background) = background {
                options = options.with_back_color(*background);
            }
            let keep_going = |_: usize| {
                if preview && quit_requested() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            };

            match record {
                Some(path) => {
                    let mut matrix = open_matrix(config, RecordingDevice::new(device))?;
                    matrix.show_message_until(text, options, keep_going)?;
                    let (_, recording) = matrix.into_surface().into_device().finish();
                    recording
                        .save_to_file(path)
                        .with_context(|| format!("cannot save recording to {}", path.display()))?;
                    log::info!(
                        "recorded {} writes to {}",
                        recording.writes.len(),
                        path.display()
                    );
                }
                None => {
                    open_matrix(config, device)?.show_message_until(text, options, keep_going)?;
                }
            }
        }
        Command::Replay { file } => {
            let recording = Recording::read_from_file(file)
                .with_context(|| format!("cannot read recording {}", file.display()))?;
            let mut device = device;
            recording.replay(&mut device)?;
        }
    }
    Ok(None)
}

/// Holds the terminal in preview mode until dropped.
struct Preview;

impl Preview {
    fn start() -> anyhow::Result<Self> {
        senseled::terminal_setup().context("cannot set up the terminal for preview")?;
        senseled::install_panic_handler();
        Ok(Preview)
    }

    /// Keeps the final picture on screen until a key is pressed.
    fn wait_for_key(&self) -> anyhow::Result<()> {
        loop {
            if let Event::Key(_) = crossterm::event::read()? {
                return Ok(());
            }
        }
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        let _ = senseled::terminal_cleanup();
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let output = if cli.preview {
        let preview = Preview::start()?;
        let device = TerminalDevice::new_with_stdout().with_origin(1, 1);
        let output = execute(&cli.command, &config, device, true)?;
        preview.wait_for_key()?;
        output
    } else {
        let device = FramebufferDevice::new(&config.device);
        log::debug!("using framebuffer {}", device.path().display());
        execute(&cli.command, &config, device, false)
            .with_context(|| format!("on device {}", config.device.display()))?
    };

    if let Some(output) = output {
        println!("{output}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
    run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use senseled::device::MemoryDevice;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("255, 128,0"), Ok(Pixel::new(255, 128, 0)));
        assert!(parse_color("256,0,0").is_err());
        assert!(parse_color("1,2").is_err());
        assert!(parse_color("red").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("senseled.json");
        std::fs::write(&path, r#"{ "rotation": 90, "device": "/dev/fb0" }"#).unwrap();
        let path = path.to_str().unwrap();

        let cli = Cli::parse_from(["senseled", "--config", path, "dump"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.rotation, Rotation::Deg90);
        assert_eq!(config.device, PathBuf::from("/dev/fb0"));

        let cli = Cli::parse_from(["senseled", "--config", path, "-r", "270", "-d", "/tmp/fb", "dump"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.rotation, Rotation::Deg270);
        assert_eq!(config.device, PathBuf::from("/tmp/fb"));

        let cli = Cli::parse_from(["senseled", "-r", "45", "dump"]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_execute_pixels() {
        let config = MatrixConfig::default();
        let mut device = MemoryDevice::new();

        let cli = Cli::parse_from(["senseled", "set-pixel", "1", "2", "255", "0", "0"]);
        execute(&cli.command, &config, &mut device, false).unwrap();
        let cli = Cli::parse_from(["senseled", "get-pixel", "1", "2"]);
        let out = execute(&cli.command, &config, &mut device, false).unwrap();
        assert_eq!(out.as_deref(), Some("248,0,0"));

        let cli = Cli::parse_from(["senseled", "set-pixel", "8", "0", "0", "0", "0"]);
        assert!(execute(&cli.command, &config, &mut device, false).is_err());
        let cli = Cli::parse_from(["senseled", "set-pixel", "0", "0", "0", "300", "0"]);
        assert!(execute(&cli.command, &config, &mut device, false).is_err());
        assert_eq!(device.write_count(), 1);

        let cli = Cli::parse_from(["senseled", "clear", "10", "20", "30"]);
        execute(&cli.command, &config, &mut device, false).unwrap();
        let cli = Cli::parse_from(["senseled", "dump"]);
        let out = execute(&cli.command, &config, &mut device, false).unwrap().unwrap();
        assert_eq!(out.lines().count(), 8);
        assert!(out.split_whitespace().all(|p| p == "8,20,24"));
    }

    #[test]
    fn test_text_needs_font() {
        let config = MatrixConfig::default();
        let cli = Cli::parse_from(["senseled", "letter", "A"]);
        assert!(execute(&cli.command, &config, MemoryDevice::new(), false).is_err());
    }
}
