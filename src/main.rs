use bootcanvas::config::{load_config, ConfigSource, KeyValueConfig};
use bootcanvas::console::ConsoleState;
use bootcanvas::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use bootcanvas::font::{font_bytes, DEFAULT_FONT_HEIGHT, DEFAULT_FONT_WIDTH};
use bootcanvas::platform::{ConsoleHandoff, HostPlatform, TextConsole};
use bootcanvas::Result;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Options {
    config: Option<PathBuf>,
    root: PathBuf,
    width: usize,
    height: usize,
    serial: bool,
    output: Option<PathBuf>,
    dump_theme: bool,
    window: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        config: None,
        root: PathBuf::from("."),
        width: 0,
        height: 0,
        serial: false,
        output: None,
        dump_theme: false,
        window: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--serial" => options.serial = true,
            "--dump-theme" => options.dump_theme = true,
            "--window" => options.window = true,
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    options.config = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--root" => {
                if i + 1 < args.len() {
                    options.root = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            },
            "--output" | "-o" => {
                if i + 1 < args.len() {
                    options.output = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<usize>() {
                        options.width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<usize>() {
                        options.height = h;
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    if let Some((w, h)) = bootcanvas::config::parse_resolution(&args[i + 1]) {
                        options.width = w;
                        options.height = h;
                    }
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: bootcanvas [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --config FILE, -c FILE    Console config (KEY=VALUE lines or .json)");
                println!("  --root DIR                Directory boot URIs resolve in (default: .)");
                println!(
                    "  --width W, -w W           Framebuffer width (default: firmware, {})",
                    DEFAULT_WIDTH
                );
                println!(
                    "  --height H, -h H          Framebuffer height (default: firmware, {})",
                    DEFAULT_HEIGHT
                );
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)");
                println!("  --serial                  Mirror to serial (caps the grid at 80x24)");
                println!("  --output FILE, -o FILE    Write the background as PNG");
                println!("  --dump-theme              Print the resolved theme as JSON");
                println!("  --window                  Show the background in a window");
                println!("  --help                    Show this help message");
                std::process::exit(0);
            },
            other => warn!(arg = other, "ignoring unknown argument"),
        }
        i += 1;
    }

    options
}

/// Stands in for the glyph renderer; reports the grid it would draw
struct HeadlessConsole;

impl TextConsole for HeadlessConsole {
    fn reinit(&mut self, handoff: &ConsoleHandoff<'_>) {
        let (cols, rows) = handoff.grid_size();
        info!(
            cols,
            rows,
            margin = handoff.margin,
            wallpaper = handoff.canvas.is_some(),
            "text console ready"
        );
    }

    fn clear(&mut self) {}

    fn deinit(&mut self) {}
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = parse_args();

    let config: Box<dyn ConfigSource> = match &options.config {
        Some(path) => load_config(path)?,
        None => Box::new(KeyValueConfig::parse("")),
    };
    let mut platform = HostPlatform::new(&options.root);
    let mut console = HeadlessConsole;
    // Glyphs are never drawn here, so a blank built-in font is enough
    let builtin_font = vec![0; font_bytes(DEFAULT_FONT_WIDTH, DEFAULT_FONT_HEIGHT)];
    let mut state = ConsoleState::new(builtin_font);

    state.init(
        config.as_ref(),
        options.width,
        options.height,
        options.serial,
        &mut platform,
        &mut console,
    )?;

    println!("=== bootcanvas ===");
    if let Some(display) = state.display() {
        println!("Resolution: {}x{}", display.width, display.height);
    }
    println!(
        "Wallpaper: {}",
        state.wallpaper().map_or_else(
            || "none".to_string(),
            |w| format!("{}x{} {:?}", w.width(), w.height(), w.layout())
        )
    );
    if !state.degradations().is_empty() {
        println!("Degradations: {}", state.degradations().len());
    }

    if options.dump_theme {
        println!("{}", serde_json::to_string_pretty(state.theme())?);
    }

    if let Some(background) = state.background() {
        if let Some(path) = &options.output {
            image::save_buffer(
                path,
                &background.to_rgba8(),
                background.width() as u32,
                background.height() as u32,
                image::ColorType::Rgba8,
            )?;
            println!("Wrote {}", path.display());
        }

        if options.window {
            show_window(&background)?;
        }
    }

    state.teardown(&mut console);
    Ok(())
}

#[cfg(feature = "window")]
fn show_window(background: &bootcanvas::Canvas) -> Result<()> {
    let mut window = bootcanvas::display::PreviewWindow::new(
        "bootcanvas",
        background.width() as u32,
        background.height() as u32,
    )?;
    window.show(background)
}

#[cfg(not(feature = "window"))]
fn show_window(_background: &bootcanvas::Canvas) -> Result<()> {
    warn!("built without the `window` feature, not opening a preview");
    Ok(())
}
