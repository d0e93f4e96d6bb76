pub mod asset;
pub mod input;
mod renderer;

pub use glam as math;
pub use palette as color;
pub use renderer::ShapeRenderer;
pub use tiny_tanks::*;
pub use tread;

use miniquad::*;
use serde::{Deserialize, Serialize};
use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::PathBuf,
    time::{Duration, Instant},
};
use tiny_game_loop::GameLoop;
use tiny_tanks::logger::{self, LogConfig};

use input::InputEvent;
use math::Vec2;

pub mod window {
    pub use miniquad::window::{order_quit, request_quit, screen_size};
}

pub type RenderingContext = Box<dyn RenderingBackend>;
pub use glyph_brush::ab_glyph::FontArc as Font;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub fps: u32,
    /// Anti-aliasing samples per pixel.
    pub sample_count: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            fullscreen: false,
            fps: 60,
            sample_count: 8,
        }
    }
}

impl WindowConfig {
    const FILENAME: &'static str = "window.yaml";
    fn create_default_config_if_missing() -> asset::Result<()> {
        let path = asset::get_path("config", Self::FILENAME);
        if path.exists() {
            return Ok(());
        }
        log::info!("Creating default file {}", path.to_string_lossy());
        asset::save_yaml_file("config", Self::FILENAME, &WindowConfig::default())
    }
    fn load_config() -> asset::Result<Self> {
        asset::load_yaml_file("config", Self::FILENAME)
    }

    /// Window settings for miniquad. Values too large for it are clamped.
    pub fn to_conf(&self, title: &str) -> conf::Conf {
        let clamp = |value: u32| i32::try_from(value).unwrap_or(i32::MAX);
        conf::Conf {
            window_title: title.to_owned(),
            window_width: clamp(self.width),
            window_height: clamp(self.height),
            fullscreen: self.fullscreen,
            sample_count: clamp(self.sample_count),
            window_resizable: false,
            ..Default::default()
        }
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

const LOG_CONFIG_FILENAME: &str = "logging.yaml";

/// Reads `config/logging.yaml` (defaults when missing) and installs the
/// console logger.
fn init_logging() {
    let config: LogConfig = match asset::load_yaml_file_or_default("config", LOG_CONFIG_FILENAME)
    {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            LogConfig::default()
        }
    };
    if let Err(error) = logger::init(config) {
        eprintln!("Logger not installed: {error}");
    }
}

pub trait Game: Sized + 'static {
    fn set_screen_size(&mut self, width: f32, height: f32);
    fn handle_event(&mut self, event: InputEvent);
    fn quit_requested(&mut self) -> bool {
        true
    }
    fn update(&mut self, frame_time: Duration);
    fn render(&mut self, context: &mut RenderingContext);
}

pub trait GameLoader: 'static {
    type Assets;
    type Game: Game;
    /// Font files under [`asset::FONTS_DIR`]. The first one is `FontId(0)`.
    fn fonts() -> Vec<&'static str> {
        vec![asset::DEFAULT_FONT]
    }
    fn create_default_files() -> asset::Result<()> {
        Ok(())
    }
    fn load(
        context: &mut RenderingContext,
        renderer: &mut ShapeRenderer,
    ) -> asset::Result<Self::Assets>;
    fn create_game(renderer: ShapeRenderer, assets: Self::Assets) -> Self::Game;
}

struct Stage<G: Game> {
    context: RenderingContext,
    game_loop: GameLoop,
    time: Instant,
    game: G,
}

impl<G: Game> Stage<G> {
    fn new(mut game: G, context: RenderingContext, window_config: &WindowConfig) -> Self {
        let (width, height) = window_config.screen_size();
        game.set_screen_size(width, height);
        Stage {
            context,
            game_loop: GameLoop::new_with_fps(window_config.fps, Duration::from_millis(250)),
            time: Instant::now(),
            game,
        }
    }

    fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match button.try_into() {
            Ok(button) => self
                .game
                .handle_event(InputEvent::MouseButton { button, pressed }),
            Err(()) => log::debug!("Ignoring unknown mouse button"),
        }
    }

    fn key(&mut self, key: KeyCode, pressed: bool) {
        self.game.handle_event(InputEvent::Key { key, pressed });
    }
}

impl<G: Game> EventHandler for Stage<G> {
    fn update(&mut self) {
        let elapsed = self.time.elapsed();
        self.time = Instant::now();
        let update = self.game_loop.update(elapsed);
        if update.num_updates > 0 {
            update.run(|update| self.game.update(update.frame_time));
        } else {
            // Limit framerate
            std::thread::sleep(update.frame_time.saturating_sub(elapsed));
        }
    }

    fn draw(&mut self) {
        self.game.render(&mut self.context);
        self.context.commit_frame();
    }

    fn quit_requested_event(&mut self) {
        if !self.game.quit_requested() {
            miniquad::window::cancel_quit();
        }
    }

    fn resize_event(&mut self, width: f32, height: f32) {
        self.game.set_screen_size(width, height);
    }

    fn mouse_motion_event(&mut self, x: f32, y: f32) {
        self.game.handle_event(InputEvent::MouseMotion {
            position: Vec2::new(x, y),
        });
    }
    fn mouse_button_down_event(&mut self, button: MouseButton, _x: f32, _y: f32) {
        self.mouse_button(button, true);
    }
    fn mouse_button_up_event(&mut self, button: MouseButton, _x: f32, _y: f32) {
        self.mouse_button(button, false);
    }

    fn key_down_event(&mut self, keycode: KeyCode, _keymods: KeyMods, _repeat: bool) {
        self.key(keycode, true);
    }
    fn key_up_event(&mut self, keycode: KeyCode, _keymods: KeyMods) {
        self.key(keycode, false);
    }
}

fn load_stage1<G: GameLoader>() -> asset::Result<(WindowConfig, Vec<Font>)> {
    log::info!("{}", console::style("Loading game (stage 1)").bold());

    #[cfg(debug_assertions)]
    {
        asset::create_dir("config")?;
        WindowConfig::create_default_config_if_missing()?;
        G::create_default_files()?;
    }

    let window_config = WindowConfig::load_config()?;
    let mut fonts = Vec::new();
    for font_file in G::fonts() {
        fonts.push(asset::load_font_file(asset::FONTS_DIR, font_file)?);
    }
    Ok((window_config, fonts))
}

fn load_stage2<G: GameLoader>(
    context: &mut RenderingContext,
    renderer: &mut ShapeRenderer,
) -> asset::Result<G::Assets> {
    log::info!("{}", console::style("Loading game (stage 2)").bold());
    G::load(context, renderer)
}

fn create_game<G: GameLoader>(
    mut renderer: ShapeRenderer,
    assets: G::Assets,
    screen_size: (f32, f32),
) -> G::Game {
    log::info!("{}", console::style("Starting game loop").bold());
    renderer.set_screen_size(screen_size.0, screen_size.1);
    let mut game = G::create_game(renderer, assets);
    game.set_screen_size(screen_size.0, screen_size.1);
    game
}

const ERROR_LOG_FILENAME: &str = "error.log";

fn error_log_path() -> PathBuf {
    asset::base_path().join(ERROR_LOG_FILENAME)
}

/// Appends one entry, separated from the next by a blank line.
fn write_error_entry(log: &mut impl Write, heading: &str, body: &str) -> io::Result<()> {
    writeln!(log, "{heading}\n{body}\n")
}

fn append_error_log(heading: &str, body: &str) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(error_log_path())
        .and_then(|mut file| write_error_entry(&mut file, heading, body));
    if let Err(error) = result {
        eprintln!("Could not write {ERROR_LOG_FILENAME}: {error}");
    }
}

/// Records an error that the game recovers from.
#[track_caller]
pub fn nonfatal_error(message: &str) {
    let location = std::panic::Location::caller();
    append_error_log(&format!("nonfatal at {location}:"), message);
    log::error!("{message}");
    println!(
        "{}",
        console::style("A nonfatal error occurred. See error.log for details.").red()
    );
}

fn panic_message<'a>(payload: &'a (dyn std::any::Any + Send)) -> &'a str {
    let payload = if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "An unknown error occurred"
    };
    payload
        .strip_prefix("called `Result::unwrap()` on an `Err` value: ")
        .unwrap_or(payload)
}

fn panic_handler(panic_info: &std::panic::PanicHookInfo) {
    let location = panic_info
        .location()
        .map_or_else(|| "unknown location".to_owned(), ToString::to_string);
    append_error_log(
        &format!("panicked at {location}:"),
        panic_message(panic_info.payload()),
    );
    eprintln!(
        "{}\n{}",
        console::style("A fatal error occurred. See error.log for details.").red(),
        panic_message(panic_info.payload())
    );
}

pub fn run_game<G: GameLoader>(window_title: &str) {
    let _ = std::fs::remove_file(error_log_path());
    std::panic::set_hook(Box::new(panic_handler));
    init_logging();
    let (window_config, fonts) = load_stage1::<G>().unwrap();
    let config = window_config.to_conf(window_title);
    let screen_size = window_config.screen_size();
    miniquad::start(config, move || {
        let mut context = miniquad::window::new_rendering_backend();
        let mut renderer = ShapeRenderer::new(&mut context, fonts);
        let assets = load_stage2::<G>(&mut context, &mut renderer).unwrap();
        let game = create_game::<G>(renderer, assets, screen_size);
        Box::new(Stage::new(game, context, &window_config))
    });
}
