use storyline::backend::{DispatchMode, HttpBackend, MutationDispatcher};
use storyline::cli::Args;
use storyline::config::{self, EditorSettings, PathConfig};
use storyline::core::{EditorContext, NullRenderer, Player, TimelineEditor};
use storyline::widgets::timeline;

use clap::Parser;
use eframe::egui;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main application state
struct StorylineApp {
    settings: EditorSettings,
    settings_dirty: bool,
    path_config: PathConfig,
    /// Story id typed into the header field
    story_input: String,
    editor: Option<TimelineEditor>,
    error_msg: Option<String>,
}

impl StorylineApp {
    fn new(settings: EditorSettings, path_config: PathConfig, story: Option<String>) -> Self {
        let mut app = Self {
            settings,
            settings_dirty: false,
            path_config,
            story_input: story.clone().unwrap_or_default(),
            editor: None,
            error_msg: None,
        };
        if let Some(story) = story {
            app.open_story(&story);
        }
        app
    }

    /// Replace the current timeline with `story_id`.
    fn open_story(&mut self, story_id: &str) {
        let story_id = story_id.trim();
        if story_id.is_empty() {
            return;
        }
        self.remember_editor_settings();
        let backend = match HttpBackend::new(&self.settings.backend_url) {
            Ok(backend) => backend,
            Err(e) => {
                error!("cannot open story {}: {}", story_id, e);
                self.error_msg = Some(e.to_string());
                return;
            }
        };
        info!("opening story {} via {}", story_id, backend.base_url());
        let dispatcher = MutationDispatcher::new(Arc::new(backend), DispatchMode::Background);
        let player = Player::new(EditorContext::new(), Box::new(NullRenderer));
        let mut editor = TimelineEditor::new(story_id, player, dispatcher, &self.settings);
        editor.refresh();
        self.editor = Some(editor);
        self.error_msg = None;
    }

    /// Copy zoom and panel height back into the settings.
    fn remember_editor_settings(&mut self) {
        let Some(editor) = &self.editor else {
            return;
        };
        let pps = editor.scale().pixels_per_second();
        let height = editor.panel_height();
        if pps != self.settings.pixels_per_second || height != self.settings.timeline_height {
            self.settings.pixels_per_second = pps;
            self.settings.timeline_height = height;
            self.settings_dirty = true;
        }
    }

    fn save_settings(&mut self) {
        self.remember_editor_settings();
        if !self.settings_dirty {
            return;
        }
        let path = config::config_file(config::SETTINGS_FILE, &self.path_config);
        match self.settings.save(&path) {
            Ok(()) => self.settings_dirty = false,
            Err(e) => warn!("{:#}", e),
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        let mut open = false;
        ui.horizontal(|ui| {
            ui.label("Story:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.story_input)
                    .hint_text("story id")
                    .desired_width(240.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                open = true;
            }
            if ui.button("Open").clicked() {
                open = true;
            }
            ui.separator();
            ui.weak(&self.settings.backend_url);
        });
        if open {
            let story = self.story_input.clone();
            self.open_story(&story);
        }

        if let Some(msg) = &self.error_msg {
            ui.colored_label(egui::Color32::from_rgb(230, 90, 80), msg);
        }

        ui.separator();

        match &self.editor {
            None => {
                ui.weak("Enter a story id to open its timeline.");
            }
            Some(editor) => {
                ui.heading(editor.story_id());
                ui.label(format!(
                    "{} clips on {} tracks",
                    editor.clips().len(),
                    editor.tracks().len()
                ));
                let audible: Vec<&str> =
                    editor.audible_clips().iter().map(|c| c.profile_name.as_str()).collect();
                if !audible.is_empty() {
                    ui.label(format!("Playing: {}", audible.join(", ")));
                }
                if let Some(clip) = editor.selected_clip().and_then(|id| editor.clip(&id)) {
                    ui.add_space(8.0);
                    ui.strong(&clip.profile_name);
                    ui.label(&clip.text);
                    if let Some(url) = editor.audio_url(&clip.id) {
                        ui.hyperlink_to("audio", url);
                    }
                }
            }
        }
    }
}

impl eframe::App for StorylineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if let Some(editor) = &mut self.editor {
            editor.tick(now);
            timeline::handle_keyboard(ctx, editor, now);
        }

        if let Some(editor) = &mut self.editor {
            egui::TopBottomPanel::bottom("storyline_timeline")
                .exact_height(editor.live_panel_height() as f32)
                .resizable(false)
                .show(ctx, |ui| {
                    timeline::render_timeline(ui, editor, now);
                });
            timeline::render_toasts(ctx, editor);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
        });

        // Keep frames coming while playing or waiting on the backend.
        let busy = self
            .editor
            .as_ref()
            .is_some_and(|e| e.is_playing() || e.requests_in_flight() > 0 || e.notifications().next().is_some());
        if busy {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        self.save_settings();
    }

    fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(10)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {:#}", e);
    }

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, &path_config));

        let file = std::fs::File::create(&log_path)?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
    }

    info!("Storyline timeline editor starting...");
    debug!("Command-line args: {:?}", args);

    let settings_path = config::config_file(config::SETTINGS_FILE, &path_config);
    info!("Config path: {}", settings_path.display());
    let mut settings = match EditorSettings::load(&settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("{:#}; using defaults", e);
            EditorSettings::default()
        }
    };
    settings.apply_overrides(std::env::var(config::BACKEND_URL_ENV).ok(), args.backend.clone());
    info!("Backend: {}", settings.backend_url);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Storyline v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([1200.0, 700.0]),
        ..Default::default()
    };

    let story = args.story.clone();
    eframe::run_native(
        "Storyline",
        native_options,
        Box::new(move |_cc| Ok(Box::new(StorylineApp::new(settings, path_config, story)))),
    )?;

    Ok(())
}
