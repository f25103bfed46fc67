//! FETE - a terminal celebration show
//!
//! Welcome screen, one burst of confetti, then dedication cards with
//! greetings and songs, advancing on their own.

use std::collections::HashMap;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Terminal,
};
use tracing::{info, warn};

use fete_audio::{AudioCommand, AudioEngine, AudioEvent, ClipKind, EngineState};
use fete_confetti::ConfettiEngine;
use fete_input::{Command, InputHandler, Screen};
use fete_library::{load_dedications, load_or_fallback, ClipLoader, Config, Dedication};
use fete_show::{CardMedia, Effect, Sequencer, SequencerConfig};
use fete_tui::{
    apply_fade, render_confetti, App, CardsWidget, HelpWidget, PlaybackInfo, StatusBarWidget,
    Theme, WelcomeWidget, PX_PER_COL, PX_PER_ROW,
};

/// Frame rate for UI updates
const FPS: u64 = 30;

/// Pause between the welcome burst and the screen transition
const BURST_TO_TRANSITION: Duration = Duration::from_millis(1500);

fn main() -> anyhow::Result<()> {
    init_logging();

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Create audio channels
    let (cmd_tx, cmd_rx, evt_tx, evt_rx) = AudioEngine::create_channels();

    // Shutdown flag
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_audio = shutdown.clone();

    // The audio thread reports the device rate here so clips decode to it
    let device_rate = Arc::new(AtomicU32::new(0));
    let device_rate_audio = device_rate.clone();

    // Spawn audio thread
    let audio_handle = thread::spawn(move || {
        run_audio_thread(cmd_rx, evt_tx, shutdown_audio, device_rate_audio);
    });

    // Create engine handle for main thread
    let engine = AudioEngine::new(cmd_tx, evt_rx);

    // Run main event loop
    let result = run_app(&mut terminal, engine, shutdown.clone(), device_rate);

    // Cleanup
    shutdown.store(true, Ordering::SeqCst);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Wait for audio thread
    let _ = audio_handle.join();

    result
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() {
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fete");
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(log_dir.join("fete.log")) else {
        return;
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn run_audio_thread(
    cmd_rx: Receiver<AudioCommand>,
    evt_tx: Sender<AudioEvent>,
    shutdown: Arc<AtomicBool>,
    device_rate: Arc<AtomicU32>,
) {
    // Get audio host and device
    let host = cpal::default_host();
    let device = match host.default_output_device() {
        Some(d) => d,
        None => {
            let _ = evt_tx.send(AudioEvent::Error("No audio output device found".into()));
            run_silent(&cmd_rx, &evt_tx, &shutdown);
            return;
        }
    };

    let config = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = evt_tx.send(AudioEvent::Error(format!(
                "Failed to get audio config: {}",
                e
            )));
            run_silent(&cmd_rx, &evt_tx, &shutdown);
            return;
        }
    };

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    device_rate.store(sample_rate, Ordering::Relaxed);
    info!("audio output at {sample_rate} Hz, {channels} channels");

    // Create engine state
    let engine_state = Arc::new(std::sync::Mutex::new(EngineState::new(sample_rate)));
    let engine_for_callback = engine_state.clone();

    // Pre-allocate mono conversion buffer (avoid allocation in audio callback)
    let mut mono_conversion_buffer = vec![0.0f32; 16384];

    // Progress update interval
    let mut last_progress = Instant::now();
    let progress_interval = Duration::from_millis(200);

    // Build audio stream
    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Use try_lock to avoid blocking the real-time audio thread.
            // On contention (rare), output silence rather than blocking.
            if let Ok(mut state) = engine_for_callback.try_lock() {
                if channels == 2 {
                    state.process(data);
                } else {
                    // Handle mono output using pre-allocated buffer
                    let stereo_len = data.len() * 2;
                    let stereo = &mut mono_conversion_buffer[..stereo_len];
                    state.process(stereo);
                    for (i, sample) in data.iter_mut().enumerate() {
                        *sample = (stereo[i * 2] + stereo[i * 2 + 1]) * 0.5;
                    }
                }
            } else {
                data.fill(0.0);
            }
        },
        |err| {
            warn!("audio stream error: {err}");
        },
        None,
    );

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = evt_tx.send(AudioEvent::Error(format!(
                "Failed to create audio stream: {}",
                e
            )));
            run_silent(&cmd_rx, &evt_tx, &shutdown);
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = evt_tx.send(AudioEvent::Error(format!("Failed to start audio: {}", e)));
        run_silent(&cmd_rx, &evt_tx, &shutdown);
        return;
    }

    // Command processing loop
    while !shutdown.load(Ordering::Relaxed) {
        match cmd_rx.recv_timeout(Duration::from_millis(10)) {
            Ok(AudioCommand::Shutdown) => break,
            Ok(cmd) => {
                if let Ok(mut state) = engine_state.lock() {
                    if let Some(event) = state.handle_command(cmd) {
                        let _ = evt_tx.try_send(event);
                    }
                }
            }
            Err(_) => {}
        }

        if let Ok(mut state) = engine_state.lock() {
            // Collect clips the callback ran to the end of
            if let Some(event) = state.take_finished() {
                let _ = evt_tx.try_send(event);
            }

            // Progress updates for the UI
            if last_progress.elapsed() >= progress_interval {
                if let Some(event) = state.progress() {
                    let _ = evt_tx.try_send(event);
                }
                last_progress = Instant::now();
            }
        }
    }
}

/// Command loop for when no audio output is available. Every Play is
/// rejected so the show still walks through the cards.
fn run_silent(
    cmd_rx: &Receiver<AudioCommand>,
    evt_tx: &Sender<AudioEvent>,
    shutdown: &Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match cmd_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(AudioCommand::Shutdown) => break,
            Ok(AudioCommand::Play { card, kind, .. }) => {
                let _ = evt_tx.try_send(AudioEvent::Rejected {
                    card,
                    kind,
                    reason: "no audio output".into(),
                });
            }
            Ok(_) => {}
            Err(_) => {}
        }
    }
}

/// Everything the show loop owns besides the app state itself
struct Show {
    sequencer: Sequencer,
    confetti: ConfettiEngine,
    /// User preferences, saved best-effort when they change
    config: Config,
    /// Built lazily so it can pick up the device sample rate
    loader: Option<ClipLoader>,
    /// Decoded clips, keyed by card and role
    cache: HashMap<(usize, ClipKind), (Arc<Vec<f32>>, f64)>,
    device_rate: Arc<AtomicU32>,
    /// When set, the welcome-to-cards fade begins at this instant
    transition_at: Option<Instant>,
}

fn card_media(dedications: &[Dedication]) -> Vec<CardMedia> {
    dedications
        .iter()
        .map(|d| CardMedia {
            has_greeting: d.has_greeting(),
            has_song: d.has_local_song(),
        })
        .collect()
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: AudioEngine,
    shutdown: Arc<AtomicBool>,
    device_rate: Arc<AtomicU32>,
) -> anyhow::Result<()> {
    let mut app = App::new();
    let mut input_handler = InputHandler::new();

    // Load user config (theme, autoplay, data file)
    let config = Config::load();
    app.state.set_theme(&config.theme);
    app.state.clear_message();
    app.state.autoplay = config.autoplay;

    // Dedication data: CLI argument wins, then the configured file,
    // then the conventional name next to the binary.
    let data_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.data_file.clone())
        .unwrap_or_else(|| PathBuf::from("dedications.json"));
    let dedications = load_or_fallback(&data_path);

    let mut sequencer = Sequencer::new(SequencerConfig::default());
    sequencer.set_cards(card_media(&dedications));
    sequencer.set_autoplay(config.autoplay);
    app.state.set_dedications(dedications);

    let size = terminal.size()?;
    let confetti = ConfettiEngine::new(
        size.width as f32 * PX_PER_COL,
        size.height as f32 * PX_PER_ROW,
    );

    let mut show = Show {
        sequencer,
        confetti,
        config,
        loader: None,
        cache: HashMap::new(),
        device_rate,
        transition_at: None,
    };

    let frame_duration = Duration::from_millis(1000 / FPS);
    let mut last_frame = Instant::now();

    loop {
        if shutdown.load(Ordering::Relaxed) || app.should_quit {
            engine.send(AudioCommand::Shutdown);
            break;
        }

        let now = Instant::now();

        // Process audio events
        while let Ok(event) = engine.event_rx.try_recv() {
            handle_audio_event(&mut app, &engine, &mut show, event, now);
        }

        // Sequencer clock
        let effects = show.sequencer.tick(now);
        apply_effects(&mut app, &engine, &mut show, effects, now);

        // Welcome burst settles, then the screens crossfade
        if show.transition_at.is_some_and(|at| now >= at) {
            show.transition_at = None;
            app.state.fade.begin();
        }
        if app.state.fade.update() {
            app.state.screen = Screen::Dedications;
            input_handler.set_screen(Screen::Dedications);
            let effects = show.sequencer.start_run(0, now);
            apply_effects(&mut app, &engine, &mut show, effects, now);
        }

        show.confetti.step(now);
        app.state.cards.update_flashes();
        app.state.frame_count = app.state.frame_count.wrapping_add(1);

        // Render
        terminal.draw(|frame| {
            render_ui(frame, &mut app, &show.confetti);
        })?;

        // Handle input
        let timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.code == KeyCode::Char('q')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        app.quit();
                        continue;
                    }

                    if let Some(cmd) = input_handler.handle_key(key) {
                        handle_command(&mut app, &engine, &mut show, cmd, Instant::now());
                    }

                    app.state.set_mode(input_handler.mode());
                    app.state.command_buffer = input_handler.command_buffer().to_string();
                }
                Event::Resize(w, h) => {
                    show.confetti
                        .resize(w as f32 * PX_PER_COL, h as f32 * PX_PER_ROW);
                }
                _ => {}
            }
        }

        // Maintain frame rate
        let elapsed = last_frame.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
        last_frame = Instant::now();
    }

    Ok(())
}

fn handle_audio_event(
    app: &mut App,
    engine: &AudioEngine,
    show: &mut Show,
    event: AudioEvent,
    now: Instant,
) {
    match event {
        AudioEvent::Started { card, kind } => {
            app.state.cards.set_highlight(card);
            app.state.playback = Some(PlaybackInfo {
                card,
                kind,
                position_secs: 0.0,
                duration_secs: 0.0,
            });
        }
        AudioEvent::Finished { card, kind } => {
            app.state.playback = None;
            let effects = show.sequencer.clip_ended(card, kind, now);
            apply_effects(app, engine, show, effects, now);
        }
        AudioEvent::Rejected { card, kind, reason } => {
            app.state.set_warning(format!("Could not play: {reason}"));
            let effects = show.sequencer.clip_rejected(card, kind, now);
            apply_effects(app, engine, show, effects, now);
        }
        AudioEvent::Progress {
            card,
            kind,
            position_secs,
            duration_secs,
        } => {
            app.state.playback = Some(PlaybackInfo {
                card,
                kind,
                position_secs,
                duration_secs,
            });
        }
        AudioEvent::Error(msg) => {
            app.state.set_error(msg);
        }
    }
}

/// Carry out sequencer effects. Playing a clip can itself produce more
/// effects (a bad file rejects the step), so this drains a queue.
fn apply_effects(
    app: &mut App,
    engine: &AudioEngine,
    show: &mut Show,
    effects: Vec<Effect>,
    now: Instant,
) {
    let mut queue: std::collections::VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::PauseAll => {
                engine.send(AudioCommand::Stop);
                app.state.playback = None;
            }
            Effect::PlayGreeting(card) => {
                queue.extend(play_clip(app, engine, show, card, ClipKind::Greeting, now));
            }
            Effect::PlaySong(card) => {
                queue.extend(play_clip(app, engine, show, card, ClipKind::Song, now));
            }
            Effect::Highlight(card) => app.state.cards.set_highlight(card),
            Effect::ClearHighlights => app.state.cards.clear_highlights(),
            Effect::ResetClipVisual(card, kind) => {
                app.state.cards.trigger_reset_flash(card, kind);
            }
            Effect::RunComplete => {
                app.state
                    .set_success("That was everyone. Thanks for celebrating ♥");
            }
        }
    }
}

/// Decode (or fetch from cache) and start a clip. On failure the step is
/// reported rejected and the resulting effects are returned for the caller
/// to carry out.
fn play_clip(
    app: &mut App,
    engine: &AudioEngine,
    show: &mut Show,
    card: usize,
    kind: ClipKind,
    now: Instant,
) -> Vec<Effect> {
    let Some(dedication) = app.state.cards.dedications.get(card) else {
        return Vec::new();
    };
    let path = match kind {
        ClipKind::Greeting => dedication.greeting_path(),
        ClipKind::Song => dedication.local_song_path(),
    };
    let Some(path) = path else {
        return show.sequencer.clip_rejected(card, kind, now);
    };
    let path = PathBuf::from(path);

    if let Some((samples, duration_secs)) = show.cache.get(&(card, kind)) {
        engine.send(AudioCommand::Play {
            card,
            kind,
            samples: samples.clone(),
            duration_secs: *duration_secs,
        });
        return Vec::new();
    }

    let rate = show.device_rate.load(Ordering::Relaxed);
    let loader = show.loader.get_or_insert_with(|| {
        if rate > 0 {
            ClipLoader::with_sample_rate(rate)
        } else {
            ClipLoader::new()
        }
    });

    match loader.load(&path) {
        Ok(clip) => {
            let samples = Arc::new(clip.samples);
            let duration_secs = clip.duration_secs;
            show.cache.insert((card, kind), (samples.clone(), duration_secs));
            engine.send(AudioCommand::Play {
                card,
                kind,
                samples,
                duration_secs,
            });
            Vec::new()
        }
        Err(e) => {
            warn!("clip {} failed to load: {e}", path.display());
            app.state
                .set_warning(format!("Could not play {}: {e}", path.display()));
            show.sequencer.clip_rejected(card, kind, now)
        }
    }
}

fn handle_command(app: &mut App, engine: &AudioEngine, show: &mut Show, cmd: Command, now: Instant) {
    match cmd {
        // Welcome screen
        Command::Start => {
            if app.state.screen == Screen::Welcome && !app.state.start_disabled {
                app.state.start_disabled = true;
                show.confetti.burst_center(now);
                show.transition_at = Some(now + BURST_TO_TRANSITION);
            }
        }

        // Card navigation
        Command::SelectNext => app.state.cards.select_next(),
        Command::SelectPrev => app.state.cards.select_prev(),
        Command::SelectFirst => app.state.cards.select_first(),
        Command::SelectLast => app.state.cards.select_last(),

        // Run control
        Command::ActivateCard => {
            if show.sequencer.autoplay() {
                let effects = show.sequencer.start_run(app.state.cards.selected, now);
                apply_effects(app, engine, show, effects, now);
            } else {
                app.state.set_warning("Autoplay is off (a to enable)");
            }
        }
        Command::ToggleAutoplay => {
            let on = !show.sequencer.autoplay();
            let effects = show.sequencer.set_autoplay(on);
            app.state.autoplay = on;
            apply_effects(app, engine, show, effects, now);
            app.state
                .set_message(if on { "Autoplay on" } else { "Autoplay off" });
            show.config.autoplay = on;
            let _ = show.config.save(); // Best effort
        }

        // Manual playback
        Command::PlayGreeting => {
            let card = app.state.cards.selected;
            if app.state.cards.selected_dedication().is_some_and(|d| d.has_greeting()) {
                let effects = play_clip(app, engine, show, card, ClipKind::Greeting, now);
                apply_effects(app, engine, show, effects, now);
            } else {
                app.state.set_warning("No greeting on this card");
            }
        }
        Command::PlaySong => {
            let card = app.state.cards.selected;
            let Some(dedication) = app.state.cards.selected_dedication() else {
                return;
            };
            if dedication.has_local_song() {
                let effects = play_clip(app, engine, show, card, ClipKind::Song, now);
                apply_effects(app, engine, show, effects, now);
            } else if let Some(url) = dedication
                .song
                .as_ref()
                .and_then(|s| s.spotify_url.as_deref())
            {
                app.state.set_message(format!("♫ streaming only: {url}"));
            } else {
                app.state.set_warning("No song on this card");
            }
        }
        Command::StopPlayback => {
            engine.send(AudioCommand::Stop);
            app.state.playback = None;
        }

        // One more shower of confetti
        Command::Burst => show.confetti.burst_center(now),

        // Data and appearance
        Command::LoadData(path) => match load_dedications(&path) {
            Ok(dedications) => {
                show.sequencer.set_cards(card_media(&dedications));
                show.cache.clear();
                engine.send(AudioCommand::Stop);
                let count = dedications.len();
                app.state.set_dedications(dedications);
                app.state
                    .set_success(format!("Loaded {} dedications from {}", count, path.display()));
                show.config.data_file = Some(path);
                let _ = show.config.save(); // Best effort
            }
            Err(e) => {
                app.state.set_error(format!("Load failed: {e}"));
            }
        },
        Command::SetTheme(name) => {
            app.state.set_theme(&name);
            show.config.theme = app.state.theme.name.to_string();
            let _ = show.config.save(); // Best effort
        }

        // Help
        Command::ToggleHelp => app.state.toggle_help(),
        Command::HelpScrollUp => app.state.help_scroll_up(),
        Command::HelpScrollDown => app.state.help_scroll_down(),

        Command::Quit => app.quit(),

        Command::ExecuteCommand(input) => {
            app.state.set_error(format!("Unknown command: {input}"));
        }

        // Mode changes are reflected from the input handler after dispatch
        Command::EnterCommandMode | Command::EnterNormalMode | Command::Cancel => {}
    }
}

fn render_ui(frame: &mut ratatui::Frame, app: &mut App, confetti: &ConfettiEngine) {
    let area = frame.area();
    let theme = &app.state.theme;

    // Clear with background
    let block = ratatui::widgets::Block::default().style(theme.normal());
    frame.render_widget(block, area);

    match app.state.screen {
        Screen::Welcome => {
            let welcome = WelcomeWidget::new(theme)
                .start_disabled(app.state.start_disabled)
                .frame_count(app.state.frame_count);
            frame.render_widget(welcome, area);
        }
        Screen::Dedications => {
            let chunks = Layout::vertical([
                Constraint::Length(1), // Title
                Constraint::Min(6),    // Cards
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            render_title(frame, chunks[0], theme);

            let playback = app.state.playback;
            let cards = CardsWidget::new(&mut app.state.cards, &app.state.theme).playback(playback);
            frame.render_widget(cards, chunks[1]);

            let status = StatusBarWidget::new(
                app.state.mode,
                &app.state.command_buffer,
                &app.state.theme,
            )
            .message(app.state.message.as_deref(), app.state.message_type)
            .autoplay(app.state.autoplay);
            frame.render_widget(status, chunks[2]);
        }
    }

    // Help overlay (scrollable)
    if app.state.show_help {
        let help_area = centered_rect(56, 26, area);
        let help = HelpWidget::new(&app.state.theme).scroll(app.state.help_scroll);
        frame.render_widget(help, help_area);
    }

    // Post-processing: confetti on top, then the screen fade
    let dim = app.state.fade.dim_factor();
    let buf = frame.buffer_mut();
    render_confetti(buf, area, confetti.particles());
    apply_fade(buf, area, dim);
}

fn render_title(frame: &mut ratatui::Frame, area: Rect, theme: &Theme) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let title_text = " ♥ with love ♥ ";
    let width = area.width as usize;
    let padding = width.saturating_sub(title_text.chars().count()) / 2;
    let rest = width
        .saturating_sub(padding)
        .saturating_sub(title_text.chars().count());
    let padded = format!(
        "{:─<pad$}{}{:─<rest$}",
        "",
        title_text,
        "",
        pad = padding,
        rest = rest
    );

    let line = Line::from(Span::styled(padded, theme.title()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
