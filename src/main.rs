//! Farmer Skip entry point
//!
//! In the browser this mounts onto `#game-board` and drives the game from
//! `requestAnimationFrame`. Natively it runs a headless autopilot demo and
//! prints a JSON summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    use farmer_skip::audio::{AudioHook, WebAudio};
    use farmer_skip::renderer::{DomRenderer, Frame, Renderer};
    use farmer_skip::sim::{Direction, GameEvent};
    use farmer_skip::{Game, StartupError, Tuning};

    /// Page-side wrapper around the controller
    struct App {
        game: Game,
        renderer: DomRenderer,
        audio: WebAudio,
        last_time: f64,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let elapsed = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                0.0
            };
            self.last_time = time;

            let events = self.game.update(elapsed);
            self.handle_events(&events);
            self.renderer.render(&Frame::capture(self.game.state()));
        }

        fn handle_events(&mut self, events: &[GameEvent]) {
            self.audio.play_events(events);
            for event in events {
                match event {
                    GameEvent::LevelStarted { level } => {
                        let needed = self.game.state().eggs_needed;
                        self.renderer
                            .show_message(&format!("Level {level}: collect {needed} eggs!"));
                    }
                    GameEvent::LifeLost { cause, lives } if *lives > 0 => {
                        self.renderer
                            .show_message(&format!("{} {} lives left", cause.describe(), lives));
                    }
                    GameEvent::GameOver { cause } => self.renderer.show_message(cause.describe()),
                    GameEvent::Victory => self.renderer.show_message("You saved the farm!"),
                    _ => {}
                }
            }
        }

        fn reset_clock(&mut self) {
            self.last_time = 0.0;
        }
    }

    fn preset_tuning(renderer: &DomRenderer) -> Tuning {
        match renderer.board().get_attribute("data-preset") {
            Some(name) => Tuning::from_preset_name(&name).unwrap_or_else(|err| {
                log::warn!("{err}; using the standard preset");
                Tuning::default()
            }),
            None => Tuning::default(),
        }
    }

    pub fn run() -> Result<(), StartupError> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Farmer Skip starting...");

        let window = web_sys::window().ok_or(StartupError::NoWindow)?;
        let document = window.document().ok_or(StartupError::NoDocument)?;
        let renderer = DomRenderer::mount(&document)?;

        let tuning = preset_tuning(&renderer);
        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game: Game::new(seed, tuning),
            renderer,
            audio: WebAudio::new(),
            last_time: 0.0,
        }));
        {
            let mut a = app.borrow_mut();
            let frame = Frame::capture(a.game.state());
            a.renderer.render(&frame);
        }

        setup_keyboard(app.clone());
        setup_mouse(app.clone());
        setup_buttons(app.clone());
        setup_focus_loss(app.clone());

        request_animation_frame(app);

        log::info!("Farmer Skip running!");
        Ok(())
    }

    fn direction_for(key: &str) -> Option<Direction> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut a = app.borrow_mut();
                if let Some(direction) = direction_for(&key) {
                    event.prevent_default();
                    a.game.set_direction_key(direction, true);
                } else if key == "i" || key == "I" {
                    let enabled = !a.game.idle_mode();
                    a.game.set_idle_mode(enabled);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(direction) = direction_for(&event.key()) {
                    app.borrow_mut().game.set_direction_key(direction, false);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_mouse(app: Rc<RefCell<App>>) {
        let board = app.borrow().renderer.board().clone();
        let target = board.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let rect = target.get_bounding_client_rect();
            let x = event.client_x() as f64 - rect.left();
            let y = event.client_y() as f64 - rect.top();
            app.borrow_mut().game.fire_at(x as f32, y as f32);
        });
        let _ = board.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_click(id: &str, app: Rc<RefCell<App>>, action: fn(&mut App)) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("No #{id} button; skipping");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut a = app.borrow_mut();
            a.reset_clock();
            action(&mut a);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(app: Rc<RefCell<App>>) {
        on_click("start-button", app.clone(), |a| a.game.start());
        on_click("continue-button", app.clone(), |a| {
            a.game.advance_level();
        });
        let restart = |a: &mut App| a.game.restart();
        on_click("play-again-button", app.clone(), restart);
        on_click("restart-button", app, restart);
    }

    fn setup_focus_loss(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            // Keyups are lost while unfocused
            app.borrow_mut().game.release_keys();
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(err) = wasm_game::run() {
        log::error!("Startup failed: {err}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use farmer_skip::renderer::{Frame, Renderer, TextRenderer};
    use farmer_skip::sim::{GameEvent, GamePhase};
    use farmer_skip::{AudioHook, Game, SilentAudio, Tuning, TuningError};

    /// Simulated frame length for the headless run
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Five simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    pub struct Options {
        pub seed: u64,
        pub tuning: Tuning,
        pub show_board: bool,
    }

    /// `farmer-skip [seed] [preset | tuning.json] [--board]`
    pub fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, TuningError> {
        let mut options = Options {
            seed: 42,
            tuning: Tuning::default(),
            show_board: false,
        };
        for arg in args {
            if arg == "--board" {
                options.show_board = true;
            } else if let Ok(seed) = arg.parse() {
                options.seed = seed;
            } else if arg.ends_with(".json") {
                let json = std::fs::read_to_string(&arg).map_err(|source| TuningError::Io {
                    path: arg.clone(),
                    source,
                })?;
                options.tuning = Tuning::from_json(&json)?;
            } else {
                options.tuning = Tuning::from_preset_name(&arg)?;
            }
        }
        Ok(options)
    }

    pub fn run(options: Options) {
        let mut game = Game::new(options.seed, options.tuning);
        let mut audio = SilentAudio;
        game.set_idle_mode(true);
        game.start();

        let mut frames = 0;
        while frames < MAX_FRAMES {
            frames += 1;
            let events = game.update(FRAME_MS);
            audio.play_events(&events);
            for event in &events {
                match event {
                    GameEvent::LevelStarted { .. }
                    | GameEvent::LifeLost { .. }
                    | GameEvent::LevelComplete { .. } => log::info!("{:?}", event),
                    _ => log::debug!("{:?}", event),
                }
            }
            match game.phase() {
                GamePhase::LevelComplete => {
                    game.advance_level();
                }
                GamePhase::GameOver | GamePhase::Victory => break,
                GamePhase::Idle | GamePhase::LevelActive => {}
            }
        }

        let frame = Frame::capture(game.state());
        if options.show_board {
            let mut board = TextRenderer::new();
            board.render(&frame);
            println!("{}", board.output());
        }

        let summary = serde_json::json!({
            "seed": options.seed,
            "phase": frame.phase,
            "sim_ms": game.state().now_ms(),
            "hud": frame.hud,
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{text}"),
            Err(err) => log::error!("Failed to serialize summary: {err}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Farmer Skip (native) starting headless demo...");

    match demo::parse_args(std::env::args().skip(1)) {
        Ok(options) => demo::run(options),
        Err(err) => {
            log::error!("{err}");
            std::process::exit(2);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
