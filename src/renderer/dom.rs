//! DOM renderer
//!
//! Draws each sprite as an absolutely positioned `div` inside the board
//! element and mirrors the HUD and overlay screens into the page.

use web_sys::{Document, Element};

use super::{Frame, Renderer};
use crate::error::StartupError;
use crate::sim::GamePhase;

const BOARD_ID: &str = "game-board";

pub struct DomRenderer {
    document: Document,
    board: Element,
    last_phase: Option<GamePhase>,
}

impl DomRenderer {
    /// Attach to `#game-board`
    pub fn mount(document: &Document) -> Result<Self, StartupError> {
        let board = document
            .get_element_by_id(BOARD_ID)
            .ok_or(StartupError::MissingElement(BOARD_ID))?;
        Ok(Self {
            document: document.clone(),
            board,
            last_phase: None,
        })
    }

    pub fn board(&self) -> &Element {
        &self.board
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(&self, id: &str, hidden: bool) {
        if let Some(el) = self.document.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if hidden {
                classes.add_1("hidden")
            } else {
                classes.remove_1("hidden")
            };
        }
    }

    /// Status line under the board
    pub fn show_message(&self, text: &str) {
        self.set_text("message", text);
    }

    fn draw_sprites(&self, frame: &Frame) {
        let _ = self.board.set_attribute(
            "style",
            &format!(
                "width:{}px;height:{}px",
                frame.board.width, frame.board.height
            ),
        );
        self.board.set_inner_html("");
        for sprite in &frame.sprites {
            let Ok(el) = self.document.create_element("div") else {
                continue;
            };
            el.set_class_name(&sprite.class());
            let _ = el.set_attribute(
                "style",
                &format!(
                    "left:{:.1}px;top:{:.1}px;width:{:.1}px;height:{:.1}px",
                    sprite.x, sprite.y, sprite.width, sprite.height
                ),
            );
            let _ = self.board.append_child(&el);
        }
    }

    fn update_hud(&self, frame: &Frame) {
        let hud = &frame.hud;
        self.set_text("level", &hud.level.to_string());
        self.set_text("lives", &hud.lives.to_string());
        self.set_text("total-score", &hud.total_score.to_string());
        self.set_text("eggs-collected-count", &hud.eggs_collected.to_string());
        self.set_text("eggs-needed", &hud.eggs_needed.to_string());
        self.set_text("snake-eggs", &hud.snake_score.to_string());
        self.set_text("snake-limit", &hud.snake_limit.to_string());
        let combo = if hud.combo > 1 {
            format!("x{}", hud.combo)
        } else {
            String::new()
        };
        self.set_text("combo", &combo);
        let power_up = match hud.power_up {
            Some((kind, secs)) => format!("{} {}s", kind.as_str(), secs),
            None => String::new(),
        };
        self.set_text("power-up", &power_up);
    }

    fn update_screens(&mut self, frame: &Frame) {
        if self.last_phase == Some(frame.phase) {
            return;
        }
        self.last_phase = Some(frame.phase);
        let hud = &frame.hud;

        self.set_hidden("start-screen", frame.phase != GamePhase::Idle);
        self.set_hidden("level-screen", frame.phase != GamePhase::LevelComplete);
        let ended = matches!(frame.phase, GamePhase::GameOver | GamePhase::Victory);
        self.set_hidden("end-screen", !ended);

        match frame.phase {
            GamePhase::LevelComplete => {
                self.set_text("completed-level", &hud.level.to_string());
                self.set_text("next-level", &(hud.level + 1).to_string());
                self.set_text("level-eggs-collected", &hud.eggs_collected.to_string());
                self.set_text("level-score", &hud.level_score.to_string());
            }
            GamePhase::GameOver | GamePhase::Victory => {
                let won = frame.phase == GamePhase::Victory;
                self.set_text("end-title", if won { "Victory!" } else { "Game Over" });
                self.set_text("final-score", &hud.total_score.to_string());
                self.set_text("final-level", &hud.level.to_string());
            }
            GamePhase::Idle | GamePhase::LevelActive => {}
        }
    }
}

impl Renderer for DomRenderer {
    fn render(&mut self, frame: &Frame) {
        self.draw_sprites(frame);
        self.update_hud(frame);
        self.update_screens(frame);
    }
}
