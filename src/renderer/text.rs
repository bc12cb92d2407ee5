//! Character-grid renderer for terminals and logs

use super::{Frame, Renderer};
use crate::consts::CELL_SIZE;
use crate::sim::EntityKind;

fn glyph(kind: EntityKind, variant: Option<&str>) -> char {
    match (kind, variant) {
        (EntityKind::Farmer, _) => 'F',
        (EntityKind::Snake, _) => 'S',
        (EntityKind::Rooster, _) => 'R',
        (EntityKind::Chicken, _) => 'c',
        (EntityKind::Weasel, _) => 'w',
        (EntityKind::Egg, Some("golden")) => 'g',
        (EntityKind::Egg, Some("special")) => '*',
        (EntityKind::Egg, _) => 'o',
        (EntityKind::Obstacle, _) => '#',
        (EntityKind::PowerUp, _) => '+',
        (EntityKind::Bullet, _) => '\'',
    }
}

/// Draws one character per board cell, keyed on each sprite's center
#[derive(Debug, Default)]
pub struct TextRenderer {
    output: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent drawing
    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, frame: &Frame) {
        let cols = (frame.board.width / CELL_SIZE).round().max(1.0) as usize;
        let rows = (frame.board.height / CELL_SIZE).round().max(1.0) as usize;
        let mut grid = vec![vec!['.'; cols]; rows];

        for sprite in &frame.sprites {
            let cx = sprite.x + sprite.width * 0.5;
            let cy = sprite.y + sprite.height * 0.5;
            let col = ((cx / CELL_SIZE) as usize).min(cols - 1);
            let row = ((cy / CELL_SIZE) as usize).min(rows - 1);
            grid[row][col] = glyph(sprite.kind, sprite.variant);
        }

        let hud = &frame.hud;
        self.output = format!(
            "level {} | lives {} | score {} | eggs {}/{} | snake {}/{}\n",
            hud.level,
            hud.lives,
            hud.total_score,
            hud.eggs_collected,
            hud.eggs_needed,
            hud.snake_score,
            hud.snake_limit
        );
        for row in grid {
            self.output.extend(row);
            self.output.push('\n');
        }
    }
}
