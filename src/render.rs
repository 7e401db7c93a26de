use crate::types::{Rect, SheetResult};

const MAX_COLS: f64 = 80.0;
const MAX_ROWS: f64 = 40.0;

/// Draws one sheet as ASCII art, origin at the bottom-left corner.
pub fn render_sheet(extent: Rect, sheet: &SheetResult) -> String {
    let scale = f64::min(
        MAX_COLS / extent.length as f64,
        MAX_ROWS / extent.width as f64,
    );
    let cols = (extent.length as f64 * scale).round() as usize;
    let rows = (extent.width as f64 * scale).round() as usize;

    if cols == 0 || rows == 0 {
        return String::new();
    }

    let mut canvas = Canvas::new(cols, rows);
    canvas.frame(0, 0, cols, rows);

    for p in &sheet.placements {
        let r = p.rect();
        let x = (p.x as f64 * scale).round() as usize;
        let y = (p.y as f64 * scale).round() as usize;
        let w = (r.length as f64 * scale).round() as usize;
        let h = (r.width as f64 * scale).round() as usize;
        if w == 0 || h == 0 {
            continue;
        }

        // Canvas rows grow downward, sheet y grows upward.
        let top = rows.saturating_sub(y + h);
        canvas.frame(x, top, w, h);
        canvas.label(x, top, w, h, p.spec.label());
    }

    canvas.into_string()
}

struct Canvas {
    cells: Vec<Vec<char>>,
}

impl Canvas {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cells: vec![vec![' '; cols + 1]; rows + 1],
        }
    }

    fn plot(&mut self, col: usize, row: usize, ch: char) {
        let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) else {
            return;
        };
        *cell = match (*cell, ch) {
            ('+', _) => '+',
            ('-', '|') | ('|', '-') => '+',
            _ => ch,
        };
    }

    fn frame(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for col in x..=x + w {
            self.plot(col, y, '-');
            self.plot(col, y + h, '-');
        }
        for row in y..=y + h {
            self.plot(x, row, '|');
            self.plot(x + w, row, '|');
        }
        for (col, row) in [(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
            if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
                *cell = '+';
            }
        }
    }

    /// Centres `text` inside the frame interior, clipped to fit.
    fn label(&mut self, x: usize, y: usize, w: usize, h: usize, text: &str) {
        if w < 3 || h < 2 {
            return;
        }
        let room = w - 1;
        let chars: Vec<char> = text.chars().take(room).collect();
        let row = y + h / 2;
        let start = x + 1 + (room - chars.len()) / 2;
        for (i, ch) in chars.into_iter().enumerate() {
            if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(start + i)) {
                *cell = ch;
            }
        }
    }

    fn into_string(self) -> String {
        let mut out = String::new();
        for row in self.cells {
            let line: String = row.into_iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
