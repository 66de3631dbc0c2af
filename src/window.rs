use crate::passage::Passage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Untyped,
    CorrectTyped,
    WrongTyped,
    Cursor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    /// Position of this character in the passage text.
    pub index: usize,
    pub ch: char,
    pub style: CellStyle,
}

/// The part of a passage that fits on a `rows` x `cols` grid, starting at the
/// row that holds the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub rows: usize,
    pub cols: usize,
    pub start_index: usize,
    pub cells: Vec<Cell>,
}

impl Window {
    pub fn compute(passage: &Passage, rows: usize, cols: usize) -> Self {
        if rows == 0 || cols == 0 {
            return Self {
                rows,
                cols,
                start_index: 0,
                cells: vec![],
            };
        }

        let cursor = passage.cursor();
        let start_index = (cursor / cols) * cols;
        // rows and cols come from user config and may be absurd
        let end = start_index
            .saturating_add(rows.saturating_mul(cols))
            .min(passage.len());

        let cells = (start_index..end)
            .filter_map(|index| {
                let ch = passage.text()[index];
                if ch == '\n' {
                    return None;
                }

                let offset = index - start_index;
                let style = if index < cursor && passage.is_wrong(index) {
                    CellStyle::WrongTyped
                } else if index < cursor {
                    CellStyle::CorrectTyped
                } else if index == cursor {
                    CellStyle::Cursor
                } else {
                    CellStyle::Untyped
                };

                Some(Cell {
                    row: offset / cols,
                    col: offset % cols,
                    index,
                    ch,
                    style,
                })
            })
            .collect();

        Self {
            rows,
            cols,
            start_index,
            cells,
        }
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        // cells are emitted row-major, so the offset orders them
        let offset = row * self.cols + col;
        self.cells
            .binary_search_by_key(&offset, |c| c.row * self.cols + c.col)
            .ok()
            .map(|i| &self.cells[i])
    }

    /// The characters of one grid row, with blanks where nothing is drawn.
    pub fn row_text(&self, row: usize) -> String {
        let mut line = vec![' '; self.cols];
        for cell in self.cells.iter().filter(|c| c.row == row) {
            line[cell.col] = cell.ch;
        }
        line.into_iter().collect::<String>().trim_end().to_string()
    }
}
