use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::window::{CellStyle, Window};

pub fn cell_style(style: CellStyle) -> Style {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    match style {
        CellStyle::CorrectTyped => bold_style.fg(Color::Green),
        CellStyle::WrongTyped => bold_style
            .fg(Color::Red)
            .add_modifier(Modifier::REVERSED),
        CellStyle::Cursor => Style::default()
            .patch(dim_style)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        CellStyle::Untyped => dim_style,
    }
}

impl Widget for &Window {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for cell in &self.cells {
            // anything past the edge of a small terminal is clipped
            let (Ok(col), Ok(row)) = (u16::try_from(cell.col), u16::try_from(cell.row)) else {
                continue;
            };
            if col >= area.width || row >= area.height {
                continue;
            }

            if let Some(target) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                target.set_char(cell.ch).set_style(cell_style(cell.style));
            }
        }
    }
}
