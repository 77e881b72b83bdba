//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Inspector pane above a one-line status / editor bar.
pub struct AppLayout {
    pub inspector_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        Self {
            inspector_area: chunks[0],
            status_area: chunks[1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bar_takes_the_last_line() {
        let layout = AppLayout::from_area(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.inspector_area.height, 23);
        assert_eq!(layout.status_area, Rect::new(0, 23, 80, 1));
    }
}
