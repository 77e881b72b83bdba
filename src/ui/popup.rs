//! Help overlay listing the active key bindings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::config::{Action, AppConfig};

pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
}

impl<'a> Widget for HelpPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // actions + blank lines + hint + borders
        let height = (Action::ALL.len() as u16) + 8;
        let popup = centered_fixed(56, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Controls ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let label_style = Style::default().fg(Color::White);
        let key_style = Style::default().fg(Color::Yellow);
        let dim = Style::default().fg(Color::DarkGray);

        let mut lines = vec![Line::raw("")];
        for &action in Action::ALL {
            let label_col = format!("   {:<24}", action.label());
            let keys_width = (inner.width as usize).saturating_sub(label_col.len()).max(1);
            let keys = self.config.display_bindings(action);
            lines.push(Line::from(vec![
                Span::styled(label_col, label_style),
                Span::styled(format!("{keys:>keys_width$}"), key_style),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Edits commit with Enter, Esc cancels.",
            dim,
        )));
        lines.push(Line::from(Span::styled(
            "  Debug views only draw while the world is playing.",
            dim,
        )));
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("  Any key: close", dim)));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Centered rectangle with fixed dimensions, clamped to the available area.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped() {
        assert_eq!(centered_fixed(10, 4, Rect::new(0, 0, 20, 10)), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_fixed(50, 50, Rect::new(2, 2, 20, 10)), Rect::new(2, 2, 20, 10));
    }

    #[test]
    fn lists_every_action() {
        let config = AppConfig::default();
        let area = Rect::new(0, 0, 80, 40);
        let mut buf = Buffer::empty(area);
        HelpPopup { config: &config }.render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        for action in Action::ALL {
            assert!(text.contains(action.label()), "missing {}", action.label());
        }
    }
}
