//! # AlertPopup Component
//!
//! Blocking modal drawn over everything else. While it is up the event loop
//! only accepts dismiss (Enter / Esc) and Ctrl+C.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use crate::tui::component::Component;

pub struct AlertPopup<'a> {
    pub message: &'a str,
}

impl<'a> AlertPopup<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Component for AlertPopup<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = self.message.lines().map(Line::from).collect();
        lines.push(Line::from(""));
        lines.push(Line::styled("[Enter] OK", Style::default().fg(Color::DarkGray)));

        let width = (area.width / 5 * 3).max(30).min(area.width);
        // Wrapped text may need more rows than lines; leave slack for borders.
        let height = (lines.len() as u16 + 4).min(area.height);
        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(row);

        let paragraph = Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title("Alert")
                    .border_style(Style::default().fg(Color::Red)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(Clear, popup);
        frame.render_widget(paragraph, popup);
    }
}
