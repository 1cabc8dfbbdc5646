//! # TitleBar Component
//!
//! Top status bar: app name, the reader backend in use, and the current step.
//!
//! Purely presentational. All data arrives as props, so it is trivial to test:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new("simulated".into(), Step::WaitingForTag, false);
//! title_bar.render(frame, area);
//! ```

use crate::core::step::Step;
use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    /// Name of the NFC backend (e.g. "simulated", "pcsc")
    pub reader_name: String,
    pub step: Step,
    /// Whether a ride record POST is in flight
    pub sending: bool,
}

impl TitleBar {
    pub fn new(reader_name: String, step: Step, sending: bool) -> Self {
        Self {
            reader_name,
            step,
            sending,
        }
    }

    fn text(&self) -> String {
        let mut text = format!(
            "ridetag (reader: {}) | {}",
            self.reader_name,
            self.step.label()
        );
        if self.sending {
            text.push_str(" | Sending...");
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = match self.step {
            Step::NoNfc | Step::NfcNotEnabled => Style::default().fg(Color::Red),
            Step::TagRead => Style::default().fg(Color::Green),
            _ => Style::default().fg(Color::Cyan),
        };
        let line = Line::from(Span::styled(self.text(), style.add_modifier(Modifier::BOLD)));
        frame.render_widget(line, area);
    }
}
