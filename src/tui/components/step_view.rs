//! # StepView Component
//!
//! The main body: one view per `Step`, centered vertically.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};

use crate::core::step::Step;
use crate::tui::component::Component;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct StepView<'a> {
    pub step: Step,
    pub tag_id: &'a str,
    pub send_status: &'a str,
    pub sending: bool,
    pub spinner_frame: usize,
}

impl StepView<'_> {
    fn spinner(&self) -> char {
        SPINNER[self.spinner_frame % SPINNER.len()]
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let dim = Style::default().fg(Color::DarkGray);
        match self.step {
            Step::Initializing => vec![Line::from(format!("{} Initializing...", self.spinner()))],
            Step::NoNfc => vec![
                Line::from("The device you are using doesn't appear to have NFC;"),
                Line::from("or, the NFC reader hasn't been set up correctly."),
            ],
            Step::NfcNotEnabled => vec![
                Line::styled("NFC is not enabled on your device.", Style::default().fg(Color::Red)),
                Line::from(""),
                Line::from("Press [s] to open your device's NFC settings, then activate NFC."),
            ],
            Step::WaitingForNfcEnabled => vec![
                Line::from("Please press [i] once you have enabled NFC."),
            ],
            Step::WaitingForTag => vec![
                Line::from(format!("{} Waiting for NFC tag...", self.spinner())),
                Line::styled("Hold a tag against the reader.", dim),
            ],
            Step::TagRead => {
                let mut lines = vec![
                    Line::from("Tag scanned! Here is its content:"),
                    Line::from(""),
                    Line::styled(
                        self.tag_id.to_string(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Line::from(""),
                ];
                if self.sending {
                    lines.push(Line::from(format!("{} Sending...", self.spinner())));
                } else {
                    lines.extend(
                        self.send_status
                            .lines()
                            .map(|l| Line::styled(l.to_string(), dim)),
                    );
                }
                lines
            }
            Step::Cancelled => vec![Line::from("Bye!")],
        }
    }
}

impl Component for StepView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.lines();
        let height = (lines.len() as u16).min(area.height);
        let [body] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, body);
    }
}
