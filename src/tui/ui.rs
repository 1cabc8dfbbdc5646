use crate::core::state::Scanner;
use crate::core::step::Step;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{AlertPopup, StepView, TitleBar};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

pub fn draw_ui(frame: &mut Frame, scanner: &Scanner, tui: &TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(1)]);
    let [title_area, main_area, hints_area] = layout.areas(frame.area());

    TitleBar::new(tui.reader_name.clone(), scanner.step, scanner.sending)
        .render(frame, title_area);

    StepView {
        step: scanner.step,
        tag_id: &scanner.tag_id,
        send_status: &scanner.send_status,
        sending: scanner.sending,
        spinner_frame: tui.spinner_frame,
    }
    .render(frame, main_area);

    frame.render_widget(hint_line(scanner, tui.can_tap), hints_area);

    if let Some(alert) = &scanner.alert {
        let area = frame.area();
        AlertPopup::new(alert).render(frame, area);
    }
}

/// Key bindings available in the current step, as (key, label) pairs.
pub fn key_hints(step: Step, alert_open: bool, can_tap: bool) -> Vec<(&'static str, &'static str)> {
    if alert_open {
        return vec![("Enter", "dismiss")];
    }
    let mut hints = match step {
        Step::NfcNotEnabled => vec![("s", "open NFC settings"), ("i", "retry")],
        Step::WaitingForNfcEnabled => vec![("i", "initialize NFC reader")],
        Step::WaitingForTag => {
            let mut hints = vec![("x", "stop")];
            if can_tap {
                hints.push(("t", "tap simulated tag"));
            }
            hints
        }
        Step::TagRead => vec![("Enter", "send"), ("r", "resume scanning"), ("x", "stop")],
        Step::Initializing | Step::NoNfc | Step::Cancelled => Vec::new(),
    };
    hints.push(("q", "quit"));
    hints
}

fn hint_line(scanner: &Scanner, can_tap: bool) -> Line<'static> {
    let key_style = Style::default().fg(Color::Yellow);
    let label_style = Style::default().fg(Color::DarkGray);
    let spans: Vec<Span> = key_hints(scanner.step, scanner.alert.is_some(), can_tap)
        .into_iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!("[{key}] "), key_style),
                Span::styled(format!("{label}  "), label_style),
            ]
        })
        .collect();
    Line::from(spans)
}
