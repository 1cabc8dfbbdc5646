//! # TUI Components
//!
//! Stateless, props-based components. Each receives everything it shows as
//! struct fields and renders into the `Rect` it is given:
//!
//! - `TitleBar`: top line with reader backend and step label
//! - `StepView`: the view for the current step
//! - `AlertPopup`: blocking modal for the settings-failure alert

pub mod alert;
pub mod step_view;
pub mod title_bar;

pub use alert::AlertPopup;
pub use step_view::StepView;
pub use title_bar::TitleBar;
