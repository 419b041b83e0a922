//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`timeline`]: executed steps in order, indented by nesting depth
//! - [`grammar`]: the active step's grammar, coloured by decay tag
//! - [`structures`]: the active step's structure bag
//! - [`status`]: status bar with position, breadcrumbs and keybindings
//!
//! Each pane module exports a primary `render_*_pane()` function (the status
//! bar exports `render_status_bar()`). Panes are stateless apart from the
//! scroll offset they are handed.

pub mod grammar;
pub mod status;
pub mod structures;
pub mod timeline;

pub use grammar::render_grammar_pane;
pub use status::render_status_bar;
pub use structures::render_structures_pane;
pub use timeline::render_timeline_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}
