//! Step list rendering
//!
//! One row per executed step, in execution order, indented by depth. The
//! active step is highlighted and kept in view.

use crate::replay::Entry;
use crate::timeline::NodeId;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding},
    Frame,
};

/// Render the timeline pane
pub fn render_timeline_pane(
    frame: &mut Frame,
    area: Rect,
    entries: &[Entry],
    active: NodeId,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Steps ")
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused))
        .padding(Padding::new(1, 0, 0, 0));

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders

    // Keep the active step inside the visible window
    if let Some(position) = entries.iter().position(|entry| entry.id == active) {
        if position < *scroll_offset {
            *scroll_offset = position;
        } else if position >= *scroll_offset + visible_height {
            *scroll_offset = position + 1 - visible_height;
        }
    }
    *scroll_offset = (*scroll_offset).min(entries.len().saturating_sub(visible_height));

    let items: Vec<ListItem> = entries
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|entry| {
            let is_active = entry.id == active;
            let indent = "  ".repeat(entry.depth.saturating_sub(1));
            let marker = if is_active { "▶ " } else { "  " };
            let mut line = Line::from(vec![
                Span::raw(format!("{}{}", marker, indent)),
                Span::styled(
                    format!("{} ", entry.label),
                    Style::default().fg(DEFAULT_THEME.label),
                ),
                Span::styled(entry.name.clone(), Style::default().fg(DEFAULT_THEME.fg)),
            ]);
            if is_active {
                line = line.style(
                    Style::default()
                        .bg(DEFAULT_THEME.current_line_bg)
                        .add_modifier(Modifier::BOLD),
                );
            }
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
