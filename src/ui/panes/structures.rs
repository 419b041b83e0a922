//! Structure bag pane rendering

use crate::structures::{Structure, StructureBody, Structures, SymbolSet};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

fn set_text(set: &SymbolSet) -> String {
    let items: Vec<&str> = set.items().collect();
    format!("{{ {} }}", items.join(", "))
}

fn structure_lines(structure: &Structure, lines: &mut Vec<Line<'static>>) {
    let title_style = match DEFAULT_THEME.tag_color(structure.tag()) {
        Some(color) => Style::default().fg(color),
        None => Style::default().fg(DEFAULT_THEME.primary),
    }
    .add_modifier(Modifier::BOLD);
    let detail = Style::default().fg(DEFAULT_THEME.comment);

    match structure.body() {
        StructureBody::SymbolSet(set) => {
            lines.push(Line::from(vec![
                Span::styled(format!("{} = ", structure.name()), title_style),
                Span::styled(set_text(set), Style::default().fg(DEFAULT_THEME.fg)),
            ]));
        }
        StructureBody::Table(table) => {
            lines.push(Line::styled(structure.name().to_string(), title_style));
            let columns: Vec<(&str, &str)> = table.columns().collect();
            for (row_id, row_name) in table.rows() {
                let mut spans = vec![Span::styled(format!("  {:<8}", row_name), detail)];
                for (column_id, column_name) in &columns {
                    let cell = table
                        .cell(row_id, column_id)
                        .map(set_text)
                        .unwrap_or_default();
                    spans.push(Span::styled(format!("{}: ", column_name), detail));
                    spans.push(Span::styled(
                        format!("{}  ", cell),
                        Style::default().fg(DEFAULT_THEME.fg),
                    ));
                }
                lines.push(Line::from(spans));
            }
        }
        StructureBody::SymbolMapping(mapping) => {
            lines.push(Line::styled(structure.name().to_string(), title_style));
            for (from, to) in mapping.pairs() {
                lines.push(Line::styled(format!("  {} ↦ {}", from, to), detail));
            }
        }
        StructureBody::Stack(stack) => {
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", structure.name()), title_style),
                Span::styled(
                    format!("[{}⟩", stack.items().join(" ")),
                    Style::default().fg(DEFAULT_THEME.fg),
                ),
            ]));
        }
    }
}

/// Render the structures pane
pub fn render_structures_pane(
    frame: &mut Frame,
    area: Rect,
    structures: Option<&Structures>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Structures ")
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    let structures = match structures {
        Some(structures) if !structures.is_empty() => structures,
        _ => {
            let paragraph = Paragraph::new("(no structures)")
                .block(block)
                .style(Style::default().fg(DEFAULT_THEME.comment));
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let mut lines = Vec::new();
    for structure in structures.iter() {
        structure_lines(structure, &mut lines);
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = (*scroll_offset).min(lines.len().saturating_sub(visible_height));

    let paragraph = Paragraph::new(lines)
        .block(block.padding(Padding::new(1, 0, 0, 0)))
        .scroll((*scroll_offset as u16, 0));
    frame.render_widget(paragraph, area);
}
