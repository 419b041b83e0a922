//! Grammar pane rendering
//!
//! Shows the grammar as the active step left it. Every symbol and rule is
//! coloured by its decay tag, so the changes a step made stand out.

use crate::decay::DecayTag;
use crate::grammar::{Grammar, Symbol};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

fn tag_style(tag: DecayTag, base: Style) -> Style {
    let style = match DEFAULT_THEME.tag_color(tag) {
        Some(color) => base.fg(color),
        None => base,
    };
    if tag == DecayTag::Removed {
        style.add_modifier(Modifier::CROSSED_OUT)
    } else {
        style
    }
}

fn symbol_span(symbol: &Symbol) -> Span<'static> {
    let base = if symbol.is_nonterminal() {
        Style::default().fg(DEFAULT_THEME.nonterminal)
    } else {
        Style::default().fg(DEFAULT_THEME.terminal)
    };
    Span::styled(symbol.name().to_string(), tag_style(symbol.tag(), base))
}

fn symbol_line<'a>(title: &str, symbols: impl Iterator<Item = &'a Symbol>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{:<14}", title),
        Style::default().fg(DEFAULT_THEME.comment),
    )];
    for symbol in symbols {
        spans.push(symbol_span(symbol));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Build display lines for a grammar
pub fn grammar_lines(grammar: &Grammar) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{:<14}", "Start"),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
            Span::styled(
                grammar.start().to_string(),
                Style::default()
                    .fg(DEFAULT_THEME.nonterminal)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        symbol_line("Nonterminals", grammar.nonterminals()),
        symbol_line("Terminals", grammar.terminals()),
        Line::raw(""),
    ];

    // One line per left side: "A -> x | y"
    let mut current: Option<&str> = None;
    let mut spans: Vec<Span<'static>> = Vec::new();
    for rule in grammar.rules() {
        if current != Some(rule.left()) {
            if !spans.is_empty() {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            current = Some(rule.left());
            let left_tag = grammar
                .symbol(rule.left())
                .map(Symbol::tag)
                .unwrap_or_default();
            spans.push(Span::styled(
                rule.left().to_string(),
                tag_style(left_tag, Style::default().fg(DEFAULT_THEME.nonterminal)),
            ));
            spans.push(Span::styled(" → ", Style::default().fg(DEFAULT_THEME.comment)));
        } else {
            spans.push(Span::styled(" | ", Style::default().fg(DEFAULT_THEME.comment)));
        }
        spans.push(Span::styled(
            rule.right().to_string(),
            tag_style(rule.tag(), Style::default().fg(DEFAULT_THEME.fg)),
        ));
    }
    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

/// Render the grammar pane
pub fn render_grammar_pane(
    frame: &mut Frame,
    area: Rect,
    grammar: Option<&Grammar>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Grammar ")
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    let Some(grammar) = grammar else {
        let paragraph = Paragraph::new("(no state recorded)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let lines = grammar_lines(grammar);
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = (*scroll_offset).min(lines.len().saturating_sub(visible_height));

    let paragraph = Paragraph::new(lines)
        .block(block.padding(Padding::new(1, 0, 0, 0)))
        .scroll((*scroll_offset as u16, 0));
    frame.render_widget(paragraph, area);
}
