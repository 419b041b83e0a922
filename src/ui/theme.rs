use crate::decay::DecayTag;
use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub label: Color,
    pub nonterminal: Color,
    pub terminal: Color,
    pub attention: Color,  // Yellow
    pub special: Color,    // Pink
    pub transferred: Color, // Muted yellow
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for the active step
    label: Color::Rgb(148, 226, 213),          // Cyan/teal for step labels
    nonterminal: Color::Rgb(137, 180, 250),
    terminal: Color::Rgb(205, 214, 244),
    attention: Color::Rgb(249, 226, 175),
    special: Color::Rgb(245, 194, 231),
    transferred: Color::Rgb(180, 165, 120),
};

impl Theme {
    /// Foreground for an entity carrying `tag`, `None` keeps the default
    pub fn tag_color(&self, tag: DecayTag) -> Option<Color> {
        match tag {
            DecayTag::None => None,
            DecayTag::New => Some(self.success),
            DecayTag::Duplicate => Some(self.secondary),
            DecayTag::Removed => Some(self.error),
            DecayTag::Replaced => Some(self.secondary),
            DecayTag::AttentionNow
            | DecayTag::AttentionPersistent
            | DecayTag::AttentionWillTransfer => Some(self.attention),
            DecayTag::AttentionWasSet => Some(self.transferred),
            DecayTag::SpecialPersistent | DecayTag::SpecialTemporary => Some(self.special),
        }
    }
}
