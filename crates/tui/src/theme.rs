use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub selection_bg: Color,
    pub favorite: Color,
    pub danger: Color,
    pub backdrop: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            favorite: Color::Yellow,
            danger: Color::Red,
            backdrop: Color::Black,
        }
    }
}
