//! Diff view palettes.
//!
//! Colors are picked per appearance. Syntax colors follow the Catppuccin
//! Mocha (dark) and Latte (light) accents.

use super::render::types::Color;
use super::syntax::ScopeCategory;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub is_dark: bool,

    pub text_default: Color,
    pub text_muted: Color,

    pub added_bg: Color,
    pub removed_bg: Color,
    pub added_change_bg: Color,
    pub removed_change_bg: Color,
    pub selection_bg: Color,

    pub header_bg: Color,
    pub header_border: Color,
    pub header_text: Color,
    pub stat_added: Color,
    pub stat_removed: Color,

    pub gutter_bg: Color,
    pub gutter_text: Color,

    pub syntax_comment: Color,
    pub syntax_string: Color,
    pub syntax_keyword: Color,
    pub syntax_function: Color,
    pub syntax_type: Color,
    pub syntax_number: Color,
    pub syntax_variable: Color,
}

impl Palette {
    pub fn dark() -> Self {
        let green = Color::from_rgb(166, 227, 161);
        let red = Color::from_rgb(243, 139, 168);
        Self {
            is_dark: true,

            text_default: Color::from_rgb(230, 233, 239),
            text_muted: Color::from_rgb(127, 132, 156),

            added_bg: green.with_alpha(0.08),
            removed_bg: red.with_alpha(0.08),
            added_change_bg: green.with_alpha(0.25),
            removed_change_bg: red.with_alpha(0.25),
            selection_bg: Color::from_rgb(137, 180, 250).with_alpha(0.30),

            header_bg: Color::from_rgb(49, 50, 68),
            header_border: Color::from_rgb(69, 71, 90),
            header_text: Color::from_rgb(205, 214, 244),
            stat_added: green,
            stat_removed: red,

            gutter_bg: Color::from_rgb(24, 24, 37),
            gutter_text: Color::from_rgb(108, 112, 134),

            syntax_comment: Color::from_rgb(127, 132, 156),
            syntax_string: green,
            syntax_keyword: Color::from_rgb(203, 166, 247),
            syntax_function: Color::from_rgb(137, 180, 250),
            syntax_type: Color::from_rgb(249, 226, 175),
            syntax_number: Color::from_rgb(250, 179, 135),
            syntax_variable: Color::from_rgb(205, 214, 244),
        }
    }

    pub fn light() -> Self {
        let green = Color::from_rgb(64, 160, 43);
        let red = Color::from_rgb(210, 15, 57);
        Self {
            is_dark: false,

            text_default: Color::from_rgb(76, 79, 105),
            text_muted: Color::from_rgb(140, 143, 161),

            added_bg: green.with_alpha(0.10),
            removed_bg: red.with_alpha(0.10),
            added_change_bg: green.with_alpha(0.28),
            removed_change_bg: red.with_alpha(0.28),
            selection_bg: Color::from_rgb(30, 102, 245).with_alpha(0.22),

            header_bg: Color::from_rgb(230, 233, 239),
            header_border: Color::from_rgb(204, 208, 218),
            header_text: Color::from_rgb(76, 79, 105),
            stat_added: green,
            stat_removed: red,

            gutter_bg: Color::from_rgb(239, 241, 245),
            gutter_text: Color::from_rgb(156, 160, 176),

            syntax_comment: Color::from_rgb(140, 143, 161),
            syntax_string: green,
            syntax_keyword: Color::from_rgb(136, 57, 239),
            syntax_function: Color::from_rgb(30, 102, 245),
            syntax_type: Color::from_rgb(223, 142, 29),
            syntax_number: Color::from_rgb(254, 100, 11),
            syntax_variable: Color::from_rgb(76, 79, 105),
        }
    }

    pub fn for_mode(is_dark: bool) -> Self {
        if is_dark { Self::dark() } else { Self::light() }
    }

    pub fn scope_color(&self, category: ScopeCategory) -> Color {
        match category {
            ScopeCategory::Comment => self.syntax_comment,
            ScopeCategory::String => self.syntax_string,
            ScopeCategory::Keyword => self.syntax_keyword,
            ScopeCategory::Function => self.syntax_function,
            ScopeCategory::Type => self.syntax_type,
            ScopeCategory::Number => self.syntax_number,
            ScopeCategory::Variable => self.syntax_variable,
        }
    }
}
