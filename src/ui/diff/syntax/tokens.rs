//! Scope categories, overlap resolution and per-character coloring.

use crate::ui::diff::render::types::Color;
use crate::ui::diff::theme::Palette;
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeCategory {
    Comment,
    String,
    Keyword,
    Function,
    Type,
    Number,
    Variable,
}

impl ScopeCategory {
    /// Higher wins when tokens overlap.
    pub fn priority(self) -> u8 {
        match self {
            ScopeCategory::Comment => 7,
            ScopeCategory::String => 6,
            ScopeCategory::Keyword => 5,
            ScopeCategory::Function => 4,
            ScopeCategory::Type => 3,
            ScopeCategory::Number => 2,
            ScopeCategory::Variable => 1,
        }
    }

    /// Category of a dotted TextMate scope name such as
    /// `comment.line.double-slash.rust`.
    pub fn from_scope(scope: &str) -> Option<Self> {
        const RULES: &[(&str, ScopeCategory)] = &[
            ("comment", ScopeCategory::Comment),
            ("punctuation.definition.comment", ScopeCategory::Comment),
            ("string", ScopeCategory::String),
            ("punctuation.definition.string", ScopeCategory::String),
            ("constant.character.escape", ScopeCategory::String),
            ("keyword", ScopeCategory::Keyword),
            ("storage", ScopeCategory::Keyword),
            ("constant.language", ScopeCategory::Keyword),
            ("variable.language", ScopeCategory::Keyword),
            ("entity.name.function", ScopeCategory::Function),
            ("support.function", ScopeCategory::Function),
            ("variable.function", ScopeCategory::Function),
            ("meta.function-call.identifier", ScopeCategory::Function),
            ("entity.name.type", ScopeCategory::Type),
            ("entity.name.class", ScopeCategory::Type),
            ("entity.name.struct", ScopeCategory::Type),
            ("entity.name.enum", ScopeCategory::Type),
            ("entity.name.trait", ScopeCategory::Type),
            ("entity.other.inherited-class", ScopeCategory::Type),
            ("support.type", ScopeCategory::Type),
            ("support.class", ScopeCategory::Type),
            ("constant.numeric", ScopeCategory::Number),
            ("variable", ScopeCategory::Variable),
        ];

        RULES
            .iter()
            .find(|(prefix, _)| scope_has_prefix(scope, prefix))
            .map(|(_, category)| *category)
    }
}

fn scope_has_prefix(scope: &str, prefix: &str) -> bool {
    match scope.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// A categorized span of one line, in character indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledToken {
    pub range: Range<usize>,
    pub category: ScopeCategory,
}

impl StyledToken {
    pub fn new(range: Range<usize>, category: ScopeCategory) -> Self {
        Self { range, category }
    }

    fn len(&self) -> usize {
        self.range.end.saturating_sub(self.range.start)
    }
}

fn overlap(a: &Range<usize>, b: &Range<usize>) -> usize {
    a.end.min(b.end).saturating_sub(a.start.max(b.start))
}

/// Drop tokens that lose an overlap. Candidates are visited from highest
/// priority down (longer first on ties); a candidate is dropped when an
/// already kept token covers more than `threshold` of its own length.
///
/// The survivors come back in paint order: ascending priority, so higher
/// priority scopes are written last.
pub fn resolve_overlaps(mut tokens: Vec<StyledToken>, threshold: f32) -> Vec<StyledToken> {
    tokens.retain(|t| t.len() > 0);
    tokens.sort_by(|a, b| {
        b.category
            .priority()
            .cmp(&a.category.priority())
            .then(b.len().cmp(&a.len()))
            .then(a.range.start.cmp(&b.range.start))
    });

    let mut kept: Vec<StyledToken> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let limit = threshold * token.len() as f32;
        let loses = kept
            .iter()
            .any(|winner| overlap(&winner.range, &token.range) as f32 > limit);
        if !loses {
            kept.push(token);
        }
    }

    kept.reverse();
    kept
}

/// Per-character colors for a line of `char_len` characters. Characters no
/// token covers get the palette's default text color.
pub fn paint_colors(tokens: &[StyledToken], char_len: usize, palette: &Palette) -> Vec<Color> {
    let mut colors = vec![palette.text_default; char_len];
    for token in tokens {
        let start = token.range.start.min(char_len);
        let end = token.range.end.min(char_len);
        let color = palette.scope_color(token.category);
        for slot in &mut colors[start..end] {
            *slot = color;
        }
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_dotted_scopes() {
        assert_eq!(
            ScopeCategory::from_scope("comment.line.double-slash.rust"),
            Some(ScopeCategory::Comment)
        );
        assert_eq!(
            ScopeCategory::from_scope("entity.name.function.rust"),
            Some(ScopeCategory::Function)
        );
        assert_eq!(
            ScopeCategory::from_scope("constant.numeric.integer.decimal"),
            Some(ScopeCategory::Number)
        );
        assert_eq!(ScopeCategory::from_scope("source.rust"), None);
        // Prefix must end on a segment boundary.
        assert_eq!(ScopeCategory::from_scope("stringly.typed"), None);
    }

    #[test]
    fn priority_order() {
        use ScopeCategory::*;
        let order = [Comment, String, Keyword, Function, Type, Number, Variable];
        for pair in order.windows(2) {
            assert!(pair[0].priority() > pair[1].priority());
        }
    }

    #[test]
    fn keyword_around_string_keeps_both() {
        let tokens = vec![
            StyledToken::new(0..10, ScopeCategory::Keyword),
            StyledToken::new(3..8, ScopeCategory::String),
        ];
        let resolved = resolve_overlaps(tokens, 0.5);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].category, ScopeCategory::Keyword);
        assert_eq!(resolved[1].category, ScopeCategory::String);

        let palette = Palette::dark();
        let colors = paint_colors(&resolved, 10, &palette);
        for (i, color) in colors.iter().enumerate() {
            let expected = if (3..8).contains(&i) {
                palette.syntax_string
            } else {
                palette.syntax_keyword
            };
            assert_eq!(*color, expected, "index {i}");
        }
    }

    #[test]
    fn lower_priority_token_mostly_covered_is_dropped() {
        let tokens = vec![
            StyledToken::new(0..4, ScopeCategory::Keyword),
            StyledToken::new(0..10, ScopeCategory::Comment),
        ];
        let resolved = resolve_overlaps(tokens, 0.5);
        assert_eq!(resolved, vec![StyledToken::new(0..10, ScopeCategory::Comment)]);
    }

    #[test]
    fn equal_priority_prefers_longer_span() {
        let tokens = vec![
            StyledToken::new(2..5, ScopeCategory::Type),
            StyledToken::new(0..8, ScopeCategory::Type),
        ];
        let resolved = resolve_overlaps(tokens, 0.5);
        assert_eq!(resolved, vec![StyledToken::new(0..8, ScopeCategory::Type)]);
    }

    #[test]
    fn empty_tokens_are_ignored() {
        let resolved = resolve_overlaps(vec![StyledToken::new(3..3, ScopeCategory::Number)], 0.5);
        assert!(resolved.is_empty());
    }

    #[test]
    fn paint_clamps_to_line_length() {
        let palette = Palette::light();
        let tokens = vec![StyledToken::new(2..40, ScopeCategory::Number)];
        let colors = paint_colors(&tokens, 4, &palette);
        assert_eq!(
            colors,
            vec![
                palette.text_default,
                palette.text_default,
                palette.syntax_number,
                palette.syntax_number
            ]
        );
    }
}
