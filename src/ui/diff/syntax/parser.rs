//! Document highlighting: syntect grammars first, keyword regexes second.
//!
//! A document is highlighted in one pass so block comments and multi-line
//! strings carry their state from line to line.

use super::tokens::{ScopeCategory, StyledToken, resolve_overlaps};
use crate::domain::HighlightError;
use crate::infra::diff::language::{canonical_extension, is_known_language};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use syntect::easy::ScopeRangeIterator;
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Lines longer than this (in bytes) are left uncolored.
const MAX_LINE_LENGTH: usize = 2000;

/// Per-line tokens for `text`, in paint order.
pub fn highlight(text: &str, language: &str, overlap_threshold: f32) -> Vec<Vec<StyledToken>> {
    let lines: Vec<Arc<str>> = text.lines().map(Arc::from).collect();
    highlight_document(&lines, language, overlap_threshold)
}

/// Tokens for each line of a document. Never fails: a grammar error or an
/// empty structural result falls back to keyword regexes, and languages
/// with neither get no tokens.
pub fn highlight_document(
    lines: &[Arc<str>],
    language: &str,
    overlap_threshold: f32,
) -> Vec<Vec<StyledToken>> {
    let raw = match structural_tokens(lines, language) {
        Ok(tokens) if tokens.iter().any(|line| !line.is_empty()) => tokens,
        Ok(_) => fallback_tokens(lines, language),
        Err(err) => {
            log::debug!(target: "syntax", "structural highlighting unavailable: {err}");
            fallback_tokens(lines, language)
        }
    };

    raw.into_iter()
        .map(|tokens| resolve_overlaps(tokens, overlap_threshold))
        .collect()
}

pub fn has_grammar(language: &str) -> bool {
    find_syntax(language).is_some()
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    canonical_extension(language)
        .and_then(|ext| SYNTAX_SET.find_syntax_by_extension(ext))
        .or_else(|| SYNTAX_SET.find_syntax_by_token(language))
}

fn structural_tokens(
    lines: &[Arc<str>],
    language: &str,
) -> Result<Vec<Vec<StyledToken>>, HighlightError> {
    let syntax =
        find_syntax(language).ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;

    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut out = Vec::with_capacity(lines.len());
    let mut buf = String::new();

    for line in lines {
        if line.len() > MAX_LINE_LENGTH {
            out.push(Vec::new());
            continue;
        }
        buf.clear();
        buf.push_str(line);
        buf.push('\n');

        let ops = state.parse_line(&buf, &SYNTAX_SET)?;
        let mut tokens: Vec<StyledToken> = Vec::new();
        let mut char_cursor = 0usize;

        for (range, op) in ScopeRangeIterator::new(&ops, &buf) {
            stack.apply(op)?;
            let end = range.end.min(line.len());
            if range.start >= end {
                continue;
            }
            let start_char = char_cursor;
            char_cursor += line[range.start..end].chars().count();

            if let Some(category) = categorize(&stack) {
                push_token(&mut tokens, start_char..char_cursor, category);
            }
        }
        out.push(tokens);
    }

    Ok(out)
}

/// Innermost scope with a known category decides.
fn categorize(stack: &ScopeStack) -> Option<ScopeCategory> {
    stack
        .as_slice()
        .iter()
        .rev()
        .find_map(|scope| ScopeCategory::from_scope(&scope.build_string()))
}

/// Appends, extending the previous token when it is adjacent and of the
/// same category.
fn push_token(tokens: &mut Vec<StyledToken>, range: std::ops::Range<usize>, category: ScopeCategory) {
    if let Some(last) = tokens.last_mut()
        && last.category == category
        && last.range.end == range.start
    {
        last.range.end = range.end;
        return;
    }
    tokens.push(StyledToken::new(range, category));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentStyle {
    Slash,
    Hash,
    Dash,
}

struct FallbackRules {
    comment: CommentStyle,
    keywords: Option<Regex>,
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
];
const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "False", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "None", "nonlocal", "not", "or", "pass", "raise", "return", "True", "try", "while",
    "with", "yield",
];
const JS_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "from", "function", "if",
    "import", "in", "instanceof", "interface", "let", "new", "null", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "type", "typeof", "undefined", "var", "void",
    "while", "yield",
];
const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "false", "for", "func", "go", "goto", "if", "import", "interface", "map", "nil", "package",
    "range", "return", "select", "struct", "switch", "true", "type", "var",
];
const C_FAMILY_KEYWORDS: &[&str] = &[
    "abstract", "auto", "bool", "break", "case", "catch", "char", "class", "const", "continue",
    "default", "delete", "do", "double", "else", "enum", "extends", "extern", "false", "final",
    "float", "for", "fun", "func", "goto", "if", "implements", "import", "int", "interface",
    "let", "long", "namespace", "new", "null", "override", "package", "private", "protected",
    "public", "return", "short", "signed", "static", "struct", "super", "switch", "template",
    "this", "throw", "true", "try", "typedef", "unsigned", "using", "val", "var", "virtual",
    "void", "volatile", "when", "while",
];
const RUBY_KEYWORDS: &[&str] = &[
    "begin", "break", "case", "class", "def", "do", "else", "elsif", "end", "ensure", "false",
    "for", "if", "in", "module", "next", "nil", "not", "or", "and", "redo", "rescue", "retry",
    "return", "self", "super", "then", "true", "unless", "until", "when", "while", "yield",
];
const SHELL_KEYWORDS: &[&str] = &[
    "case", "do", "done", "elif", "else", "esac", "export", "fi", "for", "function", "if", "in",
    "local", "return", "then", "until", "while",
];
const SQL_KEYWORDS: &[&str] = &[
    "ALTER", "AND", "AS", "BY", "CREATE", "DELETE", "DROP", "FROM", "GROUP", "INSERT", "INTO",
    "JOIN", "LEFT", "LIMIT", "NOT", "NULL", "ON", "OR", "ORDER", "SELECT", "SET", "TABLE",
    "UPDATE", "VALUES", "WHERE", "alter", "and", "as", "by", "create", "delete", "drop", "from",
    "group", "insert", "into", "join", "left", "limit", "not", "null", "on", "or", "order",
    "select", "set", "table", "update", "values", "where",
];
const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

static FALLBACK_RULES: Lazy<HashMap<&'static str, FallbackRules>> = Lazy::new(|| {
    let table: &[(&str, CommentStyle, &[&str])] = &[
        ("rust", CommentStyle::Slash, RUST_KEYWORDS),
        ("python", CommentStyle::Hash, PYTHON_KEYWORDS),
        ("javascript", CommentStyle::Slash, JS_KEYWORDS),
        ("typescript", CommentStyle::Slash, JS_KEYWORDS),
        ("vue", CommentStyle::Slash, JS_KEYWORDS),
        ("go", CommentStyle::Slash, GO_KEYWORDS),
        ("java", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("kotlin", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("scala", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("c", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("cpp", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("csharp", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("objective-c", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("swift", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("dart", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("php", CommentStyle::Slash, C_FAMILY_KEYWORDS),
        ("ruby", CommentStyle::Hash, RUBY_KEYWORDS),
        ("elixir", CommentStyle::Hash, RUBY_KEYWORDS),
        ("perl", CommentStyle::Hash, SHELL_KEYWORDS),
        ("shell", CommentStyle::Hash, SHELL_KEYWORDS),
        ("r", CommentStyle::Hash, &[]),
        ("yaml", CommentStyle::Hash, &["true", "false", "null"]),
        ("toml", CommentStyle::Hash, &["true", "false"]),
        ("sql", CommentStyle::Dash, SQL_KEYWORDS),
        ("lua", CommentStyle::Dash, LUA_KEYWORDS),
        ("haskell", CommentStyle::Dash, &[]),
    ];

    let mut rules = HashMap::new();
    for (tag, comment, words) in table {
        let keywords = (!words.is_empty()).then(|| keyword_regex(words)).flatten();
        rules.insert(
            *tag,
            FallbackRules {
                comment: *comment,
                keywords,
            },
        );
    }
    rules
});

fn keyword_regex(words: &[&str]) -> Option<Regex> {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    compile_pattern("keyword", &format!(r"\b(?:{alternation})\b"))
}

/// A rejected pattern disables that token class instead of failing the parse.
fn compile_pattern(what: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!(target: "syntax", "{what} pattern rejected: {err}");
            None
        }
    }
}

static STRING_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile_pattern("string", r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|`[^`]*`"#)
});
static NUMBER_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile_pattern(
        "number",
        r"\b(?:0[xX][0-9a-fA-F_]+|\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?)\b",
    )
});
static FUNCTION_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern("function", r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\("));
static TYPE_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern("type", r"\b[A-Z][A-Za-z0-9_]*\b"));
static SLASH_COMMENT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern("comment", r"//.*$|/\*.*?(?:\*/|$)"));
static HASH_COMMENT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern("comment", r"(?:^|\s)(#.*)$"));
static DASH_COMMENT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern("comment", r"--.*$"));

fn fallback_tokens(lines: &[Arc<str>], language: &str) -> Vec<Vec<StyledToken>> {
    let rules = FALLBACK_RULES.get(language);
    if rules.is_none() && !is_known_language(language) {
        return vec![Vec::new(); lines.len()];
    }
    lines
        .iter()
        .map(|line| {
            if line.len() > MAX_LINE_LENGTH {
                Vec::new()
            } else {
                fallback_line(line, rules)
            }
        })
        .collect()
}

/// Single-line keyword highlighting. Candidates overlap freely; the
/// priority merge sorts them out.
fn fallback_line(line: &str, rules: Option<&FallbackRules>) -> Vec<StyledToken> {
    let chars = byte_to_char_map(line);
    let to_chars = |range: std::ops::Range<usize>| chars[range.start]..chars[range.end];
    let mut tokens = Vec::new();

    let comment_re = match rules.map(|r| r.comment) {
        Some(CommentStyle::Slash) => SLASH_COMMENT_RE.as_ref(),
        Some(CommentStyle::Hash) => HASH_COMMENT_RE.as_ref(),
        Some(CommentStyle::Dash) => DASH_COMMENT_RE.as_ref(),
        None => None,
    };
    if let Some(re) = comment_re {
        for caps in re.captures_iter(line) {
            if let Some(m) = caps.get(1).or_else(|| caps.get(0)) {
                tokens.push(StyledToken::new(to_chars(m.range()), ScopeCategory::Comment));
            }
        }
    }

    if let Some(re) = STRING_RE.as_ref() {
        for m in re.find_iter(line) {
            tokens.push(StyledToken::new(to_chars(m.range()), ScopeCategory::String));
        }
    }

    if let Some(re) = rules.and_then(|r| r.keywords.as_ref()) {
        for m in re.find_iter(line) {
            tokens.push(StyledToken::new(to_chars(m.range()), ScopeCategory::Keyword));
        }
    }

    if rules.is_some() {
        if let Some(re) = FUNCTION_RE.as_ref() {
            for caps in re.captures_iter(line) {
                if let Some(m) = caps.get(1) {
                    tokens.push(StyledToken::new(to_chars(m.range()), ScopeCategory::Function));
                }
            }
        }
        if let Some(re) = TYPE_RE.as_ref() {
            for m in re.find_iter(line) {
                tokens.push(StyledToken::new(to_chars(m.range()), ScopeCategory::Type));
            }
        }
    }

    if let Some(re) = NUMBER_RE.as_ref() {
        for m in re.find_iter(line) {
            tokens.push(StyledToken::new(to_chars(m.range()), ScopeCategory::Number));
        }
    }

    tokens
}

/// `map[byte] == char index`, with one extra slot for `line.len()`.
fn byte_to_char_map(line: &str) -> Vec<usize> {
    let mut map = vec![0; line.len() + 1];
    let mut char_index = 0;
    for (byte, ch) in line.char_indices() {
        for slot in &mut map[byte..byte + ch.len_utf8()] {
            *slot = char_index;
        }
        char_index += 1;
    }
    map[line.len()] = char_index;
    map
}
