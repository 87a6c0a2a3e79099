//! Filename extension to language tag lookup.

use std::path::Path;

/// Extension -> language tag. The first extension listed for a tag is its
/// canonical one.
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("pyi", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("go", "go"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hh", "cpp"),
    ("cs", "csharp"),
    ("m", "objective-c"),
    ("swift", "swift"),
    ("rb", "ruby"),
    ("php", "php"),
    ("pl", "perl"),
    ("lua", "lua"),
    ("hs", "haskell"),
    ("ml", "ocaml"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("clj", "clojure"),
    ("dart", "dart"),
    ("r", "r"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("sql", "sql"),
    ("html", "html"),
    ("htm", "html"),
    ("xml", "xml"),
    ("css", "css"),
    ("scss", "scss"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("vue", "vue"),
];

/// Language tag for a path, from its extension.
pub fn detect_language(file_path: &str) -> Option<&'static str> {
    let ext = Path::new(file_path).extension()?.to_str()?;
    let ext = ext.to_ascii_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, tag)| *tag)
}

/// The explicit language wins; otherwise the filename decides.
pub fn resolve_language(explicit: Option<&str>, filename: Option<&str>) -> Option<String> {
    explicit
        .filter(|lang| !lang.trim().is_empty())
        .map(|lang| lang.trim().to_ascii_lowercase())
        .or_else(|| filename.and_then(detect_language).map(str::to_string))
}

/// Canonical extension for a tag, used to look the grammar up by extension.
pub fn canonical_extension(tag: &str) -> Option<&'static str> {
    EXTENSION_TABLE
        .iter()
        .find(|(_, candidate)| *candidate == tag)
        .map(|(ext, _)| *ext)
}

pub fn is_known_language(tag: &str) -> bool {
    canonical_extension(tag).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language_by_extension() {
        assert_eq!(detect_language("src/main.rs"), Some("rust"));
        assert_eq!(detect_language("component.TSX"), Some("typescript"));
        assert_eq!(detect_language("Makefile"), None);
        assert_eq!(detect_language("archive.unknownext"), None);
    }

    #[test]
    fn test_explicit_language_wins() {
        assert_eq!(
            resolve_language(Some("Python"), Some("main.rs")).as_deref(),
            Some("python")
        );
        assert_eq!(
            resolve_language(None, Some("main.rs")).as_deref(),
            Some("rust")
        );
        assert_eq!(resolve_language(Some("  "), Some("a.go")).as_deref(), Some("go"));
        assert_eq!(resolve_language(None, None), None);
    }

    #[test]
    fn test_canonical_extension() {
        assert_eq!(canonical_extension("cpp"), Some("cpp"));
        assert_eq!(canonical_extension("shell"), Some("sh"));
        assert!(!is_known_language("klingon"));
    }
}
