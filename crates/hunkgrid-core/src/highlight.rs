//! Syntax highlighting for row content (syntect-backed)
//!
//! The engine only needs `(content, language) -> markup`. Markup is HTML:
//! class-annotated `<span>`s from syntect, or escaped plain text.

use rustc_hash::FxHashMap;
use std::sync::Mutex;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};

/// Turns one line of source into marked-up text.
///
/// Implementations must be pure: the same input always yields the same
/// output, which is what makes [`CachedHighlighter`] valid. They never fail;
/// on any internal error they return the input escaped as plain text.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, content: &str, language: &str) -> String;
}

/// Escape text for use as markup
pub fn escape(content: &str) -> String {
    html_escape::encode_text(content).into_owned()
}

/// Escapes content without adding any styling
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, content: &str, _language: &str) -> String {
        escape(content)
    }
}

/// Highlighter producing class-annotated HTML spans
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn syntax_for(&self, language: &str) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn try_highlight(&self, content: &str, language: &str) -> Result<String, syntect::Error> {
        let syntax = self.syntax_for(language);
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, ClassStyle::Spaced);
        // The newline syntaxes expect every line to end with '\n'
        let mut line = String::with_capacity(content.len() + 1);
        line.push_str(content);
        line.push('\n');
        generator.parse_html_for_line_which_includes_newline(&line)?;
        Ok(generator.finalize().replace('\n', ""))
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, content: &str, language: &str) -> String {
        match self.try_highlight(content, language) {
            Ok(html) => html,
            Err(err) => {
                log::warn!("Highlighting failed for {} content: {}", language, err);
                escape(content)
            }
        }
    }
}

/// Memoizes another highlighter by (language, content)
pub struct CachedHighlighter<H> {
    inner: H,
    cache: Mutex<FxHashMap<(String, String), String>>,
}

impl<H: Highlighter> CachedHighlighter<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H: Highlighter> Highlighter for CachedHighlighter<H> {
    fn highlight(&self, content: &str, language: &str) -> String {
        let key = (language.to_string(), content.to_string());
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
        }
        let html = self.inner.highlight(content, language);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, html.clone());
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_plain_escapes() {
        assert_eq!(
            PlainHighlighter.highlight("if a < b && c > d", "rs"),
            "if a &lt; b &amp;&amp; c &gt; d"
        );
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape("<a href='x'>&"), "&lt;a href='x'&gt;&amp;");
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn test_syntect_marks_up_keywords() {
        let highlighter = SyntectHighlighter::new();
        let html = highlighter.highlight("fn main() {}", "rs");
        assert!(html.contains("<span"), "expected spans in {}", html);
        assert!(html.contains("main"));
        assert!(!html.contains('\n'));
    }

    #[test]
    fn test_syntect_unknown_language_is_plain() {
        let highlighter = SyntectHighlighter::new();
        let html = highlighter.highlight("a < b", "no-such-language");
        assert!(html.contains("a &lt; b"), "unexpected markup {}", html);
    }

    struct Counting(AtomicUsize);

    impl Highlighter for Counting {
        fn highlight(&self, content: &str, _language: &str) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            content.to_uppercase()
        }
    }

    #[test]
    fn test_cache_hits() {
        let cached = CachedHighlighter::new(Counting(AtomicUsize::new(0)));
        assert!(cached.is_empty());
        assert_eq!(cached.highlight("abc", "txt"), "ABC");
        assert_eq!(cached.highlight("abc", "txt"), "ABC");
        assert_eq!(cached.highlight("abc", "rs"), "ABC");
        assert_eq!(cached.inner.0.load(Ordering::SeqCst), 2);
        assert_eq!(cached.len(), 2);
    }
}
