//! Span-based text rewriting.
//!
//! Renderers run between discovery and substitution, so the passes cannot
//! use `Regex::replace_all` with a closure directly: the closure would have
//! to await a child process. Instead each pass records `(span, replacement)`
//! pairs and [`splice`] rebuilds the document once from the untouched gaps
//! and the replacements, in order.

use crate::error::Md2DocxError;
use std::ops::Range;

/// Replace `span` of the original text with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub span: Range<usize>,
    pub text: String,
}

impl Replacement {
    pub fn new(span: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

/// Rebuild `text` with every replacement applied at its own span.
///
/// Replacements must be sorted by start offset, non-overlapping, inside
/// `text`, and fall on `char` boundaries. Anything else is a bug in the
/// caller and reported as [`Md2DocxError::Internal`].
pub fn splice(text: &str, replacements: &[Replacement]) -> Result<String, Md2DocxError> {
    let extra: usize = replacements.iter().map(|r| r.text.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0usize;

    for r in replacements {
        let Range { start, end } = r.span;
        if start < cursor || end < start || end > text.len() {
            return Err(Md2DocxError::Internal(format!(
                "replacement span {start}..{end} overlaps or exceeds text (cursor {cursor}, len {})",
                text.len()
            )));
        }
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return Err(Md2DocxError::Internal(format!(
                "replacement span {start}..{end} splits a UTF-8 character"
            )));
        }
        out.push_str(&text[cursor..start]);
        out.push_str(&r.text);
        cursor = end;
    }

    out.push_str(&text[cursor..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_replacements_is_identity() {
        let text = "# Title\n\nBody ünïcode\n";
        assert_eq!(splice(text, &[]).unwrap(), text);
    }

    #[test]
    fn replacements_apply_at_their_own_spans() {
        let text = "a X b X c";
        let out = splice(
            text,
            &[Replacement::new(2..3, "one"), Replacement::new(6..7, "two")],
        )
        .unwrap();
        assert_eq!(out, "a one b two c");
    }

    #[test]
    fn replacement_may_change_length() {
        let text = "start\n```mermaid\ngraph TD\n```\nend";
        let out = splice(text, &[Replacement::new(6..29, "![M](m.svg)")]).unwrap();
        assert_eq!(out, "start\n![M](m.svg)\nend");
    }

    #[test]
    fn overlapping_spans_rejected() {
        let err = splice("abcdef", &[Replacement::new(0..3, "x"), Replacement::new(2..4, "y")])
            .unwrap_err();
        assert!(err.to_string().contains("overlaps"), "got: {err}");
    }

    #[test]
    fn out_of_range_span_rejected() {
        assert!(splice("abc", &[Replacement::new(1..10, "x")]).is_err());
    }

    #[test]
    fn non_char_boundary_rejected() {
        // 'é' is two bytes; 1..2 cuts it in half.
        assert!(splice("é", &[Replacement::new(1..2, "x")]).is_err());
    }
}
