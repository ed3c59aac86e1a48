//! Optional cleanup of model-generated text.
//!
//! Even when told to output bare text, vision models sometimes wrap the
//! answer in a code fence, use CRLF line endings, or leave zero-width
//! characters copied from the source layout. These rules remove that noise
//! without touching the words. They only run when
//! [`crate::config::RecognitionConfig::clean_output`] is set.
//!
//! ## Rule Order
//!
//! Fences are stripped first so line-ending normalisation sees the inner
//! text; trailing-whitespace and blank-line rules run on LF-only input.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw model output.
///
/// Rules (applied in order):
/// 1. Strip an outer code fence (any language tag)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
///
/// The result is not trimmed; the pipeline trims after cleanup.
pub fn clean_text(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    remove_invisible_chars(&s)
}

// ── Rule 1: Strip outer fence ────────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fence_with_language() {
        assert_eq!(strip_outer_fence("```text\nHello\nWorld\n```"), "Hello\nWorld");
    }

    #[test]
    fn strips_fence_without_language() {
        assert_eq!(strip_outer_fence("```\nInvoice 42\n```\n"), "Invoice 42");
    }

    #[test]
    fn inner_fence_left_alone() {
        let input = "Intro\n```\ncode\n```\nOutro";
        assert_eq!(strip_outer_fence(input), input);
    }

    #[test]
    fn crlf_normalised() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn trailing_spaces_removed() {
        assert_eq!(trim_trailing_whitespace("a  \nb\t"), "a\nb");
    }

    #[test]
    fn blank_runs_collapsed() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn invisible_removed() {
        assert_eq!(remove_invisible_chars("to\u{200B}tal\u{FEFF}"), "total");
    }

    #[test]
    fn full_pipeline() {
        let raw = "```plaintext\r\nTOTAL\u{00AD} DUE   \r\n\r\n\r\n\r\n$12.00\r\n```";
        assert_eq!(clean_text(raw), "TOTAL DUE\n\n\n$12.00");
    }
}
