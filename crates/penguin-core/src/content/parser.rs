use serde::{Deserialize, Serialize};

/// The code fence delimiter.
pub const FENCE: &str = "```";

/// Label shown for code blocks without a language tag.
const DEFAULT_CODE_LABEL: &str = "code";

/// A typed piece of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    /// Plain text, rendered as-is.
    Prose { text: String },
    /// The inside of a fenced block.
    Code {
        language: Option<String>,
        text: String,
    },
}

impl ContentSegment {
    pub fn prose(text: impl Into<String>) -> Self {
        Self::Prose { text: text.into() }
    }

    pub fn code(language: Option<&str>, text: impl Into<String>) -> Self {
        Self::Code {
            language: language.map(str::to_string),
            text: text.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }

    /// The segment text without any fence syntax.
    ///
    /// For code this is exactly what a "copy" action should put on the clipboard.
    pub fn text(&self) -> &str {
        match self {
            Self::Prose { text } | Self::Code { text, .. } => text,
        }
    }

    /// Header label of a code block: its language, or `"code"`.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Prose { .. } => None,
            Self::Code { language, .. } => Some(language.as_deref().unwrap_or(DEFAULT_CODE_LABEL)),
        }
    }
}

/// Splits a raw message into prose and fenced code segments.
///
/// Each pair of fences becomes one `Code` segment. The language tag is the
/// trimmed text on the opening fence's line. The code runs from the line
/// after the opener up to the closer, minus one trailing line break.
/// Everything else becomes `Prose`, in order, with empty pieces dropped.
///
/// Never fails. An opener without a matching closer is not a code block:
/// the fence and the rest of the input stay in the trailing prose.
pub fn parse(raw: &str) -> Vec<ContentSegment> {
    let mut segments = Vec::new();
    let mut prose = String::new();
    let mut rest = raw;

    loop {
        let Some(open) = rest.find(FENCE) else {
            prose.push_str(rest);
            break;
        };
        let after_open = &rest[open + FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            // Dangling opener
            prose.push_str(rest);
            break;
        };

        prose.push_str(&rest[..open]);
        flush_prose(&mut segments, &mut prose);

        let (language, code) = split_fence_body(&after_open[..close]);
        segments.push(ContentSegment::Code {
            language,
            text: code.to_string(),
        });

        rest = &after_open[close + FENCE.len()..];
    }

    flush_prose(&mut segments, &mut prose);
    segments
}

fn flush_prose(segments: &mut Vec<ContentSegment>, prose: &mut String) {
    if !prose.is_empty() {
        segments.push(ContentSegment::Prose {
            text: std::mem::take(prose),
        });
    }
}

/// Separates the info line from the code of a fence's inner text.
fn split_fence_body(inner: &str) -> (Option<String>, &str) {
    match inner.find('\n') {
        Some(newline) => {
            let language = inner[..newline].trim();
            let body = &inner[newline + 1..];
            let body = body.strip_suffix('\n').unwrap_or(body);
            let body = body.strip_suffix('\r').unwrap_or(body);
            let language = (!language.is_empty()).then(|| language.to_string());
            (language, body)
        }
        // Deviates from the opener-line language rule: a fence without a
        // line break is all code, so the text stays visible.
        None => (None, inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_count(segments: &[ContentSegment]) -> usize {
        segments.iter().filter(|s| s.is_code()).count()
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_plain_text_is_single_prose() {
        for input in ["hello", "two\nlines", "  padded  ", "a `single` tick", "``double``"] {
            assert_eq!(parse(input), vec![ContentSegment::prose(input)], "input: {input:?}");
        }
    }

    #[test]
    fn test_explain_scenario() {
        let segments = parse("explain ```py\nprint(1)\n```");
        assert_eq!(
            segments,
            vec![
                ContentSegment::prose("explain "),
                ContentSegment::code(Some("py"), "print(1)"),
            ]
        );
    }

    #[test]
    fn test_multiple_blocks_keep_order() {
        let raw = "Intro\n```rust\nfn main() {}\n```\nBetween\n```\nplain\n```\nOutro";
        let segments = parse(raw);

        assert_eq!(code_count(&segments), 2);
        assert_eq!(
            segments,
            vec![
                ContentSegment::prose("Intro\n"),
                ContentSegment::code(Some("rust"), "fn main() {}"),
                ContentSegment::prose("\nBetween\n"),
                ContentSegment::code(None, "plain"),
                ContentSegment::prose("\nOutro"),
            ]
        );
    }

    #[test]
    fn test_adjacent_blocks_have_no_prose_between() {
        let segments = parse("```a\n1\n``````b\n2\n```");
        assert_eq!(
            segments,
            vec![
                ContentSegment::code(Some("a"), "1"),
                ContentSegment::code(Some("b"), "2"),
            ]
        );
    }

    #[test]
    fn test_language_tag_is_trimmed() {
        let segments = parse("```  python  \nx = 1\n```");
        assert_eq!(segments, vec![ContentSegment::code(Some("python"), "x = 1")]);
    }

    #[test]
    fn test_multiline_code_is_preserved() {
        let segments = parse("```js\nconst a = 1;\n\nconsole.log(a);\n```");
        assert_eq!(
            segments,
            vec![ContentSegment::code(Some("js"), "const a = 1;\n\nconsole.log(a);")]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let segments = parse("```sh\r\necho hi\r\n```");
        assert_eq!(segments, vec![ContentSegment::code(Some("sh"), "echo hi")]);
    }

    #[test]
    fn test_closer_on_code_line() {
        let segments = parse("```py\nprint(1)```");
        assert_eq!(segments, vec![ContentSegment::code(Some("py"), "print(1)")]);
    }

    #[test]
    fn test_single_line_fence_has_no_language() {
        let segments = parse("run ```ls -la``` now");
        assert_eq!(
            segments,
            vec![
                ContentSegment::prose("run "),
                ContentSegment::code(None, "ls -la"),
                ContentSegment::prose(" now"),
            ]
        );
    }

    #[test]
    fn test_dangling_opener_is_trailing_prose() {
        let raw = "see below ```py\nprint(1)";
        assert_eq!(parse(raw), vec![ContentSegment::prose(raw)]);
    }

    #[test]
    fn test_dangling_opener_after_complete_block() {
        let segments = parse("```\na\n``` and then ```b");
        assert_eq!(
            segments,
            vec![
                ContentSegment::code(None, "a"),
                ContentSegment::prose(" and then ```b"),
            ]
        );
    }

    #[test]
    fn test_empty_block() {
        let segments = parse("x``````y");
        assert_eq!(
            segments,
            vec![
                ContentSegment::prose("x"),
                ContentSegment::code(None, ""),
                ContentSegment::prose("y"),
            ]
        );
    }

    #[test]
    fn test_content_reconstructs_without_fences() {
        let raw = "a\n```rs\nlet x = 1;\n```\nb";
        let joined: String = parse(raw).iter().map(ContentSegment::text).collect();
        assert_eq!(joined, "a\nlet x = 1;\nb");
    }

    #[test]
    fn test_labels() {
        assert_eq!(ContentSegment::code(Some("go"), "").label(), Some("go"));
        assert_eq!(ContentSegment::code(None, "").label(), Some("code"));
        assert_eq!(ContentSegment::prose("p").label(), None);
    }
}
