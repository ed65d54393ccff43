//! Response text transform: detect fenced code regions in an answer and
//! rewrap them as block-formatted segments for display.

use once_cell::sync::Lazy;
use regex::Regex;

// Non-greedy so each ``` pair closes its own region.
static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.+?)```").expect("valid regex"));

/// A piece of a rendered answer. Text passes through unchanged; code is the
/// trimmed body of a fenced region, displayed as a distinct block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code(String),
}

/// Split an answer into display segments. Unterminated fences are left
/// untransformed; multiple fenced regions are handled independently in
/// order of appearance.
pub fn render(answer: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in FENCE_RE.captures_iter(answer) {
        let whole = caps.get(0).expect("match has a whole capture");
        if whole.start() > cursor {
            segments.push(Segment::Text(answer[cursor..whole.start()].to_string()));
        }
        let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        segments.push(Segment::Code(body.trim().to_string()));
        cursor = whole.end();
    }

    if cursor < answer.len() || segments.is_empty() {
        segments.push(Segment::Text(answer[cursor..].to_string()));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through_unchanged() {
        let input = "no fences here, just prose.";
        assert_eq!(render(input), vec![Segment::Text(input.to_string())]);
    }

    #[test]
    fn fenced_region_becomes_code_block() {
        assert_eq!(render("```abc```"), vec![Segment::Code("abc".to_string())]);
    }

    #[test]
    fn code_body_is_trimmed() {
        assert_eq!(
            render("```  abc  ```"),
            vec![Segment::Code("abc".to_string())]
        );
    }

    #[test]
    fn whitespace_only_body_yields_empty_block() {
        assert_eq!(render("``` ```"), vec![Segment::Code(String::new())]);
    }

    #[test]
    fn unterminated_fence_is_left_alone() {
        let input = "```abc";
        assert_eq!(render(input), vec![Segment::Text(input.to_string())]);
    }

    #[test]
    fn multiple_regions_transform_in_order() {
        let segments = render("say ```one``` then ```two``` done");
        assert_eq!(
            segments,
            vec![
                Segment::Text("say ".to_string()),
                Segment::Code("one".to_string()),
                Segment::Text(" then ".to_string()),
                Segment::Code("two".to_string()),
                Segment::Text(" done".to_string()),
            ]
        );
    }

    #[test]
    fn fences_match_non_greedily_across_lines() {
        let segments = render("```let x = 1;\nlet y = 2;```");
        assert_eq!(
            segments,
            vec![Segment::Code("let x = 1;\nlet y = 2;".to_string())]
        );
    }

    #[test]
    fn empty_answer_is_a_single_empty_text_segment() {
        assert_eq!(render(""), vec![Segment::Text(String::new())]);
    }
}
