//! Splitting templates into literal text and code segments
//!
//! Code lives between `<?void` and `?>`; everything else is literal text.
//! An open tag without a matching close tag runs to the end of the input.

use std::ops::Range;

pub const OPEN_TAG: &str = "<?void";
pub const CLOSE_TAG: &str = "?>";

/// A byte range of the template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(Range<usize>),
    Code(Range<usize>),
}

/// Split `source` into segments, in order. Empty text segments are
/// omitted.
pub fn segments(source: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < source.len() {
        let Some(open) = source[pos..].find(OPEN_TAG).map(|i| pos + i) else {
            out.push(Segment::Text(pos..source.len()));
            break;
        };
        if open > pos {
            out.push(Segment::Text(pos..open));
        }
        let code_start = open + OPEN_TAG.len();
        match source[code_start..].find(CLOSE_TAG) {
            Some(i) => {
                out.push(Segment::Code(code_start..code_start + i));
                pos = code_start + i + CLOSE_TAG.len();
            }
            None => {
                out.push(Segment::Code(code_start..source.len()));
                pos = source.len();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text() {
        assert_eq!(segments("hello"), vec![Segment::Text(0..5)]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_interleaved() {
        let src = "a<?void print(1); ?>b";
        assert_eq!(
            segments(src),
            vec![
                Segment::Text(0..1),
                Segment::Code(7..18),
                Segment::Text(20..21),
            ]
        );
        assert_eq!(&src[7..18], " print(1); ");
    }

    #[test]
    fn test_unterminated_open_tag_runs_to_end() {
        let src = "x<?void print(2);";
        assert_eq!(
            segments(src),
            vec![Segment::Text(0..1), Segment::Code(7..src.len())]
        );
    }

    #[test]
    fn test_adjacent_code_blocks() {
        let src = "<?void a ?><?void b ?>";
        assert_eq!(
            segments(src),
            vec![Segment::Code(6..9), Segment::Code(17..20)]
        );
    }
}
