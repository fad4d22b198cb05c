use crate::model::Point;

/// Maps between byte offsets and UTF-16 based points of a document.
pub struct LineMap {
    line_starts: Vec<usize>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Byte offset of `point`. A column past the end of its line clamps to the line end.
    pub fn point_to_offset(&self, text: &str, point: Point) -> Option<usize> {
        let line_start = *self.line_starts.get(point.line as usize)?;
        let mut current_col = 0u32;

        for (i, c) in text[line_start..].char_indices() {
            if current_col >= point.col || c == '\n' {
                return Some(line_start + i);
            }
            current_col += c.len_utf16() as u32;
        }

        Some(text.len())
    }
}

/// Text of line `line` without its terminator.
pub fn line_at(text: &str, line: u32) -> Option<&str> {
    text.split('\n')
        .nth(line as usize)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
}

/// Byte index inside `line` for a UTF-16 column, clamped to the line length.
pub fn utf16_col_to_byte(line: &str, col: u32) -> usize {
    let mut current = 0u32;
    for (i, c) in line.char_indices() {
        if current >= col {
            return i;
        }
        current += c.len_utf16() as u32;
    }
    line.len()
}

/// UTF-16 column of a byte index inside `line`.
pub fn byte_to_utf16_col(line: &str, byte: usize) -> u32 {
    line[..byte].encode_utf16().count() as u32
}

/// Position right after `inserted` when it is typed at `start`.
pub fn advance(start: Point, inserted: &str) -> Point {
    match inserted.rfind('\n') {
        Some(last_newline) => Point {
            line: start.line + inserted.matches('\n').count() as u32,
            col: inserted[last_newline + 1..].encode_utf16().count() as u32,
        },
        None => Point {
            line: start.line,
            col: start.col + inserted.encode_utf16().count() as u32,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_offset_with_wide_chars() {
        let text = "# 日本\n[[😀 note]]\n";
        let map = LineMap::new(text);

        // 😀 is two UTF-16 units
        let offset = text.find("note").unwrap();
        assert_eq!(map.point_to_offset(text, Point::new(1, 5)), Some(offset));
    }

    #[test]
    fn test_point_to_offset_clamps_to_line_end() {
        let text = "ab\ncd";
        let map = LineMap::new(text);
        assert_eq!(map.point_to_offset(text, Point::new(0, 10)), Some(2));
        assert_eq!(map.point_to_offset(text, Point::new(1, 10)), Some(5));
        assert_eq!(map.point_to_offset(text, Point::new(2, 0)), None);
    }

    #[test]
    fn test_line_at_strips_carriage_return() {
        assert_eq!(line_at("one\r\ntwo", 0), Some("one"));
        assert_eq!(line_at("one\r\ntwo", 1), Some("two"));
        assert_eq!(line_at("one", 1), None);
    }

    #[test]
    fn test_advance_over_newlines() {
        assert_eq!(advance(Point::new(2, 4), "ab"), Point::new(2, 6));
        assert_eq!(advance(Point::new(2, 4), "ab\ncde"), Point::new(3, 3));
        assert_eq!(advance(Point::new(0, 1), ""), Point::new(0, 1));
    }

    #[test]
    fn test_utf16_columns() {
        let line = "é[[x]]";
        assert_eq!(utf16_col_to_byte(line, 1), 2);
        assert_eq!(byte_to_utf16_col(line, 2), 1);
        assert_eq!(utf16_col_to_byte(line, 99), line.len());
    }
}
