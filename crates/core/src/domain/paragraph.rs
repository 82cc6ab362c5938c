// Paragraph Domain Model

/// One unit of work: a maximal run of non-blank input lines, each ending in `\n`.
///
/// Content is kept as raw bytes so non-UTF-8 input reaches the command untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    index: usize,
    bytes: Vec<u8>,
}

impl Paragraph {
    /// Create a paragraph at 1-based stream position `index`
    pub fn new(index: usize, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        debug_assert!(!bytes.is_empty(), "paragraphs are never empty");
        Self { index, bytes }
    }

    /// Position in the input stream (1-based)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.bytes.iter().filter(|b| **b == b'\n').count()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        let paragraph = Paragraph::new(1, "a\nb\nc\n");
        assert_eq!(paragraph.line_count(), 3);
        assert_eq!(paragraph.len(), 6);
        assert_eq!(paragraph.index(), 1);
    }

    #[test]
    fn test_keeps_raw_bytes() {
        let raw = vec![0xff, 0xfe, b'\n'];
        let paragraph = Paragraph::new(2, raw.clone());
        assert_eq!(paragraph.as_bytes(), raw.as_slice());
        assert_eq!(paragraph.into_bytes(), raw);
    }
}
