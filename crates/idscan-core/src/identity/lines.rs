//! Line preparation for raw OCR text.

/// Raw OCR text split into trimmed, non-empty lines plus a flattened form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrLines {
    lines: Vec<String>,
    flat: String,
}

impl OcrLines {
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        let flat = lines.join(" ");
        Self { lines, flat }
    }

    /// Trimmed, non-empty lines in reading order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined by single spaces, for patterns that may span a break.
    pub fn flat(&self) -> &str {
        &self.flat
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
