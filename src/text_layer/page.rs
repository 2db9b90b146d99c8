//! Materialized page text and run identity

/// Identity of a text run: owning page plus position in that page's
/// reading order. `Ord` is document order, which makes endpoint
/// comparisons a tuple compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId {
    /// Owning page number (0-indexed)
    pub page: usize,
    /// Index within the page's run list
    pub run: usize,
}

impl RunId {
    #[must_use]
    pub const fn new(page: usize, run: usize) -> Self {
        Self { page, run }
    }
}

/// One leaf text run as a half-open byte range into the owning page's
/// concatenated text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub start: usize,
    pub end: usize,
}

impl TextRun {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Snapshot of one page's text content. Built once per materialization;
/// shared immutably afterwards.
#[derive(Clone)]
pub struct PageText {
    /// Page number (0-indexed)
    pub page: usize,
    /// All run text concatenated in reading order
    pub text: String,
    /// Half-open byte ranges of each run within `text`
    pub runs: Vec<TextRun>,
}

impl PageText {
    /// Concatenate run strings into a page snapshot, recording per-run
    /// offsets. Empty runs are kept; they occupy zero-width ranges and
    /// never match anything.
    #[must_use]
    pub fn assemble(page: usize, runs: Vec<String>) -> Self {
        let mut text = String::with_capacity(runs.iter().map(String::len).sum());
        let mut spans = Vec::with_capacity(runs.len());

        for run in &runs {
            let start = text.len();
            text.push_str(run);
            spans.push(TextRun {
                start,
                end: text.len(),
            });
        }

        Self {
            page,
            text,
            runs: spans,
        }
    }

    /// Borrow the text of one run.
    #[must_use]
    pub fn run_text(&self, run: usize) -> Option<&str> {
        let span = self.runs.get(run)?;
        Some(&self.text[span.start..span.end])
    }

    #[must_use]
    pub fn run_id(&self, run: usize) -> RunId {
        RunId::new(self.page, run)
    }

    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

impl std::fmt::Debug for PageText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageText")
            .field("page", &self.page)
            .field("text_len", &self.text.len())
            .field("run_count", &self.runs.len())
            .finish_non_exhaustive()
    }
}

/// Byte offset of the `index`-th character of `text`. `index` may equal
/// the character count, mapping to the byte length (end-exclusive
/// conversions need that). `None` past that.
#[must_use]
pub fn byte_for_char(text: &str, index: usize) -> Option<usize> {
    if index == 0 {
        return Some(0);
    }
    let mut seen = 0usize;
    for (byte, _) in text.char_indices() {
        if seen == index {
            return Some(byte);
        }
        seen += 1;
    }
    // index == char count maps to the end of the string
    (seen == index).then_some(text.len())
}
