use crate::error::CacheError;

/// A single line of a way
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub tag: u64,
    pub data: u64,
    pub valid: bool,
}

/// One way of the cache, owning a fixed number of lines
///
/// Writes are synchronous: `write` only stages the new line, which becomes readable after the next
/// `commit`. There is a single write port, staging twice before a commit keeps the last write
pub struct WayStore {
    lines: Vec<Line>,
    pending: Option<(usize, Line)>,
}

impl WayStore {
    pub fn new(lines_per_way: usize) -> Self {
        Self {
            lines: vec![Line::default(); lines_per_way],
            pending: None,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), CacheError> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(CacheError::ContractViolation { index, lines: self.lines.len() })
        }
    }

    /// Reads the committed line at an index
    pub fn read(&self, index: usize) -> Result<Line, CacheError> {
        self.check_index(index)?;
        Ok(self.lines[index])
    }

    /// Stages a write of a valid line at an index, visible after the next commit
    ///
    /// # Arguments
    ///
    /// * `index`: The line within the way
    /// * `tag`: The tag to store, already masked to the tag width by the caller
    /// * `data`: The data word, already masked to the data width by the caller
    ///
    /// returns: Result<(), CacheError>
    pub fn write(&mut self, index: usize, tag: u64, data: u64) -> Result<(), CacheError> {
        self.check_index(index)?;
        self.pending = Some((index, Line { tag, data, valid: true }));
        Ok(())
    }

    /// True iff the line at `index` is valid and holds `tag`
    pub fn hit(&self, index: usize, tag: u64) -> Result<bool, CacheError> {
        let line = self.read(index)?;
        Ok(line.valid && line.tag == tag)
    }

    /// Applies the staged write, if any. Returns whether a line changed
    pub fn commit(&mut self) -> bool {
        match self.pending.take() {
            Some((index, line)) => {
                self.lines[index] = line;
                true
            }
            None => false,
        }
    }

    /// Invalidates every line and drops any staged write
    pub fn reset(&mut self) {
        self.lines.fill(Line::default());
        self.pending = None;
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of lines written since the last reset
    pub fn valid_line_count(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }
}
