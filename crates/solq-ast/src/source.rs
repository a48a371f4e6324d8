use itertools::Itertools;

use crate::{
    error::{AstError, Result},
    location::Offset,
    tree::NodeRef,
};

/// Options for [`NodeRef::extract`].
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Prefix each line with its 1-based line number in the source.
    pub line_numbers: bool,
    /// Accepted for compatibility; has no effect.
    pub tags: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            line_numbers: true,
            tags: true,
        }
    }
}

impl<'a> NodeRef<'a> {
    /// First and last 1-based line covered by this node in `source`.
    pub fn line_numbers(self, source: &str) -> Result<(usize, usize)> {
        let offset = self.require_offset()?;
        Ok(line_range(source.as_bytes(), offset))
    }

    /// The source text covered by this node.
    ///
    /// Offsets past the end of `source` are clamped. A range that splits a
    /// UTF-8 sequence is decoded lossily.
    pub fn extract(self, source: &str, options: &ExtractOptions) -> Result<String> {
        let offset = self.require_offset()?;
        let bytes = source.as_bytes();
        let start = offset.start.min(bytes.len());
        let end = offset.end.min(bytes.len());
        let code = String::from_utf8_lossy(&bytes[start..end]);

        if options.line_numbers {
            Ok(insert_line_numbers(line_range(bytes, offset), &code))
        } else {
            Ok(code.into_owned())
        }
    }

    fn require_offset(self) -> Result<Offset> {
        self.offset().ok_or_else(|| AstError::MissingLocation {
            node_type: self.node_type().into(),
        })
    }
}

fn line_range(bytes: &[u8], offset: Offset) -> (usize, usize) {
    let line_at = |position: usize| {
        1 + bytes[..position.min(bytes.len())]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
    };
    let last = if offset.is_empty() {
        offset.start
    } else {
        offset.end - 1
    };
    (line_at(offset.start), line_at(last))
}

/// Prefixes every line of `code` with its line number, counting from `start`.
///
/// Numbers are right-aligned to the width of the larger of `end` and the last
/// line number actually written.
pub fn insert_line_numbers((start, end): (usize, usize), code: &str) -> String {
    let line_count = code.split('\n').count();
    let last = end.max(start + line_count - 1);
    let width = last.to_string().len();

    code.split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", start + i))
        .join("\n")
}
