use std::{fmt, str::FromStr};

use crate::error::AstError;

/// An absolute byte range `start..=end` into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset {
    pub start: usize,
    pub end: usize,
}

impl Offset {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "offset start {start} is past its end {end}");
        Self { start, end }
    }

    /// A zero-width offset at `position`.
    pub fn point(position: usize) -> Self {
        Self::new(position, position)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `inner` lies within this offset. Both ends are inclusive.
    #[inline(always)]
    pub fn contains(&self, inner: &Offset) -> bool {
        self.start <= inner.start && inner.start <= inner.end && inner.end <= self.end
    }
}

impl From<(usize, usize)> for Offset {
    /// Builds the offset spanning both positions, whichever order they come in.
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a.min(b), a.max(b))
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for Offset {
    type Err = String;

    /// Parses `start:end` or a single position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid offset `{s}`: {e}"))
        };

        match s.split_once(':') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(format!("invalid offset `{s}`: start is past the end"));
                }
                Ok(Offset::new(start, end))
            }
            None => parse(s).map(Offset::point),
        }
    }
}

/// The decoded form of a compiler `src` string (`start:length:scope`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// `None` when the compiler marks the node as having no source range (`-1:-1:-1`).
    pub offset: Option<Offset>,
    pub scope_id: i64,
}

impl Location {
    pub(crate) fn parse(node_type: &str, src: &str) -> Result<Self, AstError> {
        let malformed = |reason: String| AstError::malformed(node_type, reason);

        let parts = src
            .split(':')
            .map(|part| {
                part.parse::<i64>().map_err(|e| {
                    malformed(format!("invalid `src` component `{part}` in `{src}`: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let &[start, length, scope_id] = parts.as_slice() else {
            return Err(malformed(format!(
                "`src` must look like `start:length:scope`, found `{src}`"
            )));
        };

        match (start, length) {
            (-1, -1) => Ok(Location {
                offset: None,
                scope_id,
            }),
            (start, length) if start >= 0 && length >= 0 => {
                let end = start
                    .checked_add(length)
                    .ok_or_else(|| malformed(format!("source range overflows in `{src}`")))?;
                Ok(Location {
                    offset: Some(Offset::new(start as usize, end as usize)),
                    scope_id,
                })
            }
            _ => Err(malformed(format!("negative source range in `{src}`"))),
        }
    }
}
