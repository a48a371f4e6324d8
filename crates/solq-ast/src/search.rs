use crate::{
    error::{AstError, Result},
    filter::{Filter, Filters},
    location::Offset,
    tree::NodeRef,
};

/// Options for [`NodeRef::children`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Levels below the search root to visit. `None` searches the whole subtree.
    pub max_depth: Option<usize>,
    /// Lets the search root itself be returned.
    pub include_self: bool,
    /// Keeps a match even when one of its descendants matches too. When false
    /// only the innermost match of each branch is returned.
    pub include_parents: bool,
    /// Keeps searching below a match. When false the search stops at the
    /// shallowest match of each branch.
    pub include_children: bool,
    /// Only nodes whose offset contains this offset match.
    pub required_offset: Option<Offset>,
    /// Only nodes whose offset lies within this offset match.
    pub offset_limits: Option<Offset>,
    pub filters: Filters,
    /// A node matching any single condition of this filter never matches.
    pub exclude: Filter,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_depth: None,
            include_self: false,
            include_parents: true,
            include_children: true,
            required_offset: None,
            offset_limits: None,
            filters: Filters::default(),
            exclude: Filter::default(),
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(mut self, filters: impl Into<Filters>) -> Self {
        self.filters = filters.into();
        self
    }

    pub fn exclude(mut self, exclude: Filter) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn include_self(mut self, include_self: bool) -> Self {
        self.include_self = include_self;
        self
    }

    pub fn include_parents(mut self, include_parents: bool) -> Self {
        self.include_parents = include_parents;
        self
    }

    pub fn include_children(mut self, include_children: bool) -> Self {
        self.include_children = include_children;
        self
    }

    pub fn required_offset(mut self, offset: impl Into<Offset>) -> Self {
        self.required_offset = Some(offset.into());
        self
    }

    pub fn offset_limits(mut self, offset: impl Into<Offset>) -> Self {
        self.offset_limits = Some(offset.into());
        self
    }

    /// Offset constraints first, then exclusion, then the filters.
    pub fn is_match(&self, node: &NodeRef<'_>) -> bool {
        if self.required_offset.is_some() || self.offset_limits.is_some() {
            let Some(offset) = node.offset() else {
                return false;
            };
            if self
                .required_offset
                .is_some_and(|required| !offset.contains(&required))
            {
                return false;
            }
            if self.offset_limits.is_some_and(|limits| !limits.contains(&offset)) {
                return false;
            }
        }

        !self.exclude.matches_any(node) && self.filters.matches(node)
    }
}

impl<'a> NodeRef<'a> {
    /// Collects matching descendants in pre-order.
    ///
    /// The search root is a candidate only with `include_self`; otherwise it
    /// is skipped entirely and the search starts at its adjacent nodes.
    pub fn children(self, options: &SearchOptions) -> Vec<NodeRef<'a>> {
        let mut found = Vec::new();

        if options.include_self {
            collect(self, options.max_depth, options, &mut found);
        } else if options.max_depth != Some(0) {
            let remaining = options.max_depth.map(|depth| depth - 1);
            for node in self.adjacent() {
                collect(node, remaining, options, &mut found);
            }
        }

        tracing::trace!(root = %self, matches = found.len(), "Searched descendants");
        found
    }

    /// The ancestor at `depth`, or with a filter the nearest ancestor down to
    /// `depth` that matches it.
    ///
    /// A negative `depth` is relative to this node (`-1` is the immediate
    /// parent). An empty filter counts as no filter.
    pub fn parent(self, depth: isize, filter: Option<&Filter>) -> Result<Option<NodeRef<'a>>> {
        let target = self.resolve_depth(depth)?;
        let mut ancestors = self.ancestors().take_while(|node| node.depth() >= target);

        Ok(match filter.filter(|filter| !filter.is_empty()) {
            Some(filter) => ancestors.find(|node| filter.matches(node)),
            None => ancestors.find(|node| node.depth() == target),
        })
    }

    /// Every ancestor from the immediate parent down to `depth`, nearest first,
    /// keeping only those matching `filter` when one is given.
    pub fn parents(self, depth: isize, filter: Option<&Filter>) -> Result<Vec<NodeRef<'a>>> {
        let target = self.resolve_depth(depth)?;
        let filter = filter.filter(|filter| !filter.is_empty());

        Ok(self
            .ancestors()
            .take_while(|node| node.depth() >= target)
            .filter(|node| filter.is_none_or(|filter| filter.matches(node)))
            .collect())
    }

    /// `true` if `node` is a strict ancestor of this node.
    pub fn is_child_of(self, node: NodeRef<'a>) -> bool {
        node.depth() < self.depth()
            && self
                .parent(node.depth() as isize, None)
                .ok()
                .flatten()
                .is_some_and(|parent| parent == node)
    }

    /// `true` if `node` is a strict descendant of this node.
    pub fn is_parent_of(self, node: NodeRef<'a>) -> bool {
        node.is_child_of(self)
    }

    fn resolve_depth(self, depth: isize) -> Result<usize> {
        let own = self.depth() as isize;
        let resolved = if depth < 0 { own + depth } else { depth };

        if resolved < 0 || resolved >= own {
            return Err(AstError::OutOfRange {
                requested: depth,
                depth: self.depth(),
            });
        }
        Ok(resolved as usize)
    }
}

fn collect<'a>(
    node: NodeRef<'a>,
    remaining: Option<usize>,
    options: &SearchOptions,
    found: &mut Vec<NodeRef<'a>>,
) {
    let matched = options.is_match(&node);

    if remaining == Some(0) || (matched && !options.include_children) {
        if matched {
            found.push(node);
        }
        return;
    }

    let start = found.len();
    let remaining = remaining.map(|depth| depth - 1);
    for child in node.adjacent() {
        collect(child, remaining, options, found);
    }

    if matched && (options.include_parents || found.len() == start) {
        found.insert(start, node);
    }
}
