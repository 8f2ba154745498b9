/*!
# Branch tree
Tracks how many physical copies of one point variant survive the structural events applied after it.
Each level of the tree corresponds to a copy-number event that covered the variant, and each node on a level is one copy produced by that event.
The bottom level holds the variant itself.

Nodes live in a `BranchArena` and are addressed by `BranchId`.
Branching always deep-copies the affected subtree, so sibling copies never share nodes.
*/

/// Index of a node inside a `BranchArena`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct BranchId(usize);

/// Payload of one branch node
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BranchContent {
    /// Leaf marker: one physical copy of the variant
    Variant,
    /// The copies produced by a structural event, in order; empty if everything was deleted
    Children(Vec<BranchId>)
}

/// One node of the tree; the interval is the variant position for a leaf, or the event range otherwise
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BranchNode {
    start: u64,
    end: u64,
    content: BranchContent
}

impl BranchNode {
    /// Returns true if this node's interval sits entirely inside `[start, end]`
    pub fn is_within(&self, start: u64, end: u64) -> bool {
        start <= self.start && end >= self.end
    }

    // getters
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn content(&self) -> &BranchContent {
        &self.content
    }
}

/// Owner of every branch node for one haplotype track
#[derive(Clone, Debug, Default)]
pub struct BranchArena {
    nodes: Vec<BranchNode>
}

impl BranchArena {
    /// Creates the root level for a freshly created variant: a single leaf at `position`
    pub fn new_variant_level(&mut self, position: u64) -> Vec<BranchId> {
        vec![self.push(BranchNode {
            start: position,
            end: position,
            content: BranchContent::Variant
        })]
    }

    /// Applies a copy-number event to a level of the tree and returns the adjusted level.
    /// * An empty level (deleted on a prior branch) is returned unchanged.
    /// * If the first node of the level lies inside `[start, end]`, the whole level is replaced by `copies` new nodes spanning the event, each owning an independent copy of the old level.
    /// * Otherwise the event is pushed down into the first node's children.
    /// # Arguments
    /// * `level` - the sibling nodes to adjust
    /// * `start` - first position of the event
    /// * `end` - last position of the event
    /// * `copies` - number of copies produced by the event; 0 removes everything below
    pub fn adjust_branches(&mut self, level: Vec<BranchId>, start: u64, end: u64, copies: u32) -> Vec<BranchId> {
        let Some(&first) = level.first() else {
            return level;
        };

        if self.node(first).is_within(start, end) {
            return (0..copies)
                .map(|_| {
                    let children = self.clone_level(&level);
                    self.push(BranchNode {
                        start, end,
                        content: BranchContent::Children(children)
                    })
                })
                .collect();
        }

        let children = match &self.node(first).content {
            BranchContent::Children(children) => children.clone(),
            // a leaf always lies inside any event covering the variant
            BranchContent::Variant => return level
        };
        let adjusted = self.adjust_branches(children, start, end, copies);
        self.nodes[first.0].content = BranchContent::Children(adjusted);
        level
    }

    /// Counts the variant leaves reachable from the level; this is the number of surviving physical copies
    pub fn count_leaves(&self, level: &[BranchId]) -> u64 {
        level.iter()
            .map(|&id| match &self.node(id).content {
                BranchContent::Variant => 1,
                BranchContent::Children(children) => self.count_leaves(children)
            })
            .sum()
    }

    /// Deep-copies every node of the level into fresh arena slots
    pub fn clone_level(&mut self, level: &[BranchId]) -> Vec<BranchId> {
        level.iter()
            .map(|&id| self.clone_subtree(id))
            .collect()
    }

    /// Deep-copies one node and all of its descendants
    pub fn clone_subtree(&mut self, id: BranchId) -> BranchId {
        let node = self.node(id).clone();
        let content = match node.content {
            BranchContent::Variant => BranchContent::Variant,
            BranchContent::Children(children) => BranchContent::Children(self.clone_level(&children))
        };
        self.push(BranchNode {
            start: node.start,
            end: node.end,
            content
        })
    }

    /// Look up a node; ids are only handed out by this arena so they are always valid
    pub fn node(&self, id: BranchId) -> &BranchNode {
        &self.nodes[id.0]
    }

    /// Number of allocated nodes, including ones orphaned by earlier adjustments
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: BranchNode) -> BranchId {
        self.nodes.push(node);
        BranchId(self.nodes.len() - 1)
    }
}
