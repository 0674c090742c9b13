//! Request-scoped validation state.

use std::collections::{HashSet, VecDeque};

use canopy_core::InstancePath;
use canopy_schema::Schema;
use canopy_tree::DataTree;
use canopy_validate::ValidatedChildCache;

/// Everything one edit-config request mutates: the candidate tree, the
/// validated-child cache, the queue of pending synthetic removals and
/// the bookkeeping that bounds the fixpoint loop. Constructed at request
/// start, dropped at its end, never shared.
pub struct ValidationContext<'s> {
    pub schema: &'s Schema,
    /// Clone of the committed tree with the edit applied; swapped in on
    /// acceptance, discarded on rejection.
    pub tree: DataTree,
    pub cache: ValidatedChildCache,
    pending_removals: VecDeque<InstancePath>,
    /// Subtrees already scheduled for removal. A node is removed at
    /// most once per request; this is what bounds cascades.
    removed: HashSet<InstancePath>,
    passes: usize,
    pass_cap: usize,
    next_internal_id: u64,
}

impl<'s> ValidationContext<'s> {
    pub fn new(schema: &'s Schema, tree: DataTree, pass_cap: usize) -> Self {
        Self {
            schema,
            tree,
            cache: ValidatedChildCache::new(),
            pending_removals: VecDeque::new(),
            removed: HashSet::new(),
            passes: 0,
            pass_cap,
            next_internal_id: 0,
        }
    }

    /// Queue a synthetic removal. Returns false if the subtree was
    /// already scheduled in this request.
    pub fn schedule_removal(&mut self, path: InstancePath) -> bool {
        if self.removed.contains(&path) {
            return false;
        }
        self.removed.insert(path.clone());
        self.pending_removals.push_back(path);
        true
    }

    pub fn take_removal(&mut self) -> Option<InstancePath> {
        self.pending_removals.pop_front()
    }

    /// Start a pass; `None` once the cap is exhausted.
    pub fn begin_pass(&mut self) -> Option<usize> {
        if self.passes >= self.pass_cap {
            return None;
        }
        self.passes += 1;
        Some(self.passes)
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn pass_cap(&self) -> usize {
        self.pass_cap
    }

    /// Internal message ids for synthetic edits, distinguishable from
    /// client-supplied ids.
    pub fn next_internal_id(&mut self) -> u64 {
        self.next_internal_id += 1;
        self.next_internal_id
    }

    pub fn render(&self, path: &InstancePath) -> String {
        path.render(|id| self.schema.qualified_name(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{PathSegment, SchemaNodeId};
    use canopy_schema::SchemaBuilder;

    #[test]
    fn a_subtree_is_scheduled_for_removal_at_most_once() {
        let mut b = SchemaBuilder::new();
        let m = b.add_module("t", "t").unwrap();
        b.container(m, None, "a").done().unwrap();
        let schema = b.build().unwrap();

        let mut ctx = ValidationContext::new(&schema, DataTree::new(), 4);
        let path = InstancePath::root().child(PathSegment::new(SchemaNodeId::new(0)));
        assert!(ctx.schedule_removal(path.clone()));
        assert!(!ctx.schedule_removal(path.clone()));
        assert_eq!(ctx.take_removal(), Some(path));
        assert_eq!(ctx.take_removal(), None);
    }

    #[test]
    fn passes_stop_at_the_cap() {
        let mut b = SchemaBuilder::new();
        let m = b.add_module("t", "t").unwrap();
        b.container(m, None, "a").done().unwrap();
        let schema = b.build().unwrap();

        let mut ctx = ValidationContext::new(&schema, DataTree::new(), 2);
        assert_eq!(ctx.begin_pass(), Some(1));
        assert_eq!(ctx.begin_pass(), Some(2));
        assert_eq!(ctx.begin_pass(), None);
    }
}
