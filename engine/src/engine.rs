//! The validation orchestrator: passes, impact expansion, cascades.

use std::collections::HashSet;
use std::fmt;

use canopy_core::{InstancePath, SchemaNodeId};
use canopy_eval::Evaluator;
use canopy_impact::ImpactIndex;
use canopy_schema::Schema;
use canopy_tree::{apply, ChangeNode, ChangeTree, DataTree, NodeIndex, TreeError};
use canopy_validate::{
    when_state, AppTag, CheckOutcome, Checker, ErrorRecord, ErrorTag, Reporter,
};
use tracing::debug;

use crate::context::ValidationContext;
use crate::defaults::{DefaultInjector, SchemaDefaults};

/// Id of a synthetic secondary edit. Internal ids live in their own
/// namespace so they can never collide with client message ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal-{}", self.0)
    }
}

/// A cascading implicit deletion, emitted on acceptance for the
/// surrounding system to apply and audit: a precise remove of exactly
/// the subtree whose when condition went false.
#[derive(Debug, Clone)]
pub struct SyntheticEdit {
    pub message_id: MessageId,
    pub change: ChangeTree,
}

/// Verdict on one edit request.
#[derive(Debug)]
pub enum Outcome {
    Accepted {
        /// The committed-to-be tree, defaults included.
        tree: DataTree,
        synthetic_edits: Vec<SyntheticEdit>,
        passes: usize,
    },
    Rejected {
        errors: Vec<ErrorRecord>,
    },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }
}

/// Validates edit requests against a schema. Holds the impact index,
/// built once; each `validate` call stages its own candidate tree.
pub struct Engine<'s> {
    schema: &'s Schema,
    impact: ImpactIndex,
    injector: Box<dyn DefaultInjector + 's>,
}

impl<'s> Engine<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_injector(schema, Box::new(SchemaDefaults))
    }

    pub fn with_injector(schema: &'s Schema, injector: Box<dyn DefaultInjector + 's>) -> Self {
        Self {
            schema,
            impact: ImpactIndex::build(schema),
            injector,
        }
    }

    pub fn impact(&self) -> &ImpactIndex {
        &self.impact
    }

    /// Validate one edit against the committed tree. Any hard failure
    /// rejects the whole edit; nothing is partially applied.
    pub fn validate(&self, committed: &DataTree, edit: &ChangeTree) -> Outcome {
        // One pass per impact-covered schema node is enough for any
        // acyclic cascade; the extra pass confirms the fixpoint. A
        // cyclic when-dependency exhausts the cap instead of hanging.
        let cap = self.impact.covered_nodes().max(1) + 1;
        let mut ctx = ValidationContext::new(self.schema, committed.clone(), cap);
        let reporter = Reporter::new(self.schema);

        let applied = match apply(&mut ctx.tree, self.schema, edit) {
            Ok(applied) => applied,
            Err(e) => {
                return Outcome::Rejected {
                    errors: vec![structural_error(e)],
                }
            }
        };
        let explicit: HashSet<NodeIndex> = applied.explicit.iter().copied().collect();

        let mut synthetic_edits = Vec::new();
        let mut seen = HashSet::new();
        let mut dirty: Vec<NodeIndex> = Vec::new();
        for &node in applied.touched.iter().chain(applied.explicit.iter()) {
            collect_dirty(&mut ctx, node, &mut seen, &mut dirty);
        }
        let mut deleted: Vec<(SchemaNodeId, InstancePath)> = applied.deleted;

        while !dirty.is_empty() || !deleted.is_empty() {
            let pass = match ctx.begin_pass() {
                Some(p) => p,
                None => {
                    return Outcome::Rejected {
                        errors: vec![reporter.record(
                            ErrorTag::OperationFailed,
                            None,
                            format!(
                                "Validation did not converge within {} passes.",
                                ctx.pass_cap()
                            ),
                            "/",
                        )],
                    }
                }
            };
            debug!(
                pass,
                dirty = dirty.len(),
                deleted = deleted.len(),
                "validation pass"
            );

            for injected in self.inject_defaults(&mut ctx) {
                if seen.insert(injected) {
                    dirty.push(injected);
                }
            }

            // Evaluation phase: direct constraints on the delta, then
            // the instances the impact index says may depend on it.
            let mut removals: Vec<InstancePath> = Vec::new();
            {
                let chk = Checker::new(self.schema, &ctx.tree);
                let mut queue: Vec<(NodeIndex, Option<usize>)> =
                    dirty.iter().map(|&n| (n, None)).collect();
                for &node in &dirty {
                    if let Some(sid) = ctx.tree.schema_of(node) {
                        for imp in self.impact.resolve(self.schema, &ctx.tree, sid, Some(node)) {
                            queue.push((imp.node, Some(imp.constraint_index)));
                        }
                    }
                }
                for (sid, _) in &deleted {
                    for imp in self.impact.resolve(self.schema, &ctx.tree, *sid, None) {
                        queue.push((imp.node, Some(imp.constraint_index)));
                    }
                }

                let mut done = HashSet::new();
                for (node, constraint) in queue {
                    if !done.insert((node, constraint)) || !ctx.tree.contains(node) {
                        continue;
                    }
                    let outcome = match constraint {
                        Some(index) => chk.check(node, index),
                        None => chk.check_node(node),
                    };
                    match outcome {
                        CheckOutcome::Pass => {}
                        CheckOutcome::Violation(record) => {
                            return Outcome::Rejected {
                                errors: vec![record],
                            }
                        }
                        CheckOutcome::WhenFalse => {
                            // A true-to-false transition on a subtree the
                            // edit explicitly names is a hard conflict. A
                            // node that only exists from prior state, or
                            // one just created under an already-false
                            // when, is silently removed instead.
                            let path = ctx.tree.path_of(self.schema, node);
                            let preexisting =
                                committed.find_by_path(self.schema, &path).is_some();
                            if preexisting && explicit.contains(&node) {
                                return Outcome::Rejected {
                                    errors: vec![self.when_violation(&ctx, node)],
                                };
                            }
                            removals.push(path);
                        }
                    }
                }

                // Structural phase: mandatory children under touched
                // parents and parents that just lost a child.
                let mut parents: Vec<NodeIndex> = dirty
                    .iter()
                    .copied()
                    .filter(|&n| {
                        ctx.tree
                            .schema_of(n)
                            .map(|sid| !self.schema.node(sid).kind.is_leafy())
                            .unwrap_or(false)
                    })
                    .collect();
                for (_, path) in &deleted {
                    if path.len() > 1 {
                        let parent_path = InstancePath::from_segments(
                            path.segments()[..path.len() - 1].to_vec(),
                        );
                        if let Some(p) = ctx.tree.find_by_path(self.schema, &parent_path) {
                            parents.push(p);
                        }
                    }
                }
                let mut checked = HashSet::new();
                for parent in parents {
                    if !checked.insert(parent) {
                        continue;
                    }
                    if let Some(record) = chk.missing_mandatory(parent).into_iter().next() {
                        return Outcome::Rejected {
                            errors: vec![record],
                        };
                    }
                }
            }

            // Mutation phase: apply the scheduled removals; their
            // deltas drive the next pass.
            dirty.clear();
            seen.clear();
            deleted.clear();
            for path in removals {
                ctx.schedule_removal(path);
            }
            while let Some(path) = ctx.take_removal() {
                let change = removal_change(&path);
                if let Ok(out) = apply(&mut ctx.tree, self.schema, &change) {
                    deleted.extend(out.deleted);
                }
                let id = MessageId(ctx.next_internal_id());
                debug!(message_id = %id, path = %ctx.render(&path), "synthetic removal");
                synthetic_edits.push(SyntheticEdit {
                    message_id: id,
                    change,
                });
            }
        }

        let passes = ctx.passes();
        Outcome::Accepted {
            tree: ctx.tree,
            synthetic_edits,
            passes,
        }
    }

    /// Materialize defaults for present parents. A default leaf only
    /// appears once its own when condition (if any) holds.
    fn inject_defaults(&self, ctx: &mut ValidationContext) -> Vec<NodeIndex> {
        let evaluator = Evaluator::new(self.schema);
        let mut injected = Vec::new();
        for node in ctx.tree.preorder() {
            let sid = match ctx.tree.schema_of(node) {
                Some(s) => s,
                None => continue,
            };
            if self.schema.node(sid).kind.is_leafy() {
                continue;
            }
            for (child_schema, value) in self.injector.defaults_for(self.schema, sid) {
                let exists = ctx
                    .tree
                    .children(node)
                    .iter()
                    .any(|&c| ctx.tree.schema_of(c) == Some(child_schema));
                if exists {
                    continue;
                }
                let idx = ctx.tree.add(Some(node), child_schema, Some(value));
                let keep = match when_state(&evaluator, &ctx.tree, idx) {
                    Ok(state) => state.permits(),
                    Err(e) => {
                        debug!(error = %e, "default dropped: when evaluation failed");
                        false
                    }
                };
                if keep {
                    injected.push(idx);
                } else {
                    ctx.tree.remove_subtree(idx);
                }
            }
        }
        injected
    }

    fn when_violation(&self, ctx: &ValidationContext, node: NodeIndex) -> ErrorRecord {
        let reporter = Reporter::new(self.schema);
        let text = ctx
            .tree
            .schema_of(node)
            .and_then(|sid| self.schema.node(sid).when())
            .map(|c| c.text.clone())
            .unwrap_or_default();
        reporter.at_node(
            &ctx.tree,
            node,
            ErrorTag::UnknownElement,
            Some(AppTag::WhenViolation),
            format!("When condition \"{}\" not satisfied.", text),
        )
    }
}

/// Instances worth validating under a changed or explicitly named node:
/// the node itself plus descendants whose schema subtree carries any
/// constraint, pruned through the validated-child cache.
fn collect_dirty(
    ctx: &mut ValidationContext,
    node: NodeIndex,
    seen: &mut HashSet<NodeIndex>,
    out: &mut Vec<NodeIndex>,
) {
    if !ctx.tree.contains(node) || !seen.insert(node) {
        return;
    }
    out.push(node);
    let parent_schema = match ctx.tree.schema_of(node) {
        Some(s) => s,
        None => return,
    };
    for child in ctx.tree.children(node).to_vec() {
        let child_schema = match ctx.tree.schema_of(child) {
            Some(s) => s,
            None => continue,
        };
        if ctx
            .cache
            .subtree_has_constraints(ctx.schema, parent_schema, child_schema)
        {
            collect_dirty(ctx, child, seen, out);
        }
    }
}

/// A change tree performing one precise remove at `path`: merge
/// selectors down the ancestry, remove at the leaf segment.
fn removal_change(path: &InstancePath) -> ChangeTree {
    let segments = path.segments();
    let last = match segments.last() {
        Some(s) => s,
        None => return ChangeTree::new(),
    };
    let mut node = with_selector(ChangeNode::remove(last.node), &last.keys);
    for segment in segments[..segments.len() - 1].iter().rev() {
        node = with_selector(ChangeNode::merge(segment.node), &segment.keys).child(node);
    }
    ChangeTree::new().edit(node)
}

fn with_selector(mut node: ChangeNode, keys: &[(String, String)]) -> ChangeNode {
    for (name, value) in keys {
        if name == "." {
            node = node.value(value.clone());
        } else {
            node = node.key(name.clone(), value.clone());
        }
    }
    node
}

fn structural_error(error: TreeError) -> ErrorRecord {
    match error {
        TreeError::CreateExists { path } => ErrorRecord {
            tag: ErrorTag::OperationFailed,
            app_tag: None,
            message: "Instance already exists.".to_string(),
            path,
        },
        TreeError::DeleteMissing { path } => ErrorRecord {
            tag: ErrorTag::DataMissing,
            app_tag: None,
            message: "Instance does not exist.".to_string(),
            path,
        },
        TreeError::UnknownChild { path, child } => ErrorRecord {
            tag: ErrorTag::UnknownElement,
            app_tag: None,
            message: format!("Unknown element \"{}\".", child),
            path,
        },
        TreeError::MissingKey { path, key } => ErrorRecord {
            tag: ErrorTag::OperationFailed,
            app_tag: None,
            message: format!("List key \"{}\" is missing.", key),
            path,
        },
        TreeError::StaleIndex { .. } => ErrorRecord {
            tag: ErrorTag::OperationFailed,
            app_tag: None,
            message: "Reference to a removed node.".to_string(),
            path: "/".to_string(),
        },
    }
}
