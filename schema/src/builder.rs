//! SchemaBuilder for constructing an immutable Schema.

use std::collections::HashMap;

use canopy_core::{ModuleId, SchemaNodeId};
use canopy_xpath::Expr;
use regex_lite::Regex;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;
use crate::types::{Constraint, ConstraintKind, Identity, Module, NodeKind, SchemaNode};

/// Builder for constructing an immutable Schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    modules: Vec<Module>,
    prefixes: HashMap<String, ModuleId>,
    nodes: Vec<SchemaNode>,
    roots: Vec<SchemaNodeId>,
    identities: HashMap<String, Identity>,
}

impl SchemaBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module with its expression prefix.
    pub fn add_module(
        &mut self,
        name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> SchemaResult<ModuleId> {
        let name = name.into();
        let prefix = prefix.into();
        if self.modules.iter().any(|m| m.name == name) || self.prefixes.contains_key(&prefix) {
            return Err(SchemaError::DuplicateModule(name));
        }
        let id = ModuleId::new(self.modules.len() as u16);
        self.prefixes.insert(prefix.clone(), id);
        self.modules.push(Module { id, name, prefix });
        Ok(id)
    }

    /// Add an identity. Bases must already exist unless empty.
    pub fn add_identity(
        &mut self,
        name: impl Into<String>,
        bases: &[&str],
    ) -> SchemaResult<()> {
        let name = name.into();
        for base in bases {
            if !self.identities.contains_key(*base) {
                return Err(SchemaError::UnknownBaseIdentity(base.to_string()));
            }
        }
        self.identities.insert(
            name.clone(),
            Identity {
                name,
                bases: bases.iter().map(|b| b.to_string()).collect(),
            },
        );
        Ok(())
    }

    /// Start a container node.
    pub fn container(
        &mut self,
        module: ModuleId,
        parent: Option<SchemaNodeId>,
        name: impl Into<String>,
    ) -> NodeBuilder<'_> {
        self.node_builder(module, parent, name, NodeKind::Container)
    }

    /// Start a list node with its key leaf names.
    pub fn list(
        &mut self,
        module: ModuleId,
        parent: Option<SchemaNodeId>,
        name: impl Into<String>,
        keys: &[&str],
    ) -> NodeBuilder<'_> {
        self.node_builder(
            module,
            parent,
            name,
            NodeKind::List {
                keys: keys.iter().map(|k| k.to_string()).collect(),
            },
        )
    }

    /// Start a leaf node.
    pub fn leaf(
        &mut self,
        module: ModuleId,
        parent: Option<SchemaNodeId>,
        name: impl Into<String>,
    ) -> NodeBuilder<'_> {
        self.node_builder(module, parent, name, NodeKind::Leaf)
    }

    /// Start a leaf-list node. Sibling entries may never share a value;
    /// the builder attaches the uniqueness constraint itself.
    pub fn leaf_list(
        &mut self,
        module: ModuleId,
        parent: Option<SchemaNodeId>,
        name: impl Into<String>,
    ) -> NodeBuilder<'_> {
        self.node_builder(module, parent, name, NodeKind::LeafList)
    }

    fn node_builder(
        &mut self,
        module: ModuleId,
        parent: Option<SchemaNodeId>,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> NodeBuilder<'_> {
        NodeBuilder {
            builder: self,
            module,
            parent,
            name: name.into(),
            kind,
            when: None,
            musts: Vec::new(),
            uniques: Vec::new(),
            mandatory: false,
            default: None,
            enumeration: Vec::new(),
            range: None,
            pattern: None,
            identity_base: None,
            leafref: None,
            instance_identifier: None,
        }
    }

    /// Build the immutable Schema.
    pub fn build(self) -> SchemaResult<Schema> {
        // Key and unique leafs can only be checked once all children exist.
        for node in &self.nodes {
            if let NodeKind::List { keys } = &node.kind {
                for key in keys {
                    if !self.has_child(node, key) {
                        return Err(SchemaError::MissingKeyLeaf {
                            list: node.name.clone(),
                            key: key.clone(),
                        });
                    }
                }
                for constraint in &node.constraints {
                    if let ConstraintKind::Unique { leafs } = &constraint.kind {
                        for leaf in leafs {
                            if !self.has_child(node, leaf) {
                                return Err(SchemaError::UnknownUniqueLeaf {
                                    list: node.name.clone(),
                                    leaf: leaf.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }

        Ok(Schema::new(
            self.modules,
            self.prefixes,
            self.nodes,
            self.roots,
            self.identities,
        ))
    }

    fn has_child(&self, node: &SchemaNode, name: &str) -> bool {
        node.children
            .iter()
            .any(|&c| self.nodes[c.raw() as usize].name == name)
    }
}

/// Builder for one schema node.
pub struct NodeBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    module: ModuleId,
    parent: Option<SchemaNodeId>,
    name: String,
    kind: NodeKind,
    when: Option<String>,
    musts: Vec<String>,
    uniques: Vec<Vec<String>>,
    mandatory: bool,
    default: Option<String>,
    enumeration: Vec<(String, i64)>,
    range: Option<(f64, f64)>,
    pattern: Option<String>,
    identity_base: Option<String>,
    leafref: Option<(String, bool)>,
    instance_identifier: Option<bool>,
}

impl<'a> NodeBuilder<'a> {
    /// Attach a when (existence) condition.
    pub fn when(mut self, expr: impl Into<String>) -> Self {
        self.when = Some(expr.into());
        self
    }

    /// Attach a must (integrity) condition. May be repeated.
    pub fn must(mut self, expr: impl Into<String>) -> Self {
        self.musts.push(expr.into());
        self
    }

    /// Attach a unique clause (lists only): no two entries may share the
    /// combined values of the named leafs.
    pub fn unique(mut self, leafs: &[&str]) -> Self {
        self.uniques
            .push(leafs.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Mark a leaf as mandatory under its parent.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Default value, injected once the governing when (if any) is true.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Declare an enumeration type with explicit numeric values.
    pub fn enumeration(mut self, values: &[(&str, i64)]) -> Self {
        self.enumeration = values
            .iter()
            .map(|(n, v)| (n.to_string(), *v))
            .collect();
        self
    }

    /// Declare numeric bounds.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Declare a string pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Declare an identityref type with its base identity.
    pub fn identityref(mut self, base: impl Into<String>) -> Self {
        self.identity_base = Some(base.into());
        self
    }

    /// Declare a leafref type; the target instance must exist.
    pub fn leafref(mut self, target: impl Into<String>) -> Self {
        self.leafref = Some((target.into(), true));
        self
    }

    /// Declare a leafref type with `require-instance false`.
    pub fn leafref_no_require(mut self, target: impl Into<String>) -> Self {
        self.leafref = Some((target.into(), false));
        self
    }

    /// Declare an instance-identifier type.
    pub fn instance_identifier(mut self) -> Self {
        self.instance_identifier = Some(true);
        self
    }

    /// Finish building this node.
    pub fn done(self) -> SchemaResult<SchemaNodeId> {
        let siblings: &[SchemaNodeId] = match self.parent {
            Some(p) => {
                if p.raw() as usize >= self.builder.nodes.len() {
                    return Err(SchemaError::UnknownParent(p.to_string()));
                }
                &self.builder.nodes[p.raw() as usize].children
            }
            None => &self.builder.roots,
        };
        if siblings
            .iter()
            .any(|&s| self.builder.nodes[s.raw() as usize].name == self.name)
        {
            let parent_name = match self.parent {
                Some(p) => self.builder.nodes[p.raw() as usize].name.clone(),
                None => "/".to_string(),
            };
            return Err(SchemaError::duplicate_node(parent_name, self.name));
        }

        let mut constraints = Vec::new();
        if let Some(text) = &self.when {
            constraints.push(Constraint {
                kind: ConstraintKind::When,
                expr: Some(parse_expr(&self.name, text)?),
                text: text.clone(),
            });
        }
        for text in &self.musts {
            constraints.push(Constraint {
                kind: ConstraintKind::Must,
                expr: Some(parse_expr(&self.name, text)?),
                text: text.clone(),
            });
        }
        if let Some((target, require_instance)) = &self.leafref {
            constraints.push(Constraint {
                kind: ConstraintKind::Leafref {
                    require_instance: *require_instance,
                },
                expr: Some(parse_expr(&self.name, target)?),
                text: target.clone(),
            });
        }
        if let Some(base) = &self.identity_base {
            constraints.push(Constraint {
                kind: ConstraintKind::Identity { base: base.clone() },
                text: base.clone(),
                expr: None,
            });
        }
        if let Some(require_instance) = self.instance_identifier {
            constraints.push(Constraint {
                kind: ConstraintKind::InstanceIdentifier { require_instance },
                text: "instance-identifier".to_string(),
                expr: None,
            });
        }
        if let Some((min, max)) = self.range {
            constraints.push(Constraint {
                kind: ConstraintKind::Range { min, max },
                text: format!("{}..{}", min, max),
                expr: None,
            });
        }
        if let Some(pattern) = &self.pattern {
            let regex = Regex::new(&anchor(pattern)).map_err(|_| SchemaError::InvalidPattern {
                node: self.name.clone(),
                pattern: pattern.clone(),
            })?;
            constraints.push(Constraint {
                kind: ConstraintKind::Pattern { regex },
                text: pattern.clone(),
                expr: None,
            });
        }
        for leafs in &self.uniques {
            constraints.push(Constraint {
                kind: ConstraintKind::Unique {
                    leafs: leafs.clone(),
                },
                text: leafs.join(" "),
                expr: None,
            });
        }
        if matches!(self.kind, NodeKind::LeafList) {
            constraints.push(Constraint {
                kind: ConstraintKind::Unique { leafs: Vec::new() },
                text: ".".to_string(),
                expr: None,
            });
        }
        if self.mandatory {
            constraints.push(Constraint {
                kind: ConstraintKind::Mandatory,
                text: self.name.clone(),
                expr: None,
            });
        }

        let id = SchemaNodeId::new(self.builder.nodes.len() as u32);
        self.builder.nodes.push(SchemaNode {
            id,
            module: self.module,
            name: self.name,
            parent: self.parent,
            children: Vec::new(),
            kind: self.kind,
            constraints,
            default: self.default,
            enumeration: self.enumeration,
        });
        match self.parent {
            Some(p) => self.builder.nodes[p.raw() as usize].children.push(id),
            None => self.builder.roots.push(id),
        }
        Ok(id)
    }
}

fn parse_expr(node: &str, text: &str) -> SchemaResult<Expr> {
    canopy_xpath::parse(text).map_err(|e| SchemaError::invalid_expression(node, text, e))
}

/// Schema patterns match the whole value.
fn anchor(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}
