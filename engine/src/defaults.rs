//! The default-value injector seam.

use canopy_core::SchemaNodeId;
use canopy_schema::Schema;

/// Supplies default leaf values to materialize under a present parent.
/// The orchestrator decides the timing: a default appears only once the
/// leaf's own when condition (if any) holds.
pub trait DefaultInjector {
    /// `(child schema node, default value)` pairs for children of
    /// `parent` that carry a default.
    fn defaults_for(&self, schema: &Schema, parent: SchemaNodeId) -> Vec<(SchemaNodeId, String)>;
}

/// Injector reading the schema's own default statements.
#[derive(Debug, Default)]
pub struct SchemaDefaults;

impl DefaultInjector for SchemaDefaults {
    fn defaults_for(&self, schema: &Schema, parent: SchemaNodeId) -> Vec<(SchemaNodeId, String)> {
        schema
            .node(parent)
            .children
            .iter()
            .filter_map(|&child| {
                schema
                    .node(child)
                    .default
                    .as_ref()
                    .map(|value| (child, value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_schema::SchemaBuilder;

    #[test]
    fn schema_defaults_lists_defaulted_children_only() {
        let mut b = SchemaBuilder::new();
        let m = b.add_module("net", "net").unwrap();
        let sys = b.container(m, None, "system").done().unwrap();
        let mtu = b
            .leaf(m, Some(sys), "mtu")
            .default_value("1500")
            .done()
            .unwrap();
        b.leaf(m, Some(sys), "hostname").done().unwrap();
        let schema = b.build().unwrap();

        let defaults = SchemaDefaults.defaults_for(&schema, sys);
        assert_eq!(defaults, vec![(mtu, "1500".to_string())]);
    }
}
