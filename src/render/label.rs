//! Label construction shared by every output format

use crate::dependency::graph::{DependencyNode, Omission};

/// Label used for nodes without a coordinate
pub const MALFORMED_LABEL: &str = "(malformed node)";

/// Coordinate string using managed values, plus the optional marker.
///
/// The marker is left off when the node is omitted because it is optional,
/// since the omission text already says so.
fn base_label(node: &DependencyNode) -> Option<String> {
    let mut base = node.coordinate_string()?;
    if node.optional && node.omission() != Some(&Omission::OptionalDependency) {
        base.push_str(" (optional)");
    }
    Some(base)
}

/// Management notes followed by the omission reason
pub fn notes(node: &DependencyNode) -> Vec<String> {
    let mut notes = Vec::new();

    if node.managed_version.is_some() {
        if let Some(coordinate) = &node.coordinate {
            notes.push(format!("version managed from {}", coordinate.version));
        }
    }
    if node.managed_scope.is_some() {
        if let Some(scope) = node.scope {
            notes.push(format!("scope managed from {}", scope));
        }
    }
    if let Some(omission) = node.omission() {
        notes.push(omission.to_string());
    }

    notes
}

/// Full annotated node label, e.g. `(com.comm:a7:jar:1:compile - omitted for duplicate)`
pub fn node_label(node: &DependencyNode) -> String {
    let Some(mut label) = base_label(node) else {
        return MALFORMED_LABEL.to_string();
    };

    let notes = notes(node);
    if !notes.is_empty() {
        label.push_str(" - ");
        label.push_str(&notes.join("; "));
    }

    if node.is_omitted() {
        format!("({})", label)
    } else {
        label
    }
}

/// Edge label: the child's effective scope plus its notes
pub fn edge_label(node: &DependencyNode) -> String {
    let mut label = node
        .effective_scope()
        .map(|scope| scope.to_string())
        .unwrap_or_default();

    let notes = notes(node);
    if !notes.is_empty() {
        if !label.is_empty() {
            label.push_str(" - ");
        }
        label.push_str(&notes.join("; "));
    }

    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::coordinate::{Coordinate, DependencyDeclaration, Scope};
    use crate::dependency::graph::NodeStatus;

    fn node(scope: Scope) -> DependencyNode {
        DependencyNode::from_declaration(&DependencyDeclaration::new(
            Coordinate::new("com.comm", "a7", "jar", "1"),
            scope,
        ))
    }

    #[test]
    fn test_plain_label() {
        assert_eq!(node_label(&node(Scope::Compile)), "com.comm:a7:jar:1:compile");
        assert_eq!(edge_label(&node(Scope::Runtime)), "runtime");
    }

    #[test]
    fn test_omitted_label_is_wrapped() {
        let mut dup = node(Scope::Compile);
        dup.status = NodeStatus::Omitted(Omission::Duplicate {
            of: Coordinate::new("com.comm", "a7", "jar", "1"),
        });
        assert_eq!(
            node_label(&dup),
            "(com.comm:a7:jar:1:compile - omitted for duplicate)"
        );
        assert_eq!(edge_label(&dup), "compile - omitted for duplicate");
    }

    #[test]
    fn test_managed_notes() {
        let mut managed = node(Scope::Compile);
        managed.managed_version = Some("2".to_string());
        assert_eq!(
            node_label(&managed),
            "com.comm:a7:jar:2:compile - version managed from 1"
        );

        managed.managed_scope = Some(Scope::Runtime);
        assert_eq!(
            node_label(&managed),
            "com.comm:a7:jar:2:runtime - version managed from 1; scope managed from compile"
        );

        let mut scope_only = node(Scope::Compile);
        scope_only.managed_scope = Some(Scope::Provided);
        assert_eq!(
            node_label(&scope_only),
            "com.comm:a7:jar:1:provided - scope managed from compile"
        );
    }

    #[test]
    fn test_optional_marker() {
        let mut optional = node(Scope::Compile);
        optional.optional = true;
        optional.status = NodeStatus::Omitted(Omission::OptionalDependency);
        assert_eq!(
            node_label(&optional),
            "(com.comm:a7:jar:1:compile - omitted due to optional dependency)"
        );

        optional.status = NodeStatus::Omitted(Omission::VersionConflict {
            with: "2".to_string(),
        });
        assert_eq!(
            node_label(&optional),
            "(com.comm:a7:jar:1:compile (optional) - omitted for conflict with 2)"
        );
    }

    #[test]
    fn test_malformed_placeholder() {
        let mut malformed = DependencyNode::malformed();
        malformed.status = NodeStatus::Omitted(Omission::Malformed);
        assert_eq!(node_label(&malformed), MALFORMED_LABEL);
        assert_eq!(edge_label(&malformed), "omitted for malformed node");
    }
}
