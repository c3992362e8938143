use crate::{Condition, Node, RuleSet};

/// Replace every descendant that is a plain one-child `and` ruleset with its
/// only child. The root itself is kept, as are negated, named and explicitly
/// parenthesized nodes.
#[must_use]
pub fn simplify(mut rs: RuleSet) -> RuleSet {
    rs.rules = rs.rules.into_iter().map(simplify_node).collect();
    rs
}

fn simplify_node(node: Node) -> Node {
    match node {
        Node::Rule(rule) => Node::Rule(rule),
        Node::RuleSet(inner) => {
            let mut inner = simplify(inner);
            if inner.condition == Condition::And && inner.rules.len() == 1 && inner.is_plain() {
                if let Some(only) = inner.rules.pop() {
                    return only;
                }
            }
            Node::RuleSet(inner)
        }
    }
}
