use alloy_primitives::I256;
use serde_json::Value;
use tracing::debug;

/// Marker solc puts in a node's `type` string for integer literals, e.g.
/// `"int_const 42"`. The value follows the marker; tied to the solc output
/// schema, so verify against the targeted compiler version when bumping it.
const INT_CONST_TAG: &str = "int_const ";

/// Mine every integer literal out of a compiled syntax tree.
///
/// The result is a seed pool, not a set: duplicates are preserved and the
/// order is traversal-dependent. A `type` marker that carries the tag but
/// does not parse as a signed decimal means our schema assumption is stale,
/// which is a bug, not an input problem, so it panics.
pub fn extract_constants(ast: &Value) -> Vec<I256> {
    let mut found = Vec::new();
    walk(ast, &mut found);
    debug!("mined {} integer literals: {:?}", found.len(), found);
    found
}

fn walk(node: &Value, found: &mut Vec<I256>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(ty)) = map.get("type") {
                if let Some(rest) = ty.strip_prefix(INT_CONST_TAG) {
                    let value = rest.parse::<I256>().unwrap_or_else(|e| {
                        panic!("malformed integer literal marker {ty:?}: {e}")
                    });
                    found.push(value);
                }
            }
            for child in map.values() {
                walk(child, found);
            }
        }
        Value::Array(items) => {
            for child in items {
                walk(child, found);
            }
        }
        // String/number/bool/null leaves carry no literal markers themselves.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mine(v: Value) -> Vec<I256> {
        extract_constants(&v)
    }

    fn sorted(mut values: Vec<I256>) -> Vec<I256> {
        values.sort();
        values
    }

    fn nums(ns: &[i64]) -> Vec<I256> {
        ns.iter().map(|&n| I256::try_from(n).unwrap()).collect()
    }

    #[test]
    fn finds_nested_constants() {
        let ast = json!({
            "type": "int_const 42",
            "nested": [{"type": "int_const 7"}]
        });
        assert_eq!(sorted(mine(ast)), nums(&[7, 42]));
    }

    #[test]
    fn invariant_to_key_order_and_array_wrapping() {
        let a = json!({
            "type": "int_const 1",
            "children": [{"attributes": {"type": "int_const 2"}}]
        });
        let b = json!([[{
            "children": [{"attributes": {"type": "int_const 2"}}],
            "type": "int_const 1"
        }]]);
        assert_eq!(sorted(mine(a)), sorted(mine(b)));
    }

    #[test]
    fn duplicates_are_preserved() {
        let ast = json!([
            {"type": "int_const 5"},
            {"type": "int_const 5"},
            {"type": "int_const 5"}
        ]);
        assert_eq!(sorted(mine(ast)), nums(&[5, 5, 5]));
    }

    #[test]
    fn negative_and_large_values_parse() {
        let ast = json!([
            {"type": "int_const -3"},
            {"type": "int_const 340282366920938463463374607431768211456"}
        ]);
        let found = mine(ast);
        assert!(found.contains(&I256::try_from(-3i64).unwrap()));
        assert!(found.contains(&"340282366920938463463374607431768211456".parse().unwrap()));
    }

    #[test]
    fn non_marker_nodes_contribute_nothing() {
        let ast = json!({
            "type": "uint256",
            "value": 9,
            "name": "int_const 9",
            "children": [null, true, "int_const 9", 3.5]
        });
        assert!(mine(ast).is_empty());
    }

    #[test]
    #[should_panic(expected = "malformed integer literal marker")]
    fn unparseable_marker_fails_loudly() {
        mine(json!({"type": "int_const forty-two"}));
    }
}
