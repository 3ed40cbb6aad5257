use serde_json::{Map, Value};

/// Caps array growth from adversarial index segments; assignments above
/// this index are dropped instead of allocating.
const MAX_ARRAY_INDEX: usize = 10_000;

/// Whether a field name encodes an array position, i.e. contains a
/// bracketed integer such as `items[0]`.
pub fn has_array_notation(name: &str) -> bool {
    let mut rest = name;
    while let Some(open) = rest.find('[') {
        rest = &rest[open + 1..];
        match rest.find(']') {
            Some(close) => {
                let inner = &rest[..close];
                if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
                    return true;
                }
            }
            None => return false,
        }
    }
    false
}

/// Decompose a bracketed field name into its path segments:
/// `"a[0][1].b"` becomes `["a", "0", "1", "b"]`.
pub fn parse_field_path(name: &str) -> Vec<String> {
    name.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Assign `value` at `path` inside `root`, creating missing containers on
/// the way: an array when the next segment is all digits, an object
/// otherwise. Existing containers are reused so earlier fields survive.
///
/// When a path runs into a value of the wrong shape (a scalar where a
/// container is needed, an array reached with a non-numeric segment) the
/// later write wins and the obstacle is replaced by a fresh container.
/// Numeric segments landing on an existing object write plain string keys.
pub fn set_nested_value(root: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        root.insert(first.clone(), value);
        return;
    }
    let child = root.entry(first.clone()).or_insert(Value::Null);
    assign(child, rest, value);
}

fn assign(container: &mut Value, path: &[String], value: Value) {
    let Some((segment, rest)) = path.split_first() else {
        return;
    };

    let numeric = is_index(segment);
    let rebuild = match container {
        Value::Object(_) => false,
        Value::Array(_) => !numeric,
        _ => true,
    };
    if rebuild {
        *container = if numeric {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }

    match container {
        Value::Array(items) => {
            let Some(index) = array_index(segment) else {
                return;
            };
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            if rest.is_empty() {
                items[index] = value;
            } else {
                assign(&mut items[index], rest, value);
            }
        }
        Value::Object(map) => {
            if rest.is_empty() {
                map.insert(segment.clone(), value);
            } else {
                assign(map.entry(segment.clone()).or_insert(Value::Null), rest, value);
            }
        }
        _ => {}
    }
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn array_index(segment: &str) -> Option<usize> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| *index <= MAX_ARRAY_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(map: &mut Map<String, Value>, path: &[&str], value: Value) {
        let path: Vec<String> = path.iter().map(|s| (*s).to_owned()).collect();
        set_nested_value(map, &path, value);
    }

    #[test]
    fn detects_bracketed_integers_only() {
        assert!(has_array_notation("a[0].b"));
        assert!(has_array_notation("a[0]"));
        assert!(has_array_notation("items[12].name"));
        assert!(has_array_notation("a[b[0]]"));
        assert!(!has_array_notation("a.b"));
        assert!(!has_array_notation("a[]"));
        assert!(!has_array_notation("a[x]"));
        assert!(!has_array_notation("a[1"));
        assert!(!has_array_notation("plain"));
    }

    #[test]
    fn splits_bracket_and_dot_segments() {
        assert_eq!(parse_field_path("a[0].b[12]"), ["a", "0", "b", "12"]);
        assert_eq!(parse_field_path("a[0][1].b"), ["a", "0", "1", "b"]);
        assert_eq!(parse_field_path("items[0].name"), ["items", "0", "name"]);
        assert_eq!(parse_field_path("plain"), ["plain"]);
        assert_eq!(parse_field_path("a..b[]"), ["a", "b"]);
    }

    #[test]
    fn numeric_next_segment_creates_an_array() {
        let mut map = Map::new();
        set(&mut map, &["items", "0", "name"], json!("x"));
        assert_eq!(Value::Object(map), json!({"items": [{"name": "x"}]}));
    }

    #[test]
    fn sibling_indices_share_the_array() {
        let mut map = Map::new();
        set(&mut map, &["tags", "0"], json!("a"));
        set(&mut map, &["tags", "1"], json!("b"));
        assert_eq!(Value::Object(map), json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn skipped_indices_pad_with_null() {
        let mut map = Map::new();
        set(&mut map, &["t", "2"], json!("c"));
        assert_eq!(Value::Object(map), json!({"t": [null, null, "c"]}));
    }

    #[test]
    fn nested_arrays_and_objects_combine() {
        let mut map = Map::new();
        set(&mut map, &["a", "0", "1", "b"], json!(7));
        assert_eq!(Value::Object(map), json!({"a": [[null, {"b": 7}]]}));
    }

    #[test]
    fn existing_values_in_other_branches_survive() {
        let mut map = Map::new();
        set(&mut map, &["a", "0", "x"], json!(1));
        set(&mut map, &["a", "0", "y"], json!(2));
        set(&mut map, &["a", "1", "x"], json!(3));
        assert_eq!(
            Value::Object(map),
            json!({"a": [{"x": 1, "y": 2}, {"x": 3}]})
        );
    }

    #[test]
    fn later_write_replaces_a_scalar_in_the_way() {
        let mut map = Map::new();
        map.insert("a".into(), json!("x"));
        set(&mut map, &["a", "0"], json!("y"));
        assert_eq!(Value::Object(map), json!({"a": ["y"]}));
    }

    #[test]
    fn non_numeric_segment_rebuilds_an_array_into_an_object() {
        let mut map = Map::new();
        set(&mut map, &["a", "0"], json!("y"));
        set(&mut map, &["a", "b"], json!("z"));
        assert_eq!(Value::Object(map), json!({"a": {"b": "z"}}));
    }

    #[test]
    fn numeric_segment_on_an_existing_object_is_a_string_key() {
        let mut map = Map::new();
        set(&mut map, &["a", "name"], json!("n"));
        set(&mut map, &["a", "0"], json!("v"));
        assert_eq!(Value::Object(map), json!({"a": {"name": "n", "0": "v"}}));
    }

    #[test]
    fn oversized_indices_are_dropped() {
        let mut map = Map::new();
        set(&mut map, &["a", "999999999"], json!("y"));
        assert_eq!(Value::Object(map), json!({"a": []}));
    }

    #[test]
    fn empty_paths_are_ignored() {
        let mut map = Map::new();
        set_nested_value(&mut map, &[], json!("x"));
        assert!(map.is_empty());
    }
}
