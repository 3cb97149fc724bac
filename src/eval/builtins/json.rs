//! JSON builtin functions.
//!
//! `JSON_EXTRACT(doc, path, ...)` pulls values out of a JSON document with
//! a small path language: `$` for the root, `.key` for object members,
//! `[N]` for array elements and `.*`/`[*]` to fan out over all members or
//! elements. A path that compiles but matches nothing yields null; a path
//! that does not compile is an error.

use serde_json::Value;

use crate::error::{MiniqlError, MiniqlResult};

/// Call a JSON function. Returns None if function not found.
pub fn call(name: &str, args: &[Value]) -> MiniqlResult<Option<Value>> {
    let result = match name {
        "JSON_EXTRACT" => {
            if args.len() < 2 {
                return Err(MiniqlError::Execution(format!(
                    "JSON_EXTRACT expects at least 2 arguments, got {}",
                    args.len()
                )));
            }

            let doc = unmarshal_doc(&args[0])?;

            let mut results = Vec::with_capacity(args.len() - 1);
            for path_arg in &args[1..] {
                let raw = path_arg.as_str().ok_or_else(|| {
                    MiniqlError::Execution("JSON_EXTRACT: path must be a string".to_string())
                })?;
                let path = compile_path(raw)?;
                // Lookup misses are not errors, they yield null.
                results.push(lookup(&doc, &path).unwrap_or(Value::Null));
            }

            if results.len() == 1 {
                Some(results.remove(0))
            } else {
                Some(Value::Array(results))
            }
        }

        _ => None,
    };

    Ok(result)
}

/// The document argument may be a JSON value or a JSON-encoded string.
fn unmarshal_doc(value: &Value) -> MiniqlResult<Value> {
    match value {
        Value::String(s) => serde_json::from_str(s).map_err(|e| {
            MiniqlError::Execution(format!("JSON_EXTRACT: invalid JSON document: {}", e))
        }),
        other => Ok(other.clone()),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PathStep {
    Key(String),
    Index(usize),
    Wildcard,
}

/// Compile a `$`-rooted path into its steps.
fn compile_path(path: &str) -> MiniqlResult<Vec<PathStep>> {
    let bad = |detail: &str| {
        MiniqlError::Execution(format!("JSON_EXTRACT: invalid path \"{}\": {}", path, detail))
    };

    let mut chars = path.chars().peekable();
    if chars.next() != Some('$') {
        return Err(bad("must start with \"$\""));
    }

    let mut steps = Vec::new();
    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    steps.push(PathStep::Wildcard);
                    continue;
                }
                let mut key = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '.' || c == '[' {
                        break;
                    }
                    key.push(c);
                    chars.next();
                }
                if key.is_empty() {
                    return Err(bad("empty member name"));
                }
                steps.push(PathStep::Key(key));
            }

            '[' => {
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(c) => inner.push(c),
                        None => return Err(bad("unclosed \"[\"")),
                    }
                }
                if inner == "*" {
                    steps.push(PathStep::Wildcard);
                } else {
                    let index: usize = inner
                        .parse()
                        .map_err(|_| bad("array index must be a number or \"*\""))?;
                    steps.push(PathStep::Index(index));
                }
            }

            other => return Err(bad(&format!("unexpected character \"{}\"", other))),
        }
    }

    Ok(steps)
}

/// Walk the steps; `None` means the path matched nothing.
fn lookup(value: &Value, steps: &[PathStep]) -> Option<Value> {
    let Some(step) = steps.first() else {
        return Some(value.clone());
    };
    let rest = &steps[1..];

    match step {
        PathStep::Key(key) => lookup(value.get(key.as_str())?, rest),
        PathStep::Index(i) => lookup(value.get(i)?, rest),
        PathStep::Wildcard => {
            let children: Vec<&Value> = match value {
                Value::Array(arr) => arr.iter().collect(),
                Value::Object(obj) => obj.values().collect(),
                _ => return None,
            };
            let matches: Vec<Value> = children
                .into_iter()
                .filter_map(|child| lookup(child, rest))
                .collect();
            if matches.is_empty() {
                None
            } else {
                Some(Value::Array(matches))
            }
        }
    }
}
