//! JSON-patch style path operations
//!
//! The op-list patch form: a YAML sequence of `{op, path, value}` entries
//! with `add`, `replace` and `remove` ops and RFC 6901 pointer paths
//! (`/spec/replicas`, `/spec/template/spec/containers/0/image`, trailing
//! `-` appends to a sequence).

use serde::Deserialize;
use serde_yaml_ng::Value;

/// One path operation
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    Add { path: String, value: Value },
    Replace { path: String, value: Value },
    Remove { path: String },
}

#[derive(Debug, Deserialize)]
struct RawOp {
    op: String,
    path: String,
    #[serde(default)]
    value: Option<Value>,
}

/// Parse an op-list patch body. The caller supplies error context.
pub fn parse_ops(body: &Value) -> Result<Vec<PatchOp>, String> {
    let raw: Vec<RawOp> = serde_yaml_ng::from_value(body.clone())
        .map_err(|e| format!("op list did not parse: {}", e))?;

    raw.into_iter()
        .map(|r| match r.op.as_str() {
            "add" => {
                let value = r.value.ok_or_else(|| format!("'add' at {} needs a value", r.path))?;
                Ok(PatchOp::Add { path: r.path, value })
            }
            "replace" => {
                let value = r
                    .value
                    .ok_or_else(|| format!("'replace' at {} needs a value", r.path))?;
                Ok(PatchOp::Replace { path: r.path, value })
            }
            "remove" => Ok(PatchOp::Remove { path: r.path }),
            other => Err(format!("unsupported op '{}'", other)),
        })
        .collect()
}

/// Apply ops in order; any failure aborts the whole patch.
pub fn apply_ops(target: &mut Value, ops: &[PatchOp]) -> Result<(), String> {
    for op in ops {
        match op {
            PatchOp::Add { path, value } => add(target, path, value.clone())?,
            PatchOp::Replace { path, value } => replace(target, path, value.clone())?,
            PatchOp::Remove { path } => remove(target, path)?,
        }
    }
    Ok(())
}

fn split_pointer(path: &str) -> Result<Vec<String>, String> {
    if !path.starts_with('/') {
        return Err(format!("path '{}' must start with '/'", path));
    }
    Ok(path[1..]
        .split('/')
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect())
}

/// Walk to the parent of the addressed location.
fn walk<'a>(target: &'a mut Value, segments: &[String], path: &str) -> Result<&'a mut Value, String> {
    let mut current = target;
    for segment in segments {
        current = match current {
            Value::Mapping(map) => map
                .get_mut(Value::from(segment.as_str()))
                .ok_or_else(|| format!("path '{}' not found (missing '{}')", path, segment))?,
            Value::Sequence(seq) => {
                let idx: usize = segment
                    .parse()
                    .map_err(|_| format!("path '{}': '{}' is not an index", path, segment))?;
                seq.get_mut(idx)
                    .ok_or_else(|| format!("path '{}': index {} out of bounds", path, idx))?
            }
            _ => return Err(format!("path '{}': '{}' is not addressable", path, segment)),
        };
    }
    Ok(current)
}

fn add(target: &mut Value, path: &str, value: Value) -> Result<(), String> {
    let segments = split_pointer(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| format!("path '{}' is empty", path))?;
    let parent = walk(target, parents, path)?;
    match parent {
        Value::Mapping(map) => {
            map.insert(Value::from(last.as_str()), value);
            Ok(())
        }
        Value::Sequence(seq) => {
            if last == "-" {
                seq.push(value);
                return Ok(());
            }
            let idx: usize = last
                .parse()
                .map_err(|_| format!("path '{}': '{}' is not an index", path, last))?;
            if idx > seq.len() {
                return Err(format!("path '{}': index {} out of bounds", path, idx));
            }
            seq.insert(idx, value);
            Ok(())
        }
        _ => Err(format!("path '{}': parent is not a container", path)),
    }
}

fn replace(target: &mut Value, path: &str, value: Value) -> Result<(), String> {
    let segments = split_pointer(path)?;
    let slot = walk(target, &segments, path)?;
    *slot = value;
    Ok(())
}

fn remove(target: &mut Value, path: &str) -> Result<(), String> {
    let segments = split_pointer(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| format!("path '{}' is empty", path))?;
    let parent = walk(target, parents, path)?;
    match parent {
        Value::Mapping(map) => map
            .remove(Value::from(last.as_str()))
            .map(|_| ())
            .ok_or_else(|| format!("path '{}' not found", path)),
        Value::Sequence(seq) => {
            let idx: usize = last
                .parse()
                .map_err(|_| format!("path '{}': '{}' is not an index", path, last))?;
            if idx >= seq.len() {
                return Err(format!("path '{}': index {} out of bounds", path, idx));
            }
            seq.remove(idx);
            Ok(())
        }
        _ => Err(format!("path '{}': parent is not a container", path)),
    }
}
