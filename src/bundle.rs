use crate::audit::Files;
use anyhow::Context;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Loads every regular file under `root` as an upload, keyed by
/// its `/`-separated path relative to `root`, in sorted order.
///
/// Files containing a json object are uploaded as that object, other
/// text files as strings. Binary files are kept as `null`, so they are
/// reported but never take part in the audit.
pub fn load_dir(root: &Path) -> anyhow::Result<Files> {
    let mut paths = Vec::new();
    collect_files(root, &mut paths)
        .with_context(|| format!("failed to list {}", root.display()))?;

    let mut entries = paths
        .into_iter()
        .map(|path| {
            let key = relative_key(root, &path)?;
            let content = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let value = decode(&key, content);
            Ok((key, value))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    Ok(entries.into_iter().collect())
}

fn collect_files(dir: &Path, paths: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, paths)?;
        } else if path.is_file() {
            paths.push(path);
        }
    }
    Ok(())
}

/// Non utf-8 file names are converted lossily.
fn relative_key(root: &Path, path: &Path) -> anyhow::Result<String> {
    let relative = path.strip_prefix(root)?;
    let parts: Vec<_> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect();
    Ok(parts.join("/"))
}

fn decode(path: &str, content: Vec<u8>) -> Value {
    match String::from_utf8(content) {
        Ok(text) => match serde_json::from_str::<Value>(&text) {
            Ok(value @ Value::Object(_)) => value,
            _ => Value::String(text),
        },
        Err(_) => {
            log::debug!("{} is not a text file, uploading it as null", path);
            Value::Null
        }
    }
}
