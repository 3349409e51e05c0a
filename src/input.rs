use ignore::WalkBuilder;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use stacq::filter::{self, Node};

pub const FILTER_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Filter(#[from] filter::Error),
}

pub fn collect_filter_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(dir)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .add_custom_ignore_filename(".stacqignore")
        .build();

    for entry in walker.flatten() {
        let path = entry.path();
        if path.is_file() && is_filter_file(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files
}

fn is_filter_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| FILTER_EXTENSIONS.contains(&ext))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

pub fn load_filter(path: &Path) -> Result<Node, InputError> {
    let content = fs::read_to_string(path)?;
    decode(&content, is_yaml(path))
}

pub fn read_stdin() -> Result<Node, InputError> {
    let mut content = String::new();
    io::stdin().lock().read_to_string(&mut content)?;
    decode(&content, false)
}

/// YAML documents are decoded into the same JSON value model before parsing.
pub fn decode(content: &str, yaml: bool) -> Result<Node, InputError> {
    if yaml {
        let value: serde_json::Value = serde_yaml::from_str(content)?;
        return Ok(filter::parse_value(&value)?);
    }
    Ok(filter::parse_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json() {
        let node = decode(r#"{"op":"isnull","args":[{"property":"a"}]}"#, false).unwrap();
        assert_eq!(node, Node::is_null("a"));
    }

    #[test]
    fn test_decode_yaml() {
        let content = r#"
op: and
args:
  - op: "="
    args: [{property: status}, published]
  - op: ">"
    args: [{property: gsd}, 10]
"#;
        let node = decode(content, true).unwrap();
        assert_eq!(
            node,
            Node::And(vec![Node::eq("status", "published"), Node::gt("gsd", 10)])
        );
    }

    #[test]
    fn test_decode_reports_filter_error() {
        let err = decode("not json", false).unwrap_err();
        assert!(matches!(err, InputError::Filter(filter::Error::MalformedInput(_))));
    }

    #[test]
    fn test_collect_filter_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.json"), "{}").unwrap();
        fs::write(root.join("b.yaml"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::create_dir(root.join("skip")).unwrap();
        fs::write(root.join("skip").join("c.json"), "{}").unwrap();
        fs::write(root.join(".stacqignore"), "skip/\n").unwrap();

        let files = collect_filter_files(root);
        assert_eq!(files, vec![root.join("a.json"), root.join("b.yaml")]);
    }
}
