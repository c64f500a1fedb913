//! Parser for catalog fixture files.
//!
//! Fixtures are JSON arrays exported from the remote database:
//! - items.json: shop items
//! - posts.json: community posts

use crate::error::{CatalogError, Result};
use crate::types::{Item, Post};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn parse_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| CatalogError::ParseError {
        file: file_name,
        line: e.line(),
        reason: e.to_string(),
    })
}

/// Parse the items.json file
pub fn parse_items(path: &Path) -> Result<Vec<Item>> {
    parse_json_array(path)
}

/// Parse the posts.json file
pub fn parse_posts(path: &Path) -> Result<Vec<Post>> {
    parse_json_array(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("tribe-parser-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_posts() {
        let path = write_temp(
            "posts.json",
            r#"[{"id": 1, "title": "hello", "category": "잡담", "author": "u1", "created_at": 10}]"#,
        );
        let posts = parse_posts(&path).unwrap();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].liked.is_empty());
    }

    #[test]
    fn test_parse_error_reports_line() {
        let path = write_temp("items.json", "[\n{\"id\": 1,\n\"title\": }\n]");
        match parse_items(&path) {
            Err(CatalogError::ParseError { file, line, .. }) => {
                assert_eq!(file, "items.json");
                assert_eq!(line, 3);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = parse_items(Path::new("/definitely/not/here/items.json"));
        assert!(matches!(result, Err(CatalogError::FileNotFound { .. })));
    }
}
