//! Parser for TasteTrail snapshot files.
//!
//! A snapshot directory holds one JSON Lines file per entity type:
//! - users.jsonl: one `User` object per line
//! - recipes.jsonl: one `Recipe` object per line (ingredients embedded)
//! - restaurants.jsonl: one `Restaurant` object per line (menu embedded)
//! - follows.jsonl: one `{"follower": .., "followed": ..}` edge per line
//!
//! Parse failures carry the file name and line number so a bad snapshot
//! line can be located directly.

use crate::error::{Result, StoreError};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read one JSONL file into a Vec of entities, skipping blank lines
fn parse_jsonl<T: DeserializeOwned>(path: &Path, file_label: &str) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|_| StoreError::FileNotFound {
        path: path.display().to_string(),
    })?;
    let reader = BufReader::new(file);

    let mut entities = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue; // Skip empty lines
        }

        let entity: T =
            serde_json::from_str(line_trimmed).map_err(|e| StoreError::ParseError {
                file: file_label.to_string(),
                line: line_no,
                reason: e.to_string(),
            })?;
        entities.push(entity);
    }

    Ok(entities)
}

/// Parse the users.jsonl file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    parse_jsonl(path, "users.jsonl")
}

/// Parse the recipes.jsonl file
pub fn parse_recipes(path: &Path) -> Result<Vec<Recipe>> {
    parse_jsonl(path, "recipes.jsonl")
}

/// Parse the restaurants.jsonl file
pub fn parse_restaurants(path: &Path) -> Result<Vec<Restaurant>> {
    parse_jsonl(path, "restaurants.jsonl")
}

/// Parse the follows.jsonl file
pub fn parse_follows(path: &Path) -> Result<Vec<FollowEdge>> {
    parse_jsonl(path, "follows.jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, lines: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("tastetrail-{}-{}.jsonl", name, std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(lines.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_users_skips_blank_lines() {
        let path = write_temp(
            "blank-lines",
            "{\"id\":1,\"username\":\"alice\",\"email\":\"a@example.com\",\"created_at\":100}\n\
             \n\
             {\"id\":2,\"username\":\"bob\",\"email\":\"b@example.com\",\"created_at\":200}\n",
        );
        let users = parse_users(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[1].privacy_level, PrivacyLevel::Public);
    }

    #[test]
    fn test_parse_error_carries_line_number() {
        let path = write_temp(
            "bad-line",
            "{\"id\":1,\"username\":\"alice\",\"email\":\"a@example.com\",\"created_at\":100}\n\
             not json\n",
        );
        let err = parse_users(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        match err {
            StoreError::ParseError { line, .. } => assert_eq!(line, 2),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = parse_follows(Path::new("/nonexistent/follows.jsonl")).unwrap_err();
        assert!(matches!(err, StoreError::FileNotFound { .. }));
    }
}
