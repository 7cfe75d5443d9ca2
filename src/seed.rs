use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Item, ItemId};
use crate::geometry::parse_day;

#[derive(Debug)]
pub enum SeedError {
    Io(std::io::Error),
    JsonDecode(serde_json::Error),
    TomlDecode(toml::de::Error),
    Invalid(String),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::Io(err) => write!(f, "io error: {err}"),
            SeedError::JsonDecode(err) => write!(f, "failed to parse JSON seed: {err}"),
            SeedError::TomlDecode(err) => write!(f, "failed to parse TOML seed: {err}"),
            SeedError::Invalid(message) => write!(f, "invalid seed data: {message}"),
        }
    }
}

impl std::error::Error for SeedError {}

#[derive(Debug, Deserialize)]
struct SeedItem {
    id: ItemId,
    name: String,
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct SeedTable {
    #[serde(default)]
    items: Vec<SeedItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedDocument {
    List(Vec<SeedItem>),
    Table(SeedTable),
}

/// Reads a seed file: `.toml` holds `[[items]]` tables, anything else is JSON.
pub fn load_items(path: &Path) -> Result<Vec<Item>, SeedError> {
    let raw = fs::read_to_string(path).map_err(SeedError::Io)?;
    let is_toml = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("toml"));

    if is_toml {
        parse_toml(&raw)
    } else {
        parse_json(&raw)
    }
}

pub fn parse_json(raw: &str) -> Result<Vec<Item>, SeedError> {
    let document: SeedDocument = serde_json::from_str(raw).map_err(SeedError::JsonDecode)?;
    let rows = match document {
        SeedDocument::List(rows) => rows,
        SeedDocument::Table(table) => table.items,
    };
    build_items(rows)
}

pub fn parse_toml(raw: &str) -> Result<Vec<Item>, SeedError> {
    let table: SeedTable = toml::from_str(raw).map_err(SeedError::TomlDecode)?;
    build_items(table.items)
}

fn build_items(rows: Vec<SeedItem>) -> Result<Vec<Item>, SeedError> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(rows.len());

    for row in rows {
        if !seen.insert(row.id) {
            return Err(SeedError::Invalid(format!("duplicate item id {}", row.id)));
        }

        let name = row.name.trim();
        if name.is_empty() {
            return Err(SeedError::Invalid(format!("item {} has an empty name", row.id)));
        }

        let start = parse_day(&row.start).map_err(|err| {
            SeedError::Invalid(format!("item {} start {:?}: {err}", row.id, row.start))
        })?;
        let end = parse_day(&row.end).map_err(|err| {
            SeedError::Invalid(format!("item {} end {:?}: {err}", row.id, row.end))
        })?;
        if start > end {
            return Err(SeedError::Invalid(format!(
                "item {} ends before it starts",
                row.id
            )));
        }

        items.push(Item::new(row.id, name, start, end));
    }

    Ok(items)
}

/// Demo collection used when no seed file is configured.
pub fn sample_items() -> Vec<Item> {
    const SAMPLE: [(ItemId, &str, &str, &str); 12] = [
        (1, "First item", "2021-01-14", "2021-01-15"),
        (2, "Second item", "2021-01-02", "2021-01-08"),
        (3, "Another item", "2021-01-10", "2021-01-13"),
        (4, "Another item", "2021-01-09", "2021-01-10"),
        (5, "Third item", "2021-01-01", "2021-01-02"),
        (6, "Fourth item with a super long name", "2021-01-12", "2021-02-16"),
        (7, "Fifth item with a super long name", "2021-01-01", "2021-01-02"),
        (8, "First item", "2021-01-03", "2021-01-05"),
        (9, "Second item", "2021-01-04", "2021-01-08"),
        (10, "Another item", "2021-01-06", "2021-01-13"),
        (11, "Another item", "2021-01-03", "2021-01-06"),
        (12, "Third item", "2021-01-07", "2021-01-17"),
    ];

    SAMPLE
        .iter()
        .filter_map(|(id, name, start, end)| {
            Some(Item::new(*id, *name, parse_day(start).ok()?, parse_day(end).ok()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use crate::geometry::parse_day;

    use super::{SeedError, load_items, parse_json, parse_toml, sample_items};

    #[test]
    fn reads_json_lists_and_tables() {
        let list = parse_json(
            r#"[{"id": 1, "name": "Plan", "start": "2024-01-01", "end": "2024-01-05"}]"#,
        )
        .expect("list should parse");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].start, parse_day("2024-01-01").expect("date"));

        let table = parse_json(
            r#"{"items": [{"id": 2, "name": " Build ", "start": "2024-01-03", "end": "2024-01-06"}]}"#,
        )
        .expect("table should parse");
        assert_eq!(table[0].name, "Build");
    }

    #[test]
    fn reads_toml_seed_files() {
        let raw = r#"
[[items]]
id = 1
name = "Plan"
start = "2024-01-01"
end = "2024-01-05"

[[items]]
id = 2
name = "Build"
start = "2024-01-03"
end = "2024-01-06"
"#;
        let path = temp_file("timeline_seed.toml");
        fs::write(&path, raw).expect("write seed");

        let items = load_items(&path).expect("load should succeed");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].end, parse_day("2024-01-06").expect("date"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_invalid_rows() {
        let duplicate = parse_toml(
            "[[items]]\nid = 1\nname = \"A\"\nstart = \"2024-01-01\"\nend = \"2024-01-01\"\n\
             [[items]]\nid = 1\nname = \"B\"\nstart = \"2024-01-02\"\nend = \"2024-01-02\"\n",
        );
        assert!(matches!(duplicate, Err(SeedError::Invalid(_))));

        let reversed = parse_json(r#"[{"id": 1, "name": "A", "start": "2024-01-05", "end": "2024-01-01"}]"#);
        assert!(matches!(reversed, Err(SeedError::Invalid(_))));

        let blank = parse_json(r#"[{"id": 1, "name": "  ", "start": "2024-01-01", "end": "2024-01-01"}]"#);
        assert!(matches!(blank, Err(SeedError::Invalid(_))));

        let bad_date = parse_json(r#"[{"id": 1, "name": "A", "start": "01/02/2024", "end": "2024-01-01"}]"#);
        assert!(matches!(bad_date, Err(SeedError::Invalid(_))));

        assert!(matches!(parse_json("{not json"), Err(SeedError::JsonDecode(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_items(&temp_file("timeline_seed_missing.json"));
        assert!(matches!(result, Err(SeedError::Io(_))));
    }

    #[test]
    fn sample_items_are_well_formed() {
        let items = sample_items();
        assert_eq!(items.len(), 12);
        assert!(items.iter().all(|item| item.start <= item.end));
    }

    fn temp_file(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("{}_{}", std::process::id(), name));
        path
    }
}
