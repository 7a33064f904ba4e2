//! CSV feed parsing.
//!
//! The feeds are spreadsheet exports: one record per line, header first,
//! fields optionally wrapped in double quotes.

use std::collections::HashSet;

use super::animal::RegistryAnimal;
use super::columns::{DECEASED_ID_COLUMNS, REGISTRY_COLUMNS, REGISTRY_MIN_COLUMNS};
use super::normalize::normalize_id;

/// Split a line on commas that sit outside a matched pair of double quotes.
///
/// Each field is trimmed and loses one leading and one trailing quote. Inner
/// quotes are left as they are.
pub fn split_feed_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                fields.push(clean_field(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(clean_field(&current));
    fields
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Data rows of a feed document (header dropped).
fn data_rows(text: &str) -> impl Iterator<Item = Vec<String>> + '_ {
    text.split('\n').skip(1).map(split_feed_line)
}

fn column_or_placeholder(columns: &[String], idx: usize) -> String {
    match columns.get(idx) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => RegistryAnimal::PLACEHOLDER.to_string(),
    }
}

/// Parse the main registry feed.
pub fn parse_registry_csv(text: &str) -> Vec<RegistryAnimal> {
    let cols = REGISTRY_COLUMNS;
    data_rows(text)
        .filter(|columns| columns.len() >= REGISTRY_MIN_COLUMNS)
        .filter_map(|columns| {
            let id = columns.get(cols.id)?.clone();
            Some(RegistryAnimal {
                id,
                breed: column_or_placeholder(&columns, cols.breed),
                mother: column_or_placeholder(&columns, cols.mother),
                father: column_or_placeholder(&columns, cols.father),
                birth_date: column_or_placeholder(&columns, cols.birth_date),
                is_deceased: false,
            })
        })
        .collect()
}

/// Parse the deceased feed into a set of canonical ids.
pub fn parse_deceased_csv(text: &str) -> HashSet<String> {
    let mut ids = HashSet::new();
    for columns in data_rows(text) {
        for idx in DECEASED_ID_COLUMNS {
            if let Some(value) = columns.get(idx).filter(|v| !v.is_empty()) {
                ids.insert(normalize_id(value));
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = "Nacimiento,Id,C,D,E,Padre,Madre,H,I,Raza\n\
        2023-01-01,ABC-045,x,x,x,F1,M1,x,x,Angus\n\
        \"2022-05-10\",\"ABC-046\",x,x,x,\"Toro, Grande\",M2,x,x,Hereford\r\n\
        2021-02-02,ABC-047\n\
        solo\n\
        \n";

    #[test]
    fn test_split_respects_quotes() {
        let fields = split_feed_line(r#"a, "b,c" ,d"#);
        assert_eq!(fields, vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_split_strips_one_quote_layer_only() {
        let fields = split_feed_line(r#"""x"",y"#);
        assert_eq!(fields, vec![r#""x""#, "y"]);
    }

    #[test]
    fn test_parse_registry_maps_fixed_columns() {
        let animals = parse_registry_csv(REGISTRY);
        assert_eq!(animals.len(), 3);

        let first = &animals[0];
        assert_eq!(first.id, "ABC-045");
        assert_eq!(first.birth_date, "2023-01-01");
        assert_eq!(first.father, "F1");
        assert_eq!(first.mother, "M1");
        assert_eq!(first.breed, "Angus");
        assert!(!first.is_deceased);

        assert_eq!(animals[1].id, "ABC-046");
        assert_eq!(animals[1].father, "Toro, Grande");
        assert_eq!(animals[1].breed, "Hereford");
    }

    #[test]
    fn test_parse_registry_defaults_missing_fields() {
        let animals = parse_registry_csv(REGISTRY);
        let short = &animals[2];
        assert_eq!(short.id, "ABC-047");
        assert_eq!(short.breed, "-");
        assert_eq!(short.mother, "-");
        assert_eq!(short.father, "-");
    }

    #[test]
    fn test_header_is_always_skipped() {
        let animals = parse_registry_csv("2023-01-01,ABC-001,,,,F,M,,,Angus");
        assert!(animals.is_empty());
    }

    #[test]
    fn test_rows_without_id_column_are_skipped() {
        assert_eq!(REGISTRY_MIN_COLUMNS, REGISTRY_COLUMNS.id + 1);
        let animals = parse_registry_csv("h\nsolo\n\n2023-01-01,ABC-009\n");
        assert_eq!(animals.len(), 1);
        assert_eq!(animals[0].id, "ABC-009");
    }

    #[test]
    fn test_parse_deceased_reads_every_id_slot() {
        let text = "a,b,c,d,e,f,g,h\n\
            x,ABC-001,x,abc 002,x,,x,ABC-004\n\
            x,,x,,x,,x,\n";
        let ids = parse_deceased_csv(text);
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("abc001"));
        assert!(ids.contains("abc002"));
        assert!(ids.contains("abc004"));
    }
}
