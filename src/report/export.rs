// Writes the report tables out as CSV
//
// Column headers match the Search Console export so the intent table can be
// opened next to the exported one.

use crate::error::Result;
use crate::report::{IntentTable, KeywordTable};
use csv::Writer;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const INTENT_FILE_NAME: &str = "query-intent.csv";
pub const KEYWORD_FILE_NAME: &str = "freq-entity.csv";

const INTENT_HEADERS: [&str; 6] = ["Top queries", "Clicks", "Impressions", "Intent", "CTR", "Position"];
const KEYWORD_HEADERS: [&str; 4] = ["Keyword", "Count", "Percent", "Entity Labels"];

pub fn write_intent_csv<W: Write>(table: &IntentTable, out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(INTENT_HEADERS)?;

    for row in &table.rows {
        writer.write_record([
            row.query.clone(),
            row.clicks.to_string(),
            row.impressions.to_string(),
            row.intent.clone(),
            format!("{}%", row.ctr),
            row.position.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_keyword_csv<W: Write>(table: &KeywordTable, out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(KEYWORD_HEADERS)?;

    for row in &table.rows {
        writer.write_record([
            row.keyword.clone(),
            row.count.to_string(),
            format!("{:.1}", row.percent),
            row.entity_labels.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write `query-intent.csv` into `dir`, creating it if needed
pub fn save_intent_table(table: &IntentTable, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(INTENT_FILE_NAME);
    write_intent_csv(table, std::fs::File::create(&path)?)?;

    info!(path = %path.display(), rows = table.rows.len(), "saved intent table");
    Ok(path)
}

/// Write `freq-entity.csv` into `dir`, creating it if needed
pub fn save_keyword_table(table: &KeywordTable, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(KEYWORD_FILE_NAME);
    write_keyword_csv(table, std::fs::File::create(&path)?)?;

    info!(path = %path.display(), rows = table.rows.len(), "saved keyword table");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{IntentRow, KeywordRow};

    fn intent_table() -> IntentTable {
        IntentTable {
            total_queries: 2,
            categories: vec![],
            rows: vec![IntentRow {
                query: "buy shoes, cheap".to_string(),
                clicks: 5,
                impressions: 100,
                intent: "Transactional".to_string(),
                ctr: 5.0,
                position: 7.1,
            }],
        }
    }

    #[test]
    fn test_intent_csv_layout() {
        let mut out = Vec::new();
        write_intent_csv(&intent_table(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Top queries,Clicks,Impressions,Intent,CTR,Position"
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"buy shoes, cheap\",5,100,Transactional,5%,7.1"
        );
    }

    #[test]
    fn test_keyword_csv_layout() {
        let table = KeywordTable {
            total_tokens: 4,
            total_entities: 2,
            top_labels: vec![],
            rows: vec![KeywordRow {
                keyword: "google".to_string(),
                count: 2,
                percent: 50.0,
                entity_labels: "Corporation,Thing".to_string(),
            }],
        };

        let mut out = Vec::new();
        write_keyword_csv(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Keyword,Count,Percent,Entity Labels\n"));
        assert!(text.contains("google,2,50.0,\"Corporation,Thing\""));
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports");

        let path = save_intent_table(&intent_table(), &target).unwrap();

        assert!(path.ends_with(INTENT_FILE_NAME));
        assert!(path.is_file());
    }
}
