//! CLI History Command
//!
//! Lists recent prediction records straight from the store.

use std::path::Path;

use anyhow::Result;
use specscan_core::PredictionRecord;
use specscan_store::{database_file, SqlitePredictionStore};

use crate::config::Config;
use crate::output::{note_info, render_table, Column};

pub async fn run(config: &Config, limit: usize) -> Result<()> {
    if let Some(path) = database_file(&config.database_url) {
        if !Path::new(path).exists() {
            note_info(&format!("No prediction database at {path}"));
            return Ok(());
        }
    }

    let store = SqlitePredictionStore::connect_read_only(&config.database_url)?;
    let total = store.count().await?;
    let records = store.recent(limit).await?;

    if records.is_empty() {
        note_info(&format!("No predictions stored in {}", config.database_url));
        return Ok(());
    }

    print!("{}", render_table(&columns(), &rows(&records)));
    note_info(&format!("Showing {} of {} predictions", records.len(), total));
    Ok(())
}

fn columns() -> Vec<Column> {
    vec![
        Column::left("Created"),
        Column::left("Filename").max_width(32),
        Column::right("Fields"),
        Column::left("Specs").max_width(60),
    ]
}

fn rows(records: &[PredictionRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                r.filename.clone(),
                r.specs.len().to_string(),
                serde_json::to_string(&r.specs).unwrap_or_default(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use specscan_core::SpecificationResult;

    #[test]
    fn one_row_per_record() {
        let specs = SpecificationResult::from_value(json!({"brand": "Acme", "ram_gb": 8})).unwrap();
        let records = vec![PredictionRecord::new("phone.jpg", specs)];

        let rows = rows(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "phone.jpg");
        assert_eq!(rows[0][2], "2");
        assert_eq!(rows[0][3], r#"{"brand":"Acme","ram_gb":8}"#);
    }

    #[tokio::test]
    async fn missing_database_is_left_uncreated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");
        let url = format!("sqlite://{}", path.display());
        let config = Config::from_lookup(|key| (key == "SPECSCAN_DB").then(|| url.clone()));

        run(&config, 10).await.unwrap();
        assert!(!path.exists());
    }
}
