//! CSV dataset loading.
//!
//! The dataset is a header row followed by one idiom per row. Only `ID` and
//! `Idiom` are required; the other known columns are optional and unknown
//! columns are ignored.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use idiom_core::model::{CardId, IdiomCard, non_blank};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing the required {0:?} column")]
    MissingColumn(&'static str),

    #[error("row on line {line} has an empty ID")]
    EmptyId { line: u64 },

    #[error("duplicate ID {id:?} on line {line}")]
    DuplicateId { id: String, line: u64 },
}

const REQUIRED_COLUMNS: [&str; 2] = ["ID", "Idiom"];

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Idiom")]
    idiom: String,
    #[serde(rename = "Emoji", default)]
    emoji: Option<String>,
    #[serde(rename = "Category", default)]
    category: Option<String>,
    #[serde(rename = "Level", default)]
    level: Option<String>,
    #[serde(rename = "Image", default)]
    image: Option<String>,
    #[serde(rename = "Meaning", default)]
    meaning: Option<String>,
    #[serde(rename = "Business Example", default)]
    business_example: Option<String>,
    #[serde(rename = "Cantonese Note", default)]
    cantonese_note: Option<String>,
    #[serde(rename = "Related Idiom", default)]
    related_idiom: Option<String>,
}

impl Row {
    fn into_card(self, id: CardId) -> IdiomCard {
        IdiomCard {
            id,
            idiom: self.idiom.trim().to_owned(),
            emoji: self.emoji.and_then(non_blank),
            category: self.category.and_then(non_blank),
            level: self.level.and_then(non_blank),
            image: self.image.and_then(non_blank),
            meaning: self.meaning.and_then(non_blank),
            business_example: self.business_example.and_then(non_blank),
            cantonese_note: self.cantonese_note.and_then(non_blank),
            related_idiom: self.related_idiom.and_then(non_blank),
        }
    }
}

/// Parse a CSV dataset, keeping row order.
///
/// # Errors
///
/// Returns `DatasetError` if the CSV is malformed, a required column is
/// missing, or a row has an empty or repeated `ID`.
pub fn parse_dataset<R: Read>(reader: R) -> Result<Vec<IdiomCard>, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn(column));
        }
    }

    let mut seen = HashSet::new();
    let mut cards = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let row: Row = record.deserialize(Some(&headers))?;

        let id: CardId = row
            .id
            .parse()
            .map_err(|_| DatasetError::EmptyId { line })?;
        if !seen.insert(id.clone()) {
            return Err(DatasetError::DuplicateId {
                id: id.to_string(),
                line,
            });
        }
        cards.push(row.into_card(id));
    }

    Ok(cards)
}

/// Read and parse the dataset at `path`.
///
/// # Errors
///
/// Returns `DatasetError::Io` if the file cannot be read, or any error from
/// [`parse_dataset`].
pub async fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<IdiomCard>, DatasetError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let cards = parse_dataset(bytes.as_slice())?;
    info!(path = %path.display(), cards = cards.len(), "dataset loaded");
    Ok(cards)
}
