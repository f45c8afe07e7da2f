//! The record type the demo filters.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use querysift::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[sift(rename_all = "PascalCase")]
pub struct Book {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub pages: u32,
    pub rating: Option<f32>,
    pub genres: Vec<String>,
    pub published: DateTime<Utc>,
    pub series: Option<String>,
}

/// Reads a JSON array of books.
pub fn load_books(path: &Path) -> Result<Vec<Book>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
