//! Google Books volume payloads and their mapping to catalog entries

use chrono::NaiveDate;
use serde::Deserialize;

use super::{
    book::NewBook,
    enums::{BookStatus, BookType},
};

#[derive(Debug, Default, Deserialize)]
pub struct VolumesResponse {
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub description: Option<String>,
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i32>,
    pub image_links: Option<ImageLinks>,
    pub language: Option<String>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct IndustryIdentifier {
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageLinks {
    pub thumbnail: Option<String>,
}

impl VolumeInfo {
    pub fn into_new_book(self, actor: Option<String>) -> NewBook {
        let author = self
            .authors
            .filter(|authors| !authors.is_empty())
            .map(|authors| authors.join(", "))
            .unwrap_or_else(|| "Unknown Author".to_string());

        NewBook {
            title: self.title.unwrap_or_else(|| "Unknown Title".to_string()),
            author,
            isbn: self
                .industry_identifiers
                .and_then(|ids| ids.into_iter().next())
                .map(|id| id.identifier),
            description: self.description,
            categories: self.categories,
            published_at: self.published_date.as_deref().and_then(parse_published_date),
            book_type: BookType::PhysicalBook,
            status: BookStatus::Available,
            total_quantity: 1,
            available_quantity: 1,
            price: None,
            rental_price: None,
            rental_duration_days: None,
            publisher: self.publisher,
            thumbnail_url: self.image_links.and_then(|links| links.thumbnail),
            page_count: self.page_count,
            language: self.language,
            created_by: actor,
        }
    }
}

/// Google reports dates as YYYY, YYYY-MM or YYYY-MM-DD
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = match parts.next() {
        Some(m) => m.parse::<u32>().ok()?,
        None => 1,
    };
    let day = match parts.next() {
        Some(d) => d.get(..2).unwrap_or(d).parse::<u32>().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
