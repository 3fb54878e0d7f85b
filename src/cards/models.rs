//! Data models for cards and the payload served to the client

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Headings;

/// Logical columns of a card sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardField {
    Chapter,
    Section,
    Front,
    Back,
}

impl CardField {
    pub const ALL: [CardField; 4] = [
        CardField::Chapter,
        CardField::Section,
        CardField::Front,
        CardField::Back,
    ];

    /// Label used in the sheet's header row
    pub fn heading(&self) -> &'static str {
        match self {
            CardField::Chapter => "Chapter",
            CardField::Section => "Section",
            CardField::Front => "Front",
            CardField::Back => "Back",
        }
    }
}

/// A flash card. Chapter and section are labels, not numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Card {
    pub chapter: String,
    pub section: String,
    pub front: String,
    pub back: String,
}

impl Card {
    pub fn new(
        chapter: impl Into<String>,
        section: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
    ) -> Self {
        Self {
            chapter: chapter.into(),
            section: section.into(),
            front: front.into(),
            back: back.into(),
        }
    }

    /// The card whose fields are the column labels
    pub fn header() -> Self {
        Self::new(
            CardField::Chapter.heading(),
            CardField::Section.heading(),
            CardField::Front.heading(),
            CardField::Back.heading(),
        )
    }

    pub fn field(&self, field: CardField) -> &str {
        match field {
            CardField::Chapter => &self.chapter,
            CardField::Section => &self.section,
            CardField::Front => &self.front,
            CardField::Back => &self.back,
        }
    }

    fn field_mut(&mut self, field: CardField) -> &mut String {
        match field {
            CardField::Chapter => &mut self.chapter,
            CardField::Section => &mut self.section,
            CardField::Front => &mut self.front,
            CardField::Back => &mut self.back,
        }
    }

    /// Lay the card out as a sheet row
    pub fn to_row(&self, headings: &Headings) -> Vec<String> {
        let mut row = vec![String::new(); headings.width()];
        for field in CardField::ALL {
            row[headings.position(field)] = self.field(field).to_string();
        }
        row
    }

    /// Read a card from a sheet row. Cells past the end of a short row are empty.
    pub fn from_row<S: AsRef<str>>(headings: &Headings, row: &[S]) -> Self {
        let mut card = Card::default();
        for field in CardField::ALL {
            if let Some(cell) = row.get(headings.position(field)) {
                *card.field_mut(field) = cell.as_ref().to_string();
            }
        }
        card
    }
}

/// Sections present under each chapter, used by the client for navigation.
///
/// Serialized as `{ "chapter": { "section": true } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterIndex(BTreeMap<String, BTreeMap<String, bool>>);

impl ChapterIndex {
    pub fn insert(&mut self, chapter: &str, section: &str) {
        self.0
            .entry(chapter.to_string())
            .or_default()
            .insert(section.to_string(), true);
    }

    pub fn chapters(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn sections(&self, chapter: &str) -> impl Iterator<Item = &str> {
        self.0
            .get(chapter)
            .into_iter()
            .flat_map(|sections| sections.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a Card> for ChapterIndex {
    fn from_iter<I: IntoIterator<Item = &'a Card>>(iter: I) -> Self {
        let mut index = ChapterIndex::default();
        for card in iter {
            index.insert(&card.chapter, &card.section);
        }
        index
    }
}

/// Everything the client needs to display a deck
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardsPayload {
    pub cards: Vec<Card>,
    pub chapters: ChapterIndex,
    /// Link to the spreadsheet holding the cards
    pub url: String,
}
