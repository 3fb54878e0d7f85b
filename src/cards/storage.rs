//! Card retrieval on top of a user's spreadsheet
//!
//! The first call for a user provisions a spreadsheet, records its location in
//! the user's properties and writes the header row. A stored location that no
//! longer opens is replaced by a fresh spreadsheet. A stored link that no
//! longer matches the served address is rewritten.

use thiserror::Error;

use super::models::{Card, CardsPayload, ChapterIndex};
use crate::config::AppConfig;
use crate::properties::{PropertyError, PropertyStore, StoreLocation, UserProperties};
use crate::sheets::{CsvSpreadsheetStore, SheetError, Spreadsheet, SpreadsheetStore};

#[derive(Error, Debug)]
pub enum CardStoreError {
    #[error("Spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("Property error: {0}")]
    Property(#[from] PropertyError),
}

pub type Result<T> = std::result::Result<T, CardStoreError>;

/// Shown when a sheet has no cards yet
const DEFAULT_FRONT: &str = "This is the front of a card. Click the card to turn it over.";
const DEFAULT_BACK: &str = "This is the back of a card. The back button should return you to \
the front of the card. Use the link above to view your spreadsheet, add cards with \
`flashcards add` and refresh this page to load the new set of cards.";

/// Card store backed by local CSV spreadsheets and file properties
pub type LocalCardStore = CardStore<CsvSpreadsheetStore, UserProperties>;

pub struct CardStore<S, P> {
    config: AppConfig,
    sheets: S,
    properties: P,
}

impl<S: SpreadsheetStore, P: PropertyStore> CardStore<S, P> {
    pub fn new(config: AppConfig, sheets: S, properties: P) -> Self {
        Self {
            config,
            sheets,
            properties,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sheets(&self) -> &S {
        &self.sheets
    }

    /// Open the user's spreadsheet, creating one when none is recorded or the
    /// recorded one cannot be opened.
    pub fn get_sheet(&self) -> Result<Spreadsheet> {
        let location = StoreLocation::load(
            &self.properties,
            &self.config.spreadsheet_id_key,
            &self.config.sheet_url_key,
        )?;

        let Some(location) = location else {
            return self.new_spreadsheet();
        };

        match self.sheets.open_by_id(&location.id) {
            Ok(spreadsheet) => {
                if spreadsheet.schema_version != self.config.headings.version {
                    log::warn!(
                        "Spreadsheet {} was written with column layout v{}, reading with v{}",
                        spreadsheet.id,
                        spreadsheet.schema_version,
                        self.config.headings.version
                    );
                }
                if location.url != spreadsheet.url {
                    log::info!(
                        "Updating link for spreadsheet {} to {}",
                        spreadsheet.id,
                        spreadsheet.url
                    );
                    StoreLocation::new(location.id, spreadsheet.url.clone()).save(
                        &self.properties,
                        &self.config.spreadsheet_id_key,
                        &self.config.sheet_url_key,
                    )?;
                }
                Ok(spreadsheet)
            }
            Err(e) => {
                log::warn!(
                    "Could not open spreadsheet {} ({}); replacing it with a new one",
                    location.id,
                    e
                );
                self.new_spreadsheet()
            }
        }
    }

    /// Create a spreadsheet with a frozen header row and make it the user's
    /// current one.
    pub fn new_spreadsheet(&self) -> Result<Spreadsheet> {
        let mut spreadsheet = self
            .sheets
            .create(&self.config.spreadsheet_name, self.config.headings.version)?;

        StoreLocation::new(spreadsheet.id.to_string(), spreadsheet.url.clone()).save(
            &self.properties,
            &self.config.spreadsheet_id_key,
            &self.config.sheet_url_key,
        )?;

        self.sheets
            .append_row(&spreadsheet, &Card::header().to_row(&self.config.headings))?;
        self.sheets.set_frozen_rows(&mut spreadsheet, 1)?;

        log::info!("Provisioned card spreadsheet {}", spreadsheet.id);
        Ok(spreadsheet)
    }

    /// Placeholder deck explaining how to use the app
    pub fn get_default_cards(&self) -> Vec<Card> {
        vec![Card::new("1", "1", DEFAULT_FRONT, DEFAULT_BACK)]
    }

    /// Stored link to the user's spreadsheet
    pub fn get_url(&self) -> Result<Option<String>> {
        Ok(self.properties.get_property(&self.config.sheet_url_key)?)
    }

    /// All cards in sheet order, the chapter index and the spreadsheet link
    pub fn get_cards(&self) -> Result<CardsPayload> {
        let spreadsheet = self.get_sheet()?;
        let rows = self.sheets.read_rows(&spreadsheet)?;

        let headings = &self.config.headings;
        let mut cards: Vec<Card> = rows
            .iter()
            .skip(1)
            .map(|row| Card::from_row(headings, row))
            .collect();
        if cards.is_empty() {
            cards = self.get_default_cards();
        }

        let chapters: ChapterIndex = cards.iter().collect();
        let url = self.get_url()?.unwrap_or(spreadsheet.url);

        Ok(CardsPayload {
            cards,
            chapters,
            url,
        })
    }

    /// Append a card to the user's spreadsheet
    pub fn add_card(&self, card: &Card) -> Result<Spreadsheet> {
        let spreadsheet = self.get_sheet()?;
        self.sheets
            .append_row(&spreadsheet, &card.to_row(&self.config.headings))?;
        Ok(spreadsheet)
    }
}
