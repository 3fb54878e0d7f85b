use anyhow::{Context, Result};

use flashcards_lib::cards::Card;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    chapter: String,
    section: String,
    front: String,
    back: String,
    format: &OutputFormat,
) -> Result<()> {
    let store = app.open_store()?;
    let card = Card::new(chapter, section, front, back);
    let spreadsheet = store.add_card(&card).context("Failed to add card")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "card": card,
                "spreadsheetId": spreadsheet.id.to_string(),
                "url": spreadsheet.url,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Added card to chapter {} section {} of '{}'",
                card.chapter, card.section, spreadsheet.name
            );
        }
    }

    Ok(())
}
