use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let store = app.open_store()?;
    let spreadsheet = store.get_sheet().context("Failed to open spreadsheet")?;
    let csv_path = store.sheets().sheet_path(spreadsheet.id);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "user": app.user,
                "id": spreadsheet.id.to_string(),
                "name": spreadsheet.name,
                "url": spreadsheet.url,
                "path": csv_path.to_string_lossy(),
                "schemaVersion": spreadsheet.schema_version,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("User:        {}", app.user);
            println!("Spreadsheet: {} ({})", spreadsheet.name, spreadsheet.id);
            println!("URL:         {}", spreadsheet.url);
            println!("File:        {}", csv_path.display());
        }
    }

    Ok(())
}
