use anyhow::{anyhow, Context, Result};

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    let store = app.open_store()?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let mut server = flashcards_lib::web::start_server(store)
            .await
            .map_err(|e| anyhow!("Failed to start server: {}", e))?;

        println!("Serving flash cards at {}", server.base_url());

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        server.stop().await;
        Ok::<(), anyhow::Error>(())
    })
}
