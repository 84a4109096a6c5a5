#[tokio::main]
async fn main() -> foxchat::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("foxchat=info,serenity=warn"),
    )
    .init();
    log::info!("Starting foxchat Discord bot");

    match foxchat::run().await {
        Ok(_) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {}", e);
            Err(e)
        }
    }
}
