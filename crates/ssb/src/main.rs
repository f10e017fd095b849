use std::sync::Arc;

use anyhow::Context;

use ssb_core::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ssb_core::logging::init("ssb")?;

    let cfg = Arc::new(Config::load().context("invalid configuration")?);

    ssb_telegram::router::run_polling(cfg)
        .await
        .context("telegram bot failed")?;

    Ok(())
}
