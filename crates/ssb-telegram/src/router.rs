use std::{sync::Arc, time::Duration};

use teloxide::{
    dispatching::{DefaultKey, Dispatcher, ShutdownToken},
    dptree,
    prelude::*,
};
use tracing::{error, info, warn};

use ssb_core::{
    config::Config,
    errors::{Error, PlatformErrorKind},
    flow::StickerFlow,
    messaging::port::MessagingPort,
    ports::StickerSource,
    shutdown,
    storage::StickerStore,
};

use crate::{handlers, TelegramMessenger, TelegramStickerSource};

#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<StickerFlow>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Owns the bot connection and the update dispatcher for the life of the
/// process. `start` runs until a stop is requested through `stop_handle`;
/// dropping the service releases the connection.
pub struct BotService {
    bot: Bot,
    dispatcher: Dispatcher<Bot, Error, DefaultKey>,
}

impl BotService {
    pub async fn new(cfg: Arc<Config>) -> ssb_core::Result<Self> {
        let bot = Bot::new(cfg.bot_token.clone());

        let store = StickerStore::new(cfg.sticker_dir.clone());
        store.ensure_root().await?;

        let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
        let source: Arc<dyn StickerSource> = Arc::new(TelegramStickerSource::new(bot.clone()));
        let flow = Arc::new(StickerFlow::new(
            store,
            source,
            messenger.clone(),
            cfg.progress_every,
        ));

        let state = Arc::new(AppState { flow, messenger });

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message));

        let dispatcher = Dispatcher::builder(bot.clone(), handler)
            .dependencies(dptree::deps![state])
            .default_handler(|_| async {})
            .error_handler(Arc::new(|err: Error| async move {
                log_dispatch_error(&err);
            }))
            .build();

        Ok(Self { bot, dispatcher })
    }

    pub fn stop_handle(&self) -> ShutdownToken {
        self.dispatcher.shutdown_token()
    }

    pub async fn start(mut self) {
        match self.bot.get_me().await {
            Ok(me) => info!("connected as @{}", me.username()),
            Err(e) => warn!("getMe failed, polling anyway: {e}"),
        }
        self.dispatcher.dispatch().await;
    }
}

/// Ask the dispatcher to finish in-flight updates and return.
///
/// A dispatcher that has not started polling yet cannot be stopped, so the
/// request is repeated until it is.
pub async fn stop(token: ShutdownToken) {
    loop {
        match token.shutdown() {
            Ok(done) => return done.await,
            Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
}

/// Errors that escaped a handler: nothing user-facing is left to address,
/// so they are only logged, by category.
fn log_dispatch_error(err: &Error) {
    match err {
        Error::Messaging {
            kind: PlatformErrorKind::Protocol,
            message,
        } => error!("Error in request: {message}"),
        Error::Messaging {
            kind: PlatformErrorKind::Connectivity,
            message,
        } => error!("Could not contact Telegram: {message}"),
        other => error!("Unknown error while handling update: {other}"),
    }
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    info!(
        storage = %cfg.sticker_dir.display(),
        progress_every = cfg.progress_every,
        "Bot is starting..."
    );

    let service = BotService::new(cfg).await?;
    let token = service.stop_handle();

    tokio::spawn(async move {
        match shutdown::wait_for_signal().await {
            Ok(signal) => info!(%signal, "Bot is stopping..."),
            Err(e) => {
                error!("failed to listen for shutdown signals: {e}");
                return;
            }
        }
        stop(token).await;
    });

    service.start().await;
    info!("Bot stopped");
    Ok(())
}
