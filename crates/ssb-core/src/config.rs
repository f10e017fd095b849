use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{download::DEFAULT_PROGRESS_EVERY, errors::Error, Result};

/// Typed configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// Root of the sticker tree; one directory per set lives under it.
    pub sticker_dir: PathBuf,
    /// Progress message is edited every N stickers (and on the last one).
    pub progress_every: usize,
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        // Existing variables win over `.env`.
        let _ = dotenvy::dotenv();

        let cwd = env::current_dir()?;
        Self::from_lookup(|key| env::var(key).ok(), &cwd)
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>, cwd: &Path) -> Result<Self> {
        let bot_token = get("BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| get("TELEGRAM_BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| Error::Config("BOT_TOKEN is required".to_string()))?;

        let sticker_dir = match get("STICKER_DIR").and_then(non_empty) {
            Some(dir) => {
                let p = PathBuf::from(dir.trim());
                if p.is_absolute() {
                    p
                } else {
                    cwd.join(p)
                }
            }
            None => cwd.join("stickers"),
        };

        let progress_every = match get("PROGRESS_EVERY").and_then(non_empty) {
            None => DEFAULT_PROGRESS_EVERY,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "PROGRESS_EVERY must be a positive integer, got {raw:?}"
                    )))
                }
            },
        };

        Ok(Self {
            bot_token: bot_token.trim().to_string(),
            sticker_dir,
            progress_every,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
