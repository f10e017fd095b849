//! Outbound messaging abstraction (Telegram adapter lives in `ssb-telegram`).

pub mod port;
