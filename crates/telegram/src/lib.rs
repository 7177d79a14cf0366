//! Telegram Integration - Bot API long-polling interface
//!
//! This crate provides the Telegram interface for almanac:
//! - **Transport** (`transport`) - `getUpdates` long polling and `sendMessage` over HTTPS
//! - **Polling** (`polling`) - update loop with reconnect backoff and bounded concurrency
//! - **Slash Commands** (`commands`) - `/start`, `/hello`, `/help`, `/thanks`, `/delete`
//! - **Events** (`events`) - update parsing and routing to handlers
//! - **Messages** (`messages`) - fixed reply texts
//!
//! # Getting Started
//!
//! 1. Create a bot with @BotFather and copy its HTTP API token
//! 2. Set env vars: `ALMANAC_TELEGRAM_BOT_TOKEN` (or `BOT_TOKEN`)
//! 3. Optionally set `ALMANAC_AUTHZ_PRIVILEGED_USER_ID` to your numeric Telegram user id
//!
//! # Architecture
//!
//! ```text
//! getUpdates → PollingRunner → EventDispatcher → Handlers → Agent Runtime → Event Store
//!                                     ↓
//!                          sendMessage ← Reply text
//! ```

pub mod commands;
pub mod events;
pub mod messages;
pub mod polling;
pub mod transport;

pub use commands::{BotCommand, CommandRouter, CommandService};
pub use events::{EventDispatcher, MessageService, TelegramEvent, TelegramUpdate};
pub use polling::{PollingRunner, ReconnectPolicy};
pub use transport::{BotApiClient, TransportError, UpdateTransport};
