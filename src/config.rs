use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

/// The question sent with every daily poll.
pub const POLL_QUESTION: &str = "Who's in for today's session?";
/// The answer options, in display order.
pub const POLL_OPTIONS: [&str; 3] = ["I'm in", "Maybe later", "Not today"];

/// Local hour at which the daily broadcast fires.
pub const BROADCAST_HOUR: u8 = 19;
/// Local minute at which the daily broadcast fires.
pub const BROADCAST_MINUTE: u8 = 10;
/// Timezone the broadcast time is interpreted in.
pub const BROADCAST_TIMEZONE: chrono_tz::Tz = chrono_tz::Europe::Kiev;

/// Runtime configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot API token.
    pub bot_token: String,
    /// Path of the JSON file the group store persists to.
    pub groups_file: PathBuf,
}

impl Config {
    /// Reads configuration from environment variables.
    ///
    /// `BOT_TOKEN` is required; the service refuses to start without it.
    /// `GROUPS_FILE` defaults to `groups.json` in the working directory.
    pub fn from_env() -> Result<Self> {
        let token = env::var("BOT_TOKEN").map_err(|_| anyhow!("BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("BOT_TOKEN must be set"));
        }

        let groups_file = env::var("GROUPS_FILE").unwrap_or_else(|_| String::new());
        let groups_file = if groups_file.trim().is_empty() {
            PathBuf::from("groups.json")
        } else {
            PathBuf::from(groups_file)
        };

        Ok(Config {
            bot_token: token,
            groups_file,
        })
    }
}
