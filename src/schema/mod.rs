//! Reference configuration schema.
//!
//! The snapshot type served by the bot's configuration document. Every
//! section takes part in diffing, and [`topics`] names the filters that
//! route each section's events.

use serde::{Deserialize, Serialize};

use crate::diff_record;


/// Complete configuration snapshot.
///
/// Missing sections and fields deserialize to their empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat bot settings.
    pub bot: Bot,
    /// Logger settings.
    pub log: Log,
    /// Database connection settings.
    pub database: Database,
    /// YouTube API settings.
    pub youtube: Youtube,
    /// Settings of the auxiliary services.
    pub services: Services,
}

/// Chat bot settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bot {
    /// Discord credentials.
    pub discord: Discord,
    /// Command prefix (e.g. "!").
    pub prefix: String,
    /// Enabled command names.
    pub commands: Vec<String>,
}

/// Discord credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discord {
    /// Bot token.
    pub token: String,
}

/// Logger settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Logging forwarded to a Discord webhook.
    pub discord: LogDiscord,
    /// Level of the local logger.
    pub level: String,
}

/// Logging forwarded to a Discord webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogDiscord {
    /// Minimum level forwarded to the webhook.
    pub level: String,
    /// Webhook URL.
    pub webhook: String,
}

/// Database connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    /// Host name or address.
    pub host: String,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// SSL mode.
    pub ssl: String,
    /// Database driver.
    #[serde(rename = "type")]
    pub kind: String,
}

/// YouTube API settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Youtube {
    /// API key.
    #[serde(rename = "api-key")]
    pub api_key: String,
}

/// Settings of the auxiliary services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Services {
    /// Search service settings.
    pub search: Search,
}

/// Search service settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Search {
    /// Address of the search service.
    pub location: String,
}

diff_record!(Config {
    bot,
    log,
    database,
    youtube,
    services
});
diff_record!(Bot {
    discord,
    prefix,
    commands
});
diff_record!(Discord { token });
diff_record!(Log { discord, level });
diff_record!(LogDiscord { level, webhook });
diff_record!(Database {
    host,
    user,
    password,
    ssl,
    kind => "type"
});
diff_record!(Youtube { api_key => "apikey" });
diff_record!(Services { search });
diff_record!(Search { location });

/// Topic filters for each configuration section.
pub mod topics {
    /// Chat bot events.
    pub const BOT: &str = "bot";
    /// Logger events.
    pub const LOG: &str = "log";
    /// Database events.
    pub const DATABASE: &str = "database";
    /// YouTube events.
    pub const YOUTUBE: &str = "youtube";
    /// Events of every auxiliary service.
    pub const SERVICES: &str = "services";
    /// Search service events.
    pub const SEARCH_SERVICE: &str = "services.search";

    /// Every topic, most specific first so that chained splits give each
    /// topic its own events.
    pub const ALL: [&str; 6] = [SEARCH_SERVICE, SERVICES, BOT, LOG, DATABASE, YOUTUBE];
}
