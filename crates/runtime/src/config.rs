//! Runtime tunables and their environment overrides.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dbot_core::ExplorationConfig;

/// Timing, exploration and persistence settings shared by every action.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Period of the event-draining loop.
    pub loop_period: Duration,
    /// Minimum time between locomotion/action steps.
    pub action_period: Duration,
    /// Errors tolerated by the run loop before it logs out.
    pub max_errors: u32,
    pub exploration: ExplorationConfig,
    /// Minimum delay before re-inviting the same player.
    pub invite_cooldown: Duration,
    /// How long to wait for the player-select window after clicking a player.
    pub select_timeout: Duration,
    /// Release a held key once the avatar is closer than this to the target.
    pub near_threshold: u32,
    /// Flush collision maps on every resolved cell instead of on cleanup only.
    pub frequent_saves: bool,
    /// Chat channel used for status reports and peer hints.
    pub report_channel: String,
    /// First word of a chat command addressed to every bot.
    pub command_prompt: String,
    /// Root directory for per-bot collision maps.
    pub data_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            loop_period: Duration::from_millis(200),
            action_period: Duration::from_millis(500),
            max_errors: 0,
            exploration: ExplorationConfig::default(),
            invite_cooldown: Duration::from_millis(2500),
            select_timeout: Duration::from_millis(500),
            near_threshold: 2,
            frequent_saves: false,
            report_channel: "wsay".to_string(),
            command_prompt: "dbots".to_string(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DBOT_LOOP_MS` - Event loop period in milliseconds (default: 200)
    /// - `DBOT_ACTION_MS` - Action cadence in milliseconds (default: 500)
    /// - `DBOT_MAX_ERRORS` - Run-loop errors tolerated (default: 0)
    /// - `DBOT_REFRESH_THRESHOLD` - Frontier refresh threshold (default: 10)
    /// - `DBOT_DISTANCE_THRESHOLD` - Stale frontier distance (default: 5)
    /// - `DBOT_INVITE_COOLDOWN_MS` - Party invite cooldown (default: 2500)
    /// - `DBOT_SELECT_TIMEOUT_MS` - Player-select timeout (default: 500)
    /// - `DBOT_NEAR_THRESHOLD` - Key release distance (default: 2)
    /// - `DBOT_FREQUENT_SAVES` - Save maps on every resolution (default: false)
    /// - `DBOT_REPORT_CHANNEL` - Chat channel for reports (default: wsay)
    /// - `DBOT_COMMAND_PROMPT` - Chat command prompt (default: dbots)
    /// - `DBOT_DATA_DIR` - Collision map root (default: ./data)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("DBOT_LOOP_MS") {
            config.loop_period = Duration::from_millis(ms.max(10));
        }
        if let Some(ms) = read_env::<u64>("DBOT_ACTION_MS") {
            config.action_period = Duration::from_millis(ms);
        }
        if let Some(max) = read_env::<u32>("DBOT_MAX_ERRORS") {
            config.max_errors = max;
        }
        if let Some(threshold) = read_env::<usize>("DBOT_REFRESH_THRESHOLD") {
            config.exploration.refresh_threshold = threshold;
        }
        if let Some(threshold) = read_env::<u32>("DBOT_DISTANCE_THRESHOLD") {
            config.exploration.distance_threshold = threshold;
        }
        if let Some(ms) = read_env::<u64>("DBOT_INVITE_COOLDOWN_MS") {
            config.invite_cooldown = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("DBOT_SELECT_TIMEOUT_MS") {
            config.select_timeout = Duration::from_millis(ms);
        }
        if let Some(threshold) = read_env::<u32>("DBOT_NEAR_THRESHOLD") {
            config.near_threshold = threshold.max(1);
        }
        if let Some(frequent) = read_env::<bool>("DBOT_FREQUENT_SAVES") {
            config.frequent_saves = frequent;
        }
        if let Ok(channel) = env::var("DBOT_REPORT_CHANNEL")
            && !channel.is_empty()
        {
            config.report_channel = channel;
        }
        if let Ok(prompt) = env::var("DBOT_COMMAND_PROMPT")
            && !prompt.is_empty()
        {
            config.command_prompt = prompt;
        }
        if let Ok(dir) = env::var("DBOT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        config
    }

    /// Directory holding one bot's collision maps.
    pub fn maps_dir(&self, bot: &str) -> PathBuf {
        self.data_dir.join(format!("{bot}_maps"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.loop_period, Duration::from_millis(200));
        assert_eq!(config.action_period, Duration::from_millis(500));
        assert_eq!(config.exploration.refresh_threshold, 10);
        assert_eq!(config.exploration.distance_threshold, 5);
        assert_eq!(config.invite_cooldown, Duration::from_millis(2500));
        assert_eq!(config.near_threshold, 2);
        assert_eq!(config.report_channel, "wsay");
        assert_eq!(config.command_prompt, "dbots");
    }

    #[test]
    fn maps_dir_is_per_bot() {
        let config = RuntimeConfig {
            data_dir: PathBuf::from("/srv/dbot"),
            ..RuntimeConfig::default()
        };
        assert_eq!(config.maps_dir("alpha"), PathBuf::from("/srv/dbot/alpha_maps"));
    }
}
