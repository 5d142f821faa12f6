//! Which game window is open, derived from server events.
use crate::events::{ServerEvent, UpdateValue};

/// Update key announcing (or withdrawing) a party invite to this bot.
pub const PARTY_PROMPT_KEY: &str = "partyPromptedPlayerUsername";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UiScreen {
    #[default]
    None,
    PlayerSelect,
    PartyPrompt,
}

/// Fixed click targets in client pixels.
pub struct UiPositions;

impl UiPositions {
    /// "Invite to party" in the player-select window.
    pub const PARTY_INVITE: (i32, i32) = (100, 140);
    /// Close button of the player-select window.
    pub const PLAYER_SELECT_EXIT: (i32, i32) = (238, 24);
    pub const ACCEPT_INVITE: (i32, i32) = (117, 150);
    pub const DECLINE_INVITE: (i32, i32) = (183, 150);

    /// Pixel the client maps to tile (`x`, `y`) while the avatar stands on `me`.
    pub fn tile(me: dbot_core::Point, x: i32, y: i32) -> (i32, i32) {
        (150 - (me.x - x) * 16, 120 - (me.y - y) * 16)
    }
}

/// Read-only view of the UI consulted by actions.
pub trait UiOracle {
    fn screen(&self) -> UiScreen;
    /// Player that opened the current prompt.
    fn source(&self) -> &str;
    /// Player selected in the player-select window.
    fn target(&self) -> &str;
}

#[derive(Clone, Debug, Default)]
pub struct UiState {
    screen: UiScreen,
    source: String,
    target: String,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_screen(&mut self, screen: UiScreen) {
        tracing::info!("new UI screen: {screen}");
        self.screen = screen;
    }

    /// Applies at most one screen transition for `event`.
    pub fn observe(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::SelectPlayer { username } => {
                self.target = username.clone();
                self.set_screen(UiScreen::PlayerSelect);
            }
            ServerEvent::InvitePlayer { .. } => self.set_screen(UiScreen::None),
            ServerEvent::Update { key, value } if key == PARTY_PROMPT_KEY => match value {
                UpdateValue::Null => {
                    // Only close the prompt we know about; a late null must not
                    // clobber a different window.
                    if self.screen == UiScreen::PartyPrompt {
                        self.set_screen(UiScreen::None);
                    }
                }
                UpdateValue::Text(source) => {
                    self.source = source.clone();
                    self.set_screen(UiScreen::PartyPrompt);
                }
                other => tracing::warn!("unexpected party prompt value {other:?}"),
            },
            _ => {}
        }
    }
}

impl UiOracle for UiState {
    fn screen(&self) -> UiScreen {
        self.screen
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbot_core::Point;

    #[test]
    fn select_then_invite_closes_the_window() {
        let mut ui = UiState::new();
        ui.observe(&ServerEvent::SelectPlayer {
            username: "bravo".into(),
        });
        assert_eq!(ui.screen(), UiScreen::PlayerSelect);
        assert_eq!(ui.target(), "bravo");

        ui.observe(&ServerEvent::InvitePlayer {
            username: "bravo".into(),
        });
        assert_eq!(ui.screen(), UiScreen::None);
    }

    #[test]
    fn party_prompt_opens_and_closes() {
        let mut ui = UiState::new();
        ui.observe(&ServerEvent::Update {
            key: PARTY_PROMPT_KEY.into(),
            value: UpdateValue::Text("alpha".into()),
        });
        assert_eq!(ui.screen(), UiScreen::PartyPrompt);
        assert_eq!(ui.source(), "alpha");

        ui.observe(&ServerEvent::Update {
            key: PARTY_PROMPT_KEY.into(),
            value: UpdateValue::Null,
        });
        assert_eq!(ui.screen(), UiScreen::None);
    }

    #[test]
    fn stray_prompt_close_keeps_other_windows() {
        let mut ui = UiState::new();
        ui.observe(&ServerEvent::SelectPlayer {
            username: "bravo".into(),
        });
        ui.observe(&ServerEvent::Update {
            key: PARTY_PROMPT_KEY.into(),
            value: UpdateValue::Null,
        });
        assert_eq!(ui.screen(), UiScreen::PlayerSelect);
    }

    #[test]
    fn tile_clicks_are_relative_to_the_avatar() {
        let me = Point::new(10, 10);
        assert_eq!(UiPositions::tile(me, 10, 10), (150, 120));
        assert_eq!(UiPositions::tile(me, 11, 9), (166, 104));
    }
}
