//! Session-bus playback watching.
//!
//! Subscribes to `PropertiesChanged` signals on the session bus, filters to
//! the MPRIS player interface and its `PlaybackStatus` property, and turns
//! transitions into engine commands.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::TryStreamExt;
use tokio::sync::{OnceCell, mpsc};
use zbus::{MatchRule, MessageStream, message::Type as MessageType};
use zvariant::OwnedValue;

use crate::engine::Command;

const MPRIS_PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

/// Errors that can occur while registering for playback-state events.
#[derive(thiserror::Error, Debug)]
pub enum SubscriptionError {
    #[error("D-Bus error: {0}")]
    ZBus(#[from] zbus::Error),
    #[error("Failed to establish D-Bus connection")]
    NoConnection,
}

/// Global D-Bus connection singleton
static DBUS_CONNECTION: OnceCell<Arc<zbus::Connection>> = OnceCell::const_new();

/// Get or create a shared D-Bus session connection
async fn get_dbus_conn() -> Result<Arc<zbus::Connection>, SubscriptionError> {
    DBUS_CONNECTION
        .get_or_try_init(|| async {
            let conn = zbus::Connection::session()
                .await
                .map_err(|_| SubscriptionError::NoConnection)?;
            Ok(Arc::new(conn))
        })
        .await
        .cloned()
}

/// Forwards MPRIS playback-state transitions into the engine command channel.
pub struct PlaybackWatcher {
    commands: mpsc::Sender<Command>,
}

impl PlaybackWatcher {
    pub fn new(commands: mpsc::Sender<Command>) -> Self {
        Self { commands }
    }

    /// Register the match rule and consume the signal stream until the
    /// engine side goes away. Registration failure surfaces as a
    /// [`SubscriptionError`]; the caller logs it and carries on without
    /// bus-driven start/stop.
    pub async fn watch(self) -> Result<(), SubscriptionError> {
        let conn = get_dbus_conn().await?;
        let rule = MatchRule::builder()
            .msg_type(MessageType::Signal)
            .interface("org.freedesktop.DBus.Properties")?
            .member("PropertiesChanged")?
            .build();
        let mut stream = MessageStream::for_match_rule(rule, &conn, Some(16)).await?;

        while let Some(msg) = stream.try_next().await? {
            let body = msg.body();
            let Ok((interface, changed, _invalidated)) =
                body.deserialize::<(String, HashMap<String, OwnedValue>, Vec<String>)>()
            else {
                continue;
            };
            if interface != MPRIS_PLAYER_INTERFACE {
                continue;
            }
            let Some(playing) = playback_status_is_playing(&changed) else {
                continue;
            };
            if self
                .commands
                .send(Command::PlaybackChanged(playing))
                .await
                .is_err()
            {
                break;
            }
        }
        Ok(())
    }
}

/// Pull `PlaybackStatus` out of a changed-properties map. `None` when the
/// property is absent or not a string.
fn playback_status_is_playing(changed: &HashMap<String, OwnedValue>) -> Option<bool> {
    let val = changed.get("PlaybackStatus")?;
    let status: String = std::convert::TryInto::try_into(val.clone()).ok()?;
    Some(status == "Playing")
}
