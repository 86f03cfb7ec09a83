//! Fire-and-forget launching of the external player application.

use tokio::process::Command;

/// Spawn the player application and move on. A spawn failure is logged and
/// otherwise ignored; nothing here may take the daemon down.
pub fn launch_player(command: &str) {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return;
    };
    match Command::new(program).args(parts).spawn() {
        Ok(_child) => {
            tracing::debug!(target: "lyricbar::launcher", "launched {program}");
        }
        Err(err) => {
            tracing::warn!(target: "lyricbar::launcher", "failed to launch {program}: {err}");
        }
    }
}
