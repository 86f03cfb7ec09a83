//! Status surface abstraction.
//!
//! The engine publishes through this trait instead of owning a widget, so
//! the binary can run with a stdout pipe surface and tests can record calls.

/// Host-provided status surface: a single replaceable line of text plus a
/// visibility toggle.
pub trait StatusDisplay {
    fn show(&mut self);
    fn hide(&mut self);
    fn set_text(&mut self, text: &str);
}

/// Writes each new status line to stdout (for scripting, panel bars that
/// read a pipe, etc.). Hidden state swallows writes; repeated identical
/// lines are not re-printed.
#[derive(Debug, Default)]
pub struct PipeDisplay {
    visible: bool,
    last_line: Option<String>,
}

impl PipeDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusDisplay for PipeDisplay {
    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.last_line = None;
    }

    fn set_text(&mut self, text: &str) {
        if !self.visible || text.is_empty() {
            return;
        }
        if self.last_line.as_deref() == Some(text) {
            return;
        }
        println!("{text}");
        self.last_line = Some(text.to_string());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::StatusDisplay;

    /// Call recorder used by the engine tests.
    #[derive(Debug, Default)]
    pub struct RecordingDisplay {
        pub shows: usize,
        pub hides: usize,
        pub texts: Vec<String>,
    }

    impl StatusDisplay for RecordingDisplay {
        fn show(&mut self) {
            self.shows += 1;
        }

        fn hide(&mut self) {
            self.hides += 1;
        }

        fn set_text(&mut self, text: &str) {
            self.texts.push(text.to_string());
        }
    }
}
