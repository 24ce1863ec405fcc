//! User Interface module
//!
//! The simulation drives the UI through the [`Ui`] trait: a progress
//! indicator for fast-forwarding, the combat mode toggle and the message log.
//! [`HeadlessUi`] records everything and is used when no frontend is attached.

/// Most messages the log keeps
pub const MAX_MESSAGES: usize = 100;

/// A message to display in the game log
#[derive(Debug, Clone, PartialEq)]
pub struct GameMessage {
    pub text: String,
    pub category: MessageCategory,
}

/// Categories for message filtering/coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Combat,
    System,
    Warning,
}

/// What the simulation needs from a user interface
pub trait Ui {
    /// Show the fast-forward progress indicator
    fn show_progress(&mut self, label: &str, total_hours: f32);
    fn update_progress(&mut self, hours_passed: f32);
    fn hide_progress(&mut self);
    fn enter_combat_mode(&mut self);
    fn exit_combat_mode(&mut self);
    /// Abort any pending "pick a target" interaction
    fn stop_target_selection(&mut self);
    fn log_message(&mut self, text: &str, category: MessageCategory);
}

/// State of the progress indicator
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressIndicator {
    pub label: String,
    pub total_hours: f32,
    pub hours_passed: f32,
}

/// A UI with no frontend that remembers what it was told
#[derive(Debug, Clone, Default)]
pub struct HeadlessUi {
    progress: Option<ProgressIndicator>,
    times_progress_shown: u32,
    times_progress_hidden: u32,
    in_combat_mode: bool,
    messages: Vec<GameMessage>,
}

impl HeadlessUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> Option<&ProgressIndicator> {
        self.progress.as_ref()
    }

    pub fn times_progress_shown(&self) -> u32 {
        self.times_progress_shown
    }

    pub fn times_progress_hidden(&self) -> u32 {
        self.times_progress_hidden
    }

    pub fn in_combat_mode(&self) -> bool {
        self.in_combat_mode
    }

    /// Get all messages
    pub fn messages(&self) -> &[GameMessage] {
        &self.messages
    }

    pub fn has_message_containing(&self, needle: &str) -> bool {
        self.messages.iter().any(|message| message.text.contains(needle))
    }
}

impl Ui for HeadlessUi {
    fn show_progress(&mut self, label: &str, total_hours: f32) {
        self.times_progress_shown += 1;
        self.progress = Some(ProgressIndicator {
            label: label.to_string(),
            total_hours,
            hours_passed: 0.0,
        });
    }

    fn update_progress(&mut self, hours_passed: f32) {
        if let Some(progress) = self.progress.as_mut() {
            progress.hours_passed = hours_passed;
        }
    }

    fn hide_progress(&mut self) {
        if self.progress.take().is_some() {
            self.times_progress_hidden += 1;
        }
    }

    fn enter_combat_mode(&mut self) {
        self.in_combat_mode = true;
    }

    fn exit_combat_mode(&mut self) {
        self.in_combat_mode = false;
    }

    fn stop_target_selection(&mut self) {}

    fn log_message(&mut self, text: &str, category: MessageCategory) {
        self.messages.push(GameMessage {
            text: text.to_string(),
            category,
        });

        // Keep only last 100 messages
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }
}
