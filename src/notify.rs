//! Notification Channel
//!
//! Blocking, modal-style alerts and confirmations. The wizard uses
//! [`Notifier::alert`] to report a blocked step; page-level callers use
//! [`Notifier::confirm`] before destructive actions.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use log::debug;

/// Icon shown with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    Success,
    Info,
    Warning,
    Error,
    Question,
}

/// A single user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub icon: NotificationIcon,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(icon: NotificationIcon, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            icon,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Shorthand for a warning notification.
    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(NotificationIcon::Warning, title, body)
    }
}

/// Delivers notifications to the user.
pub trait Notifier {
    /// Shows a notification and blocks until it is dismissed.
    fn alert(&mut self, notification: &Notification);

    /// Asks the user to confirm or cancel. Returns `true` on confirm.
    fn confirm(&mut self, notification: &Notification) -> bool;
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn alert(&mut self, notification: &Notification) {
        (**self).alert(notification);
    }

    fn confirm(&mut self, notification: &Notification) -> bool {
        (**self).confirm(notification)
    }
}

/// Keeps every notification in memory.
///
/// Confirmations answer with a fixed reply.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    delivered: Vec<Notification>,
    confirm_reply: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reply given to every confirmation.
    pub fn with_confirm_reply(mut self, reply: bool) -> Self {
        self.confirm_reply = reply;
        self
    }

    /// Returns all notifications delivered so far.
    pub fn delivered(&self) -> &[Notification] {
        &self.delivered
    }

    pub fn count(&self) -> usize {
        self.delivered.len()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.delivered.last()
    }

    pub fn clear(&mut self) {
        self.delivered.clear();
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&mut self, notification: &Notification) {
        debug!("alert: {}", notification.title);
        self.delivered.push(notification.clone());
    }

    fn confirm(&mut self, notification: &Notification) -> bool {
        debug!("confirm: {} -> {}", notification.title, self.confirm_reply);
        self.delivered.push(notification.clone());
        self.confirm_reply
    }
}

/// Prints notifications to stderr and reads confirmations from stdin.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    fn print(notification: &Notification) {
        let badge = match notification.icon {
            NotificationIcon::Success => "✔".green().bold(),
            NotificationIcon::Info => "ℹ".blue().bold(),
            NotificationIcon::Warning => "⚠".yellow().bold(),
            NotificationIcon::Error => "✖".red().bold(),
            NotificationIcon::Question => "?".cyan().bold(),
        };

        eprintln!();
        eprintln!("{} {}", badge, notification.title.bold());
        for line in notification.body.lines() {
            eprintln!("  {}", line);
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn alert(&mut self, notification: &Notification) {
        Self::print(notification);
        eprintln!();
    }

    fn confirm(&mut self, notification: &Notification) -> bool {
        Self::print(notification);
        eprint!("  Confirm? [y/N] ");
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
