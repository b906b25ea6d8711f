//! Session Coordinator
//!
//! Owns the "session-expiry prompt is showing" state. When several requests
//! fail with an expired session at once, only the first may prompt the user
//! to sign in again; the rest wait for the outcome. The flag is cleared when
//! re-authentication succeeds.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::{debug, info};

/// Coordinates session-expiry prompts across concurrent requests.
///
/// Create one at application start and share it by reference.
#[derive(Debug, Default)]
pub struct SessionCoordinator {
    prompt_in_flight: AtomicBool,
    reauth_count: AtomicU64,
}

impl SessionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the expiry prompt.
    ///
    /// Returns true for exactly one caller until [`reset_on_reauth`] or
    /// [`abandon_prompt`] is called.
    ///
    /// [`reset_on_reauth`]: Self::reset_on_reauth
    /// [`abandon_prompt`]: Self::abandon_prompt
    pub fn begin_expiry_prompt(&self) -> bool {
        let claimed = self
            .prompt_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if claimed {
            info!("Session expired, prompting for sign-in");
        } else {
            debug!("Session-expiry prompt already showing");
        }
        claimed
    }

    pub fn is_prompt_in_flight(&self) -> bool {
        self.prompt_in_flight.load(Ordering::Acquire)
    }

    /// Marks a successful re-authentication and releases the prompt.
    pub fn reset_on_reauth(&self) {
        self.reauth_count.fetch_add(1, Ordering::AcqRel);
        self.prompt_in_flight.store(false, Ordering::Release);
        info!("Session re-established");
    }

    /// Releases the prompt without re-authenticating (user dismissed it).
    pub fn abandon_prompt(&self) {
        self.prompt_in_flight.store(false, Ordering::Release);
        debug!("Session-expiry prompt dismissed");
    }

    /// Number of successful re-authentications so far.
    pub fn reauth_count(&self) -> u64 {
        self.reauth_count.load(Ordering::Acquire)
    }
}
