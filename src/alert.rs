//! Modal notification collaborator.
//!
//! The router resets it on every navigation; components reach it through
//! their scope.

use crate::component::Hook;
use std::fmt;
use std::rc::Rc;
use tracing::info;

/// A labelled button with an optional callback.
#[derive(Clone)]
pub struct AlertButton {
    pub text: String,
    pub action: Option<Hook>,
}

impl AlertButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: None,
        }
    }

    /// The default dismiss button.
    pub fn close() -> Self {
        Self::new("Ok")
    }

    pub fn on_press(mut self, action: impl Fn() -> crate::Result<()> + 'static) -> Self {
        self.action = Some(Rc::new(action));
        self
    }

    /// Runs the callback, if any. Failures are logged and swallowed.
    pub fn press(&self) {
        if let Some(action) = &self.action {
            if let Err(e) = action() {
                tracing::warn!(button = %self.text, error = %e, "alert action failed");
            }
        }
    }
}

impl fmt::Debug for AlertButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertButton")
            .field("text", &self.text)
            .field("action", &self.action.is_some())
            .finish()
    }
}

pub trait Alert {
    /// Dismisses whatever is showing.
    fn reset(&self);
    fn display(&self, message: &str, close: AlertButton, action: Option<AlertButton>);
}

/// Headless alert: messages go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlert;

impl Alert for TracingAlert {
    fn reset(&self) {}

    fn display(&self, message: &str, close: AlertButton, action: Option<AlertButton>) {
        info!(
            message,
            close = %close.text,
            action = action.as_ref().map(|a| a.text.as_str()).unwrap_or(""),
            "alert"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn pressing_runs_the_action() {
        let pressed = Rc::new(Cell::new(0));
        let counter = pressed.clone();
        let button = AlertButton::new("Retry").on_press(move || {
            counter.set(counter.get() + 1);
            Ok(())
        });
        button.press();
        AlertButton::close().press();
        assert_eq!(pressed.get(), 1);
    }
}
