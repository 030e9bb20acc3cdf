//! Expand/collapse controller.
//!
//! Two states, no transitions in between. The controller only holds the flag;
//! the scheduler owns it and requests a recompute on every change.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExpandMode {
    /// Row cap applies; hidden chips are summarized by the expand affordance.
    #[default]
    Collapsed,
    /// Every chip is shown; the affordance offers "collapse".
    Expanded,
}

impl ExpandMode {
    pub fn is_expanded(self) -> bool {
        matches!(self, ExpandMode::Expanded)
    }

    pub fn toggled(self) -> Self {
        match self {
            ExpandMode::Collapsed => ExpandMode::Expanded,
            ExpandMode::Expanded => ExpandMode::Collapsed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExpandMode::Collapsed => "collapsed",
            ExpandMode::Expanded => "expanded",
        }
    }
}

impl From<bool> for ExpandMode {
    fn from(expanded: bool) -> Self {
        if expanded {
            ExpandMode::Expanded
        } else {
            ExpandMode::Collapsed
        }
    }
}

#[derive(Debug, Default)]
pub struct ExpandController {
    mode: ExpandMode,
}

impl ExpandController {
    pub fn new(mode: ExpandMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExpandMode {
        self.mode
    }

    pub fn is_expanded(&self) -> bool {
        self.mode.is_expanded()
    }

    /// Flip the mode and return the new one.
    pub fn toggle(&mut self) -> ExpandMode {
        self.mode = self.mode.toggled();
        tracing::debug!(target: "layout.expand", mode = self.mode.as_str(), "expand_toggle");
        self.mode
    }

    /// Set an explicit mode; returns true when it changed.
    pub fn set(&mut self, mode: ExpandMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        tracing::debug!(target: "layout.expand", mode = mode.as_str(), "expand_set");
        true
    }
}
