//! Active-view selector.
//!
//! Exactly one view is active at a time. Switching views is driven both by
//! explicit navigation and by auth-state changes; every switch to a different
//! view yields a [`ViewEntered`] event that the caller uses to run the view's
//! load hook.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Catalog,
    Login,
    Register,
    Profile,
}

impl View {
    /// Parses a navigation target. Unknown names fall back to the catalog.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "login" => View::Login,
            "register" => View::Register,
            "profile" => View::Profile,
            _ => View::Catalog,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            View::Catalog => "shop-directory",
            View::Login => "login",
            View::Register => "register",
            View::Profile => "profile",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emitted when the active view changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEntered {
    pub from: View,
    pub to: View,
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: View,
}

impl Navigator {
    #[must_use]
    pub fn new(initial: View) -> Self {
        Self { current: initial }
    }

    #[must_use]
    pub fn current(&self) -> View {
        self.current
    }

    /// Switches to `view`. Returns `None` when it is already active.
    pub fn navigate(&mut self, view: View) -> Option<ViewEntered> {
        if view == self.current {
            return None;
        }
        let from = std::mem::replace(&mut self.current, view);
        Some(ViewEntered { from, to: view })
    }

    /// Reacts to a sign-in or sign-out.
    ///
    /// Signing in while an auth form is showing moves to the catalog; signing
    /// out while the profile is showing moves to the catalog. Anything else
    /// leaves the view alone.
    pub fn on_session_change(&mut self, signed_in: bool) -> Option<ViewEntered> {
        match (signed_in, self.current) {
            (true, View::Login | View::Register) | (false, View::Profile) => {
                self.navigate(View::Catalog)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_parses_known_views_and_defaults_to_catalog() {
        assert_eq!(View::from_name("shop-directory"), View::Catalog);
        assert_eq!(View::from_name("catalog"), View::Catalog);
        assert_eq!(View::from_name("login"), View::Login);
        assert_eq!(View::from_name("register"), View::Register);
        assert_eq!(View::from_name("profile"), View::Profile);
        assert_eq!(View::from_name("settings"), View::Catalog);
        assert_eq!(View::Profile.to_string(), "profile");
    }

    #[test]
    fn navigate_reports_entry_only_on_change() {
        let mut nav = Navigator::default();
        assert_eq!(nav.navigate(View::Catalog), None);
        assert_eq!(
            nav.navigate(View::Profile),
            Some(ViewEntered {
                from: View::Catalog,
                to: View::Profile
            })
        );
        assert_eq!(nav.current(), View::Profile);
    }

    #[test]
    fn sign_in_leaves_auth_views() {
        let mut nav = Navigator::new(View::Login);
        let entered = nav.on_session_change(true).unwrap();
        assert_eq!(entered.to, View::Catalog);

        let mut nav = Navigator::new(View::Register);
        assert_eq!(nav.on_session_change(true).unwrap().to, View::Catalog);

        let mut nav = Navigator::new(View::Profile);
        assert!(nav.on_session_change(true).is_none());
        assert_eq!(nav.current(), View::Profile);
    }

    #[test]
    fn sign_out_leaves_profile_only() {
        let mut nav = Navigator::new(View::Profile);
        assert_eq!(nav.on_session_change(false).unwrap().to, View::Catalog);

        let mut nav = Navigator::new(View::Login);
        assert!(nav.on_session_change(false).is_none());
        assert_eq!(nav.current(), View::Login);
    }
}
