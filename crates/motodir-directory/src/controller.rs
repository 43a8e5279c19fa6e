//! The application controller: owns the catalog state, the active view and
//! the signed-in user's data, and reacts to navigation and session changes.

use std::sync::Arc;

use motodir_core::{
    AppConfig, AuthUser, Bike, BikerProfile, DirectoryState, Navigator, Notice, Session, View,
    ViewEntered,
};
use motodir_gateway::{Auth, Gateway};
use tokio::sync::watch;

use crate::bikes::{list_bikes, DEFAULT_BUCKET};
use crate::catalog::{load_all_shops, DEFAULT_SHOPS_TABLE};
use crate::error::DirectoryError;
use crate::personalization::resolve_brands;
use crate::profile::get_or_create_profile;

/// Table and bucket names used by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    pub shops_table: String,
    pub storage_bucket: String,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            shops_table: DEFAULT_SHOPS_TABLE.to_owned(),
            storage_bucket: DEFAULT_BUCKET.to_owned(),
        }
    }
}

impl From<&AppConfig> for DirectorySettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            shops_table: config.shops_table.clone(),
            storage_bucket: config.storage_bucket.clone(),
        }
    }
}

pub struct Directory<G> {
    gateway: Arc<G>,
    settings: DirectorySettings,
    state: Option<DirectoryState>,
    navigator: Navigator,
    session_rx: watch::Receiver<Option<Session>>,
    notice: Option<Notice>,
    profile: Option<BikerProfile>,
    bikes: Vec<Bike>,
    bike_form_open: bool,
}

impl<G> Directory<G>
where
    G: Gateway + Auth,
{
    pub fn new(gateway: Arc<G>, settings: DirectorySettings) -> Self {
        let mut session_rx = gateway.subscribe();
        session_rx.mark_unchanged();
        Self {
            gateway,
            settings,
            state: None,
            navigator: Navigator::default(),
            session_rx,
            notice: None,
            profile: None,
            bikes: Vec::new(),
            bike_form_open: false,
        }
    }

    /// Loads the catalog and applies personalization for any existing session.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NoData`] for an empty catalog and
    /// [`DirectoryError::DataAccess`] when loading fails. Either way a
    /// persistent error notice is left in place.
    pub async fn start(&mut self) -> Result<(), DirectoryError> {
        self.notice = Some(Notice::loading("Loading motorcycle shops..."));
        let loaded = load_all_shops(self.gateway.as_ref(), &self.settings.shops_table).await;
        let shops = match loaded {
            Ok(shops) if shops.is_empty() => {
                self.notice = Some(Notice::error("No shops found in the directory.").persistent());
                return Err(DirectoryError::NoData);
            }
            Ok(shops) => shops,
            Err(e) => {
                tracing::error!(error = %e, "failed to load shop catalog");
                self.notice =
                    Some(Notice::error(format!("Error loading shops: {e}")).persistent());
                return Err(e.into());
            }
        };

        let count = shops.len();
        self.state = Some(DirectoryState::new(shops));
        self.notice = Some(Notice::success(format!("Loaded {count} shops")));
        self.refresh_personalization().await;
        Ok(())
    }

    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    #[must_use]
    pub fn settings(&self) -> &DirectorySettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> Option<&DirectoryState> {
        self.state.as_ref()
    }

    /// Mutable state for the filter input handlers.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotStarted`] before [`Directory::start`] succeeded.
    pub fn state_mut(&mut self) -> Result<&mut DirectoryState, DirectoryError> {
        self.state.as_mut().ok_or(DirectoryError::NotStarted)
    }

    #[must_use]
    pub fn current_view(&self) -> View {
        self.navigator.current()
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    #[must_use]
    pub fn profile(&self) -> Option<&BikerProfile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn bikes(&self) -> &[Bike] {
        &self.bikes
    }

    #[must_use]
    pub fn bike_form_open(&self) -> bool {
        self.bike_form_open
    }

    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.gateway.current_user()
    }

    /// Re-resolves personalization for the current user. Returns whether the
    /// result was applied; a result computed against a state that changed in
    /// the meantime is dropped.
    pub async fn refresh_personalization(&mut self) -> bool {
        let Some(ticket) = self.state.as_ref().map(DirectoryState::ticket) else {
            return false;
        };
        let user = self.gateway.current_user();
        let context = resolve_brands(self.gateway.as_ref(), user.as_ref()).await;
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let applied = state.apply_personalization(ticket, context);
        if !applied {
            tracing::debug!(ticket = ticket.generation(), "discarded stale personalization");
        }
        applied
    }

    /// Switches views and runs the entry hook of the new view.
    ///
    /// # Errors
    ///
    /// Returns any failure of the entry hook.
    pub async fn navigate(&mut self, view: View) -> Result<(), DirectoryError> {
        match self.navigator.navigate(view) {
            Some(entered) => self.on_enter(entered).await,
            None => Ok(()),
        }
    }

    /// Picks up session changes published by the auth service and reacts to
    /// them. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns any failure of a resulting view entry hook.
    pub async fn sync_session(&mut self) -> Result<bool, DirectoryError> {
        if !self.session_rx.has_changed().unwrap_or(false) {
            return Ok(false);
        }
        let signed_in = self.session_rx.borrow_and_update().is_some();
        tracing::debug!(signed_in, "session changed");

        if !signed_in {
            self.profile = None;
            self.bikes.clear();
            self.bike_form_open = false;
        }
        // Signing in on the profile view keeps the view, so its data is loaded here.
        let hook = match self.navigator.on_session_change(signed_in) {
            Some(entered) => self.on_enter(entered).await,
            None if signed_in && self.navigator.current() == View::Profile => {
                self.load_profile_view().await
            }
            None => Ok(()),
        };
        if signed_in {
            self.refresh_personalization().await;
        } else if let Some(state) = self.state.as_mut() {
            state.clear_personalization();
        }
        hook.map(|()| true)
    }

    /// # Errors
    ///
    /// Returns the sign-in failure; the view does not change.
    pub async fn sign_in(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Session, DirectoryError> {
        let session = crate::account::sign_in(self.gateway.as_ref(), email, password).await?;
        self.notice = Some(Notice::success("Signed in"));
        self.sync_session().await?;
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns the backend failure after the local session was cleared.
    pub async fn sign_out(&mut self) -> Result<(), DirectoryError> {
        let result = crate::account::sign_out(self.gateway.as_ref()).await;
        self.sync_session().await?;
        self.notice = Some(Notice::info("Signed out"));
        result
    }

    /// "Add your bike": signed-out users are sent to the login view, everyone
    /// else to their profile with the bike form open.
    ///
    /// # Errors
    ///
    /// Returns any failure of the profile entry hook.
    pub async fn request_add_bike(&mut self) -> Result<(), DirectoryError> {
        if self.gateway.current_session().is_none() {
            self.notice = Some(Notice::info("Please log in to add your bike"));
            return self.navigate(View::Login).await;
        }
        self.navigate(View::Profile).await?;
        self.bike_form_open = true;
        Ok(())
    }

    pub fn close_bike_form(&mut self) {
        self.bike_form_open = false;
    }

    /// Reloads the profile and bikes shown on the profile view.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotSignedIn`] without a session, otherwise
    /// any backend failure.
    pub async fn reload_profile(&mut self) -> Result<(), DirectoryError> {
        let user = self
            .gateway
            .current_user()
            .ok_or(DirectoryError::NotSignedIn)?;
        let profile = get_or_create_profile(self.gateway.as_ref(), &user).await?;
        let bikes = list_bikes(self.gateway.as_ref(), &profile).await?;
        tracing::debug!(bikes = bikes.len(), "profile view loaded");
        self.profile = Some(profile);
        self.bikes = bikes;
        Ok(())
    }

    async fn on_enter(&mut self, entered: ViewEntered) -> Result<(), DirectoryError> {
        tracing::debug!(from = %entered.from, to = %entered.to, "view entered");
        if entered.from == View::Profile {
            self.bike_form_open = false;
        }
        match entered.to {
            View::Profile if self.gateway.current_session().is_some() => {
                self.load_profile_view().await
            }
            View::Profile => {
                self.notice = Some(Notice::info("Please log in to view your profile"));
                Ok(())
            }
            View::Catalog | View::Login | View::Register => Ok(()),
        }
    }

    async fn load_profile_view(&mut self) -> Result<(), DirectoryError> {
        if let Err(e) = self.reload_profile().await {
            self.notice = Some(Notice::error(format!("Error loading profile: {e}")));
            return Err(e);
        }
        Ok(())
    }
}
