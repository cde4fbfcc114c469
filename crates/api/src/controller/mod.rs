//! View controller
//!
//! Owns the login-screen / signed-in state machine, gates views by role and
//! loads each view's data through [`TrackerApi`]. Session events are drained
//! at the start and end of every operation, so an invalidated session lands
//! back on the sign-in screen without a restart.

mod errors;
mod state;
mod view_model;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use dailytrack_core::{
    can_edit_records, patch_record, per_person_aggregate, scope_rule, visible_rows,
    ActivityFilter, LoginScreen, ScopeRule, SessionEvent, SessionStore, View, WeeklySummary,
};
use dailytrack_domain::{
    ActivityQuery, ActivityRecord, FilterOptions, Identity, NewUser, OrgChart, PerformanceQuery,
    Product, ResourcePlan, SubmissionReceipt, TeamReportRow, TrackerSubmission,
};
use dailytrack_infra::TrackerApi;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, instrument, warn};

pub use errors::ControllerError;
pub use state::ControllerState;
pub use view_model::{ReportSource, ViewModel};

/// Minimum length accepted for a new account's password.
pub const MIN_PASSWORD_LEN: usize = 8;

type ControllerResult<T> = std::result::Result<T, ControllerError>;

#[derive(Debug, Default)]
struct OldDataState {
    filter: ActivityFilter,
    rows: Vec<ActivityRecord>,
}

/// Role-gated router over the tracker views.
pub struct ViewController {
    session: Arc<SessionStore>,
    api: Arc<TrackerApi>,
    chart: Arc<OrgChart>,
    state: RwLock<ControllerState>,
    events: Mutex<broadcast::Receiver<SessionEvent>>,
    old_data: Mutex<OldDataState>,
}

impl ViewController {
    /// Build a controller over an already restored session.
    ///
    /// `launch_url` is only consulted when nobody is signed in; a
    /// `reset_token` parameter opens the password reset screen.
    pub fn new(
        session: Arc<SessionStore>,
        api: Arc<TrackerApi>,
        chart: Arc<OrgChart>,
        launch_url: Option<&str>,
    ) -> Self {
        let events = session.subscribe();
        let state = ControllerState::initial(session.current_user(), launch_url);
        debug!(authenticated = state.is_authenticated(), "View controller created");
        Self {
            session,
            api,
            chart,
            state: RwLock::new(state),
            events: Mutex::new(events),
            old_data: Mutex::new(OldDataState::default()),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.sync_session();
        self.state.read().clone()
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.state().user().cloned()
    }

    pub fn current_view(&self) -> Option<View> {
        self.state().view()
    }

    /// Navigation entries for the signed-in role; empty when signed out.
    pub fn menu(&self) -> Vec<View> {
        self.current_user().map(|u| View::visible_to(u.role)).unwrap_or_default()
    }

    /// Switch between the login screens. Ignored while signed in.
    pub fn show_login_screen(&self, screen: LoginScreen) {
        self.sync_session();
        let mut state = self.state.write();
        if let ControllerState::Unauthenticated(current) = &mut *state {
            *current = screen;
        }
    }

    // === Authentication ===

    /// Sign in and land on `Home`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for blank credentials, `Api(Auth)` with the backend's
    /// message when the login is refused
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> ControllerResult<Identity> {
        self.sync_session();
        if email.trim().is_empty() || password.is_empty() {
            return Err(ControllerError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        let grant = self.api.login(email.trim(), password).await?;
        let user = grant.user.clone();
        self.session.start(grant).await?;

        *self.state.write() =
            ControllerState::Authenticated { user: user.clone(), view: View::Home };
        *self.old_data.lock() = OldDataState::default();
        info!(role = %user.role, "Signed in");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.sync_session();
        self.session.sign_out().await;
        self.reset_to_sign_in();
        info!("Signed out");
    }

    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> ControllerResult<()> {
        if email.trim().is_empty() {
            return Err(ControllerError::InvalidInput("Email is required".to_string()));
        }
        self.api.forgot_password(email.trim()).await?;
        info!("Password reset link requested");
        Ok(())
    }

    /// Set a new password from a reset token, then return to sign-in.
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ControllerResult<()> {
        if token.trim().is_empty() || new_password.is_empty() {
            return Err(ControllerError::InvalidInput(
                "Reset token and new password are required".to_string(),
            ));
        }
        self.api.reset_password(token.trim(), new_password).await?;
        self.show_login_screen(LoginScreen::SignIn);
        Ok(())
    }

    // === Navigation ===

    /// Open `view` for the signed-in user.
    ///
    /// # Errors
    ///
    /// `NotSignedIn` without a user, `Forbidden` when the role may not see
    /// the view
    #[instrument(skip(self), fields(view = %view))]
    pub fn navigate(&self, view: View) -> ControllerResult<()> {
        let user = self.require_user()?;
        if !view.is_visible_to(user.role) {
            warn!(role = %user.role, "View refused");
            return Err(ControllerError::forbidden_view(view));
        }

        let mut state = self.state.write();
        if let ControllerState::Authenticated { view: current, .. } = &mut *state {
            *current = view;
        }
        debug!("Navigated");
        Ok(())
    }

    /// Filter applied the next time the old-data view loads.
    pub fn set_old_data_filter(&self, filter: ActivityFilter) {
        self.old_data.lock().filter = filter;
    }

    /// Fetch and shape the data of the current view, as of today.
    pub async fn load_current_view(&self) -> ControllerResult<ViewModel> {
        self.load_current_view_on(Local::now().date_naive()).await
    }

    /// Same as [`ViewController::load_current_view`] with an explicit
    /// reference date for the weekly figures.
    #[instrument(skip(self))]
    pub async fn load_current_view_on(&self, today: NaiveDate) -> ControllerResult<ViewModel> {
        let user = self.require_user()?;
        let view = self.current_view().ok_or(ControllerError::NotSignedIn)?;

        let loaded = self.load_view(&user, view, today).await;
        // A 401 that could not be refreshed has invalidated the session by now.
        self.sync_session();

        let model = loaded?;
        debug!(view = %model.view(), rows = model.row_count(), "View loaded");
        Ok(model)
    }

    async fn load_view(
        &self,
        user: &Identity,
        view: View,
        today: NaiveDate,
    ) -> ControllerResult<ViewModel> {
        match view {
            View::Home => Ok(ViewModel::Home {
                user: user.clone(),
                menu: View::visible_to(user.role),
                scope: scope_rule(user, &self.chart).describe(),
            }),
            View::Tracker => Ok(ViewModel::Tracker {
                products: Product::KNOWN.to_vec(),
                pods: self.chart.all_pods(),
            }),
            View::ResourcePlanner => Ok(ViewModel::ResourcePlanner { pods: self.chart.all_pods() }),
            View::Performance => self.load_performance(user, today).await,
            View::OldData => self.load_old_data(user).await,
            View::TeamReport => self.load_team_report(user, today).await,
            View::TeamControl => {
                self.require_admin(user, "Team Control")?;
                let users = self.api.list_users().await?;
                Ok(ViewModel::TeamControl { users })
            }
        }
    }

    async fn load_performance(
        &self,
        user: &Identity,
        today: NaiveDate,
    ) -> ControllerResult<ViewModel> {
        let query = PerformanceQuery::for_identity(user, today);
        let fetched = self.api.performance(&query).await?;
        let rows = visible_rows(fetched, user, &self.chart);
        // the 40h target is personal, even when the table shows a team
        let own = ScopeRule::Own { email: user.email.clone() };
        let own_rows: Vec<ActivityRecord> =
            rows.iter().filter(|r| own.allows(r)).cloned().collect();
        let summary = WeeklySummary::compute(&own_rows, today);
        Ok(ViewModel::Performance {
            query,
            summary,
            rows,
            scope: scope_rule(user, &self.chart).describe(),
        })
    }

    async fn load_old_data(&self, user: &Identity) -> ControllerResult<ViewModel> {
        let filter = self.old_data.lock().filter.clone();
        let query = ActivityQuery {
            email: ActivityQuery::for_identity(user).email,
            ..filter.to_query()
        };

        let (fetched, options) =
            tokio::join!(self.api.daily_activity(&query), self.api.filter_options());
        // The server ignores the date range; narrow locally as well.
        let rows = filter.apply(&visible_rows(fetched?, user, &self.chart));
        let options = match options {
            Ok(options) if !options.is_empty() => options,
            Ok(_) => FilterOptions::from_records(&rows),
            Err(e) => {
                warn!(error = %e, "Filter options unavailable, deriving from rows");
                FilterOptions::from_records(&rows)
            }
        };

        self.old_data.lock().rows.clone_from(&rows);
        Ok(ViewModel::OldData { rows, options, filter, can_edit: can_edit_records(user.role) })
    }

    async fn load_team_report(
        &self,
        user: &Identity,
        today: NaiveDate,
    ) -> ControllerResult<ViewModel> {
        let query = PerformanceQuery::for_identity(user, today);
        let backend = match self.api.team_report(&query).await {
            Ok(rows) if !rows.is_empty() => Some(rows),
            Ok(_) => {
                debug!("Team report empty, aggregating locally");
                None
            }
            Err(e) if e.status() == Some(404) => {
                debug!("Team report endpoint missing, aggregating locally");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let unrestricted = scope_rule(user, &self.chart) == ScopeRule::All;
        if let (Some(rows), true) = (&backend, unrestricted) {
            return Ok(ViewModel::TeamReport { rows: rows.clone(), source: ReportSource::Backend });
        }

        // The backend does not scope the report; members are whoever shows
        // up in the caller's visible performance rows.
        let scoped = visible_rows(self.api.performance(&query).await?, user, &self.chart);
        if let Some(rows) = backend {
            let members: HashSet<&str> = scoped.iter().filter_map(|r| r.email.as_deref()).collect();
            let dropped = rows.len();
            let rows: Vec<TeamReportRow> =
                rows.into_iter().filter(|row| members.contains(row.email.as_str())).collect();
            debug!(kept = rows.len(), dropped = dropped - rows.len(), "Team report scoped");
            return Ok(ViewModel::TeamReport { rows, source: ReportSource::Backend });
        }

        let rows: Vec<TeamReportRow> =
            per_person_aggregate(&scoped).into_iter().map(TeamReportRow::from).collect();
        Ok(ViewModel::TeamReport { rows, source: ReportSource::Local })
    }

    // === Submissions ===

    #[instrument(skip(self, submission), fields(date = %submission.date))]
    pub async fn submit_tracker(
        &self,
        submission: &TrackerSubmission,
    ) -> ControllerResult<SubmissionReceipt> {
        self.require_user()?;
        if submission.date.trim().is_empty() {
            return Err(ControllerError::InvalidInput("Date is required".to_string()));
        }
        if submission.projects.is_empty() {
            return Err(ControllerError::InvalidInput(
                "At least one project entry is required".to_string(),
            ));
        }

        let mut outgoing = submission.clone();
        for entry in &mut outgoing.projects {
            entry.retain_product_fields(&outgoing.product);
        }
        let receipt = self.call(self.api.submit_tracker(&outgoing)).await?;
        info!(count = ?receipt.count, hours = outgoing.total_hours(), "Tracker submitted");
        Ok(receipt)
    }

    #[instrument(skip(self, plan), fields(date = %plan.date))]
    pub async fn submit_resource_plan(&self, plan: &ResourcePlan) -> ControllerResult<()> {
        self.require_user()?;
        if plan.date.trim().is_empty() || plan.pod_name.trim().is_empty() {
            return Err(ControllerError::InvalidInput("Date and pod are required".to_string()));
        }
        self.call(self.api.submit_resource_plan(plan)).await
    }

    /// Save an edited old-data row and patch the loaded rows in place.
    ///
    /// Returns whether a loaded row matched the edit.
    #[instrument(skip(self, edited))]
    pub async fn save_record_edit(&self, edited: &ActivityRecord) -> ControllerResult<bool> {
        let user = self.require_user()?;
        if !can_edit_records(user.role) {
            return Err(ControllerError::Forbidden("Editing records".to_string()));
        }
        self.call(self.api.edit_record(edited)).await?;
        let patched = patch_record(&mut self.old_data.lock().rows, edited);
        info!(patched, "Record edit saved");
        Ok(patched)
    }

    // === User management ===

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    pub async fn create_user(&self, new_user: &NewUser) -> ControllerResult<()> {
        let user = self.require_user()?;
        self.require_admin(&user, "User management")?;
        if new_user.name.trim().is_empty()
            || new_user.email.trim().is_empty()
            || new_user.password.is_empty()
        {
            return Err(ControllerError::InvalidInput("All fields are required".to_string()));
        }
        if new_user.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ControllerError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        self.call(self.api.create_user(new_user)).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> ControllerResult<()> {
        let user = self.require_user()?;
        self.require_admin(&user, "User management")?;
        if id.trim().is_empty() {
            return Err(ControllerError::InvalidInput("User id is required".to_string()));
        }
        self.call(self.api.delete_user(id)).await
    }

    // === Internals ===

    /// Await an API call, then pick up any session change it caused.
    async fn call<T, F>(&self, fut: F) -> ControllerResult<T>
    where
        F: std::future::Future<Output = Result<T, dailytrack_infra::ApiError>>,
    {
        let result = fut.await;
        self.sync_session();
        result.map_err(ControllerError::from)
    }

    fn require_user(&self) -> ControllerResult<Identity> {
        self.current_user().ok_or(ControllerError::NotSignedIn)
    }

    fn require_admin(&self, user: &Identity, what: &str) -> ControllerResult<()> {
        if user.role.is_admin() {
            Ok(())
        } else {
            warn!(role = %user.role, what, "Admin action refused");
            Err(ControllerError::Forbidden(what.to_string()))
        }
    }

    fn reset_to_sign_in(&self) {
        *self.state.write() = ControllerState::signed_out();
        *self.old_data.lock() = OldDataState::default();
    }

    /// Apply pending session events, then make sure a signed-in state still
    /// has a session behind it.
    fn sync_session(&self) {
        loop {
            let next = self.events.lock().try_recv();
            match next {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed session events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        if self.state.read().is_authenticated() && !self.session.is_authenticated() {
            debug!("Session gone, returning to sign-in");
            self.reset_to_sign_in();
        }
    }

    fn apply_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Invalidated { reason } => {
                warn!(%reason, "Session invalidated, returning to sign-in");
                self.reset_to_sign_in();
            }
            SessionEvent::SignedOut => self.reset_to_sign_in(),
            SessionEvent::SignedIn(user) => {
                let mut state = self.state.write();
                if !state.is_authenticated() {
                    *state = ControllerState::Authenticated { user, view: View::Home };
                }
            }
            SessionEvent::TokenRefreshed => debug!("Access token refreshed"),
        }
    }
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController").field("state", &*self.state.read()).finish_non_exhaustive()
    }
}
