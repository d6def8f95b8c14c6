//! The store controller
//!
//! `Workbook` owns the application state and is the only way to change it:
//! every mutation goes through [`Workbook::dispatch`]. After a change it
//! schedules a debounced write of the whole state and appends an audit entry.
//! Neither side effect can fail the dispatch.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::archive::{migrate_state, ImportPlan};
use crate::audit::AuditLogger;
use crate::config::{Settings, WorkbookPaths};
use crate::error::WorkbookResult;
use crate::models::{AppState, BudgetConfig, BudgetModel, ModelData, ModelId, ServiceId, Version};
use crate::services::compare::{compare, Comparison};
use crate::session::AdjustSession;
use crate::storage::{FileStore, KeyValueStore, PersistScheduler, STATE_KEY};

use super::action::Action;
use super::clock::{Clock, SystemClock};
use super::journal;
use super::reducer::reduce;

/// Which dataset of a model to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRef {
    /// The live working data
    Working,
    /// A saved version by number
    Version(u32),
}

impl fmt::Display for DataRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Working => write!(f, "working"),
            Self::Version(n) => write!(f, "v{}", n),
        }
    }
}

impl FromStr for DataRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("working") || s.eq_ignore_ascii_case("current") {
            return Ok(Self::Working);
        }
        s.trim_start_matches(['v', 'V'])
            .parse::<u32>()
            .map(Self::Version)
            .map_err(|_| format!("Expected a version number or 'working', got '{}'", s))
    }
}

pub struct Workbook {
    state: AppState,
    clock: Box<dyn Clock>,
    persistence: Option<PersistScheduler>,
    audit: Option<AuditLogger>,
}

impl Workbook {
    /// An in-memory workbook without persistence or audit trail
    pub fn new(state: AppState, clock: Box<dyn Clock>) -> Self {
        Self {
            state,
            clock,
            persistence: None,
            audit: None,
        }
    }

    pub fn with_persistence(mut self, scheduler: PersistScheduler) -> Self {
        self.persistence = Some(scheduler);
        self
    }

    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    /// Open the on-disk workbook under `paths`
    pub fn open(paths: &WorkbookPaths, settings: &Settings) -> WorkbookResult<Self> {
        paths.ensure_directories()?;

        let clock = Box::new(SystemClock);
        let store = FileStore::new(paths.state_dir());
        let first_run = matches!(store.get(STATE_KEY), Ok(None));
        let state = load_state(&store, settings.default_budget_config(), clock.now());
        let scheduler = PersistScheduler::new(
            Box::new(store),
            STATE_KEY,
            Duration::from_millis(settings.persist_debounce_ms),
        );

        let mut workbook = Self::new(state, clock)
            .with_persistence(scheduler)
            .with_audit(AuditLogger::new(paths.audit_log()));
        // The default model's id must survive to the next run
        if first_run {
            workbook.schedule_persist();
        }
        Ok(workbook)
    }

    /// Apply an action; returns whether the state changed
    pub fn dispatch(&mut self, action: Action) -> bool {
        let now = self.clock.now();
        let kind = action.kind();
        let draft = match self.audit {
            Some(_) => journal::draft(&self.state, &action, now),
            None => None,
        };

        let changed = reduce(&mut self.state, action, now);
        tracing::debug!(action = kind, changed, "dispatched");
        if !changed {
            return false;
        }

        if let (Some(logger), Some(draft)) = (&self.audit, draft) {
            if let Err(e) = logger.log(&draft.finish(&self.state)) {
                tracing::warn!(action = kind, error = %e, "failed to write audit entry");
            }
        }
        self.schedule_persist();
        true
    }

    /// Write the pending state if its debounce window has passed
    pub fn tick(&mut self) -> bool {
        self.persistence
            .as_mut()
            .map(PersistScheduler::poll)
            .unwrap_or(false)
    }

    /// Write the pending state now
    pub fn flush(&mut self) -> bool {
        self.persistence
            .as_mut()
            .map(PersistScheduler::flush)
            .unwrap_or(false)
    }

    pub fn has_pending_write(&self) -> bool {
        self.persistence
            .as_ref()
            .map(PersistScheduler::has_pending)
            .unwrap_or(false)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn audit(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    pub fn active_model(&self) -> Option<&BudgetModel> {
        self.state.active_model()
    }

    pub fn model(&self, id: ModelId) -> Option<&BudgetModel> {
        self.state.model(id)
    }

    pub fn find_model_by_name(&self, name: &str) -> Option<&BudgetModel> {
        self.state.find_model_by_name(name)
    }

    pub fn version(&self, model_id: ModelId, number: u32) -> Option<&Version> {
        self.model(model_id)?.version(number)
    }

    /// Working data or a version's data
    pub fn dataset(&self, model_id: ModelId, data: DataRef) -> Option<&ModelData> {
        let model = self.model(model_id)?;
        match data {
            DataRef::Working => Some(&model.data),
            DataRef::Version(number) => model.version(number).map(|v| &v.data),
        }
    }

    /// Compare two datasets of one model
    pub fn compare(&self, model_id: ModelId, older: DataRef, newer: DataRef) -> Option<Comparison> {
        Some(compare(
            self.dataset(model_id, older)?,
            self.dataset(model_id, newer)?,
        ))
    }

    /// Start an edit session on a service of the active model
    pub fn open_session(&self, service_id: ServiceId, undo_depth: usize) -> Option<AdjustSession> {
        let budget = self.active_model()?.data.budget(service_id)?;
        Some(AdjustSession::with_depth(service_id, *budget, undo_depth))
    }

    /// Write an edit session's budget back to the store
    pub fn accept_session(&mut self, session: AdjustSession) -> bool {
        self.dispatch(session.accept())
    }

    /// Classify an imported model against the current state
    pub fn plan_import(&self, model: BudgetModel) -> ImportPlan {
        ImportPlan::classify(&self.state, model)
    }

    fn schedule_persist(&mut self) {
        let Some(scheduler) = self.persistence.as_mut() else {
            return;
        };
        match serde_json::to_string(&self.state) {
            Ok(payload) => scheduler.schedule(payload),
            Err(e) => tracing::warn!(error = %e, "failed to serialize state"),
        }
    }
}

/// Read and migrate the persisted state, or start with a default model
///
/// An absent record is a first run. An unreadable one is logged and replaced
/// by the default on the next write.
pub fn load_state(
    store: &dyn KeyValueStore,
    default_config: BudgetConfig,
    now: DateTime<Utc>,
) -> AppState {
    let fresh = || AppState::with_default_model(default_config, now);

    match store.get(STATE_KEY) {
        Ok(Some(raw)) => match migrate_state(&raw, now) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "stored state is unusable, starting fresh");
                fresh()
            }
        },
        Ok(None) => fresh(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stored state, starting fresh");
            fresh()
        }
    }
}
