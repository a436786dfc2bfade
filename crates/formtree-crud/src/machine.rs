//! CRUD form state machine
//!
//! States are the root form's [`DataMode`]: `Unspecified` (view), `Insert`
//! and `Update`.
//!
//! | action  | from            | to          | guard                          |
//! |---------|-----------------|-------------|--------------------------------|
//! | New     | view            | Insert      | insert allowed                 |
//! | Edit    | view            | Update      | a record is loaded             |
//! | Save    | Insert, Update  | view        | form valid, handler succeeded  |
//! | Cancel  | Insert, Update  | view        |                                |
//! | Refresh | view            | view        | handler succeeded              |
//!
//! Every cascade step runs synchronously under the form lock; the lock is
//! never held across the awaited collaborator call. At most one load or save
//! is in flight per form, and all other actions are rejected meanwhile.

use crate::affordance::Affordances;
use crate::collab::{BusyIndicator, BusyScope, CrudHandler, DiscardPrompt, NoopBusy, SaveRequest};
use crate::config::CrudConfig;
use crate::error::CrudError;
use formtree_binding::{dirty, propagate, validation, Propagation};
use formtree_blocks::Form;
use formtree_node::{DataMode, DataNode, DataValue, NodeId, ValidationContext};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Session {
    form: Form,
    baseline: Option<DataValue>,
    last_save_result: Option<DataValue>,
    affordances: Affordances,
}

impl Session {
    fn derive(&self, busy: bool, config: &CrudConfig) -> Affordances {
        Affordances::derive(self.form.mode(), self.baseline.is_some(), busy, config)
    }
}

/// Orchestrates New/Edit/Save/Cancel/Refresh for one root form
///
/// Hosts share it as `Arc<CrudForm>`; all operations take `&self`.
pub struct CrudForm {
    session: Mutex<Session>,
    handler: Arc<dyn CrudHandler>,
    busy: Arc<dyn BusyIndicator>,
    prompt: Option<Arc<dyn DiscardPrompt>>,
    config: CrudConfig,
    context: ValidationContext,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for CrudForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudForm")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight flag and re-derives affordances on drop
struct InFlight<'a> {
    owner: &'a CrudForm,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.owner.in_flight.store(false, Ordering::Release);
        self.owner.resettle();
    }
}

impl CrudForm {
    /// Create state machine in view mode with no record loaded
    #[must_use]
    pub fn new(form: Form, handler: Arc<dyn CrudHandler>) -> Self {
        let config = CrudConfig::default();
        let mut session = Session {
            form,
            baseline: None,
            last_save_result: None,
            affordances: Affordances::default(),
        };
        session.affordances = session.derive(false, &config);
        Self {
            session: Mutex::new(session),
            handler,
            busy: Arc::new(NoopBusy),
            prompt: None,
            config,
            context: ValidationContext::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// With busy indicator
    #[must_use]
    pub fn with_busy(mut self, busy: Arc<dyn BusyIndicator>) -> Self {
        self.busy = busy;
        self
    }

    /// With close-query prompt
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn DiscardPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// With configuration
    #[must_use]
    pub fn with_config(mut self, config: CrudConfig) -> Self {
        let session = self.session.get_mut();
        session.affordances = session.derive(false, &config);
        self.config = config;
        self
    }

    /// With context shared by every validation pass
    #[must_use]
    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = context;
        self
    }

    /// Current mode
    #[must_use]
    pub fn mode(&self) -> DataMode {
        self.session.lock().form.mode()
    }

    /// Value the form returns to on Cancel
    #[must_use]
    pub fn baseline(&self) -> Option<DataValue> {
        self.session.lock().baseline.clone()
    }

    /// Currently available actions
    #[must_use]
    pub fn affordances(&self) -> Affordances {
        self.session.lock().affordances
    }

    /// Opaque result of the last successful save
    #[must_use]
    pub fn last_save_result(&self) -> Option<DataValue> {
        self.session.lock().last_save_result.clone()
    }

    /// Check if a load or save is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Check if any form in the tree holds unsaved edits
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        dirty::any_form_dirty(&self.session.lock().form)
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    /// Read access to the form
    pub fn with_form<R>(&self, f: impl FnOnce(&Form) -> R) -> R {
        f(&self.session.lock().form)
    }

    /// Programmatic mutation of the form, followed by an affordance update
    ///
    /// # Errors
    /// - `CrudError::Busy` while a load or save is in flight
    pub fn with_form_mut<R>(&self, f: impl FnOnce(&mut Form) -> R) -> Result<R, CrudError> {
        self.ensure_idle()?;
        let mut session = self.session.lock();
        let out = f(&mut session.form);
        self.settle(&mut session);
        Ok(out)
    }

    /// Apply a user edit to field `target` and propagate it
    ///
    /// Only accepted while inserting or updating.
    ///
    /// # Errors
    /// - `CrudError::Busy` while a load or save is in flight
    /// - `CrudError::IllegalTransition` in view mode
    /// - `CrudError::Binding` if `target` is not a data node of the form
    pub fn input(&self, target: NodeId, value: DataValue) -> Result<Propagation, CrudError> {
        self.ensure_idle()?;
        let mut session = self.session.lock();
        let mode = session.form.mode();
        if !mode.is_editing() {
            return Err(CrudError::illegal("input", mode));
        }
        let outcome = propagate::user_edit(&mut session.form, target, value)?;
        self.settle(&mut session);
        Ok(outcome)
    }

    /// Start a new record
    ///
    /// # Errors
    /// - `CrudError::IllegalTransition` unless in view mode
    /// - `CrudError::Disabled` if inserts are switched off
    /// - `CrudError::Busy` while a load or save is in flight
    pub fn new_record(&self) -> Result<(), CrudError> {
        self.ensure_idle()?;
        let mut guard = self.session.lock();
        let session = &mut *guard;
        let mode = session.form.mode();
        if mode.is_editing() {
            return Err(CrudError::illegal("create", mode));
        }
        if !self.config.allow_insert {
            return Err(CrudError::Disabled { action: "create" });
        }

        validation::clear(&mut session.form);
        session.form.set_value(self.config.insert_defaults.clone());
        session.form.set_mode(DataMode::Insert);
        dirty::mark_clean(&mut session.form);

        tracing::info!(from = %mode, to = %DataMode::Insert, "new record");
        self.settle(session);
        Ok(())
    }

    /// Start editing the loaded record
    ///
    /// # Errors
    /// - `CrudError::IllegalTransition` unless in view mode
    /// - `CrudError::Disabled` if updates are switched off
    /// - `CrudError::NoBaseline` if no record is loaded
    /// - `CrudError::Busy` while a load or save is in flight
    pub fn edit(&self) -> Result<(), CrudError> {
        self.ensure_idle()?;
        let mut guard = self.session.lock();
        let session = &mut *guard;
        let mode = session.form.mode();
        if mode.is_editing() {
            return Err(CrudError::illegal("edit", mode));
        }
        if !self.config.allow_update {
            return Err(CrudError::Disabled { action: "edit" });
        }
        if session.baseline.is_none() {
            return Err(CrudError::NoBaseline);
        }

        session.form.set_mode(DataMode::Update);

        tracing::info!(from = %mode, to = %DataMode::Update, "editing record");
        self.settle(session);
        Ok(())
    }

    /// Validate and persist the edited record
    ///
    /// On success the re-collected value becomes the new baseline and the
    /// form returns to view mode. Returns the handler's result.
    ///
    /// # Errors
    /// - `CrudError::IllegalTransition` unless editing
    /// - `CrudError::Invalid` if validation fails (the handler is not called)
    /// - `CrudError::Save` if the handler fails (state is unchanged)
    /// - `CrudError::Busy` while another load or save is in flight
    #[tracing::instrument(skip(self))]
    pub async fn save(&self) -> Result<DataValue, CrudError> {
        let _guard = self.enter()?;
        let request = self.prepare_save()?;

        let outcome = {
            let _busy = BusyScope::begin(self.busy.as_ref(), &self.config.busy_label);
            self.handler.save(&request).await
        };
        self.finish_save(request.mode, outcome)
    }

    fn prepare_save(&self) -> Result<SaveRequest, CrudError> {
        let mut guard = self.session.lock();
        let session = &mut *guard;
        let mode = session.form.mode();
        if !mode.is_editing() {
            return Err(CrudError::illegal("save", mode));
        }

        let scope = self.config.save_scope.as_deref();
        if let Some(error) = validation::validate(&mut session.form, &self.context, scope, true) {
            tracing::info!(errors = error.field_errors(), "save aborted by validation");
            self.settle(session);
            return Err(CrudError::Invalid(error));
        }

        Ok(SaveRequest {
            mode,
            value: session.form.value(),
        })
    }

    fn finish_save(
        &self,
        mode: DataMode,
        outcome: anyhow::Result<DataValue>,
    ) -> Result<DataValue, CrudError> {
        let result = outcome.map_err(|source| {
            tracing::warn!(error = %source, "save handler failed");
            CrudError::Save(source)
        })?;

        let mut guard = self.session.lock();
        let session = &mut *guard;
        if self.config.apply_save_result && result.is_object() {
            session.form.set_value(result.clone());
        }
        session.baseline = Some(session.form.untagged_value());
        session.form.set_mode(DataMode::Unspecified);
        dirty::mark_clean(&mut session.form);
        session.last_save_result = Some(result.clone());

        tracing::info!(from = %mode, to = %DataMode::Unspecified, "record saved");
        self.settle(session);
        Ok(result)
    }

    /// Abandon the edit session
    ///
    /// Clears every stored error without re-validating and restores the
    /// baseline (or empties the form when there is none).
    ///
    /// # Errors
    /// - `CrudError::IllegalTransition` unless editing
    /// - `CrudError::Busy` while a load or save is in flight
    pub fn cancel(&self) -> Result<(), CrudError> {
        self.ensure_idle()?;
        let mut guard = self.session.lock();
        let session = &mut *guard;
        let mode = session.form.mode();
        if !mode.is_editing() {
            return Err(CrudError::illegal("cancel", mode));
        }

        validation::clear(&mut session.form);
        let restore = session.baseline.clone().unwrap_or(DataValue::Null);
        session.form.set_value(restore);
        session.form.set_mode(DataMode::Unspecified);
        dirty::mark_clean(&mut session.form);

        tracing::info!(from = %mode, to = %DataMode::Unspecified, "edit canceled");
        self.settle(session);
        Ok(())
    }

    /// Reload the record through the handler
    ///
    /// A `Null` result empties the form and drops the baseline.
    ///
    /// # Errors
    /// - `CrudError::IllegalTransition` unless in view mode
    /// - `CrudError::Load` if the handler fails (state is unchanged)
    /// - `CrudError::Busy` while another load or save is in flight
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CrudError> {
        let _guard = self.enter()?;
        let mode = self.mode();
        if mode.is_editing() {
            return Err(CrudError::illegal("refresh", mode));
        }

        let loaded = {
            let _busy = BusyScope::begin(self.busy.as_ref(), &self.config.busy_label);
            self.handler.load().await
        }
        .map_err(|source| {
            tracing::warn!(error = %source, "load handler failed");
            CrudError::Load(source)
        })?;

        let mut guard = self.session.lock();
        let session = &mut *guard;
        validation::clear(&mut session.form);
        let found = !loaded.is_null();
        session.form.set_value(loaded);
        session.baseline = found.then(|| session.form.untagged_value());
        dirty::mark_clean(&mut session.form);

        tracing::info!(found, "record loaded");
        self.settle(session);
        Ok(())
    }

    /// Check if Save would pass validation right now
    ///
    /// Dry run: nothing is stored on the nodes.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        if self.is_busy() {
            return false;
        }
        let mut session = self.session.lock();
        session.form.mode().is_editing()
            && validation::is_valid(
                &mut session.form,
                &self.context,
                self.config.save_scope.as_deref(),
            )
    }

    /// Ask whether the host may close the form
    ///
    /// Clean forms close freely. With unsaved edits the prompt decides; with
    /// no prompt installed, closing is refused.
    pub async fn query_close(&self) -> bool {
        if !self.is_dirty() {
            return true;
        }
        let Some(prompt) = &self.prompt else {
            tracing::debug!("close refused: unsaved edits and no prompt");
            return false;
        };
        let allowed = prompt.confirm_discard().await;
        tracing::debug!(allowed, "close queried with unsaved edits");
        allowed
    }

    fn ensure_idle(&self) -> Result<(), CrudError> {
        if self.is_busy() {
            return Err(CrudError::Busy);
        }
        Ok(())
    }

    fn enter(&self) -> Result<InFlight<'_>, CrudError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CrudError::Busy)?;
        self.resettle();
        Ok(InFlight { owner: self })
    }

    fn settle(&self, session: &mut Session) {
        let next = session.derive(self.is_busy(), &self.config);
        if next != session.affordances {
            tracing::trace!(?next, "affordances changed");
            session.affordances = next;
        }
    }

    fn resettle(&self) {
        let mut session = self.session.lock();
        self.settle(&mut session);
    }
}
