//! Module: engine
//! Responsibility: the component lifecycle, fetch-cycle orchestration,
//! interaction routing, and every asynchronous completion boundary.
//! Does not own: strategy decisions (source), normalization (mapper), or
//! the marker cache (reconcile).
//!
//! Invariants:
//! - Provider state machine: Uninitialized → Loading → Ready, with calls
//!   arriving during Loading queued and drained on readiness.
//! - Every data-producing request is generation-tagged; a completion whose
//!   generation is stale is dropped, never reconciled.
//! - At most one info window is open per instance, enforced by explicit
//!   close-before-open.

use crate::{
    RESIZE_DEBOUNCE_MS,
    config::{ConfigError, WidgetConfig},
    drag::{self, GeocodeResolution},
    effect::{ActionOutcome, Effect, Generation, GeocodeOutcome, MapEvent, QueryOutcome},
    error::InternalError,
    geometry::LatLng,
    mapper,
    obs::sink::{self, FetchStrategy, MetricsEvent, MetricsSink, StaleKind},
    reconcile::Reconciler,
    record::{Guid, SourceRecord},
    schema::{self, SchemaPlan},
    source::{self, FetchPlan},
    surface::{self, MapSurface},
};
use tracing::{debug, error, warn};

///
/// ProviderState
///

#[derive(Debug)]
enum ProviderState {
    Uninitialized,
    Loading { queued: Vec<QueuedCall> },
    Ready,
    Disposed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum QueuedCall {
    Fetch,
    Resize,
}

///
/// MarkerEngine
///
/// One widget instance: configuration, provider surface, marker cache, and
/// the in-flight bookkeeping for asynchronous collaborators.
///

pub struct MarkerEngine<S: MapSurface> {
    config: WidgetConfig,
    surface: S,
    state: ProviderState,
    context: Option<SourceRecord>,
    subscription: Option<Guid>,
    reconciler: Reconciler,
    last_seen: Vec<SourceRecord>,
    generation: Generation,
    fetch_inflight: Option<Generation>,
    geocode_inflight: Option<(Generation, Guid)>,
    open_info_window: Option<Guid>,
    resize_token: u64,
    metrics: Option<&'static dyn MetricsSink>,
}

impl<S: MapSurface> MarkerEngine<S> {
    /// Construct an engine over a validated configuration.
    pub fn new(config: WidgetConfig, surface: S) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            surface,
            state: ProviderState::Uninitialized,
            context: None,
            subscription: None,
            reconciler: Reconciler::new(),
            last_seen: Vec::new(),
            generation: Generation::default(),
            fetch_inflight: None,
            geocode_inflight: None,
            open_info_window: None,
            resize_token: 0,
            metrics: None,
        })
    }

    /// Route instrumentation to a dedicated sink instead of global state.
    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &WidgetConfig {
        &self.config
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    #[must_use]
    pub fn last_seen(&self) -> &[SourceRecord] {
        &self.last_seen
    }

    #[must_use]
    pub const fn open_info_window(&self) -> Option<&Guid> {
        self.open_info_window.as_ref()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Begin provider loading. Idempotent; only meaningful from the
    /// uninitialized state.
    pub fn initialize(&mut self) {
        if matches!(self.state, ProviderState::Uninitialized) {
            self.state = ProviderState::Loading { queued: Vec::new() };
            debug!("map provider loading");
        }
    }

    /// The provider SDK finished loading; drain calls queued meanwhile.
    pub fn on_provider_ready(&mut self) -> Vec<Effect> {
        let queued = match std::mem::replace(&mut self.state, ProviderState::Ready) {
            ProviderState::Loading { queued } => queued,
            ProviderState::Ready => return Vec::new(),
            other @ (ProviderState::Uninitialized | ProviderState::Disposed) => {
                self.state = other;
                return Vec::new();
            }
        };

        debug!(queued = queued.len(), "map provider ready");

        let mut effects = Vec::new();
        if queued.contains(&QueuedCall::Fetch) {
            effects.extend(self.start_fetch());
        }
        if queued.contains(&QueuedCall::Resize) {
            self.surface.trigger_resize();
        }

        effects
    }

    /// Rebind the context object, re-arm the change subscription, and start
    /// a fetch cycle.
    pub fn on_context_changed(&mut self, context: Option<SourceRecord>) -> Vec<Effect> {
        if matches!(self.state, ProviderState::Disposed) {
            return Vec::new();
        }

        let mut effects = Vec::new();

        if let Some(old) = self.subscription.take() {
            effects.push(Effect::Unsubscribe { guid: old });
        }
        if let Some(ctx) = &context {
            let guid = ctx.guid().clone();
            effects.push(Effect::Subscribe { guid: guid.clone() });
            self.subscription = Some(guid);
        }
        self.context = context;

        if self.ready_or_queue(QueuedCall::Fetch) {
            effects.extend(self.start_fetch());
            self.surface.trigger_resize();
        }

        effects
    }

    /// The host reported a change to the subscribed context object:
    /// re-display the refreshed context record alone.
    pub fn on_subscription_fired(&mut self, record: SourceRecord) -> Vec<Effect> {
        if self.subscription.as_ref() != Some(record.guid()) {
            debug!(guid = %record.guid(), "change notification for unsubscribed record dropped");
            return Vec::new();
        }

        self.context = Some(record.clone());
        if matches!(self.state, ProviderState::Ready) {
            match self.resolve_plan() {
                Ok(plan) => self.complete_records(vec![record], &plan),
                Err(effects) => return effects,
            }
        }

        Vec::new()
    }

    /// Debounced reflow signal; bursts collapse to the last call.
    pub fn on_resize(&mut self) -> Vec<Effect> {
        if matches!(
            self.state,
            ProviderState::Uninitialized | ProviderState::Disposed
        ) {
            return Vec::new();
        }

        self.resize_token += 1;
        vec![Effect::ScheduleResizeFlush {
            token: self.resize_token,
            delay_ms: RESIZE_DEBOUNCE_MS,
        }]
    }

    /// Debounce timer fired. Stale tokens are collapsed bursts; ignored.
    pub fn on_resize_flush(&mut self, token: u64) {
        if token == self.resize_token && self.ready_or_queue(QueuedCall::Resize) {
            self.surface.trigger_resize();
        }
    }

    /// Explicit refresh-from-source: wholesale cache invalidation plus a
    /// fresh fetch cycle.
    pub fn refresh(&mut self) -> Vec<Effect> {
        if matches!(self.state, ProviderState::Disposed) {
            return Vec::new();
        }

        self.reconciler.invalidate(&mut self.surface);
        if self.ready_or_queue(QueuedCall::Fetch) {
            self.start_fetch()
        } else {
            Vec::new()
        }
    }

    /// Tear down: unsubscribe, blank the map, terminal state.
    pub fn dispose(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(old) = self.subscription.take() {
            effects.push(Effect::Unsubscribe { guid: old });
        }
        self.close_info_window_if_open();
        self.reconciler.remove_all(&mut self.surface);
        self.state = ProviderState::Disposed;
        effects
    }

    /// Flip the draggable flag on every currently known marker.
    pub fn set_dragging(&mut self, enabled: bool) {
        self.reconciler.set_dragging(&mut self.surface, enabled);
    }

    // ---------------------------------------------------------------------
    // Fetch cycle
    // ---------------------------------------------------------------------

    fn start_fetch(&mut self) -> Vec<Effect> {
        self.generation = self.generation.next();
        self.fetch_inflight = None;

        // Go-to-context mode with nothing bound: blank the map and stop.
        if self.config.go_to_context && self.context.is_none() {
            self.reconciler.remove_all(&mut self.surface);
            return Vec::new();
        }

        let plan = match self.resolve_plan() {
            Ok(plan) => plan,
            Err(effects) => return effects,
        };

        let cache_populated = !self.reconciler.cache().is_empty();
        let decision = source::plan_fetch(
            &self.config,
            &plan,
            self.context.as_ref(),
            cache_populated,
        );
        self.execute_fetch(decision, &plan)
    }

    fn execute_fetch(&mut self, decision: FetchPlan, plan: &SchemaPlan) -> Vec<Effect> {
        match decision {
            FetchPlan::UseContext => {
                self.emit(MetricsEvent::FetchStarted {
                    strategy: FetchStrategy::Context,
                });
                if let Some(ctx) = self.context.clone() {
                    self.complete_records(vec![ctx], plan);
                }
                Vec::new()
            }

            FetchPlan::ServeFromCache => {
                let context_guid = self.context.as_ref().map(|ctx| ctx.guid().clone());
                let served = self.reconciler.serve_from_cache(
                    context_guid.as_ref(),
                    &mut self.surface,
                    &self.config,
                );
                if let Some(frame) = served {
                    self.emit(MetricsEvent::FetchStarted {
                        strategy: FetchStrategy::Cache,
                    });
                    surface::apply_frame(&mut self.surface, frame);
                    Vec::new()
                } else {
                    // Nothing cached for this context; re-plan against the store.
                    let fallback = source::plan_fetch(&self.config, plan, self.context.as_ref(), false);
                    self.execute_fetch(fallback, plan)
                }
            }

            FetchPlan::RunAction { action, target } => {
                self.emit(MetricsEvent::FetchStarted {
                    strategy: FetchStrategy::Action,
                });
                self.fetch_inflight = Some(self.generation);
                vec![Effect::RunAction {
                    generation: self.generation,
                    action,
                    target,
                }]
            }

            FetchPlan::RunQuery(request) => {
                self.emit(MetricsEvent::FetchStarted {
                    strategy: FetchStrategy::Query,
                });
                self.fetch_inflight = Some(self.generation);
                vec![Effect::RunQuery {
                    generation: self.generation,
                    request,
                }]
            }

            FetchPlan::Skip(reason) => {
                self.emit(MetricsEvent::FetchSkipped);
                let diag = InternalError::source_config_gap(format!(
                    "fetch skipped ({reason:?}): constraint requires a context object"
                ));
                warn!("{}", diag.display_with_class());
                Vec::new()
            }
        }
    }

    /// Query completion from the host store.
    pub fn on_query_complete(&mut self, generation: Generation, outcome: QueryOutcome) -> Vec<Effect> {
        if !self.accept_fetch_completion(generation, StaleKind::Query) {
            return Vec::new();
        }

        match outcome {
            QueryOutcome::Records(records) => self.reconcile_fetched(records),
            QueryOutcome::Failed(reason) => {
                let err = InternalError::source_external(format!("store query failed: {reason}"));
                error!("{}", err.display_with_class());
                vec![Effect::NotifyHostError {
                    message: err.display_with_class(),
                }]
            }
        }
    }

    /// Action completion from the host action runner.
    pub fn on_action_complete(&mut self, generation: Generation, outcome: ActionOutcome) -> Vec<Effect> {
        if !self.accept_fetch_completion(generation, StaleKind::Action) {
            return Vec::new();
        }

        match outcome {
            ActionOutcome::Records(records) => self.reconcile_fetched(records),
            ActionOutcome::Failed(reason) => {
                self.emit(MetricsEvent::ActionFailed);
                let err =
                    InternalError::source_external(format!("data action failed: {reason}"));
                error!("{}", err.display_with_class());
                vec![Effect::NotifyHostError {
                    message: err.display_with_class(),
                }]
            }
        }
    }

    fn accept_fetch_completion(&mut self, generation: Generation, kind: StaleKind) -> bool {
        if self.fetch_inflight != Some(generation) || generation != self.generation {
            self.emit(MetricsEvent::StaleCompletionDropped { kind });
            debug!(%generation, current = %self.generation, "stale fetch completion dropped");
            return false;
        }
        self.fetch_inflight = None;
        true
    }

    fn reconcile_fetched(&mut self, records: Vec<SourceRecord>) -> Vec<Effect> {
        match self.resolve_plan() {
            Ok(plan) => {
                self.complete_records(records, &plan);
                Vec::new()
            }
            Err(effects) => effects,
        }
    }

    fn complete_records(&mut self, records: Vec<SourceRecord>, plan: &SchemaPlan) {
        let context_guid = self.context.as_ref().map(|ctx| ctx.guid().clone());
        let views = mapper::normalize(&records, plan, &self.config.roles, context_guid.as_ref());
        self.last_seen = records;

        if self.config.debug {
            debug!(batch = views.len(), "reconciling normalized result batch");
        }

        // Replacement discards transient handle state; an open info window
        // cannot survive its anchor.
        self.close_info_window_if_open();

        let outcome = self
            .reconciler
            .reconcile(&views, &mut self.surface, &self.config);
        self.emit(MetricsEvent::MarkersReconciled {
            placed: outcome.placed.len() as u64,
            replaced: outcome.replaced.len() as u64,
            suppressed: u64::from(outcome.suppressed),
        });

        surface::apply_frame(&mut self.surface, outcome.frame);
    }

    /// Resolve the disposable per-cycle schema plan.
    ///
    /// Bindings were validated at construction, so failure here is an
    /// invariant break, surfaced as a diagnostic rather than a panic.
    fn resolve_plan(&self) -> Result<SchemaPlan, Vec<Effect>> {
        schema::resolve(&self.config.roles).map_err(|err| {
            let internal = InternalError::engine_invariant(format!(
                "schema resolution failed after validation: {err}"
            ));
            error!("{}", internal.display_with_class());
            vec![Effect::NotifyHostError {
                message: internal.display_with_class(),
            }]
        })
    }

    // ---------------------------------------------------------------------
    // Marker interaction
    // ---------------------------------------------------------------------

    pub fn on_map_event(&mut self, event: MapEvent) -> Vec<Effect> {
        match event {
            MapEvent::MarkerClicked { guid } => self.marker_clicked(&guid),
            MapEvent::MarkerDragEnded { guid, position } => self.marker_drag_ended(&guid, position),
            MapEvent::InfoWindowReady { guid } => {
                self.info_window_ready(&guid);
                Vec::new()
            }
            MapEvent::InfoWindowActionClicked { guid } => self.info_window_action(&guid),
        }
    }

    fn marker_clicked(&mut self, guid: &Guid) -> Vec<Effect> {
        if self.config.disable_info_window {
            return self.info_window_action(guid);
        }

        let Some(handle) = self.reconciler.handle(guid) else {
            return Vec::new();
        };
        let anchor = handle.surface_id();
        let content = format!(
            "{}: <b>{}</b>",
            self.config.info_window_label,
            handle.title()
        );

        self.close_info_window_if_open();
        self.surface.open_info_window(anchor, &content);
        self.open_info_window = Some(guid.clone());

        Vec::new()
    }

    /// The provider materialized the window content; only now can the
    /// action control be injected.
    fn info_window_ready(&mut self, guid: &Guid) {
        let Some(action) = &self.config.on_click_action else {
            return;
        };
        if self.open_info_window.as_ref() != Some(guid) {
            return;
        }
        let Some(handle) = self.reconciler.handle(guid) else {
            return;
        };

        let content = format!(
            "{}: <b>{}</b><br><br>{}",
            self.config.info_window_label,
            handle.title(),
            action_control_markup(guid, action),
        );
        self.surface
            .set_info_window_content(handle.surface_id(), &content);
    }

    fn info_window_action(&mut self, guid: &Guid) -> Vec<Effect> {
        self.config.on_click_action.as_ref().map_or_else(Vec::new, |action| {
            vec![Effect::TriggerAction {
                action: action.clone(),
                target: guid.clone(),
            }]
        })
    }

    fn marker_drag_ended(&mut self, guid: &Guid, position: LatLng) -> Vec<Effect> {
        let Some(writes) =
            drag::apply_drag(guid, position, &self.last_seen, &self.config.roles)
        else {
            let err = InternalError::drag_not_found(format!(
                "no last-seen record for dragged marker {guid}"
            ));
            debug!("{}", err.display_with_class());
            return Vec::new();
        };

        if let Some(handle) = self.reconciler.handle_mut(guid) {
            handle.set_position(position);
        }

        let mut effects = writes.effects;
        for _ in &effects {
            self.emit(MetricsEvent::AttributeWritten);
        }

        if writes.wants_geocode {
            self.emit(MetricsEvent::GeocodeRequested);
            self.geocode_inflight = Some((self.generation, guid.clone()));
            effects.push(Effect::Geocode {
                generation: self.generation,
                guid: guid.clone(),
                position,
            });
        }

        effects
    }

    /// Geocode completion for a dragged marker.
    pub fn on_geocode_complete(
        &mut self,
        generation: Generation,
        outcome: GeocodeOutcome,
    ) -> Vec<Effect> {
        let stale = match &self.geocode_inflight {
            Some((expected, _)) => generation != *expected || generation != self.generation,
            None => true,
        };
        if stale {
            self.emit(MetricsEvent::StaleCompletionDropped {
                kind: StaleKind::Geocode,
            });
            debug!(%generation, "stale geocode completion dropped");
            return Vec::new();
        }
        let Some((_, guid)) = self.geocode_inflight.take() else {
            return Vec::new();
        };

        if !matches!(outcome, GeocodeOutcome::Address(_)) {
            self.emit(MetricsEvent::GeocodeFailed);
        }

        let mut effects = Vec::new();
        let text = match drag::resolve_geocode(outcome) {
            GeocodeResolution::Persist(address) => {
                self.emit(MetricsEvent::AttributeWritten);
                effects.push(Effect::WriteAttribute {
                    guid: guid.clone(),
                    attribute: self.config.roles.address.clone(),
                    value: address.clone(),
                });
                address
            }
            GeocodeResolution::Failure(reason) => reason.to_string(),
        };

        if let Some(handle) = self.reconciler.handle_mut(&guid) {
            handle.set_formatted_address(text.clone());
        }

        if !self.config.disable_info_window
            && let Some(handle) = self.reconciler.handle(&guid)
        {
            let anchor = handle.surface_id();
            self.close_info_window_if_open();
            self.surface
                .open_info_window(anchor, &drag::address_window_content(&text));
            self.open_info_window = Some(guid);
        }

        effects
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn ready_or_queue(&mut self, call: QueuedCall) -> bool {
        match &mut self.state {
            ProviderState::Ready => true,
            ProviderState::Loading { queued } => {
                if !queued.contains(&call) {
                    queued.push(call);
                }
                false
            }
            ProviderState::Uninitialized | ProviderState::Disposed => false,
        }
    }

    fn close_info_window_if_open(&mut self) {
        if self.open_info_window.take().is_some() {
            self.surface.close_info_window();
        }
    }

    fn emit(&self, event: MetricsEvent) {
        sink::record(self.metrics, event);
    }
}

/// Markup for the info-window action control; the host glue binds its
/// activation back to [`MapEvent::InfoWindowActionClicked`].
fn action_control_markup(guid: &Guid, action: &str) -> String {
    format!(
        r#"<button type="button" class="glyphicon glyphicon-share-alt" data-action="{action}" data-marker="{guid}" style="cursor: pointer"></button>"#
    )
}
