//! Layout pipeline.
//!
//! [`CanvasEngine`] owns the document (template, page setup, instances, data)
//! and is the only writer of home regions, measurements and the current
//! [`CanvasLayout`]. Hosts drive it with three kinds of calls:
//!
//! - mutations (`apply_edit`, `set_column_count`, `add_instance`, ...), which
//!   only record what changed;
//! - `tick(now)`, which releases idle edit locks;
//! - `run_pass(oracle)`, which measures whatever is stale and re-paginates.
//!
//! Components locked by an editor keep the flow they had when the lock was
//! taken: their data changes immediately but their size and segments do not
//! move until the lock is released.

use crate::config::ResolvedConfig;
use crate::editing::{
    ComponentPhase, EditLockState, LifecycleEvent, LockRelease, ReleaseReason, Timestamp,
};
use crate::layout::{
    compute_home_regions, extract_content, measure_component, paginate, CanvasLayout,
    ComponentContent, ComponentMeasurement, FlowBody, FlowItem, FlowList, Measurement,
    MeasurementContext, MeasurementState, MeasurementStore, PageGeometry, PageMetrics, Px,
    SizeOracle,
};
use crate::model::{
    ComponentId, ComponentInstance, DataRef, DataSources, DataStore, EngineError, LayoutIssue,
    PageDimensions, PageVariables, PaginationSettings, TemplateConfig,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Idle window of edit locks.
    pub idle_window: Duration,
    /// Display-only zoom of the visible layer. Never affects measurement.
    pub display_scale: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            idle_window: crate::editing::DEFAULT_IDLE_RELEASE,
            display_scale: 1.0,
        }
    }
}

impl From<&ResolvedConfig> for EngineOptions {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            idle_window: config.idle_release,
            display_scale: config.display_scale,
        }
    }
}

/// Single-writer layout pipeline over a data store.
#[derive(Debug)]
pub struct CanvasEngine<S: DataStore = DataSources> {
    template: TemplateConfig,
    page: PageVariables,
    instances: Vec<ComponentInstance>,
    data: S,
    options: EngineOptions,
    locks: EditLockState,
    phases: BTreeMap<ComponentId, ComponentPhase>,
    generations: BTreeMap<ComponentId, u64>,
    measurements: MeasurementStore,
    /// Flow each component had in the last pass it took part in.
    settled: BTreeMap<ComponentId, FlowBody>,
    layout: CanvasLayout,
    layout_dirty: bool,
    pass_count: u64,
    measure_counts: BTreeMap<ComponentId, u64>,
}

impl<S: DataStore> CanvasEngine<S> {
    /// Engine over the template's default components.
    pub fn new(template: TemplateConfig, data: S) -> Self {
        let instances = template.instantiate_defaults();
        Self::with_instances(template, instances, data)
    }

    /// Engine over an explicit instance list instead of the template defaults.
    pub fn with_instances(template: TemplateConfig, instances: Vec<ComponentInstance>, data: S) -> Self {
        let options = EngineOptions::default();
        let phases = instances
            .iter()
            .map(|instance| (instance.id.clone(), ComponentPhase::Idle))
            .collect();
        Self {
            page: template.default_page_variables.clone(),
            template,
            instances,
            data,
            options,
            locks: EditLockState::new(options.idle_window),
            phases,
            generations: BTreeMap::new(),
            measurements: MeasurementStore::default(),
            settled: BTreeMap::new(),
            layout: CanvasLayout::default(),
            layout_dirty: true,
            pass_count: 0,
            measure_counts: BTreeMap::new(),
        }
    }

    /// Apply options. Must be called before any lock is taken.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = EngineOptions {
            display_scale: sanitize_scale(options.display_scale),
            ..options
        };
        self.locks = EditLockState::new(options.idle_window);
        self
    }

    // ===== Accessors =====

    /// Layout of the last completed pass.
    pub fn layout(&self) -> &CanvasLayout {
        &self.layout
    }

    /// Active template.
    pub fn template(&self) -> &TemplateConfig {
        &self.template
    }

    /// Current page setup.
    pub fn page_variables(&self) -> &PageVariables {
        &self.page
    }

    /// Pixel geometry derived from the page setup.
    pub fn page_metrics(&self) -> PageMetrics {
        PageMetrics::from_variables(&self.page)
    }

    /// Width and scale every measurement is taken at.
    pub fn measurement_context(&self) -> MeasurementContext {
        MeasurementContext::new(self.page_metrics().column_width, self.options.display_scale)
    }

    /// Mounted component instances, in template order.
    pub fn instances(&self) -> &[ComponentInstance] {
        &self.instances
    }

    /// Bound data sources.
    pub fn data(&self) -> &S {
        &self.data
    }

    /// Current edit locks.
    pub fn locks(&self) -> &EditLockState {
        &self.locks
    }

    /// Stored measurements, keyed by component.
    pub fn measurements(&self) -> &MeasurementStore {
        &self.measurements
    }

    /// Lifecycle phase of `id`, or `None` if it is not mounted.
    pub fn phase(&self, id: &ComponentId) -> Option<ComponentPhase> {
        self.phases.get(id).copied()
    }

    /// Completed layout passes.
    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    /// Times `id` has been sent to the size oracle and come back ready.
    pub fn measure_count(&self, id: &ComponentId) -> u64 {
        self.measure_counts.get(id).copied().unwrap_or(0)
    }

    /// Whether `run_pass` has anything to do.
    pub fn needs_pass(&self) -> bool {
        self.layout_dirty || self.phases.values().any(ComponentPhase::needs_pass)
    }

    // ===== Document mutations =====

    /// Swap templates. Page setup resets to the template's defaults.
    pub fn set_template(&mut self, template: TemplateConfig) {
        info!(template = %template.id, "Template changed");
        self.page = template.default_page_variables.clone();
        self.template = template;
        self.invalidate_all();
    }

    /// Change the column count. Zero is treated as one.
    pub fn set_column_count(&mut self, column_count: u32) {
        let column_count = column_count.max(1);
        self.page.columns.column_count = column_count;
        self.page.columns.enabled = column_count > 1;
        self.invalidate_all();
    }

    /// Resize the page.
    pub fn set_page_dimensions(&mut self, dimensions: PageDimensions) {
        self.page.dimensions = dimensions;
        self.invalidate_all();
    }

    /// Change the visible zoom. Measurement width does not depend on it, so
    /// no relayout is needed.
    pub fn set_display_scale(&mut self, display_scale: f64) {
        self.options.display_scale = sanitize_scale(display_scale);
    }

    /// Fonts finished loading: every stored size is suspect.
    pub fn notify_fonts_loaded(&mut self) {
        info!("Fonts loaded; discarding measurements");
        self.measurements.clear();
        self.invalidate_all();
    }

    /// Add an instance, replacing any existing one with the same id.
    pub fn add_instance(&mut self, instance: ComponentInstance) {
        let id = instance.id.clone();
        match self.instances.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = instance,
            None => self.instances.push(instance),
        }
        self.bump_generation(&id);
        self.measurements.remove(&id);
        self.settled.remove(&id);
        self.phases.insert(id, ComponentPhase::Idle);
        self.layout_dirty = true;
    }

    /// Unmount an instance. Any lock it still holds is released.
    pub fn remove_instance(&mut self, id: &ComponentId) -> Result<ComponentInstance, EngineError> {
        let position = self
            .instances
            .iter()
            .position(|instance| &instance.id == id)
            .ok_or_else(|| EngineError::UnknownComponent(id.clone()))?;
        self.release(id, ReleaseReason::Unmount);
        let removed = self.instances.remove(position);
        self.phases.remove(id);
        self.generations.remove(id);
        self.measurements.remove(id);
        self.settled.remove(id);
        self.layout_dirty = true;
        Ok(removed)
    }

    // ===== Editing =====

    /// An editor gained focus on `id`.
    pub fn focus(&mut self, id: &ComponentId, now: Timestamp) -> Result<(), EngineError> {
        self.instance(id)?;
        self.locks = std::mem::take(&mut self.locks).request_component_lock(id, now);
        self.advance_phase(id, LifecycleEvent::FocusAcquired);
        Ok(())
    }

    /// Merge `patch` into the data behind `id` on behalf of its editor.
    ///
    /// The data store sees the change at once. `id` itself stays locked and
    /// is not re-laid out until the lock releases; other unlocked components
    /// reading overlapping data are queued for the next pass.
    pub fn apply_edit(&mut self, id: &ComponentId, patch: &Value, now: Timestamp) -> Result<(), EngineError> {
        let data_ref = self.instance(id)?.data_ref.clone();
        self.data.apply_update(&data_ref, patch)?;

        if !self.locks.is_locked(id) {
            self.advance_phase(id, LifecycleEvent::FocusAcquired);
        }
        self.locks = std::mem::take(&mut self.locks).record_edit(id, now);
        self.bump_generation(id);
        self.advance_phase(id, LifecycleEvent::DataChanged);
        debug!(component = %id, data_ref = %data_ref, "Edit applied under lock");

        self.dirty_readers_of(&data_ref, Some(id));
        Ok(())
    }

    /// Merge `patch` at `data_ref` outside of any editor (imports, sync).
    pub fn update_data(&mut self, data_ref: &DataRef, patch: &Value) -> Result<(), EngineError> {
        self.data.apply_update(data_ref, patch)?;
        self.dirty_readers_of(data_ref, None);
        Ok(())
    }

    /// Release the lock on `id` because its editor lost focus.
    pub fn blur(&mut self, id: &ComponentId) -> Option<LockRelease> {
        self.release(id, ReleaseReason::Blur)
    }

    /// Release the lock on `id` without undoing data already written.
    pub fn cancel(&mut self, id: &ComponentId) -> Option<LockRelease> {
        self.release(id, ReleaseReason::Cancel)
    }

    /// Release locks whose idle window has elapsed.
    pub fn tick(&mut self, now: Timestamp) -> Vec<LockRelease> {
        let (locks, releases) = std::mem::take(&mut self.locks).expire(now);
        self.locks = locks;
        for release in &releases {
            self.advance_phase(&release.component, LifecycleEvent::LockReleased);
        }
        releases
    }

    /// Earliest time `tick` will release something.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.locks.next_deadline()
    }

    /// Check a width reported by the visible layer. A mismatch discards the
    /// component's measurement so the next pass retakes it.
    pub fn report_visible_width(&mut self, id: &ComponentId, rendered_width_px: f64) -> Result<(), LayoutIssue> {
        let result = self
            .measurement_context()
            .verify_visible_width(id, rendered_width_px);
        if let Err(issue) = &result {
            warn!(%issue, "Visible width diverged from measurement width");
            self.measurements.remove(id);
            self.advance_phase(id, LifecycleEvent::Invalidated);
        }
        result
    }

    // ===== Layout pass =====

    /// Measure what is stale, then paginate everything.
    pub fn run_pass(&mut self, oracle: &dyn SizeOracle) -> &CanvasLayout {
        let metrics = self.page_metrics();
        let ctx = MeasurementContext::new(metrics.column_width, self.options.display_scale);
        let home_regions = compute_home_regions(
            &self.instances,
            &self.template,
            metrics.column_count,
            metrics.page_width_px,
        );

        let mut issues: Vec<LayoutIssue> = home_regions.issues().to_vec();
        let mut flow = Vec::with_capacity(home_regions.len());
        let mut pending: Vec<ComponentId> = Vec::new();
        let mut measured = 0usize;

        for instance in &self.instances {
            let id = &instance.id;
            let editing = self.phases.get(id).is_some_and(ComponentPhase::is_editing);
            if !editing {
                advance(&mut self.phases, id, LifecycleEvent::PassStarted);
            }
            let Some(home) = home_regions.get(id).copied() else {
                continue;
            };
            if !instance.layout.is_visible {
                continue;
            }

            if editing {
                if let Some(body) = self.settled.get(id) {
                    flow.push(FlowItem {
                        instance_id: id.clone(),
                        home,
                        body: body.clone(),
                    });
                    continue;
                }
            }

            let Some(value) = self.data.resolve(&instance.data_ref) else {
                debug!(component = %id, data_ref = %instance.data_ref, "No data; component renders nothing");
                issues.push(LayoutIssue::MissingData {
                    component: id.clone(),
                    data_ref: instance.data_ref.to_string(),
                });
                self.settled.remove(id);
                continue;
            };
            let content = extract_content(instance.component_type, value);
            let generation = self.generations.get(id).copied().unwrap_or(0);

            let current = self
                .measurements
                .get(id)
                .filter(|m| {
                    self.measurements.is_current(id, generation, &ctx) && shape_matches(&content, m)
                })
                .cloned();
            let measurement = match current {
                Some(measurement) => Some(measurement),
                None => match measure_component(oracle, id, &content, &ctx, generation) {
                    MeasurementState::Ready(measurement) => {
                        self.measurements.insert(measurement.clone());
                        *self.measure_counts.entry(id.clone()).or_default() += 1;
                        measured += 1;
                        Some(measurement)
                    }
                    MeasurementState::Pending => {
                        issues.push(LayoutIssue::MeasurementPending(id.clone()));
                        pending.push(id.clone());
                        None
                    }
                },
            };

            let body = flow_body(&content, measurement.as_ref());
            self.settled.insert(id.clone(), body.clone());
            flow.push(FlowItem {
                instance_id: id.clone(),
                home,
                body,
            });
        }

        let geometry = PageGeometry {
            columns_per_page: metrics.column_count,
            column_height: metrics.column_height,
        };
        let pagination = paginate(&flow, geometry);
        let provisional = !pending.is_empty();
        self.page.pagination = PaginationSettings {
            page_count: pagination.page_count,
            column_count: metrics.column_count,
        };

        for instance in &self.instances {
            let id = &instance.id;
            let is_pending = pending.contains(id);
            advance(
                &mut self.phases,
                id,
                LifecycleEvent::PassCompleted {
                    provisional: is_pending,
                },
            );
        }

        self.layout = CanvasLayout::assemble(
            &home_regions,
            pagination,
            metrics.column_count,
            provisional,
            issues,
        );
        self.layout_dirty = false;
        self.pass_count += 1;

        for issue in self.layout.issues.iter().filter(|issue| !issue.is_transient()) {
            warn!(%issue, "Layout issue");
        }
        info!(
            pass = self.pass_count,
            pages = self.layout.page_count(),
            components = flow.len(),
            measured,
            provisional,
            "Layout pass complete"
        );
        &self.layout
    }

    // ===== Internals =====

    fn instance(&self, id: &ComponentId) -> Result<&ComponentInstance, EngineError> {
        self.instances
            .iter()
            .find(|instance| &instance.id == id)
            .ok_or_else(|| EngineError::UnknownComponent(id.clone()))
    }

    fn release(&mut self, id: &ComponentId, reason: ReleaseReason) -> Option<LockRelease> {
        let (locks, release) = std::mem::take(&mut self.locks).release_component_lock(id, reason);
        self.locks = locks;
        if release.is_some() {
            self.advance_phase(id, LifecycleEvent::LockReleased);
        }
        release
    }

    fn advance_phase(&mut self, id: &ComponentId, event: LifecycleEvent) {
        advance(&mut self.phases, id, event);
    }

    fn bump_generation(&mut self, id: &ComponentId) {
        *self.generations.entry(id.clone()).or_default() += 1;
    }

    /// Mark every reader of data overlapping `data_ref` stale.
    ///
    /// Locked readers get a new generation too, so their release remeasures;
    /// their phase stays `Editing` until then.
    fn dirty_readers_of(&mut self, data_ref: &DataRef, except: Option<&ComponentId>) {
        let readers: Vec<ComponentId> = self
            .instances
            .iter()
            .filter(|instance| Some(&instance.id) != except)
            .filter(|instance| instance.data_ref.overlaps(data_ref))
            .map(|instance| instance.id.clone())
            .collect();
        for id in readers {
            self.bump_generation(&id);
            self.advance_phase(&id, LifecycleEvent::DataChanged);
        }
    }

    fn invalidate_all(&mut self) {
        let ids: Vec<ComponentId> = self.phases.keys().cloned().collect();
        for id in ids {
            self.advance_phase(&id, LifecycleEvent::Invalidated);
        }
        self.layout_dirty = true;
    }
}

fn advance(phases: &mut BTreeMap<ComponentId, ComponentPhase>, id: &ComponentId, event: LifecycleEvent) {
    if let Some(phase) = phases.get_mut(id) {
        *phase = phase.transition(event);
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// A stored list measurement only applies to content with as many items.
fn shape_matches(content: &ComponentContent, measurement: &Measurement) -> bool {
    match (content, &measurement.body) {
        (ComponentContent::List(list), ComponentMeasurement::List(heights)) => {
            list.items.len() == heights.items.len()
        }
        (ComponentContent::List(_), _) | (_, ComponentMeasurement::List(_)) => false,
        _ => true,
    }
}

/// Pagination input for one component. Pending measurements flow as zero
/// heights and the pass is marked provisional.
fn flow_body(content: &ComponentContent, measurement: Option<&Measurement>) -> FlowBody {
    match content {
        ComponentContent::List(list) => {
            let heights = match measurement.map(|m| &m.body) {
                Some(ComponentMeasurement::List(heights)) => heights.clone(),
                _ => crate::layout::ListMeasurement {
                    items: vec![Px::ZERO; list.items.len()],
                    ..Default::default()
                },
            };
            FlowBody::List(FlowList {
                kind: list.kind,
                heading: heights.heading,
                continuation_heading: heights.continuation_heading,
                preamble: heights.preamble,
                item_heights: heights.items,
                items: list.items.iter().map(|item| item.raw.clone()).collect(),
                metadata: list.metadata.clone(),
            })
        }
        ComponentContent::Block { .. } | ComponentContent::Fixed { .. } => FlowBody::Atomic {
            height: measurement.map(Measurement::total_height).unwrap_or(Px::ZERO),
        },
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
