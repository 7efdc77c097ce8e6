//! `MeshModel` — the single owner of the world and its public API.
//!
//! All nodes, messages, and listeners live here.  External collaborators
//! mutate the world only through the methods below; every completed
//! mutation notifies the subscribed listeners exactly once.  Mutations
//! naming an unknown node are silent no-ops and notify nobody.

use log::info;
use rustc_hash::FxHashSet;

use foors_core::{
    EngineConfig, FoorsResult, MessageKind, NodeId, NodeKind, Severity, SimClock, SimRng, TimeMs,
    TriageId, Vec2,
};
use foors_node::NodeStore;
use foors_routing::{classify_modes, rebuild_routing_tables, recompute_links, LinkDiff};

use crate::autogen::AutoGenerator;
use crate::message::Message;
use crate::observer::{ModelEvent, ModelListener, SubscriptionId};
use crate::stats::{self, EngineStats};

/// The FOORS+ mesh world.
pub struct MeshModel {
    pub(crate) config:   EngineConfig,
    pub(crate) clock:    SimClock,
    pub(crate) nodes:    NodeStore,
    pub(crate) messages: Vec<Message>,

    pub(crate) next_message_id: u64,
    pub(crate) next_triage_id:  u64,

    pub(crate) rng:       SimRng,
    pub(crate) generator: AutoGenerator,

    /// Every triage ever present in a sink's store.  Backs the
    /// `sink_triages_seen` stat; survives node removal.
    pub(crate) sink_seen: FxHashSet<TriageId>,

    /// Topology changes from mutations since the last tick.  The tick's
    /// replay and flush phases consume links "new this tick", including
    /// those a mutation created between ticks.
    pub(crate) pending_diff: LinkDiff,

    listeners:         Vec<(SubscriptionId, Box<dyn ModelListener>)>,
    next_subscription: u64,

    /// Monotone tick counter; stamps messages so the advance phase can
    /// skip those spawned within the running tick.
    pub(crate) tick_seq: u64,
}

impl Default for MeshModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshModel {
    // ── Construction ──────────────────────────────────────────────────────

    /// A model with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default()).expect("default config is valid")
    }

    /// A model with a caller-supplied configuration.  Bounded parameters
    /// are clamped; free-form ones (radius, speed) must be sane.
    pub fn with_config(config: EngineConfig) -> FoorsResult<Self> {
        config.validate()?;
        let config = config.clamped();
        let rng = SimRng::new(config.seed);
        Ok(Self {
            config,
            clock: SimClock::new(),
            nodes: NodeStore::new(),
            messages: Vec::new(),
            next_message_id: 0,
            next_triage_id: 0,
            rng,
            generator: AutoGenerator::default(),
            sink_seen: FxHashSet::default(),
            pending_diff: LinkDiff::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            tick_seq: 0,
        })
    }

    // ── World mutation ────────────────────────────────────────────────────

    /// Place a node, recompute links and routes, and — when placing a sink —
    /// let already-present sinks replay their catalogs toward it.
    pub fn add_node(&mut self, x: f64, y: f64, kind: NodeKind) -> NodeId {
        let id = self
            .nodes
            .spawn(kind, Vec2::new(x, y), self.config.default_connection_radius);
        self.refresh_after_mutation();
        self.notify(ModelEvent::NodeAdded(id));
        id
    }

    /// Remove a node and purge it from all neighbor sets.  Routes to or
    /// through it demote on the next routing pass; in-flight messages
    /// touching it are dropped.
    pub fn remove_node(&mut self, id: NodeId) {
        if self.nodes.remove(id).is_none() {
            return;
        }
        self.messages.retain(|m| m.from != id && m.to != id);
        self.notify(ModelEvent::NodeRemoved(id));
    }

    /// Flip source ↔ sink.  Promotion to sink triggers new-sink replay
    /// from every sink that can route to the promoted node.
    pub fn toggle_node_type(&mut self, id: NodeId) {
        let became_sink = {
            let Some(node) = self.nodes.get_mut(id) else { return };
            node.kind = node.kind.toggled();
            node.is_sink()
        };
        if became_sink {
            // Everything a freshly promoted sink already holds counts as
            // sink-observed.
            let held: Vec<TriageId> = self
                .nodes
                .get(id)
                .map(|n| n.triage_store.keys().copied().collect())
                .unwrap_or_default();
            self.sink_seen.extend(held);
        }
        self.refresh_after_mutation();
        self.notify(ModelEvent::NodeKindToggled(id));
    }

    /// Move a node.  Link membership catches up on the next tick.
    pub fn update_node_position(&mut self, id: NodeId, x: f64, y: f64) {
        let Some(node) = self.nodes.get_mut(id) else { return };
        node.position = Vec2::new(x, y);
        self.notify(ModelEvent::NodeMoved(id));
    }

    pub fn update_node_velocity(&mut self, id: NodeId, vx: f64, vy: f64) {
        let Some(node) = self.nodes.get_mut(id) else { return };
        node.velocity = Vec2::new(vx, vy);
        self.notify(ModelEvent::NodeMoved(id));
    }

    // ── Parameter setters ─────────────────────────────────────────────────

    /// Update the global connection radius and propagate it to every node.
    /// Non-finite values are ignored; negatives clamp to zero (no links).
    pub fn set_connection_radius(&mut self, radius: f64) {
        if !radius.is_finite() {
            return;
        }
        let radius = radius.max(0.0);
        self.config.default_connection_radius = radius;
        for node in self.nodes.iter_mut() {
            node.connection_radius = radius;
        }
        self.notify(ModelEvent::ParameterChanged);
    }

    /// Set the demoted-route grace period, clamped to its documented bounds.
    pub fn set_inactive_routing_timeout(&mut self, ms: u64) {
        self.config.inactive_routing_timeout_ms = EngineConfig::clamp_inactive_timeout(ms);
        self.notify(ModelEvent::ParameterChanged);
    }

    /// Set the auto-generation cadence, clamped to its documented bounds.
    pub fn set_triage_generation_interval(&mut self, ms: u64) {
        self.config.triage_generation_interval_ms = EngineConfig::clamp_generation_interval(ms);
        self.notify(ModelEvent::ParameterChanged);
    }

    // ── Auto-generation ───────────────────────────────────────────────────

    pub fn start_auto_generation(&mut self) {
        self.generator.active = true;
        self.generator.last_fired = self.clock.now();
        info!("auto-generation started");
        self.notify(ModelEvent::AutoGenerationChanged(true));
    }

    pub fn stop_auto_generation(&mut self) {
        self.generator.active = false;
        info!("auto-generation stopped");
        self.notify(ModelEvent::AutoGenerationChanged(false));
    }

    pub fn is_auto_generation_active(&self) -> bool {
        self.generator.active
    }

    // ── Sending ───────────────────────────────────────────────────────────

    /// Originate a message at `from`.
    ///
    /// Triage sends allocate and return a fresh [`TriageId`]; a triage
    /// without a severity is a no-op (there is nothing meaningful to
    /// stamp on it).  Normal sends return `None`.  Unknown nodes are
    /// silent no-ops.
    pub fn send_message(
        &mut self,
        from:     NodeId,
        kind:     MessageKind,
        severity: Option<Severity>,
    ) -> Option<TriageId> {
        if !self.nodes.contains(from) {
            return None;
        }
        let triage = match kind {
            MessageKind::Triage => {
                let severity = severity?;
                self.send_triage(from, severity)
            }
            MessageKind::Normal => {
                self.send_normal(from);
                None
            }
        };
        self.notify(ModelEvent::MessageSent(from));
        triage
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Clear nodes, messages, and generators.  IDs are not reused and the
    /// clock keeps running.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.messages.clear();
        self.generator = AutoGenerator::default();
        self.sink_seen.clear();
        self.pending_diff = LinkDiff::default();
        info!("model reset");
        self.notify(ModelEvent::Reset);
    }

    /// Advance the world by `delta_seconds`.  See the crate docs for the
    /// phase order.
    pub fn tick(&mut self, delta_seconds: f64) {
        self.tick_seq += 1;
        self.clock.advance_secs(delta_seconds);
        let dt = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            0.0
        };

        // ① Motion.
        for node in self.nodes.iter_mut() {
            node.apply_motion(dt);
        }

        // ② Links — merge with changes mutations made since the last tick.
        let prev_sink_routes = self.snapshot_sink_routes();
        let tick_diff = recompute_links(&mut self.nodes);
        let diff = self.take_merged_diff(tick_diff);

        // ③④ Routes and modes.
        let now = self.clock.now();
        rebuild_routing_tables(&mut self.nodes, now, self.config.inactive_routing_timeout_ms);
        classify_modes(&mut self.nodes, now, self.config.route_expiry_ms);

        // ⑤ Boundary replay.
        self.replay_new_links(&diff.new_links);
        self.replay_new_sinks(&prev_sink_routes);

        // ⑥ Queue flush.
        self.flush_queues(&diff.reconnected);

        // ⑦ Auto-generation.
        self.maybe_auto_generate();

        // ⑧ Advance and deliver.
        self.advance_messages(dt);

        // ⑨ Notify.
        self.notify(ModelEvent::TickCompleted);
    }

    // ── Subscription ──────────────────────────────────────────────────────

    /// Register a listener; returns the handle that detaches it.
    pub fn subscribe<L: ModelListener + 'static>(&mut self, listener: L) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Detach a listener.  Returns `false` if the handle was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // ── Observation ───────────────────────────────────────────────────────

    pub fn nodes(&self) -> impl Iterator<Item = &foors_node::Node> {
        self.nodes.iter()
    }

    pub fn node(&self, id: NodeId) -> Option<&foors_node::Node> {
        self.nodes.get(id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Undirected link list as `(a, b)` pairs with `a < b`.
    pub fn connections(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes.links()
    }

    pub fn stats(&self) -> EngineStats {
        stats::compute(self)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> TimeMs {
        self.clock.now()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Synchronous recompute after a topology mutation: links, routes,
    /// modes, and new-sink replay.  New-link replay and queue flushing are
    /// tick phases; the link diff is banked for the next tick.
    pub(crate) fn refresh_after_mutation(&mut self) {
        let prev_sink_routes = self.snapshot_sink_routes();
        let diff = recompute_links(&mut self.nodes);
        self.bank_diff(diff);
        let now = self.clock.now();
        rebuild_routing_tables(&mut self.nodes, now, self.config.inactive_routing_timeout_ms);
        classify_modes(&mut self.nodes, now, self.config.route_expiry_ms);
        self.replay_new_sinks(&prev_sink_routes);
    }

    fn bank_diff(&mut self, diff: LinkDiff) {
        self.pending_diff.new_links.extend(diff.new_links);
        self.pending_diff.reconnected.extend(diff.reconnected);
    }

    /// Combine banked mutation diffs with this tick's own, deduplicated.
    fn take_merged_diff(&mut self, tick_diff: LinkDiff) -> LinkDiff {
        let mut merged = std::mem::take(&mut self.pending_diff);
        merged.new_links.extend(tick_diff.new_links);
        merged.reconnected.extend(tick_diff.reconnected);
        merged.new_links.sort_unstable();
        merged.new_links.dedup();
        merged.reconnected.sort_unstable();
        merged.reconnected.dedup();
        merged
    }

    /// Listeners are detached while running so they observe a model that
    /// cannot re-enter them.
    pub(crate) fn notify(&mut self, event: ModelEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener.on_change(self, &event);
        }
        self.listeners = listeners;
    }
}
