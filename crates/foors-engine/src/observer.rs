//! Listener registration and change notification.
//!
//! External collaborators (renderers, panels) observe the model through
//! read-only snapshots; this module is how they learn that something
//! changed.  Listeners are invoked synchronously at the end of every tick
//! and after every completed mutation.

use foors_core::NodeId;

use crate::model::MeshModel;

/// What just changed.  Coarse by design — listeners re-read whatever
/// slice of the model they render.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    NodeKindToggled(NodeId),
    NodeMoved(NodeId),
    ParameterChanged,
    AutoGenerationChanged(bool),
    /// A send completed at this node (emitted or queued).
    MessageSent(NodeId),
    TickCompleted,
    Reset,
}

/// Callback invoked by the model after each mutation and at tick end.
///
/// The model passes itself read-only; a listener cannot mutate the world
/// from inside a notification.
pub trait ModelListener {
    fn on_change(&mut self, model: &MeshModel, event: &ModelEvent);
}

/// Handle returned by [`MeshModel::subscribe`]; pass to
/// [`MeshModel::unsubscribe`] to detach.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SubscriptionId(pub(crate) u64);
