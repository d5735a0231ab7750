//! Change notification for reflexion graphs.
//! Typed events, one channel per subscriber, RAII subscription handles.

pub mod bus;
pub mod types;

pub use bus::{EventBus, Subscription};
pub use crossbeam_channel::TryRecvError;
pub use types::{
    ChangeEvent, EdgeChangeEvent, EdgeStateChangeEvent, EndpointContext, GraphEvent,
    HierarchyChangeEvent, MapsToChangeEvent, NodeChangeEvent,
};
