//! Drainage network construction: flow routing, topological ordering, and
//! drainage-area accumulation.
//!
//! The receiver relation computed here forms a forest rooted at boundary and
//! pit cells. Everything downstream of it — the ordering, the area pass, the
//! implicit incision solve — relies on that forest invariant, so it is
//! checked fatally when the order is rebuilt.

pub mod accumulate;
pub mod router;
pub mod stack;

pub use accumulate::accumulate_area;
pub use router::FlowField;
pub use stack::FlowStack;
