//! View state graph.
//!
//! Contexts own the single-writer state (active domain, active filter form,
//! active tab); derived views follow them through [`DomainBinding`].
//! [`LogsContainer`] wires everything behind one presentation boundary.

pub mod active_log;
pub mod field_catalog;
pub mod filter_context;
pub mod histogram;
pub mod load_trigger;
pub mod log_type_context;
pub mod logs_container;
pub mod tab_registry;
pub mod view_projector;

pub use active_log::ActiveLogSlot;
pub use field_catalog::FieldCatalog;
pub use filter_context::{FilterContext, FilterForm};
pub use histogram::HistogramAggregator;
pub use load_trigger::{LoadOperation, LoadReason, LoadTrigger};
pub use log_type_context::{Activation, DomainBinding, LogDomain, LogTypeContext};
pub use logs_container::{Collaborators, LogsContainer};
pub use tab_registry::TabRegistry;
pub use view_projector::{project_logs, ViewProjector};
