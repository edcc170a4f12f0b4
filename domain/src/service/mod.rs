//! Service lifecycle types
//!
//! A service is a pluggable component with a load/start/stop lifecycle and
//! an optional table of callable procedures. The types here are free of any
//! runtime concerns; the registry that drives them lives in the application
//! layer.
//!
//! ```text
//! Unloaded ──load──▶ Loaded ──start──▶ Started
//!    ▲                 │  ▲                │
//!    └─────unload──────┘  └──────stop──────┘
//! ```

pub mod error;
pub mod lifecycle;

pub use error::{HookError, ProcedureError, ServiceError};
pub use lifecycle::{LifecycleState, ServiceDescriptor};
