//! Core types shared by the tdrlog facilities
//!
//! This crate provides the foundational types used by error handling
//! and the logging facade:
//!
//! - **Context types**: RequestContext, ContextKey, TraceId
//! - **Masking policy**: sensitive keys, sensitive headers, the mask string
//! - **Schema constants**: Canonical field keys

pub mod context;
pub mod schema;
pub mod sensitive;

pub use context::{ContextKey, RequestContext, TraceId};
pub use sensitive::{MaskingPolicy, MASK};
