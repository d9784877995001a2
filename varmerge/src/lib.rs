//! Umbrella crate for the varmerge toolkit.
//!
//! Re-exports the member crates behind feature flags so downstream users
//! can depend on one crate and enable only what they need:
//!
//! - `core` — record data model ([`varmerge_core`])
//! - `engine` — the position-local merge engine ([`varmerge_engine`])
//! - `wig` — the single-contig wiggle writer ([`varmerge_wig`])

#[cfg(feature = "core")]
pub use varmerge_core as core;

#[cfg(feature = "engine")]
pub use varmerge_engine as engine;

#[cfg(feature = "wig")]
pub use varmerge_wig as wig;
