//! Shared client-side state.
//!
//! DESIGN
//! ======
//! State is split by concern (`auth`, `theme`). Each store is a cloneable
//! handle over a `watch` channel, so front ends subscribe to changes instead
//! of polling, and each persists its own key in client storage.

pub mod auth;
pub mod theme;
