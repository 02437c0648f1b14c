//! Router-level tests.
//!
//! These drive the full application (middleware, routing, error mapping)
//! through `tower::ServiceExt::oneshot` against an in-memory dataset.

mod reports_e2e;
