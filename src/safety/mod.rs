//! Safety checks applied before any scan or destructive operation.

pub mod guard;

pub use guard::{default_protected_roots, GuardError, PathGuard, ProtectedRootSet};
