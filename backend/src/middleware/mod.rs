//! Request middleware.
//!
//! Wrap order matters: `Trace` goes outermost so authentication failures
//! carry the request's trace identifier.

pub mod authenticate;
pub mod trace;

pub use authenticate::{Authenticate, PublicRoutes};
pub use trace::Trace;
