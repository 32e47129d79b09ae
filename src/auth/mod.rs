//! Client-side authentication lifecycle.
//!
//! One controller owns the session: it is the only component that writes
//! the persisted mirror, and the in-memory identity and the stored
//! credential always appear or disappear together. States move
//! `initializing -> {authenticated, anonymous}` and `authenticated ->
//! anonymous` on logout or credential rejection; there is no refresh state.

pub mod controller;

pub use controller::{AuthController, AuthPhase};
