//! Startup routing: decides which of onboarding, PIN entry or the vault the
//! app opens on.

pub mod resolver;

pub use resolver::{choose_route, BootRoute, BootstrapResolver};
