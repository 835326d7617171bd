//! Serialized navigation.
//!
//! Every screen transition the gate issues goes through one
//! [`NavigationSerializer`], which hands intents to the platform router one
//! at a time, in the order they were requested.

pub mod intent;
pub mod serializer;

pub use intent::{Destination, NavigationIntent, TransitionMode};
pub use serializer::NavigationSerializer;
