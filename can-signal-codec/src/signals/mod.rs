//! Signal descriptor model
//!
//! This module contains the immutable message/signal records consumed by the
//! codec and the choice table helpers.

pub mod choices;
pub mod database;

// Re-export key types for convenience
pub use choices::{canonical_name, ChoiceTable};
pub use database::{
    ByteOrder, MessageDefinition, MultiplexRole, MultiplexerInfo, Protocol, SignalDefinition,
    TypeClass, ValueType,
};
