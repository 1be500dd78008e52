//! Teams domain layer: entities, membership state machine, validation

pub mod entities;
pub mod state;
pub mod validation;
