pub mod entities;
pub mod update;
