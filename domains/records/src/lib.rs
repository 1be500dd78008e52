//! Match records for CurlARC teams
//!
//! A record belongs to exactly one team. Team MEMBERs may write it; anyone
//! may read it once it is public.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::entities::*;
pub use domain::update::RecordUpdate;
pub use repository::RecordRepository;
pub use service::RecordService;
