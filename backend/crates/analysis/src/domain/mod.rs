//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (AnalysisEntry, NewAnalysis)
//! - Domain value objects (OwnerId, Statement)
//! - Domain services (analysis text post-processing)
//! - The analysis prompt
//! - Repository and upstream model traits (interfaces)

pub mod entities;
pub mod model;
pub mod prompt;
pub mod repository;
pub mod services;
pub mod value_objects;
