//! SeaORM entities.

pub mod reports;
