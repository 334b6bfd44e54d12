pub mod delivery;
pub mod factory;
pub mod repositories;
