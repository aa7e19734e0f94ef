pub mod end_uses;
pub mod heating_systems;
pub mod hot_water_engine;
pub mod material_properties;
pub mod occupancy;
pub mod schedule;
pub mod units;
pub mod water_heat_demand;
