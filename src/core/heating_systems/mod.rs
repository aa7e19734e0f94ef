pub mod common;
pub mod heat_pump;
pub mod point_of_use;
pub mod solar_thermal;
pub mod storage_tank;
