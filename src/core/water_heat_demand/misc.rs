use crate::core::material_properties::WATER;

/// Calculate the fraction of hot water required when mixing hot and cold
/// water to achieve a target temperature
///
/// Arguments:
/// * `temp_target` -- temperature to be achieved, in any units
/// * `temp_hot`    -- temperature of hot water to be mixed, in same units as temp_target
/// * `temp_cold`   -- temperature of cold water to be mixed, in same units as temp_target
pub fn frac_hot_water(temp_target: f64, temp_hot: f64, temp_cold: f64) -> f64 {
    (temp_target - temp_cold) / (temp_hot - temp_cold)
}

/// Calculates the kWh energy content of the hot water demand.
///
/// Arguments:
/// * `litres_demand`  -- hot water demand in litres
/// * `demand_temp`    -- temperature of hot water delivered, in degrees C
/// * `cold_temp`      -- temperature of the cold feed, in degrees C
pub fn water_demand_to_kwh(litres_demand: f64, demand_temp: f64, cold_temp: f64) -> f64 {
    WATER.volumetric_energy_content_kwh_per_litre(demand_temp, cold_temp) * litres_demand
}
