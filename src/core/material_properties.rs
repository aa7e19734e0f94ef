use crate::core::units::JOULES_PER_KILOWATT_HOUR;
use std::sync::LazyLock;

/// Properties of the fluid held in (and drawn from) water heaters.
#[derive(Clone, Copy, Debug)]
pub struct MaterialProperties {
    volumetric_heat_capacity: f64, // J/(litre.K)
}

impl MaterialProperties {
    /// Arguments:
    /// * `density` - in kg/litre
    /// * `specific_heat_capacity` - in J/(kg.K)
    pub fn new(density: f64, specific_heat_capacity: f64) -> Self {
        Self {
            volumetric_heat_capacity: specific_heat_capacity * density,
        }
    }

    /// Heat capacity of a volume of the material, in kWh/K
    pub fn heat_capacity_kwh_per_kelvin(&self, volume_litres: f64) -> f64 {
        volume_litres * self.volumetric_heat_capacity / JOULES_PER_KILOWATT_HOUR as f64
    }

    /// Return energy content of material, in kWh / litre
    ///
    /// Arguments:
    /// * `temp_high` - temperature for which energy content should be calculated, in deg C or K
    /// * `temp_base` - temperature which defines "zero energy", in same units as temp_high
    pub fn volumetric_energy_content_kwh_per_litre(&self, temp_high: f64, temp_base: f64) -> f64 {
        (temp_high - temp_base) * self.volumetric_heat_capacity / JOULES_PER_KILOWATT_HOUR as f64
    }
}

pub static WATER: LazyLock<MaterialProperties> =
    LazyLock::new(|| MaterialProperties::new(1.0, 4184.0));
