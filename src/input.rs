use crate::errors::{WohError, WohResult};
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use std::fmt::{Display, Formatter};
use strum_macros::{Display as StrumDisplay, EnumIter};

/// Everything about a dwelling that the end-use generators need. Immutable for a calculation
/// run and owned by the caller.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DwellingProfile {
    pub dwelling_id: SmartString,
    /// Floor area of all conditioned zones excluding garage, in m2
    pub floor_area: f64,
    pub number_of_bedrooms: u32,
    #[serde(default)]
    pub household: HouseholdComposition,
    pub climate_zone: ClimateZone,
    pub revision: RevisionTag,
    #[serde(default)]
    pub lighting: Vec<LightingFixture>,
    #[serde(default)]
    pub plug_loads: Vec<PlugLoadAppliance>,
    pub hot_water: HotWaterSystem,
    #[serde(default)]
    pub hot_water_fixtures: HotWaterFixtures,
    #[serde(default)]
    pub cooking: Vec<CookingAppliance>,
}

impl DwellingProfile {
    /// Check the dwelling-level quantities the end-use generators scale by.
    pub fn validate(&self) -> WohResult<()> {
        if !(self.floor_area.is_finite() && self.floor_area > 0.) {
            return Err(WohError::InvalidDwellingProfile(format!(
                "floor area must be positive, got {} m2",
                self.floor_area
            )));
        }
        for fixture in &self.lighting {
            if !(fixture.wattage.is_finite() && fixture.wattage >= 0.) {
                return Err(WohError::InvalidDwellingProfile(format!(
                    "lighting fixture wattage cannot be negative, got {} W",
                    fixture.wattage
                )));
            }
        }
        for appliance in &self.plug_loads {
            if !(appliance.rated_power.is_finite() && appliance.rated_power >= 0.) {
                return Err(WohError::InvalidDwellingProfile(format!(
                    "rated power of {} appliance cannot be negative, got {} W",
                    appliance.category, appliance.rated_power
                )));
            }
        }
        Ok(())
    }
}

/// How the number of occupants is determined.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum HouseholdComposition {
    /// Derive occupants from floor area using the methodology's occupancy equation
    #[default]
    FromFloorArea,
    Occupants { count: f64 },
    AdultsAndChildren { adults: u32, children: u32 },
}

impl HouseholdComposition {
    pub(crate) fn has_children(&self) -> bool {
        matches!(self, HouseholdComposition::AdultsAndChildren { children, .. } if *children > 0)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ClimateZone(pub u32);

impl Display for ClimateZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Revision tag of the published calculation method as supplied by the caller, e.g. "10.1".
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RevisionTag(pub SmartString);

impl From<&str> for RevisionTag {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl Display for RevisionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Methodology revisions for which rule sets and reference tables are implemented.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MethodologyRevision {
    #[serde(rename = "10.1")]
    V10_1,
}

impl TryFrom<&RevisionTag> for MethodologyRevision {
    type Error = WohError;

    fn try_from(tag: &RevisionTag) -> WohResult<Self> {
        match tag.0.trim() {
            "10.1" | "rev10.1" => Ok(MethodologyRevision::V10_1),
            other => Err(WohError::UnsupportedRevision(other.to_string())),
        }
    }
}

impl Display for MethodologyRevision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodologyRevision::V10_1 => write!(f, "10.1"),
        }
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, StrumDisplay,
)]
pub enum EnergyCarrier {
    Electricity,
    Gas,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LightingFixture {
    pub count: u32,
    /// Rated power per fixture, in W
    pub wattage: f64,
    #[serde(default)]
    pub control: LightingControl,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum LightingControl {
    #[default]
    Standard,
    Dimmer,
    MotionSensor,
    DaylightSensor,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlugLoadAppliance {
    pub category: ApplianceCategory,
    /// Rated power, in W
    pub rated_power: f64,
    pub usage: UsageFrequency,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, StrumDisplay)]
pub enum ApplianceCategory {
    Refrigeration,
    Laundry,
    Dishwashing,
    Entertainment,
    Computing,
    SmallAppliance,
    Miscellaneous,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum UsageFrequency {
    Low,
    Medium,
    High,
    AlwaysOn,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CookingAppliance {
    #[serde(rename = "type")]
    pub appliance_type: CookingApplianceType,
    #[serde(default = "default_appliance_count")]
    pub count: u32,
}

fn default_appliance_count() -> u32 {
    1
}

#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, Hash, PartialEq, Serialize, StrumDisplay)]
pub enum CookingApplianceType {
    GasCooktop,
    ElectricCooktop,
    InductionCooktop,
    GasOven,
    ElectricOven,
}

impl CookingApplianceType {
    pub fn carrier(&self) -> EnergyCarrier {
        match self {
            CookingApplianceType::GasCooktop | CookingApplianceType::GasOven => EnergyCarrier::Gas,
            _ => EnergyCarrier::Electricity,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, StrumDisplay)]
pub enum HotWaterSystemType {
    SolidFuel,
    ElectricStorage,
    /// Large electric storage tank run on a restricted (daytime or off-peak) tariff
    ElectricStorageLarge,
    ElectricInstantaneous,
    GasStorage,
    GasInstantaneous,
    SolarElectric,
    SolarGas,
    HeatPump,
}

/// When a storage water heater is allowed to draw energy.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum EnergisationSchedule {
    Daytime,
    Overnight,
    #[default]
    Continuous,
}

impl EnergisationSchedule {
    pub fn is_energised(&self, hour_of_day: u32) -> bool {
        match self {
            EnergisationSchedule::Continuous => true,
            EnergisationSchedule::Daytime => (9..=16).contains(&hour_of_day),
            EnergisationSchedule::Overnight => hour_of_day >= 22 || hour_of_day <= 6,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HotWaterSystem {
    #[serde(rename = "type")]
    pub system_type: HotWaterSystemType,
    /// Storage volume in litres (storage, heat pump and solar electric systems)
    pub storage_volume: Option<f64>,
    /// Rated efficiency (storage and instantaneous) or rated COP at 20ºC ambient (heat pump)
    pub rated_efficiency: f64,
    /// Delivery setpoint temperature, in ºC
    pub setpoint: f64,
    /// Heating element / burner / compressor thermal capacity, in kW
    pub heater_capacity: Option<f64>,
    /// Measured standby losses at standardised conditions, in kWh/24h
    pub standby_loss: Option<f64>,
    #[serde(default)]
    pub energisation: EnergisationSchedule,
    /// Solar collector aperture area, in m2 (solar-boosted systems)
    pub solar_collector_area: Option<f64>,
    /// Auxiliary electrical power (controls, ignition, circulation pump), in W
    pub auxiliary_power: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HotWaterFixtures {
    pub showers: u32,
    /// Shower flow rate, in litres/minute of hot water
    pub shower_flow_rate: f64,
    pub baths: u32,
    /// Hot water volume of a bath fill, in litres
    pub bath_fill_volume: f64,
    pub basin_taps: u32,
    pub kitchen_taps: u32,
}

impl Default for HotWaterFixtures {
    fn default() -> Self {
        Self {
            showers: 1,
            shower_flow_rate: 9.,
            baths: 1,
            bath_fill_volume: 80.,
            basin_taps: 1,
            kitchen_taps: 1,
        }
    }
}

/// Run-wide numerical settings. Defaults are the methodology's standard assumptions.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    pub hot_water_seed: u64,
    /// Relative deviation of drawn volume from the reference volume that triggers a rescale
    pub draw_volume_tolerance: f64,
    /// Tank temperature cutoff, in ºC
    pub tank_cutoff_temperature: f64,
    /// Maximum hourly energy balance residual, in kWh
    pub energy_balance_tolerance: f64,
    pub sanity_checks: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            hot_water_seed: 37,
            draw_volume_tolerance: 0.01,
            tank_cutoff_temperature: 90.,
            energy_balance_tolerance: 1e-9,
            sanity_checks: true,
        }
    }
}
