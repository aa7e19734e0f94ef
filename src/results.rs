use crate::core::heating_systems::storage_tank::TankState;
use crate::core::units::{
    convert_profile_to_daily, convert_profile_to_monthly, kwh_to_mj, HOURS_PER_YEAR,
};
use crate::core::water_heat_demand::dhw_demand::ReferenceHotWaterDemand;
use crate::input::{ClimateZone, EnergyCarrier, MethodologyRevision};
use crate::statistics::{peak, percentile};
use indexmap::IndexMap;
use serde::Serialize;
use smartstring::alias::String as SmartString;
use std::fmt::{Display, Formatter};
use strum_macros::{Display as StrumDisplay, EnumIter};

/// The non-envelope end uses covered by the whole-of-home calculation.
#[derive(
    Clone, Copy, Debug, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, StrumDisplay,
)]
pub enum EndUse {
    Lighting,
    PlugLoads,
    HotWater,
    Cooking,
}

/// Identifies one hourly series in a result: an end use on one energy carrier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProfileKey {
    pub end_use: EndUse,
    pub carrier: EnergyCarrier,
}

impl ProfileKey {
    pub fn new(end_use: EndUse, carrier: EnergyCarrier) -> Self {
        Self { end_use, carrier }
    }
}

impl Display for ProfileKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.end_use, self.carrier)
    }
}

/// Hourly energy (kWh) for one end use on one carrier.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EndUseProfile {
    pub key: ProfileKey,
    pub hourly_kwh: Vec<f64>,
}

impl EndUseProfile {
    pub fn new(key: ProfileKey, hourly_kwh: Vec<f64>) -> Self {
        Self { key, hourly_kwh }
    }

    pub fn annual_kwh(&self) -> f64 {
        self.hourly_kwh.iter().sum()
    }

    pub fn annual_mj(&self) -> f64 {
        kwh_to_mj(self.annual_kwh())
    }

    pub fn daily_kwh(&self) -> Vec<f64> {
        convert_profile_to_daily(&self.hourly_kwh)
    }

    /// Calendar month totals, in kWh
    pub fn monthly_kwh(&self) -> [f64; 12] {
        convert_profile_to_monthly(&self.hourly_kwh)
    }

    pub fn summary(&self) -> ProfileSummary {
        let (peak_hour, peak_kwh) = peak(&self.hourly_kwh).unwrap_or_default();
        ProfileSummary {
            annual_kwh: self.annual_kwh(),
            annual_mj: self.annual_mj(),
            peak_hour,
            peak_kwh,
            percentile_95_kwh: if self.hourly_kwh.is_empty() {
                0.
            } else {
                percentile(&self.hourly_kwh, 95)
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub annual_kwh: f64,
    pub annual_mj: f64,
    pub peak_hour: usize,
    pub peak_kwh: f64,
    pub percentile_95_kwh: f64,
}

/// Where a result came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Provenance {
    pub revision: MethodologyRevision,
    pub climate_zone: ClimateZone,
    pub dwelling_id: SmartString,
    pub occupants: f64,
    /// Parts of the calculation that use simplified approximations
    pub approximations: Vec<String>,
}

/// Annual hot water simulation totals, in litres and kWh.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HotWaterDiagnostics {
    pub drawn_volume: f64,
    pub reference_volume: f64,
    pub draw_events: usize,
    pub rescale_factor: f64,
    pub heat_delivered: f64,
    pub heat_input: f64,
    pub standby_loss: f64,
    pub solar_heat: f64,
    pub unmet_energy: f64,
    pub shortfall_hours: usize,
    pub min_tank_temperature: Option<f64>,
    pub max_tank_temperature: Option<f64>,
    pub final_tank_state: Option<TankState>,
    /// Reference demand for the household, where the climate zone has a reference factor
    pub reference_demand: Option<ReferenceHotWaterDemand>,
}

/// An annual total outside the typical range for its end use. Advisory only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SanityWarning {
    pub end_use: EndUse,
    pub annual_kwh: f64,
    pub typical_min_kwh: f64,
    pub typical_max_kwh: f64,
}

impl Display for SanityWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "annual {} energy of {:.1} kWh is outside the typical range {:.0}-{:.0} kWh",
            self.end_use, self.annual_kwh, self.typical_min_kwh, self.typical_max_kwh
        )
    }
}

/// Hourly energy profiles for every end use of one dwelling.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WholeOfHomeResult {
    pub(crate) provenance: Provenance,
    pub(crate) profiles: IndexMap<ProfileKey, EndUseProfile>,
    pub(crate) hot_water: Option<HotWaterDiagnostics>,
    pub(crate) warnings: Vec<SanityWarning>,
}

impl WholeOfHomeResult {
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn profiles(&self) -> impl Iterator<Item = &EndUseProfile> {
        self.profiles.values()
    }

    pub fn profile(&self, end_use: EndUse, carrier: EnergyCarrier) -> Option<&EndUseProfile> {
        self.profiles.get(&ProfileKey::new(end_use, carrier))
    }

    pub fn hot_water_diagnostics(&self) -> Option<&HotWaterDiagnostics> {
        self.hot_water.as_ref()
    }

    pub fn warnings(&self) -> &[SanityWarning] {
        &self.warnings
    }

    /// Annual energy of one end use across all carriers, in kWh
    pub fn annual_end_use_kwh(&self, end_use: EndUse) -> f64 {
        self.profiles
            .values()
            .filter(|p| p.key.end_use == end_use)
            .map(|p| p.annual_kwh())
            .sum()
    }

    /// Hourly total across every end use on one carrier
    pub fn hourly_carrier_total(&self, carrier: EnergyCarrier) -> Vec<f64> {
        let mut total = vec![0.; HOURS_PER_YEAR];
        for profile in self.profiles.values().filter(|p| p.key.carrier == carrier) {
            for (sum, value) in total.iter_mut().zip(&profile.hourly_kwh) {
                *sum += value;
            }
        }
        total
    }
}
