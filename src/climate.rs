use crate::core::units::{HOURS_PER_DAY, HOURS_PER_YEAR, WATTS_PER_KILOWATT};
use crate::errors::{WohError, WohResult};
use crate::input::ClimateZone;
use crate::simulation_time::month_start_end_hours;
use anyhow::{anyhow, bail};
use csv::Reader;
use indexmap::IndexMap;
use interp::{interp, InterpMode};
use serde::Deserialize;
use std::f64::consts::PI;
use std::io::{BufReader, Cursor, Read};
use std::sync::Arc;
use tracing::debug;

// bundle the reference climate table into the binary
static CLIMATE_ZONES_FILE: &str = include_str!("reference_data/climate_zones_rev10_1.csv");

/// Hour of day (local solar time) at which the diurnal temperature swing peaks
const DIURNAL_PEAK_HOUR: f64 = 15.;

/// Hourly climate for one zone over the rating year.
#[derive(Clone, Debug, PartialEq)]
pub struct ClimateSeries {
    zone: ClimateZone,
    ambient_temperatures: Vec<f64>,
    mains_temperatures: Vec<f64>,
    /// Mean global horizontal irradiance over each hour, in W/m2
    global_irradiance: Vec<f64>,
}

impl ClimateSeries {
    pub fn new(
        zone: ClimateZone,
        ambient_temperatures: Vec<f64>,
        mains_temperatures: Vec<f64>,
        global_irradiance: Vec<f64>,
    ) -> anyhow::Result<Self> {
        for (name, series) in [
            ("ambient temperature", &ambient_temperatures),
            ("mains temperature", &mains_temperatures),
            ("global irradiance", &global_irradiance),
        ] {
            if series.len() != HOURS_PER_YEAR {
                bail!(
                    "Climate series for zone {zone} has {} {name} values, expected {HOURS_PER_YEAR}",
                    series.len()
                );
            }
            if series.iter().any(|v| !v.is_finite()) {
                bail!("Climate series for zone {zone} has a non-finite {name} value");
            }
        }
        if global_irradiance.iter().any(|v| *v < 0.) {
            bail!("Climate series for zone {zone} has negative irradiance");
        }

        Ok(Self {
            zone,
            ambient_temperatures,
            mains_temperatures,
            global_irradiance,
        })
    }

    pub fn zone(&self) -> &ClimateZone {
        &self.zone
    }

    pub fn ambient_temperature(&self, hour: usize) -> f64 {
        self.ambient_temperatures[hour]
    }

    pub fn mains_temperature(&self, hour: usize) -> f64 {
        self.mains_temperatures[hour]
    }

    pub fn global_irradiance(&self, hour: usize) -> f64 {
        self.global_irradiance[hour]
    }

    pub fn ambient_temperatures(&self) -> &[f64] {
        &self.ambient_temperatures
    }

    pub fn mains_temperatures(&self) -> &[f64] {
        &self.mains_temperatures
    }

    /// Total global horizontal irradiation over one day, in kWh/m2
    pub fn daily_irradiation(&self, day: usize) -> f64 {
        let start = day * HOURS_PER_DAY as usize;
        self.global_irradiance[start..start + HOURS_PER_DAY as usize]
            .iter()
            .sum::<f64>()
            / WATTS_PER_KILOWATT as f64
    }
}

/// Monthly climate statistics from which an hourly series is expanded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonthlyClimate {
    /// ºC
    pub mean_ambient_temperature: f64,
    /// Mean daily maximum minus mean daily minimum, in K
    pub diurnal_range: f64,
    /// ºC
    pub mains_water_temperature: f64,
    /// Mean daily global horizontal irradiation, in kWh/m2/day
    pub daily_irradiation: f64,
    /// Hours between sunrise and sunset
    pub day_length: f64,
}

#[derive(Deserialize)]
struct ClimateZoneRecord {
    zone: u32,
    month: usize,
    mean_ambient_temperature: f64,
    diurnal_range: f64,
    mains_water_temperature: f64,
    daily_irradiation: f64,
    day_length: f64,
}

impl From<&ClimateZoneRecord> for MonthlyClimate {
    fn from(record: &ClimateZoneRecord) -> Self {
        Self {
            mean_ambient_temperature: record.mean_ambient_temperature,
            diurnal_range: record.diurnal_range,
            mains_water_temperature: record.mains_water_temperature,
            daily_irradiation: record.daily_irradiation,
            day_length: record.day_length,
        }
    }
}

#[derive(Deserialize)]
struct HourlyClimateRecord {
    ambient_temperature: f64,
    mains_water_temperature: f64,
    global_irradiance: f64,
}

/// Read-only store of climate series keyed by zone. Populate it once (per process or per batch)
/// and pass it by reference into each calculation.
#[derive(Clone, Debug, Default)]
pub struct ClimateReferenceProvider {
    series: IndexMap<ClimateZone, Arc<ClimateSeries>>,
}

impl ClimateReferenceProvider {
    pub fn new() -> Self {
        Default::default()
    }

    /// Provider populated with the bundled reference climate for zones 1 to 5.
    pub fn load_bundled() -> WohResult<Self> {
        let mut provider = Self::new();
        let mut monthly: IndexMap<u32, [Option<MonthlyClimate>; 12]> = Default::default();

        let mut reader = Reader::from_reader(BufReader::new(Cursor::new(CLIMATE_ZONES_FILE)));
        for record in reader.deserialize() {
            let record: ClimateZoneRecord = record
                .map_err(|e| anyhow!("There was a problem reading the bundled climate file: {e}"))?;
            if !(1..=12).contains(&record.month) {
                return Err(anyhow!("Invalid month {} in bundled climate file", record.month).into());
            }
            monthly.entry(record.zone).or_default()[record.month - 1] = Some((&record).into());
        }

        for (zone, months) in monthly {
            let months = months
                .into_iter()
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| anyhow!("Bundled climate for zone {zone} is missing months"))?;
            let months: [MonthlyClimate; 12] = months
                .try_into()
                .map_err(|_| anyhow!("Bundled climate for zone {zone} does not have 12 months"))?;
            provider.register_monthly(ClimateZone(zone), &months)?;
        }

        debug!(zones = provider.series.len(), "loaded bundled climate reference data");
        Ok(provider)
    }

    /// Expand monthly statistics into an hourly series and register it for `zone`, replacing
    /// any series already held for that zone.
    pub fn register_monthly(
        &mut self,
        zone: ClimateZone,
        months: &[MonthlyClimate; 12],
    ) -> WohResult<()> {
        let series = expand_monthly_climate(zone.clone(), months)?;
        self.series.insert(zone, Arc::new(series));
        Ok(())
    }

    /// Register a measured hourly series read from CSV with columns `ambient_temperature`,
    /// `mains_water_temperature` and `global_irradiance` (W/m2), one row per hour of the year.
    pub fn register_hourly_csv(&mut self, zone: ClimateZone, file: impl Read) -> WohResult<()> {
        let mut ambient = Vec::with_capacity(HOURS_PER_YEAR);
        let mut mains = Vec::with_capacity(HOURS_PER_YEAR);
        let mut irradiance = Vec::with_capacity(HOURS_PER_YEAR);

        let mut reader = Reader::from_reader(file);
        for (row, record) in reader.deserialize().enumerate() {
            let record: HourlyClimateRecord = record
                .map_err(|e| anyhow!("Could not read hourly climate row {row} for zone {zone}: {e}"))?;
            ambient.push(record.ambient_temperature);
            mains.push(record.mains_water_temperature);
            irradiance.push(record.global_irradiance);
        }

        let series = ClimateSeries::new(zone.clone(), ambient, mains, irradiance)?;
        self.series.insert(zone, Arc::new(series));
        Ok(())
    }

    pub fn lookup(&self, zone: &ClimateZone) -> WohResult<Arc<ClimateSeries>> {
        self.series
            .get(zone)
            .cloned()
            .ok_or_else(|| WohError::UnknownClimateZone(zone.to_string()))
    }

    pub fn zones(&self) -> impl Iterator<Item = &ClimateZone> {
        self.series.keys()
    }
}

/// Value of a monthly quantity at a fractional hour of the year, interpolated linearly between
/// mid-month points and wrapping across the year boundary.
fn interpolate_monthly(mid_month_hours: &[f64; 12], values: &[f64; 12], hour: f64) -> f64 {
    let year = HOURS_PER_YEAR as f64;
    let x = [mid_month_hours[11] - year]
        .into_iter()
        .chain(mid_month_hours.iter().copied())
        .chain([mid_month_hours[0] + year])
        .collect::<Vec<_>>();
    let y = [values[11]]
        .into_iter()
        .chain(values.iter().copied())
        .chain([values[0]])
        .collect::<Vec<_>>();

    interp(&x, &y, hour, &InterpMode::FirstLast)
}

/// Relative weight of each hour of a day for a half-sine daylight window centred on noon.
fn daylight_weights(day_length: f64) -> [f64; 24] {
    let day_length = day_length.clamp(0., 24.);
    let sunrise = 12. - day_length / 2.;
    let mut weights = [0.; 24];
    if day_length <= 0. {
        return weights;
    }
    for (hour, weight) in weights.iter_mut().enumerate() {
        let t = hour as f64 + 0.5 - sunrise;
        if (0. ..=day_length).contains(&t) {
            *weight = (PI * t / day_length).sin();
        }
    }
    let total = weights.iter().sum::<f64>();
    if total > 0. {
        weights.iter_mut().for_each(|w| *w /= total);
    }
    weights
}

fn expand_monthly_climate(
    zone: ClimateZone,
    months: &[MonthlyClimate; 12],
) -> anyhow::Result<ClimateSeries> {
    let mid_month_hours: [f64; 12] = std::array::from_fn(|idx| {
        let (start, end) = month_start_end_hours(idx);
        (start + end) as f64 / 2.
    });
    let mean_ambient: [f64; 12] = std::array::from_fn(|idx| months[idx].mean_ambient_temperature);
    let diurnal_range: [f64; 12] = std::array::from_fn(|idx| months[idx].diurnal_range);
    let mains: [f64; 12] = std::array::from_fn(|idx| months[idx].mains_water_temperature);

    let mut ambient_temperatures = Vec::with_capacity(HOURS_PER_YEAR);
    let mut mains_temperatures = Vec::with_capacity(HOURS_PER_YEAR);
    let mut global_irradiance = Vec::with_capacity(HOURS_PER_YEAR);

    for (month_idx, month) in months.iter().enumerate() {
        if month.daily_irradiation < 0. {
            bail!("Negative daily irradiation for zone {zone}, month {}", month_idx + 1);
        }
        let weights = daylight_weights(month.day_length);
        let (start, end) = month_start_end_hours(month_idx);
        for hour in start..end {
            let time = hour as f64 + 0.5;
            let hour_of_day = (hour % HOURS_PER_DAY) as f64 + 0.5;
            let diurnal = 0.5
                * interpolate_monthly(&mid_month_hours, &diurnal_range, time)
                * (2. * PI * (hour_of_day - DIURNAL_PEAK_HOUR) / HOURS_PER_DAY as f64).cos();

            ambient_temperatures.push(interpolate_monthly(&mid_month_hours, &mean_ambient, time) + diurnal);
            mains_temperatures.push(interpolate_monthly(&mid_month_hours, &mains, time));
            global_irradiance.push(
                month.daily_irradiation
                    * WATTS_PER_KILOWATT as f64
                    * weights[(hour % HOURS_PER_DAY) as usize],
            );
        }
    }

    ClimateSeries::new(zone, ambient_temperatures, mains_temperatures, global_irradiance)
}
