use crate::climate::ClimateSeries;
use crate::core::occupancy::OccupancyDiversitySeries;
use crate::core::schedule::DiversityCategory;
use crate::core::units::{DAYS_PER_YEAR, HOURS_PER_DAY, HOURS_PER_YEAR};
use crate::core::water_heat_demand::dhw_demand::reference_annual_volume;
use crate::core::water_heat_demand::misc::frac_hot_water;
use crate::input::{HotWaterFixtures, SimulationSettings};
use anyhow::bail;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use rand_mt::Mt64;
use rand_pcg::Pcg64;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::{debug, warn};

const SHOWER_DURATION_MINUTES: f64 = 6.;
const BASIN_TAP_VOLUME: f64 = 1.5;
const KITCHEN_TAP_VOLUME: f64 = 4.;

#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
pub enum DrawEventKind {
    Shower,
    Bath,
    BasinTap,
    KitchenTap,
    /// Bath-sized draw standing in for showers and baths in a dwelling with neither
    Other,
}

impl DrawEventKind {
    /// Temperature the draw must arrive at the fixture, in ºC
    pub fn delivery_temperature(&self) -> f64 {
        match self {
            DrawEventKind::Shower | DrawEventKind::Bath | DrawEventKind::Other => 42.,
            DrawEventKind::BasinTap => 40.,
            DrawEventKind::KitchenTap => 50.,
        }
    }

    /// Highest delivery temperature of any draw, in ºC
    pub fn max_delivery_temperature() -> f64 {
        Self::iter()
            .map(|kind| kind.delivery_temperature())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Expected events per occupant per day
    fn daily_rate_per_occupant(&self) -> f64 {
        match self {
            DrawEventKind::Shower => 0.75,
            DrawEventKind::Bath => 0.12,
            DrawEventKind::BasinTap => 2.,
            DrawEventKind::KitchenTap => 1.2,
            DrawEventKind::Other => 0.87,
        }
    }
}

/// A single hot water draw.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HotWaterDrawEvent {
    /// Start time, in hours from the start of the rating year
    pub start: f64,
    /// Volume of hot water drawn from the heater, in litres
    pub volume: f64,
    /// Temperature the water is required at, in ºC
    pub delivery_temperature: f64,
    pub kind: DrawEventKind,
}

impl HotWaterDrawEvent {
    pub fn hour(&self) -> usize {
        self.start.floor() as usize
    }
}

/// All draws for the rating year, grouped by hour and ordered by start time within each hour.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawSchedule {
    hourly: Vec<Vec<HotWaterDrawEvent>>,
    reference_volume: f64,
    rescale_factor: f64,
}

impl DrawSchedule {
    pub fn events_in_hour(&self, hour: usize) -> &[HotWaterDrawEvent] {
        &self.hourly[hour]
    }

    pub fn total_volume(&self) -> f64 {
        self.hourly.iter().flatten().map(|e| e.volume).sum()
    }

    pub fn daily_volumes(&self) -> Vec<f64> {
        self.hourly
            .chunks(HOURS_PER_DAY as usize)
            .map(|day| day.iter().flatten().map(|e| e.volume).sum())
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.hourly.iter().map(Vec::len).sum()
    }

    pub fn reference_volume(&self) -> f64 {
        self.reference_volume
    }

    /// Factor applied to every generated volume to bring the annual total onto the reference
    /// volume (1.0 when the generated total was already within tolerance)
    pub fn rescale_factor(&self) -> f64 {
        self.rescale_factor
    }
}

/// Kind and nominal hot-water volume of each draw type the fixture inventory supports.
fn draw_types(
    fixtures: &HotWaterFixtures,
    setpoint: f64,
    mean_mains_temperature: f64,
) -> Vec<(DrawEventKind, f64)> {
    let shower_volume = fixtures.shower_flow_rate
        * SHOWER_DURATION_MINUTES
        * frac_hot_water(
            DrawEventKind::Shower.delivery_temperature(),
            setpoint,
            mean_mains_temperature,
        )
        .clamp(0., 1.);
    let bath_volume = fixtures.bath_fill_volume;

    let mut types = match (fixtures.showers > 0, fixtures.baths > 0) {
        (true, true) => vec![
            (DrawEventKind::Shower, shower_volume),
            (DrawEventKind::Bath, bath_volume),
        ],
        // no baths, so showers are taken instead
        (true, false) => vec![(DrawEventKind::Shower, shower_volume)],
        // no showers, so baths are taken instead
        (false, true) => vec![(DrawEventKind::Bath, bath_volume)],
        (false, false) => vec![(DrawEventKind::Other, bath_volume)],
    };
    if fixtures.basin_taps > 0 {
        types.push((DrawEventKind::BasinTap, BASIN_TAP_VOLUME));
    }
    if fixtures.kitchen_taps > 0 {
        types.push((DrawEventKind::KitchenTap, KITCHEN_TAP_VOLUME));
    }
    types
}

/// Expected events per day for a draw type, taking over the rate of any type it replaces.
fn daily_rate(kind: DrawEventKind, types: &[(DrawEventKind, f64)], occupants: f64) -> f64 {
    let has = |k: DrawEventKind| types.iter().any(|(t, _)| *t == k);
    let rate = match kind {
        DrawEventKind::Shower if !has(DrawEventKind::Bath) => {
            DrawEventKind::Shower.daily_rate_per_occupant()
                + DrawEventKind::Bath.daily_rate_per_occupant()
        }
        DrawEventKind::Bath if !has(DrawEventKind::Shower) => {
            DrawEventKind::Shower.daily_rate_per_occupant()
                + DrawEventKind::Bath.daily_rate_per_occupant()
        }
        _ => kind.daily_rate_per_occupant(),
    };
    rate * occupants
}

/// Stage A of the hot water simulation: reproducible stochastic draw generation.
pub struct DrawEventGenerator<'a> {
    fixtures: &'a HotWaterFixtures,
    settings: &'a SimulationSettings,
    setpoint: f64,
}

impl<'a> DrawEventGenerator<'a> {
    pub fn new(fixtures: &'a HotWaterFixtures, settings: &'a SimulationSettings, setpoint: f64) -> Self {
        Self {
            fixtures,
            settings,
            setpoint,
        }
    }

    pub fn generate(
        &self,
        diversity: &OccupancyDiversitySeries,
        climate: &ClimateSeries,
    ) -> anyhow::Result<DrawSchedule> {
        let occupants = diversity.occupants();
        let reference_volume = reference_annual_volume(occupants);
        let hourly_factors = diversity.factors(DiversityCategory::HotWaterDraw);
        if hourly_factors.len() != HOURS_PER_YEAR {
            bail!("Hot water diversity series has {} hours", hourly_factors.len());
        }
        let factor_total = hourly_factors.iter().sum::<f64>();
        if factor_total <= 0. {
            bail!("Hot water diversity series is zero throughout the year");
        }

        let mean_mains =
            climate.mains_temperatures().iter().sum::<f64>() / HOURS_PER_YEAR as f64;
        let types = draw_types(self.fixtures, self.setpoint, mean_mains);

        // calibrate nominal volumes so that the expected annual total is the reference volume
        let expected_daily_volume = types
            .iter()
            .map(|(kind, volume)| daily_rate(*kind, &types, occupants) * volume)
            .sum::<f64>();
        if expected_daily_volume <= 0. {
            bail!("Fixture inventory gives no hot water draws");
        }
        let calibration = reference_volume / (expected_daily_volume * DAYS_PER_YEAR as f64);

        let mut rng_poisson = Pcg64::seed_from_u64(self.settings.hot_water_seed);
        let mut rng: Mt64 = SeedableRng::seed_from_u64(self.settings.hot_water_seed);

        let mut hourly = vec![vec![]; HOURS_PER_YEAR];
        for (kind, nominal_volume) in &types {
            let annual_events = daily_rate(*kind, &types, occupants) * DAYS_PER_YEAR as f64;
            for (hour, factor) in hourly_factors.iter().enumerate() {
                // ensure lambda > 0. for poisson distribution
                let lambda = (annual_events * factor / factor_total).max(f64::MIN_POSITIVE);
                let count = Poisson::new(lambda)?.sample(&mut rng_poisson) as usize;
                for _ in 0..count {
                    hourly[hour].push(HotWaterDrawEvent {
                        start: hour as f64 + rng.random::<f64>(),
                        volume: nominal_volume * calibration,
                        delivery_temperature: kind.delivery_temperature(),
                        kind: *kind,
                    });
                }
            }
        }
        for events in hourly.iter_mut() {
            events.sort_by(|a: &HotWaterDrawEvent, b| a.start.total_cmp(&b.start));
        }

        let mut schedule = DrawSchedule {
            hourly,
            reference_volume,
            rescale_factor: 1.,
        };
        schedule.normalise(self.settings.draw_volume_tolerance);

        debug!(
            events = schedule.event_count(),
            volume = schedule.total_volume(),
            reference_volume,
            "generated hot water draws"
        );
        Ok(schedule)
    }
}

impl DrawSchedule {
    /// Rescale all draw volumes onto the reference volume if the generated total deviates from
    /// it by more than `tolerance` (relative).
    fn normalise(&mut self, tolerance: f64) {
        let total = self.total_volume();
        if total <= 0. {
            warn!("No hot water draws were generated; leaving the draw schedule empty");
            return;
        }
        let deviation = (total - self.reference_volume) / self.reference_volume;
        if deviation.abs() <= tolerance {
            return;
        }

        let factor = self.reference_volume / total;
        debug!(
            deviation,
            factor, "rescaling generated hot water draws onto the reference volume"
        );
        self.hourly
            .iter_mut()
            .flatten()
            .for_each(|event| event.volume *= factor);
        self.rescale_factor = factor;
    }
}
