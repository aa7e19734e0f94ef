use crate::core::schedule::{is_school_holiday, DiversityCategory, ScheduleTemplates};
use crate::core::units::HOURS_PER_YEAR;
use crate::errors::{WohError, WohResult};
use crate::input::{HouseholdComposition, MethodologyRevision, RevisionTag};
use crate::simulation_time::{DayType, SimulationTime};
use anyhow::anyhow;
use tracing::instrument;

const MIN_OCCUPANTS: f64 = 1.;
const MAX_OCCUPANTS: f64 = 6.;

/// Derive the number of occupants from total floor area (m2), clamped to 1..=6 and rounded to
/// 2 decimal places.
pub fn occupants_from_floor_area(floor_area: f64) -> f64 {
    let occupants = (1.525 * floor_area.ln() - 4.533).clamp(MIN_OCCUPANTS, MAX_OCCUPANTS);
    (occupants * 100.).round() / 100.
}

/// Number of occupants implied by a household composition.
pub fn resolve_occupants(household: &HouseholdComposition, floor_area: f64) -> WohResult<f64> {
    let occupants = match household {
        HouseholdComposition::FromFloorArea => {
            if !(floor_area.is_finite() && floor_area > 0.) {
                return Err(WohError::InvalidHouseholdComposition(format!(
                    "cannot derive occupants from a floor area of {floor_area} m2"
                )));
            }
            occupants_from_floor_area(floor_area)
        }
        HouseholdComposition::Occupants { count } => *count,
        HouseholdComposition::AdultsAndChildren { adults, children } => {
            if *adults == 0 && *children > 0 {
                return Err(WohError::InvalidHouseholdComposition(
                    "a household with children must have at least one adult".into(),
                ));
            }
            *adults as f64 + *children as f64
        }
    };

    if !(occupants.is_finite() && occupants > 0.) {
        return Err(WohError::InvalidHouseholdComposition(format!(
            "occupant count must be positive, got {occupants}"
        )));
    }
    Ok(occupants)
}

/// Flat share of activity present in every hour. Larger households keep more going at all
/// times of day.
fn baseline_share(occupants: f64) -> f64 {
    0.05 + 0.15 * (1. - 1. / occupants.max(MIN_OCCUPANTS))
}

/// Exponent applied to template fractions. Above 1 sharpens peaks; approaches 1 as household
/// size grows.
fn peak_sharpness(occupants: f64) -> f64 {
    1. + 1. / occupants.max(MIN_OCCUPANTS)
}

/// Hourly diversity factors for each end-use category over the rating year.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyDiversitySeries {
    occupants: f64,
    lighting: Vec<f64>,
    plug_loads: Vec<f64>,
    hot_water_draw: Vec<f64>,
    cooking: Vec<f64>,
}

impl OccupancyDiversitySeries {
    pub fn occupants(&self) -> f64 {
        self.occupants
    }

    pub fn factors(&self, category: DiversityCategory) -> &[f64] {
        match category {
            DiversityCategory::Lighting => &self.lighting,
            DiversityCategory::PlugLoads => &self.plug_loads,
            DiversityCategory::HotWaterDraw => &self.hot_water_draw,
            DiversityCategory::Cooking => &self.cooking,
        }
    }
}

/// Turns household composition into diversity series using the standard schedules of one
/// methodology revision.
#[derive(Debug)]
pub struct OccupancyDiversityEngine {
    revision: MethodologyRevision,
    templates: &'static ScheduleTemplates,
}

impl OccupancyDiversityEngine {
    pub fn new(revision: &RevisionTag) -> WohResult<Self> {
        let revision = MethodologyRevision::try_from(revision)?;
        let templates = ScheduleTemplates::for_revision(revision)?;
        Ok(Self {
            revision,
            templates,
        })
    }

    pub fn revision(&self) -> MethodologyRevision {
        self.revision
    }

    #[instrument(skip(self))]
    pub fn derive(
        &self,
        household: &HouseholdComposition,
        floor_area: f64,
    ) -> WohResult<OccupancyDiversitySeries> {
        let occupants = resolve_occupants(household, floor_area)?;
        let holiday_adjustment = household.has_children();

        let series = |category: DiversityCategory| {
            self.series_for(category, occupants, holiday_adjustment)
                .map_err(|e| {
                    WohError::InvalidHouseholdComposition(format!(
                        "no {category} schedule for revision {}: {e}",
                        self.revision
                    ))
                })
        };

        Ok(OccupancyDiversitySeries {
            occupants,
            lighting: series(DiversityCategory::Lighting)?,
            plug_loads: series(DiversityCategory::PlugLoads)?,
            hot_water_draw: series(DiversityCategory::HotWaterDraw)?,
            cooking: series(DiversityCategory::Cooking)?,
        })
    }

    fn series_for(
        &self,
        category: DiversityCategory,
        occupants: f64,
        holiday_adjustment: bool,
    ) -> anyhow::Result<Vec<f64>> {
        let template = self.templates.daily(category)?;
        let baseline = baseline_share(occupants);
        let sharpness = peak_sharpness(occupants);

        let mut factors = Vec::with_capacity(HOURS_PER_YEAR);
        for t_it in SimulationTime::rating_year().iter() {
            let month_idx = t_it
                .current_month()
                .ok_or_else(|| anyhow!("Hour {} is outside the rating year", t_it.index))?;
            let day_type = if holiday_adjustment && is_school_holiday(t_it.current_day()) {
                DayType::Weekend
            } else {
                t_it.day_type()
            };
            let seasonal = self.templates.seasonal_factor(category, month_idx as usize)?;
            let fraction = template.fraction(day_type, t_it.hour_of_day());

            let factor = baseline + (1. - baseline) * seasonal * fraction.powf(sharpness);
            if !(0. ..=1.).contains(&factor) {
                return Err(anyhow!(
                    "diversity factor {factor} at hour {} is outside [0, 1]",
                    t_it.index
                ));
            }
            factors.push(factor);
        }

        Ok(factors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::HOURS_PER_DAY;
    use crate::simulation_time::day_type_for_day;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    #[fixture]
    fn engine() -> OccupancyDiversityEngine {
        OccupancyDiversityEngine::new(&RevisionTag::from("10.1")).unwrap()
    }

    #[rstest]
    #[case(50., 1.43)]
    #[case(100., 2.49)]
    #[case(150., 3.11)]
    #[case(10., 1.)]
    #[case(10_000., 6.)]
    fn should_derive_occupants_from_floor_area(#[case] area: f64, #[case] expected: f64) {
        assert_relative_eq!(occupants_from_floor_area(area), expected);
    }

    #[rstest]
    fn should_reject_non_positive_occupancy(engine: OccupancyDiversityEngine) {
        for household in [
            HouseholdComposition::Occupants { count: 0. },
            HouseholdComposition::Occupants { count: -2. },
            HouseholdComposition::AdultsAndChildren {
                adults: 0,
                children: 0,
            },
            HouseholdComposition::AdultsAndChildren {
                adults: 0,
                children: 2,
            },
        ] {
            assert!(matches!(
                engine.derive(&household, 120.),
                Err(WohError::InvalidHouseholdComposition(_))
            ));
        }
        assert!(matches!(
            engine.derive(&HouseholdComposition::FromFloorArea, 0.),
            Err(WohError::InvalidHouseholdComposition(_))
        ));
    }

    #[rstest]
    fn should_sum_adults_and_children_without_overflow() {
        let household = HouseholdComposition::AdultsAndChildren {
            adults: u32::MAX,
            children: 1,
        };
        assert_eq!(
            resolve_occupants(&household, 120.).unwrap(),
            u32::MAX as f64 + 1.
        );
    }

    #[rstest]
    fn should_reject_unsupported_revision() {
        assert!(matches!(
            OccupancyDiversityEngine::new(&RevisionTag::from("11.0")),
            Err(WohError::UnsupportedRevision(_))
        ));
    }

    #[rstest]
    #[case(HouseholdComposition::Occupants { count: 1. })]
    #[case(HouseholdComposition::Occupants { count: 0.4 })]
    #[case(HouseholdComposition::AdultsAndChildren { adults: 2, children: 3 })]
    #[case(HouseholdComposition::FromFloorArea)]
    fn should_bound_every_factor(
        engine: OccupancyDiversityEngine,
        #[case] household: HouseholdComposition,
    ) {
        let series = engine.derive(&household, 180.).unwrap();
        for category in DiversityCategory::iter() {
            let factors = series.factors(category);
            assert_eq!(factors.len(), HOURS_PER_YEAR);
            assert!(factors.iter().all(|f| (0. ..=1.).contains(f)), "{category}");
        }
    }

    #[rstest]
    fn should_flatten_profile_for_larger_households(engine: OccupancyDiversityEngine) {
        let single = engine
            .derive(&HouseholdComposition::Occupants { count: 1. }, 100.)
            .unwrap();
        let large = engine
            .derive(&HouseholdComposition::Occupants { count: 6. }, 100.)
            .unwrap();

        let min = |f: &[f64]| f.iter().copied().fold(f64::INFINITY, f64::min);
        let lighting_single = single.factors(DiversityCategory::Lighting);
        let lighting_large = large.factors(DiversityCategory::Lighting);
        assert!(min(lighting_large) > min(lighting_single));
    }

    #[rstest]
    fn should_repeat_weekly_within_a_month(engine: OccupancyDiversityEngine) {
        let series = engine
            .derive(&HouseholdComposition::Occupants { count: 2. }, 100.)
            .unwrap();
        let factors = series.factors(DiversityCategory::HotWaterDraw);
        let week = 7 * HOURS_PER_DAY as usize;
        // March has no school holidays and a constant seasonal factor
        let march_start = 59 * HOURS_PER_DAY as usize;
        for hour in march_start..march_start + 14 * HOURS_PER_DAY as usize {
            assert_eq!(factors[hour], factors[hour + week]);
        }
    }

    #[rstest]
    fn should_use_weekend_schedule_in_school_holidays_with_children(
        engine: OccupancyDiversityEngine,
    ) {
        let family = engine
            .derive(
                &HouseholdComposition::AdultsAndChildren {
                    adults: 2,
                    children: 2,
                },
                150.,
            )
            .unwrap();
        let adults = engine
            .derive(&HouseholdComposition::Occupants { count: 4. }, 150.)
            .unwrap();

        // 3 January 2022 is a Monday inside the summer school holidays
        assert_eq!(day_type_for_day(2), DayType::Weekday);
        let morning = 2 * HOURS_PER_DAY as usize + 7;
        assert!(
            family.factors(DiversityCategory::HotWaterDraw)[morning]
                < adults.factors(DiversityCategory::HotWaterDraw)[morning]
        );
    }
}
