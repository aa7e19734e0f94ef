use crate::core::units::{HOURS_PER_DAY, HOURS_PER_YEAR};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Deserialize;

/// Calendar year used for all rating calculations (365 days, starting on a Saturday).
pub const RATING_YEAR: i32 = 2022;

// # Define hours that start each month (and end next month). Note there are 13
// # values so that end of final month is handled correctly.
// # E.g. Jan is hours 0-743
const MONTH_START_END_HOURS: [u32; 13] = [
    0, 744, 1416, 2160, 2880, 3624, 4344, 5088, 5832, 6552, 7296, 8016, 8760,
];

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
pub enum DayType {
    Weekday,
    Weekend,
}

/// Hourly simulation time over the rating year.
#[derive(Clone, Copy, Debug)]
pub struct SimulationTime {
    start_time: f64,
    end_time: f64,
    step: f64,
}

impl SimulationTime {
    pub fn new(start_time: f64, end_time: f64, step: f64) -> Self {
        Self {
            start_time,
            end_time,
            step,
        }
    }

    /// The full rating year at hourly resolution.
    pub fn rating_year() -> Self {
        Self::new(0., HOURS_PER_YEAR as f64, 1.)
    }

    pub fn total_steps(&self) -> usize {
        ((self.end_time - self.start_time) / self.step).ceil() as usize
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator {
            current_index: 0,
            simulation_time: *self,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimulationTimeIterator {
    current_index: usize,
    simulation_time: SimulationTime,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationTimeIteration {
    pub index: usize,
    pub time: f64,
    pub timestep: f64,
}

impl SimulationTimeIteration {
    pub fn current_hour(&self) -> u32 {
        self.time.floor() as u32
    }

    pub fn hour_of_day(&self) -> u32 {
        self.current_hour() % HOURS_PER_DAY
    }

    pub fn current_day(&self) -> u32 {
        self.time as u32 / HOURS_PER_DAY
    }

    /// Zero-based calendar month, or None beyond the end of the rating year
    pub fn current_month(&self) -> Option<u32> {
        month_for_hour(self.current_hour())
    }

    pub fn day_type(&self) -> DayType {
        day_type_for_day(self.current_day())
    }
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.simulation_time.total_steps() {
            return None;
        }
        let iteration = SimulationTimeIteration {
            index: self.current_index,
            time: self.simulation_time.start_time
                + self.current_index as f64 * self.simulation_time.step,
            timestep: self.simulation_time.step,
        };
        self.current_index += 1;
        Some(iteration)
    }
}

pub(crate) fn month_for_hour(hour: u32) -> Option<u32> {
    MONTH_START_END_HOURS
        .iter()
        .position(|end_hour| hour < *end_hour)
        .map(|i| (i - 1) as u32)
}

pub(crate) fn month_start_end_hours(month_idx: usize) -> (u32, u32) {
    (
        MONTH_START_END_HOURS[month_idx],
        MONTH_START_END_HOURS[month_idx + 1],
    )
}

pub(crate) fn date_for_day(day_of_year: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(RATING_YEAR, 1, 1)
        .map(|first| first + Duration::days(day_of_year as i64))
        .unwrap_or_default()
}

pub(crate) fn day_type_for_day(day_of_year: u32) -> DayType {
    match date_for_day(day_of_year).weekday() {
        Weekday::Sat | Weekday::Sun => DayType::Weekend,
        _ => DayType::Weekday,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    pub fn simtime() -> SimulationTime {
        SimulationTime::new(742.0, 746.0, 0.5)
    }

    #[rstest]
    fn should_have_correct_total_steps(simtime: SimulationTime) {
        assert_eq!(simtime.total_steps(), 8);
        assert_eq!(SimulationTime::rating_year().total_steps(), 8760);
    }

    #[rstest]
    fn should_iterate_correctly(simtime: SimulationTime) {
        let hours = [742, 742, 743, 743, 744, 744, 745, 745];
        let hours_of_day = [22, 22, 23, 23, 0, 0, 1, 1];
        let current_days = [30, 30, 30, 30, 31, 31, 31, 31];
        let current_months = [0, 0, 0, 0, 1, 1, 1, 1];

        for (i, item) in simtime.iter().enumerate() {
            assert_eq!(item.index, i);
            assert_eq!(item.time, i as f64 * 0.5 + 742.0);
            assert_eq!(item.current_hour(), hours[i]);
            assert_eq!(item.hour_of_day(), hours_of_day[i]);
            assert_eq!(item.current_day(), current_days[i]);
            assert_eq!(item.current_month().unwrap(), current_months[i]);
        }
        assert_eq!(simtime.iter().count(), 8);
    }

    #[rstest]
    fn should_start_rating_year_on_a_weekend() {
        // 1 January 2022 was a Saturday
        assert_eq!(day_type_for_day(0), DayType::Weekend);
        assert_eq!(day_type_for_day(1), DayType::Weekend);
        assert_eq!(day_type_for_day(2), DayType::Weekday);
        assert_eq!(date_for_day(364), NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
    }

    #[rstest]
    fn should_give_month_boundaries() {
        assert_eq!(month_for_hour(0), Some(0));
        assert_eq!(month_for_hour(8759), Some(11));
        assert_eq!(month_for_hour(8760), None);
        assert_eq!(month_start_end_hours(1), (744, 1416));
    }
}
