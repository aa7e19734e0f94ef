use crate::core::units::HOURS_PER_DAY;
use crate::input::MethodologyRevision;
use crate::simulation_time::DayType;
use anyhow::{anyhow, bail};
use csv::Reader;
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::{BufReader, Cursor};
use std::ops::RangeInclusive;
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter};

// bundle the schedule CSVs into the binary
static SCHEDULE_TEMPLATES_FILE: &str =
    include_str!("../reference_data/schedule_templates_rev10_1.csv");
static SEASONAL_FACTORS_FILE: &str = include_str!("../reference_data/seasonal_factors_rev10_1.csv");

/// School holiday periods of the rating year as zero-based, inclusive day-of-year ranges.
const SCHOOL_HOLIDAYS: [RangeInclusive<u32>; 5] = [0..=26, 98..=113, 175..=190, 259..=274, 350..=364];

/// The end-use categories that each get their own diversity series.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DiversityCategory {
    Lighting,
    PlugLoads,
    HotWaterDraw,
    Cooking,
}

#[derive(Deserialize)]
struct TemplateRecord {
    category: DiversityCategory,
    day_type: DayType,
    hour: usize,
    fraction: f64,
}

#[derive(Deserialize)]
struct SeasonalRecord {
    category: DiversityCategory,
    month: usize,
    factor: f64,
}

/// Daily template for one category: relative activity per hour of day, peak normalised to 1.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct DailyTemplate {
    weekday: [f64; 24],
    weekend: [f64; 24],
}

impl DailyTemplate {
    pub(crate) fn fraction(&self, day_type: DayType, hour_of_day: u32) -> f64 {
        match day_type {
            DayType::Weekday => self.weekday[hour_of_day as usize],
            DayType::Weekend => self.weekend[hour_of_day as usize],
        }
    }
}

/// Standard behavioural schedules for one methodology revision.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ScheduleTemplates {
    daily: IndexMap<DiversityCategory, DailyTemplate>,
    seasonal: IndexMap<DiversityCategory, [f64; 12]>,
}

static TEMPLATES_REV10_1: LazyLock<anyhow::Result<ScheduleTemplates>> =
    LazyLock::new(|| ScheduleTemplates::parse(SCHEDULE_TEMPLATES_FILE, SEASONAL_FACTORS_FILE));

impl ScheduleTemplates {
    pub(crate) fn for_revision(revision: MethodologyRevision) -> anyhow::Result<&'static Self> {
        match revision {
            MethodologyRevision::V10_1 => TEMPLATES_REV10_1
                .as_ref()
                .map_err(|e| anyhow!("Schedule templates for revision {revision} are invalid: {e}")),
        }
    }

    fn parse(templates_csv: &str, seasonal_csv: &str) -> anyhow::Result<Self> {
        let mut daily: IndexMap<DiversityCategory, DailyTemplate> = Default::default();
        let mut seen: IndexMap<(DiversityCategory, DayType), [bool; 24]> = Default::default();

        let mut reader = Reader::from_reader(BufReader::new(Cursor::new(templates_csv)));
        for record in reader.deserialize() {
            let record: TemplateRecord = record?;
            if record.hour >= HOURS_PER_DAY as usize {
                bail!("Schedule template hour {} is out of range", record.hour);
            }
            if !(0. ..=1.).contains(&record.fraction) {
                bail!(
                    "Schedule template fraction {} for {} is outside [0, 1]",
                    record.fraction,
                    record.category
                );
            }
            let template = daily.entry(record.category).or_default();
            match record.day_type {
                DayType::Weekday => template.weekday[record.hour] = record.fraction,
                DayType::Weekend => template.weekend[record.hour] = record.fraction,
            }
            seen.entry((record.category, record.day_type)).or_default()[record.hour] = true;
        }
        if seen.len() != 8 || seen.values().any(|hours| hours.iter().any(|h| !h)) {
            bail!("Schedule templates must give all 24 hours of both day types for each category");
        }

        let mut seasonal: IndexMap<DiversityCategory, [f64; 12]> = Default::default();
        let mut reader = Reader::from_reader(BufReader::new(Cursor::new(seasonal_csv)));
        for record in reader.deserialize() {
            let record: SeasonalRecord = record?;
            if !(1..=12).contains(&record.month) {
                bail!("Seasonal factor month {} is out of range", record.month);
            }
            if !(record.factor > 0. && record.factor <= 1.) {
                bail!("Seasonal factor {} for {} is outside (0, 1]", record.factor, record.category);
            }
            seasonal.entry(record.category).or_insert([0.; 12])[record.month - 1] = record.factor;
        }
        if seasonal.len() != 4 || seasonal.values().any(|months| months.contains(&0.)) {
            bail!("Seasonal factors must give all 12 months for each category");
        }

        Ok(Self { daily, seasonal })
    }

    pub(crate) fn daily(&self, category: DiversityCategory) -> anyhow::Result<&DailyTemplate> {
        self.daily
            .get(&category)
            .ok_or_else(|| anyhow!("No daily schedule template for {category}"))
    }

    pub(crate) fn seasonal_factor(
        &self,
        category: DiversityCategory,
        month_idx: usize,
    ) -> anyhow::Result<f64> {
        self.seasonal
            .get(&category)
            .map(|months| months[month_idx])
            .ok_or_else(|| anyhow!("No seasonal factors for {category}"))
    }
}

pub(crate) fn is_school_holiday(day_of_year: u32) -> bool {
    SCHOOL_HOLIDAYS.iter().any(|range| range.contains(&day_of_year))
}
