use thiserror::Error;

pub const JOULES_PER_KILOWATT_HOUR: u32 = 3_600_000;
pub const MEGAJOULES_PER_KILOWATT_HOUR: f64 = 3.6;
pub const MEGAJOULES_PER_GIGAJOULE: f64 = 1_000.;
pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_YEAR: u32 = 365;
pub const HOURS_PER_YEAR: usize = 8_760;
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub fn kwh_to_mj(kwh: f64) -> f64 {
    kwh * MEGAJOULES_PER_KILOWATT_HOUR
}

pub fn mj_to_kwh(mj: f64) -> f64 {
    mj / MEGAJOULES_PER_KILOWATT_HOUR
}

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> Result<f64, BelowAbsoluteZeroError> {
    if temp_c < -273.15 {
        Err(BelowAbsoluteZeroError::from_c(temp_c))
    } else {
        Ok(temp_c + 273.15)
    }
}

/// Sum an hourly profile into daily totals.
pub fn convert_profile_to_daily(hourly_totals: &[f64]) -> Vec<f64> {
    hourly_totals
        .chunks(HOURS_PER_DAY as usize)
        .map(|day| day.iter().sum::<f64>())
        .collect()
}

/// Sum an hourly annual profile into calendar month totals.
pub fn convert_profile_to_monthly(hourly_totals: &[f64]) -> [f64; 12] {
    let mut monthly = [0.; 12];
    let mut start = 0;
    for (month_idx, days) in DAYS_IN_MONTH.iter().enumerate() {
        let end = (start + (*days * HOURS_PER_DAY) as usize).min(hourly_totals.len());
        monthly[month_idx] = hourly_totals[start..end].iter().sum();
        start = end;
    }
    monthly
}

#[derive(Debug, Error)]
#[error("A temperature of {k}ºK/{}ºC was encountered, which is less than absolute zero", k - 273.15)]
pub(crate) struct BelowAbsoluteZeroError {
    k: f64,
}

impl BelowAbsoluteZeroError {
    fn from_c(c: f64) -> Self {
        Self { k: c + 273.15 }
    }
}
