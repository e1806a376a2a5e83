use chrono::NaiveDateTime;

use super::records::{RawStop, StationCode, TrainRecord};

/// Corridor station allow-list, WAS through BOS. Stops anywhere else are
/// dropped without diagnostics; the pipeline only covers this one corridor.
pub const CORRIDOR_STATIONS: [&str; 30] = [
    "WAS", "NCR", "BWI", "BAL", "ABE", "NRK", "WIL", "PHL", "PHN", "CWH", "TRE", "PJC", "NBK",
    "MET", "EWR", "NWK", "NYP", "NRO", "STM", "BRP", "NHV", "OSB", "NLC", "MYS", "WLY", "KIN",
    "PVD", "RTE", "BBY", "BOS",
];

pub fn is_corridor_station(code: &StationCode) -> bool {
    CORRIDOR_STATIONS.contains(&code.0.as_str())
}

/// Reduces a stop sequence to the corridor subsequence, relative order
/// unchanged.
pub fn filter_corridor_stops(stations: &[RawStop]) -> Vec<RawStop> {
    stations
        .iter()
        .filter(|stop| is_corridor_station(&stop.code))
        .cloned()
        .collect()
}

/// Parses an upstream timestamp such as "2024-05-13T21:01:00-07:00" into the
/// wall-clock instant it names. The zone offset and any fractional seconds
/// are stripped before the date and time components are combined.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let (date, rest) = raw.split_once('T')?;
    let time = rest.split(['+', '-']).next()?.split('.').next()?;
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").ok()
}

/// A corridor stop whose four timestamps all parsed. A stop with any missing
/// or malformed field is dropped whole; partial stops are never kept.
#[derive(Clone, Debug)]
pub struct NormalizedStop {
    pub code: StationCode,
    pub scheduled_arrival: NaiveDateTime,
    pub scheduled_departure: NaiveDateTime,
    pub actual_arrival: NaiveDateTime,
    pub actual_departure: NaiveDateTime,
}

impl NormalizedStop {
    fn from_raw(stop: &RawStop) -> Option<NormalizedStop> {
        Some(NormalizedStop {
            code: stop.code.clone(),
            scheduled_arrival: parse_timestamp(stop.sch_arr.as_deref()?)?,
            scheduled_departure: parse_timestamp(stop.sch_dep.as_deref()?)?,
            actual_arrival: parse_timestamp(stop.arr.as_deref()?)?,
            actual_departure: parse_timestamp(stop.dep.as_deref()?)?,
        })
    }
}

/// Ordered corridor stops for one train.
#[derive(Clone, Debug)]
pub struct TrainSchedule {
    pub stops: Vec<NormalizedStop>,
}

impl TrainSchedule {
    /// Filters and normalizes one train's stop list. Returns None when two or
    /// fewer stops survive; such a schedule is too sparse to animate and the
    /// train is excluded from all output.
    pub fn build(train: &TrainRecord) -> Option<TrainSchedule> {
        let stops: Vec<NormalizedStop> = filter_corridor_stops(&train.stations)
            .iter()
            .filter_map(NormalizedStop::from_raw)
            .collect();
        if stops.len() <= 2 {
            return None;
        }
        Some(TrainSchedule { stops })
    }

    pub fn first_stop(&self) -> &NormalizedStop {
        &self.stops[0]
    }

    pub fn last_stop(&self) -> &NormalizedStop {
        &self.stops[self.stops.len() - 1]
    }
}
