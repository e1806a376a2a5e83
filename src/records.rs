use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Snapshot endpoint for the upstream tracker. Returns a map of train
/// identifier to the ordered legs currently known for that train.
pub const DEFAULT_API_URL: &str = "https://api-v3.amtraker.com/v3/trains";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Short upstream identifier for a physical stop, e.g. "NYP".
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct StationCode(pub String);

/// One station record of a train leg. The four timestamps arrive as ISO-8601
/// strings with a trailing zone offset, and any of them may be absent for
/// stops the upstream has no estimate for yet.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStop {
    pub code: StationCode,
    #[serde(default)]
    pub sch_arr: Option<String>,
    #[serde(default)]
    pub sch_dep: Option<String>,
    #[serde(default)]
    pub arr: Option<String>,
    #[serde(default)]
    pub dep: Option<String>,
}

/// One leg of an upstream train entry. Parity of the train number encodes
/// direction on the corridor.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRecord {
    pub train_num: u32,
    pub route_name: String,
    #[serde(default)]
    pub stations: Vec<RawStop>,
}

/// Fetches the full position snapshot. Any transport failure, non-success
/// status or non-map payload is fatal for the run; nothing downstream can
/// proceed without a valid snapshot.
pub fn fetch_trains(api_url: &str) -> Result<HashMap<String, Vec<TrainRecord>>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;
    client
        .get(api_url)
        .send()
        .with_context(|| format!("Failed to fetch train data from {api_url}"))?
        .error_for_status()
        .context("Upstream returned a non-success status")?
        .json()
        .context("Upstream payload was not a map of train entries")
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RouteName {
    Acela,
    NortheastRegional,
}

impl RouteName {
    pub fn from_label(label: &str) -> Option<RouteName> {
        match label {
            "Acela" => Some(RouteName::Acela),
            "Northeast Regional" => Some(RouteName::NortheastRegional),
            _ => None,
        }
    }
}

/// Corridor trains split by recognized service. Trains on any other route
/// are excluded from every downstream stage.
#[derive(Debug, Default)]
pub struct RouteGroups {
    pub acela: Vec<TrainRecord>,
    pub regional: Vec<TrainRecord>,
}

impl RouteGroups {
    pub fn train_count(&self) -> usize {
        self.acela.len() + self.regional.len()
    }

    /// Iteration order fixes color assignment and manifest order: the Acela
    /// group is fully processed before the regional group.
    pub fn in_processing_order(&self) -> impl Iterator<Item = &TrainRecord> {
        self.acela.iter().chain(self.regional.iter())
    }
}

pub fn group_by_route(fetched: HashMap<String, Vec<TrainRecord>>) -> RouteGroups {
    let mut groups = RouteGroups::default();
    for legs in fetched.into_values() {
        // Only the first leg of each entry is tracked.
        let Some(train) = legs.into_iter().next() else {
            continue;
        };
        match RouteName::from_label(&train.route_name) {
            Some(RouteName::Acela) => groups.acela.push(train),
            Some(RouteName::NortheastRegional) => groups.regional.push(train),
            None => {}
        }
    }
    // Upstream map order is arbitrary; sort so a run's output is deterministic.
    groups.acela.sort_by_key(|train| train.train_num);
    groups.regional.sort_by_key(|train| train.train_num);
    groups
}
