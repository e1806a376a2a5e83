use anyhow::Result;
use indicatif::ProgressIterator;
use serde::{Deserialize, Serialize};
use std::io::BufWriter;

use super::config::Config;
use super::records::RouteGroups;
use super::schedule::{NormalizedStop, TrainSchedule};
use super::timeline::TimelineWindow;
use super::utils::progress_bar_for_count;

/// Cyclic palette keeping per-train schedule filenames visually
/// distinguishable. A labeling convenience, not a domain concept.
pub const TRAIN_COLORS: [&str; 42] = [
    "red", "blue", "green", "cyan", "magenta", "orange", "purple", "brown", "black", "darkred",
    "darkblue", "darkgreen", "darkorange", "darkviolet", "darkgrey", "steelblue", "gold", "orchid",
    "turquoise", "chocolate", "tomato", "maroon", "navy", "coral", "firebrick", "seagreen",
    "mediumblue", "dodgerblue", "royalblue", "springgreen", "forestgreen", "goldenrod", "hotpink",
    "deeppink", "mediumvioletred", "midnightblue", "indigo", "violet", "slateblue", "chartreuse",
    "darkslategrey", "indianred",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Preset position carried by the three aggregate manifest entries.
const AGGREGATE_ANIMATION_START: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Direction {
    North,
    South,
}

impl Direction {
    /// Even train numbers run north on the corridor, odd numbers south.
    pub fn of_train(train_num: u32) -> Direction {
        if train_num % 2 == 0 {
            Direction::North
        } else {
            Direction::South
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
        }
    }
}

/// One row of an emitted schedule table.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct ScheduleRow {
    #[serde(rename = "Abbreviation")]
    pub abbreviation: String,
    #[serde(rename = "Scheduled Arrival Time")]
    pub scheduled_arrival: String,
    #[serde(rename = "Scheduled Departure Time")]
    pub scheduled_departure: String,
    #[serde(rename = "Actual Arrival Time")]
    pub actual_arrival: String,
    #[serde(rename = "Actual Departure Time")]
    pub actual_departure: String,
}

impl ScheduleRow {
    pub fn from_stop(stop: &NormalizedStop) -> ScheduleRow {
        ScheduleRow {
            abbreviation: stop.code.0.clone(),
            scheduled_arrival: stop.scheduled_arrival.format(TIMESTAMP_FORMAT).to_string(),
            scheduled_departure: stop
                .scheduled_departure
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            actual_arrival: stop.actual_arrival.format(TIMESTAMP_FORMAT).to_string(),
            actual_departure: stop.actual_departure.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Writes one train's schedule table, overwriting any previous file at the
/// same path. Returns the path written.
pub fn write_schedule(
    schedule_dir: &str,
    train_num: u32,
    color: &str,
    schedule: &TrainSchedule,
) -> Result<String> {
    let dir = format!(
        "{}/{}",
        schedule_dir,
        Direction::of_train(train_num).path_segment()
    );
    fs_err::create_dir_all(&dir)?;
    let path = format!("{dir}/{train_num}_{color}.csv");

    let mut writer = csv::Writer::from_writer(BufWriter::new(fs_err::File::create(&path)?));
    for stop in &schedule.stops {
        writer.serialize(ScheduleRow::from_stop(stop))?;
    }
    writer.flush()?;
    Ok(path)
}

/// One entry of the manifest consumed by the animation frontend. The image
/// paths are composed here but the plots themselves are produced elsewhere.
#[derive(Debug, Serialize)]
pub struct AnimationEntry {
    pub id: String,
    pub foreground_img: String,
    pub background_img: String,
    pub animation_start: f64,
}

impl AnimationEntry {
    fn new(id: String, plot_stem: &str, img_id: &str, animation_start: f64) -> AnimationEntry {
        AnimationEntry {
            id,
            foreground_img: format!("plots/{plot_stem}_plot_{img_id}.png"),
            background_img: format!("plots/{plot_stem}_bg_plot_{img_id}.png"),
            animation_start,
        }
    }
}

/// The three fixed aggregate entries leading every manifest.
pub fn aggregate_entries(img_id: &str) -> Vec<AnimationEntry> {
    vec![
        AnimationEntry::new(
            "All Trains".to_string(),
            "main",
            img_id,
            AGGREGATE_ANIMATION_START,
        ),
        AnimationEntry::new(
            "Northbound".to_string(),
            "north",
            img_id,
            AGGREGATE_ANIMATION_START,
        ),
        AnimationEntry::new(
            "Southbound".to_string(),
            "south",
            img_id,
            AGGREGATE_ANIMATION_START,
        ),
    ]
}

/// Runs the per-train half of the pipeline: normalization, schedule tables
/// and manifest entries. The palette index is threaded through the loop and
/// advances once per qualifying train.
pub fn process_trains(
    groups: &RouteGroups,
    config: &Config,
    img_id: &str,
) -> Result<Vec<AnimationEntry>> {
    let mut entries = aggregate_entries(img_id);
    let mut color_idx: usize = 0;

    let progress = progress_bar_for_count(groups.train_count());
    for train in groups.in_processing_order().progress_with(progress) {
        let Some(schedule) = TrainSchedule::build(train) else {
            continue;
        };

        let color = TRAIN_COLORS[color_idx % TRAIN_COLORS.len()];
        color_idx += 1;
        write_schedule(&config.schedule_dir, train.train_num, color, &schedule)?;

        let window = TimelineWindow::from_schedule(&schedule);
        let animation_start = window.animation_start(schedule.first_stop().actual_arrival);
        entries.push(AnimationEntry::new(
            train.train_num.to_string(),
            &train.train_num.to_string(),
            img_id,
            animation_start,
        ));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RawStop, StationCode, TrainRecord};

    #[test]
    fn test_palette_length() {
        assert_eq!(TRAIN_COLORS.len(), 42);
    }

    #[test]
    fn test_direction_from_train_number() {
        assert_eq!(Direction::of_train(100), Direction::North);
        assert_eq!(Direction::of_train(101), Direction::South);
        assert_eq!(Direction::of_train(100).path_segment(), "north");
        assert_eq!(Direction::of_train(101).path_segment(), "south");
    }

    #[test]
    fn test_aggregate_entry_paths() {
        let entries = aggregate_entries("run7");
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["All Trains", "Northbound", "Southbound"]);
        assert_eq!(entries[0].foreground_img, "plots/main_plot_run7.png");
        assert_eq!(entries[0].background_img, "plots/main_bg_plot_run7.png");
        assert_eq!(entries[1].foreground_img, "plots/north_plot_run7.png");
        assert_eq!(entries[2].background_img, "plots/south_bg_plot_run7.png");
        assert!(entries.iter().all(|e| e.animation_start == 100.0));
    }

    fn raw_stop(code: &str, sch_arr: &str, sch_dep: &str, arr: &str, dep: &str) -> RawStop {
        RawStop {
            code: StationCode(code.to_string()),
            sch_arr: Some(sch_arr.to_string()),
            sch_dep: Some(sch_dep.to_string()),
            arr: Some(arr.to_string()),
            dep: Some(dep.to_string()),
        }
    }

    fn corridor_train(train_num: u32, route_name: &str) -> TrainRecord {
        TrainRecord {
            train_num,
            route_name: route_name.to_string(),
            stations: vec![
                raw_stop(
                    "WAS",
                    "2024-01-01T05:00:00-05:00",
                    "2024-01-01T05:05:00-05:00",
                    "2024-01-01T05:00:00-05:00",
                    "2024-01-01T05:05:00-05:00",
                ),
                raw_stop(
                    "PHL",
                    "2024-01-01T06:30:00-05:00",
                    "2024-01-01T06:32:00-05:00",
                    "2024-01-01T06:31:00-05:00",
                    "2024-01-01T06:33:00-05:00",
                ),
                raw_stop(
                    "NYP",
                    "2024-01-01T08:00:00-05:00",
                    "2024-01-01T08:05:00-05:00",
                    "2024-01-01T08:02:00-05:00",
                    "2024-01-01T08:05:00-05:00",
                ),
            ],
        }
    }

    /// A train whose corridor stops are too sparse to qualify.
    fn sparse_train(train_num: u32, route_name: &str) -> TrainRecord {
        let mut train = corridor_train(train_num, route_name);
        train.stations.truncate(2);
        train
    }

    #[test]
    fn test_schedule_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let schedule_dir = dir.path().to_str().unwrap();

        let train = corridor_train(2150, "Acela");
        let schedule = TrainSchedule::build(&train).unwrap();
        let path = write_schedule(schedule_dir, 2150, "red", &schedule).unwrap();
        assert_eq!(path, format!("{schedule_dir}/north/2150_red.csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(vec![
                "Abbreviation",
                "Scheduled Arrival Time",
                "Scheduled Departure Time",
                "Actual Arrival Time",
                "Actual Departure Time",
            ])
        );
        let rows: Vec<ScheduleRow> = reader.deserialize().map(|row| row.unwrap()).collect();
        let expected: Vec<ScheduleRow> = schedule.stops.iter().map(ScheduleRow::from_stop).collect();
        assert_eq!(rows, expected);
        assert_eq!(rows[0].scheduled_arrival, "2024-01-01 05:00:00");
    }

    #[test]
    fn test_process_trains_manifest_shape_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_url: String::new(),
            schedule_dir: dir.path().to_str().unwrap().to_string(),
            manifest_path: String::new(),
        };

        let groups = RouteGroups {
            acela: vec![sparse_train(2153, "Acela"), corridor_train(2150, "Acela")],
            regional: vec![corridor_train(171, "Northeast Regional")],
        };

        let entries = process_trains(&groups, &config, "run7").unwrap();

        // Three aggregates plus one entry per qualifying train.
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[3].id, "2150");
        assert_eq!(entries[3].foreground_img, "plots/2150_plot_run7.png");
        assert_eq!(entries[4].id, "171");

        // The sparse train consumed no color and produced no file; the two
        // qualifying trains took the first two palette entries.
        assert!(dir.path().join("north/2150_red.csv").exists());
        assert!(dir.path().join("south/171_blue.csv").exists());
        assert!(!dir.path().join("south/2153_red.csv").exists());
        assert!(!dir.path().join("south/2153_blue.csv").exists());
    }

    #[test]
    fn test_palette_wraps_after_42_trains() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_url: String::new(),
            schedule_dir: dir.path().to_str().unwrap().to_string(),
            manifest_path: String::new(),
        };
        let groups = RouteGroups {
            acela: (1..=43).map(|i| corridor_train(2 * i, "Acela")).collect(),
            regional: Vec::new(),
        };

        let entries = process_trains(&groups, &config, "run7").unwrap();
        assert_eq!(entries.len(), 3 + 43);

        // The 1st and 43rd qualifying trains share the first palette color;
        // the 42nd takes the last.
        assert!(dir.path().join("north/2_red.csv").exists());
        assert!(dir.path().join("north/84_indianred.csv").exists());
        assert!(dir.path().join("north/86_red.csv").exists());
    }

    #[test]
    fn test_process_trains_computed_position() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_url: String::new(),
            schedule_dir: dir.path().to_str().unwrap().to_string(),
            manifest_path: String::new(),
        };
        let groups = RouteGroups {
            acela: vec![corridor_train(2150, "Acela")],
            regional: Vec::new(),
        };

        let entries = process_trains(&groups, &config, "run7").unwrap();
        // Window is 05:00 to 08:05 (185 minutes); the first actual arrival
        // sits at its very start.
        assert_eq!(entries[3].animation_start, 100.0);
    }
}
