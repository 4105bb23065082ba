use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::StationSummary;
use crate::protocols::dnp3::DecodedFrame;
use crate::protocols::dnp3::application::Iin;

/// Link source and destination address.
pub(crate) type StationKey = (u16, u16);

#[derive(Debug, Default)]
pub(crate) struct StationStats {
    pub frames: u64,
    pub messages: u64,
    pub discarded_segments: u64,
    pub link_functions: BTreeMap<String, u64>,
    pub app_functions: BTreeMap<String, u64>,
    pub iin: Option<Iin>,
    pub classes: BTreeSet<u8>,
}

pub(crate) fn add_station_frame(
    stats: &mut HashMap<StationKey, StationStats>,
    frame: &DecodedFrame,
) {
    let entry = stats
        .entry((frame.link.source, frame.link.destination))
        .or_default();
    entry.frames += 1;
    *entry
        .link_functions
        .entry(frame.link.function.name().to_string())
        .or_default() += 1;
    if frame.discarded.is_some() {
        entry.discarded_segments += 1;
    }
    let Some(message) = &frame.message else {
        return;
    };
    entry.messages += 1;
    *entry
        .app_functions
        .entry(message.header.function.name.to_string())
        .or_default() += 1;
    if let Some(iin) = message.header.iin {
        entry.iin = Some(entry.iin.unwrap_or(Iin::empty()) | iin);
    }
    entry.classes.extend(message.requested_classes());
}

pub(crate) fn build_station_summaries(
    stats: HashMap<StationKey, StationStats>,
) -> Vec<StationSummary> {
    let mut stations: Vec<StationSummary> = stats
        .into_iter()
        .map(|((source, destination), stats)| StationSummary {
            link_source: source,
            link_destination: destination,
            frames: stats.frames,
            messages: stats.messages,
            discarded_segments: stats.discarded_segments,
            link_functions: stats.link_functions,
            app_functions: stats.app_functions,
            iin_flags: stats
                .iin
                .map(|iin| iin.names().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            requested_classes: stats.classes.into_iter().collect(),
        })
        .collect();
    stations.sort_by_key(|station| (station.link_source, station.link_destination));
    stations
}

#[cfg(test)]
mod tests {
    use super::{StationStats, build_station_summaries};
    use crate::protocols::dnp3::application::Iin;
    use std::collections::{BTreeSet, HashMap};

    #[test]
    fn summaries_are_sorted_by_addresses() {
        let mut stats = HashMap::new();
        stats.insert((10, 1), StationStats::default());
        stats.insert(
            (1, 10),
            StationStats {
                frames: 2,
                iin: Some(Iin::DEVICE_RESTART | Iin::NEED_TIME),
                classes: BTreeSet::from([1, 0]),
                ..StationStats::default()
            },
        );

        let stations = build_station_summaries(stats);
        assert_eq!(stations[0].link_source, 1);
        assert_eq!(stations[0].frames, 2);
        assert_eq!(
            stations[0].iin_flags,
            vec!["Time Sync Required from Master", "Device Restart"]
        );
        assert_eq!(stations[0].requested_classes, vec![0, 1]);
        assert!(stations[1].iin_flags.is_empty());
    }
}
