use crate::domain::{Item, ItemId, LaneOverrides};

/// Items sharing one horizontal row, ordered by start date.
pub type Lane = Vec<Item>;

/// Partitions `items` into rows so that no two items in a row overlap.
///
/// Items are taken in start order (stable). Items carrying an override are placed first, directly
/// into their chosen lane and without an overlap check; the remaining items go into the first lane
/// whose last item ends strictly before they start, or into a new lane. Without overrides this is
/// the greedy interval-partitioning schedule and uses the minimum number of lanes.
pub fn assign_lanes(items: &[Item], overrides: &LaneOverrides) -> Vec<Lane> {
    let mut sorted = items.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|item| item.start);

    let mut lanes: Vec<Lane> = Vec::new();
    let mut remaining = Vec::with_capacity(sorted.len());

    for item in sorted {
        match overrides.get(&item.id) {
            Some(&lane) => {
                if lanes.len() <= lane {
                    lanes.resize_with(lane + 1, Vec::new);
                }
                lanes[lane].push(item.clone());
            }
            None => remaining.push(item),
        }
    }

    for item in remaining {
        let free_lane = lanes.iter_mut().find(|lane| match lane.last() {
            Some(last) => last.end < item.start,
            None => true,
        });

        match free_lane {
            Some(lane) => lane.push(item.clone()),
            None => lanes.push(vec![item.clone()]),
        }
    }

    lanes
}

pub fn lane_of(lanes: &[Lane], id: ItemId) -> Option<usize> {
    lanes
        .iter()
        .position(|lane| lane.iter().any(|item| item.id == id))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    use crate::domain::{Item, LaneOverrides};
    use crate::geometry::parse_day;

    use super::{Lane, assign_lanes, lane_of};

    fn day(raw: &str) -> NaiveDate {
        parse_day(raw).expect("valid test date")
    }

    fn ids(lane: &Lane) -> Vec<i64> {
        lane.iter().map(|item| item.id).collect()
    }

    fn peak_overlap(items: &[Item]) -> usize {
        let mut peak = 0;
        for probe in items {
            let active = items
                .iter()
                .filter(|item| item.start <= probe.start && probe.start <= item.end)
                .count();
            peak = peak.max(active);
        }
        peak
    }

    #[test]
    fn overlapping_items_get_separate_lanes() {
        let items = vec![
            Item::new(1, "Research", day("2024-01-01"), day("2024-01-05")),
            Item::new(2, "Prototype", day("2024-01-03"), day("2024-01-06")),
        ];

        let lanes = assign_lanes(&items, &LaneOverrides::new());
        assert_eq!(lanes.len(), 2);
        assert_eq!(ids(&lanes[0]), vec![1]);
        assert_eq!(ids(&lanes[1]), vec![2]);
    }

    #[test]
    fn disjoint_items_share_a_lane_in_start_order() {
        let items = vec![
            Item::new(2, "Review", day("2024-01-03"), day("2024-01-04")),
            Item::new(1, "Draft", day("2024-01-01"), day("2024-01-02")),
        ];

        let lanes = assign_lanes(&items, &LaneOverrides::new());
        assert_eq!(lanes.len(), 1);
        assert_eq!(ids(&lanes[0]), vec![1, 2]);
    }

    #[test]
    fn touching_days_count_as_overlap() {
        let items = vec![
            Item::new(1, "Draft", day("2024-01-01"), day("2024-01-03")),
            Item::new(2, "Review", day("2024-01-03"), day("2024-01-04")),
        ];

        let lanes = assign_lanes(&items, &LaneOverrides::new());
        assert_eq!(lanes.len(), 2);
    }

    #[test]
    fn equal_starts_keep_input_order() {
        let items = vec![
            Item::new(7, "B", day("2024-01-01"), day("2024-01-02")),
            Item::new(3, "A", day("2024-01-01"), day("2024-01-02")),
        ];

        let lanes = assign_lanes(&items, &LaneOverrides::new());
        assert_eq!(ids(&lanes[0]), vec![7]);
        assert_eq!(ids(&lanes[1]), vec![3]);
    }

    #[test]
    fn override_wins_over_a_free_lower_lane() {
        let items = vec![
            Item::new(1, "Pinned", day("2024-01-01"), day("2024-01-02")),
            Item::new(2, "Free", day("2024-03-01"), day("2024-03-02")),
        ];
        let overrides = LaneOverrides::from([(1, 2)]);

        let lanes = assign_lanes(&items, &overrides);
        assert_eq!(lanes.len(), 3);
        assert_eq!(ids(&lanes[2]), vec![1]);
        assert_eq!(ids(&lanes[0]), vec![2]);
        assert!(lanes[1].is_empty());
        assert_eq!(lane_of(&lanes, 1), Some(2));
        assert_eq!(lane_of(&lanes, 9), None);
    }

    #[test]
    fn overridden_items_may_overlap_in_their_lane() {
        let items = vec![
            Item::new(1, "Free", day("2024-01-01"), day("2024-01-10")),
            Item::new(2, "Pinned", day("2024-01-05"), day("2024-01-06")),
        ];
        let overrides = LaneOverrides::from([(2, 0)]);

        let lanes = assign_lanes(&items, &overrides);
        assert_eq!(ids(&lanes[0]), vec![2]);
        assert_eq!(ids(&lanes[1]), vec![1]);

        let stacked = LaneOverrides::from([(1, 0), (2, 0)]);
        let lanes = assign_lanes(&items, &stacked);
        assert_eq!(lanes.len(), 1);
        assert_eq!(ids(&lanes[0]), vec![1, 2]);
    }

    #[test]
    fn empty_input_has_no_lanes() {
        assert!(assign_lanes(&[], &LaneOverrides::new()).is_empty());
    }

    fn arb_items() -> impl Strategy<Value = Vec<Item>> {
        prop::collection::vec((0i64..120, 0i64..15), 0..24).prop_map(|spans| {
            let base = day("2024-01-01");
            spans
                .into_iter()
                .enumerate()
                .map(|(index, (offset, length))| {
                    let start = base + Duration::days(offset);
                    Item::new(index as i64, format!("item {index}"), start, start + Duration::days(length))
                })
                .collect()
        })
    }

    fn arb_overrides(count: usize) -> impl Strategy<Value = LaneOverrides> {
        prop::collection::btree_map(0i64..count.max(1) as i64, 0usize..4, 0..=count.min(4))
    }

    proptest! {
        #[test]
        fn lanes_partition_without_overlap(items in arb_items()) {
            let lanes = assign_lanes(&items, &LaneOverrides::new());

            let placed: usize = lanes.iter().map(Vec::len).sum();
            prop_assert_eq!(placed, items.len());
            for item in &items {
                prop_assert!(lane_of(&lanes, item.id).is_some());
            }
            for lane in &lanes {
                for pair in lane.windows(2) {
                    prop_assert!(pair[0].end < pair[1].start);
                }
            }
        }

        #[test]
        fn lane_count_matches_peak_overlap(items in arb_items()) {
            let lanes = assign_lanes(&items, &LaneOverrides::new());
            prop_assert_eq!(lanes.len(), peak_overlap(&items));
        }

        #[test]
        fn assignment_is_repeatable_and_respects_overrides(
            (items, overrides) in arb_items().prop_flat_map(|items| {
                let count = items.len();
                (Just(items), arb_overrides(count))
            })
        ) {
            let first = assign_lanes(&items, &overrides);
            let second = assign_lanes(&items, &overrides);
            prop_assert_eq!(&first, &second);

            for (id, lane) in &overrides {
                if items.iter().any(|item| item.id == *id) {
                    prop_assert_eq!(lane_of(&first, *id), Some(*lane));
                }
            }
            for lane in &first {
                for pair in lane.windows(2) {
                    let pinned = overrides.contains_key(&pair[0].id) || overrides.contains_key(&pair[1].id);
                    prop_assert!(pinned || pair[0].end < pair[1].start);
                }
            }
        }
    }
}
