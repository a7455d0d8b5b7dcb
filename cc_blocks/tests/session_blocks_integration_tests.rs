//! End-to-end tests: protocol files through sessions, queries and session files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cc_blocks::collections::GroupedSessionBlocks;
use cc_blocks::config::DatasetConfig;
use cc_blocks::core::BlockSelector;
use cc_blocks::io::{load_any, load_grouped, load_session, save_grouped, save_session, StoredBlocks};
use cc_blocks::parsing::Protocol;
use tempfile::TempDir;

fn protocol_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("protocols")
}

#[test]
fn test_ret_protocol_file() {
    let protocol = Protocol::from_file(&protocol_dir().join("astrocyte_ret.toml")).unwrap();
    let session = protocol.build_session().unwrap();

    assert_eq!(session.session_name(), "RET");
    assert_eq!(session.len(), 61);
    assert_eq!(session.end_time(), Some(1980.0));

    let starts = session.get_block_starts(&BlockSelector::by_name("CS")).unwrap();
    assert_eq!(starts.len(), 30);
    assert_eq!(starts[0], 180.0);
    assert_eq!(starts[29], 180.0 + 29.0 * 60.0);

    let series = session.get_block_time_series(20.0).unwrap();
    assert_eq!(series.height(), 1980 * 20);
}

#[test]
fn test_day3_protocol_file() {
    let protocol = Protocol::from_file(&protocol_dir().join("ofl_day3.toml")).unwrap();
    let session = protocol.build_session().unwrap();

    assert_eq!(session.len(), 91);
    assert_eq!(session.get_unique_block_types(), vec!["CS", "ITI", "US", "baseline"]);

    let us = session.get_block_starts(&BlockSelector::by_name("US")).unwrap();
    assert_eq!(us[0], 208.0);

    let binary = session
        .get_binary_block_time_series(1.0, &BlockSelector::by_group("stimulus"))
        .unwrap();
    let in_block = binary
        .column("in_block")
        .unwrap()
        .bool()
        .unwrap()
        .into_no_null_iter()
        .filter(|f| *f)
        .count();
    assert_eq!(in_block, 30 * 30);
}

#[test]
fn test_protocol_to_file_and_back() {
    let dir = TempDir::new().unwrap();
    let ret = Protocol::from_file(&protocol_dir().join("astrocyte_ret.toml"))
        .unwrap()
        .build_session()
        .unwrap();
    let day3 = Protocol::from_file(&protocol_dir().join("ofl_day3.toml"))
        .unwrap()
        .build_session()
        .unwrap();

    let session_path = dir.path().join("session_blocks.json");
    save_session(&day3, &session_path).unwrap();
    let restored = load_session(&session_path).unwrap();
    assert_eq!(restored, day3);

    let events = restored.block_sequence();
    assert!(Arc::ptr_eq(&events[1].block_type, &events[4].block_type));

    let grouped =
        GroupedSessionBlocks::from_members("mixed", [("ret", ret), ("day3", day3)]).unwrap();
    let grouped_path = dir.path().join("grouped_session_blocks.json");
    save_grouped(&grouped, &grouped_path).unwrap();
    assert_eq!(load_grouped(&grouped_path).unwrap(), grouped);

    match load_any(&grouped_path).unwrap() {
        StoredBlocks::Grouped(loaded) => assert_eq!(loaded.group_names(), vec!["ret", "day3"]),
        other => panic!("expected a grouped file, got {:?}", other.kind()),
    }

    let before = grouped.get_block_time_series(1.0).unwrap();
    let after = load_grouped(&grouped_path).unwrap().get_block_time_series(1.0).unwrap();
    assert!(before.equals_missing(&after));
}

#[test]
fn test_bundled_dataset_config() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("dataset.toml");
    let config = DatasetConfig::from_file(&config_path).unwrap();

    assert_eq!(config.sessions.len(), 2);
    for entry in &config.sessions {
        let protocol = Protocol::from_file(&config.protocol_path(entry)).unwrap();
        assert!(protocol.build_session().is_ok(), "{}", entry.session_name);
    }
    assert!(config.grouped_file().is_some());
}

mod properties {
    use cc_blocks::collections::SessionBlocks;
    use cc_blocks::core::{BlockSelector, BlockType};
    use cc_blocks::sequence::create_block_events;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn catalogue() -> Vec<Arc<BlockType>> {
        vec![
            BlockType::new("baseline", 12.5).shared(),
            BlockType::new("CS", 3.0).with_group("stimulus").shared(),
            BlockType::new("US", 0.7).with_group("stimulus").shared(),
            BlockType::new("ITI", 4.25).shared(),
        ]
    }

    fn protocol() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0usize..4, 1..40)
    }

    proptest! {
        #[test]
        fn starts_are_prefix_sums(indices in protocol(), start in -100.0f64..100.0) {
            let types = catalogue();
            let sequence: Vec<_> = indices.iter().map(|i| types[*i].clone()).collect();
            let events = create_block_events(&sequence, start);

            prop_assert_eq!(events.len(), sequence.len());
            prop_assert_eq!(events[0].start_time, start);
            for pair in events.windows(2) {
                prop_assert_eq!(pair[1].start_time, pair[0].start_time + pair[0].duration());
            }
        }

        #[test]
        fn row_count_is_sum_of_truncated_counts(indices in protocol(), rate in 0.0f64..50.0) {
            let types = catalogue();
            let sequence: Vec<_> = indices.iter().map(|i| types[*i].clone()).collect();
            let session = SessionBlocks::from_block_types("prop", &sequence, 0.0);

            let expected: usize = sequence
                .iter()
                .map(|t| (t.duration * rate).floor() as usize)
                .sum();
            let df = session.get_block_time_series(rate).unwrap();
            prop_assert_eq!(df.height(), expected);

            let time: Vec<i64> = df
                .column("time")
                .unwrap()
                .i64()
                .unwrap()
                .into_no_null_iter()
                .collect();
            prop_assert!(time.iter().enumerate().all(|(i, t)| *t == i as i64));
        }

        #[test]
        fn binary_mask_matches_labels(indices in protocol(), rate in 0.5f64..20.0) {
            let types = catalogue();
            let sequence: Vec<_> = indices.iter().map(|i| types[*i].clone()).collect();
            let session = SessionBlocks::from_block_types("prop", &sequence, 0.0);
            prop_assume!(session.block_groups().contains("stimulus"));

            let selector = BlockSelector::by_group("stimulus");
            let labels = session.get_block_time_series(rate).unwrap();
            let binary = session.get_binary_block_time_series(rate, &selector).unwrap();
            prop_assert_eq!(labels.height(), binary.height());

            let groups = labels.column("block_group").unwrap().str().unwrap();
            let flags = binary.column("in_block").unwrap().bool().unwrap();
            for (group, flag) in groups.into_iter().zip(flags.into_no_null_iter()) {
                prop_assert_eq!(group == Some("stimulus"), flag);
            }
        }
    }
}
