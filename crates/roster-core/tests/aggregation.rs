use roster_core::import::RosterImporter;
use roster_core::roster::aggregation::{percentage_metrics, top_deficits, GroupKey, Grouping};
use roster_core::roster::StaffingRecord;

fn example_records() -> Vec<StaffingRecord> {
    vec![
        StaffingRecord::new("A", 10, 8),
        StaffingRecord::new("A", 5, 5),
        StaffingRecord::new("B", 3, 6),
    ]
}

fn fixture_records() -> Vec<StaffingRecord> {
    let data = include_bytes!("data/staffing.csv");
    RosterImporter::staffing_from_reader(&data[..]).expect("staffing fixture imports")
}

#[test]
fn worked_example_groups_and_ranks_deficits() {
    let summary = Grouping::Unit.apply(&example_records());

    let a = summary.get(&GroupKey::Unit("A".into())).expect("row A");
    assert_eq!((a.planned(), a.actual(), a.difference()), (15, 13, -2));
    let b = summary.get(&GroupKey::Unit("B".into())).expect("row B");
    assert_eq!((b.planned(), b.actual(), b.difference()), (3, 6, 3));

    let rows = summary.into_rows();
    let deficits = top_deficits(&rows, 5);
    assert_eq!(deficits.len(), 1);
    assert_eq!(deficits[0].key(), &GroupKey::Unit("A".into()));
    assert_eq!(deficits[0].difference(), -2);
}

#[test]
fn decimal_formatted_headcounts_keep_their_value() {
    let csv = "OM,POSTO,ESP,TMFT,EXI\nA,SO,TIC,10.0,8.0\nA,SO,TIC,1.200,1.199\n";
    let records = RosterImporter::staffing_from_reader(csv.as_bytes()).expect("imports");

    let summary = Grouping::Unit.apply(&records);
    let a = summary.get(&GroupKey::Unit("A".into())).expect("row A");
    assert_eq!((a.planned(), a.actual(), a.difference()), (1210, 1207, -3));
}

#[test]
fn grouping_never_drops_or_double_counts() {
    let records = fixture_records();
    let actual: u64 = records.iter().map(|record| u64::from(record.actual)).sum();
    let planned: u64 = records.iter().map(|record| u64::from(record.planned)).sum();

    for grouping in Grouping::ordered() {
        let totals = grouping.apply(&records).totals();
        assert_eq!(totals.actual, actual, "{} lost actual counts", grouping.label());
        assert_eq!(totals.planned, planned, "{} lost planned counts", grouping.label());
    }
}

#[test]
fn every_row_difference_is_actual_minus_planned() {
    let records = fixture_records();
    for grouping in Grouping::ordered() {
        for row in grouping.apply(&records).rows() {
            assert_eq!(row.difference(), row.actual() as i64 - row.planned() as i64);
        }
    }
}

#[test]
fn top_deficits_are_ascending_and_bounded() {
    let rows = Grouping::Unit.apply(&fixture_records()).into_rows();
    let negative = rows.iter().filter(|row| row.difference() < 0).count();

    for n in 0..5 {
        let deficits = top_deficits(&rows, n);
        assert_eq!(deficits.len(), n.min(negative));
        assert!(deficits
            .windows(2)
            .all(|pair| pair[0].difference() <= pair[1].difference()));
    }

    let labels: Vec<_> = top_deficits(&rows, 5)
        .iter()
        .map(|row| row.key().label())
        .collect();
    assert_eq!(labels, vec!["GAP-RJ", "BAAN"]);
}

#[test]
fn month_grouping_buckets_projected_movements() {
    let summary = Grouping::Month.apply(&fixture_records());
    let rows: Vec<_> = summary
        .rows()
        .map(|row| (row.key().label(), row.planned(), row.actual()))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("Unscheduled".to_string(), 13, 9),
            ("2025-03".to_string(), 10, 8),
            ("2025-04".to_string(), 7, 7),
        ]
    );
}

#[test]
fn percentage_metrics_average_per_rank_and_round_for_display() {
    let metrics = percentage_metrics(&fixture_records());
    let views: Vec<_> = metrics.iter().map(|entry| entry.to_view()).collect();

    let rank = |code: &str| {
        views
            .iter()
            .find(|view| view.rank == code)
            .unwrap_or_else(|| panic!("metrics for {code}"))
    };

    assert_eq!(rank("SO").fill_rate_pct, Some(80));
    assert_eq!(rank("SO").qualification_pct, Some(80));
    assert_eq!(rank("1S").fill_rate_pct, Some(83));
    assert_eq!(rank("1S").qualification_pct, Some(83));
    assert_eq!(rank("2S").qualification_pct, None);
    assert_eq!(rank("3S").fill_rate_pct, None);

    let so = metrics
        .iter()
        .find(|entry| entry.rank().map(|code| code.as_str()) == Some("SO"))
        .expect("SO metrics");
    assert_eq!(so.qualification_mean(), Some(80.25));
}

#[test]
fn empty_collections_aggregate_to_nothing() {
    assert!(Grouping::Unit.apply(&[]).is_empty());
    assert!(top_deficits(&[], 3).is_empty());
    assert!(percentage_metrics(&[]).is_empty());
}
