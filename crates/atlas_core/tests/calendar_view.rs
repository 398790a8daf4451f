use atlas_core::view::calendar::{
    assign_to_grid, block_events, events_on, month_grid, parse_events, shift_month, week_days,
};
use atlas_core::{AtlasDataBlock, BlockKind, DataItem, FieldSchema, FieldType, SelectOption};
use chrono::{Datelike, NaiveDate, Timelike, Weekday};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn events_block(items: Vec<DataItem>) -> AtlasDataBlock {
    let schema = vec![
        FieldSchema::new("title", FieldType::Text),
        FieldSchema::new("start", FieldType::Date),
        FieldSchema::new("end", FieldType::Date),
        FieldSchema::new("kind", FieldType::Select).with_options(vec![
            SelectOption::new("meeting").with_color("blue"),
            SelectOption::new("trip").with_color("teal"),
        ]),
    ];
    let mut block = AtlasDataBlock::new("events", BlockKind::CalendarSource, schema, items);
    block.date_field = Some("start".to_string());
    block.end_date_field = Some("end".to_string());
    block
}

#[test]
fn offsetless_timestamps_stay_on_local_wall_clock() {
    let block = events_block(vec![DataItem::new("e1")
        .with("title", "Standup")
        .with("start", "2025-06-15T09:00:00")]);

    let events = parse_events(&block, "start", None);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start.hour(), 9);
    assert_eq!(events[0].start.date(), date(2025, 6, 15));
    assert!(!events[0].all_day);
    assert_eq!(events[0].title, "Standup");
}

#[test]
fn events_sort_by_start_and_drop_unparseable_dates() {
    let block = events_block(vec![
        DataItem::new("late").with("start", "2025-06-20"),
        DataItem::new("bad").with("start", "someday"),
        DataItem::new("missing"),
        DataItem::new("early").with("start", "2025-06-01"),
        DataItem::new("tie").with("start", "2025-06-20"),
    ]);

    let ids: Vec<_> = block_events(&block).into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["early", "late", "tie"]);
}

#[test]
fn end_before_start_is_clamped_and_color_comes_from_options() {
    let block = events_block(vec![DataItem::new("e1")
        .with("start", "2025-06-10")
        .with("end", "2025-06-08")
        .with("kind", "meeting")]);

    let events = block_events(&block);
    assert_eq!(events[0].end, Some(events[0].start));
    assert_eq!(events[0].color.as_deref(), Some("blue"));
    assert!(events[0].all_day);

    let unknown_color = events_block(vec![DataItem::new("e2")
        .with("start", "2025-06-10")
        .with("kind", "trip")]);
    assert_eq!(block_events(&unknown_color)[0].color.as_deref(), Some("gray"));
}

#[test]
fn month_grids_are_complete_sunday_first_weeks() {
    for year in [2015, 2024, 2025, 2026] {
        for month in 1..=12 {
            let weeks = month_grid(year, month);
            assert!(
                (4..=6).contains(&weeks.len()),
                "{year}-{month} produced {} weeks",
                weeks.len()
            );
            assert_eq!(weeks[0].days[0].date.weekday(), Weekday::Sun);

            let days: Vec<_> = weeks.iter().flat_map(|week| week.days.iter()).collect();
            assert!(weeks.iter().all(|week| week.days.len() == 7));
            for pair in days.windows(2) {
                assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
            }

            let in_month = days.iter().filter(|day| day.in_month).count();
            let first = date(year, month, 1);
            let next = first
                .checked_add_months(chrono::Months::new(1))
                .expect("next month exists");
            let expected = (next - first).num_days() as usize;
            assert_eq!(in_month, expected, "{year}-{month} in-month day count");
        }
    }
}

#[test]
fn february_grids_match_their_calendars() {
    let leap = month_grid(2024, 2);
    assert_eq!(leap.len(), 5);
    assert_eq!(leap[0].days[0].date, date(2024, 1, 28));
    assert!(!leap[0].days[0].in_month);
    assert!(leap[4].days.iter().any(|day| day.date == date(2024, 2, 29)));

    let exact = month_grid(2015, 2);
    assert_eq!(exact.len(), 4);
    assert_eq!(exact[0].days[0].date, date(2015, 2, 1));
    assert!(exact.iter().all(|week| week.days.iter().all(|day| day.in_month)));

    assert!(month_grid(2025, 13).is_empty());
}

#[test]
fn multi_day_events_land_on_every_covered_day() {
    let block = events_block(vec![
        DataItem::new("trip")
            .with("start", "2025-06-27")
            .with("end", "2025-07-02"),
        DataItem::new("call").with("start", "2025-06-30T15:00"),
    ]);
    let events = block_events(&block);
    let weeks = assign_to_grid(&month_grid(2025, 6), &events);

    let trip_days: Vec<_> = weeks
        .iter()
        .flat_map(|week| week.days.iter())
        .filter(|day| day.events.iter().any(|event| event.id == "trip"))
        .map(|day| day.date)
        .collect();
    assert_eq!(
        trip_days,
        vec![
            date(2025, 6, 27),
            date(2025, 6, 28),
            date(2025, 6, 29),
            date(2025, 6, 30),
            date(2025, 7, 1),
            date(2025, 7, 2),
        ]
    );

    let june_30: Vec<_> = events_on(&events, date(2025, 6, 30))
        .into_iter()
        .map(|event| event.id)
        .collect();
    assert_eq!(june_30, vec!["trip", "call"]);
    assert!(events_on(&events, date(2025, 7, 3)).is_empty());
}

#[test]
fn week_days_span_sunday_to_saturday_at_midnight() {
    let days = week_days(date(2025, 6, 18));
    assert_eq!(days[0].date(), date(2025, 6, 15));
    assert_eq!(days[6].date(), date(2025, 6, 21));
    assert!(days.iter().all(|day| day.hour() == 0 && day.minute() == 0));

    let sunday = week_days(date(2025, 6, 15));
    assert_eq!(sunday[0].date(), date(2025, 6, 15));
}

#[test]
fn shift_month_crosses_year_boundaries() {
    assert_eq!(shift_month(2025, 1, -1), Some((2024, 12)));
    assert_eq!(shift_month(2025, 12, 1), Some((2026, 1)));
    assert_eq!(shift_month(2025, 6, 0), Some((2025, 6)));
    assert_eq!(shift_month(2025, 6, -18), Some((2023, 12)));
    assert_eq!(shift_month(2025, 13, 1), None);
}
