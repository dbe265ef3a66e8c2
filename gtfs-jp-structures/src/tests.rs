use crate::archive::Fetcher;
use crate::error::{Diagnostic, Issue};
use crate::objects::*;
use crate::schema::TableName;
use crate::{read_feed, Error, Feed, FeedReader, LoadedFeed, RawFeed};
use chrono::NaiveDate;
use rstest::rstest;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn read(location: &str) -> LoadedFeed {
    FeedReader::default()
        .distance_units(DistanceUnits::Kilometers)
        .read(location)
        .expect("impossible to read feed")
}

fn read_path(path: &Path) -> LoadedFeed {
    read(path.to_str().unwrap())
}

/// A writable copy of the basic fixture
fn basic_copy() -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    for entry in std::fs::read_dir("fixtures/basic").unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), tmp.path().join(entry.file_name())).unwrap();
    }
    tmp
}

#[test]
fn read_basic() {
    let loaded = read("fixtures/basic");
    assert_eq!(Vec::<Diagnostic>::new(), loaded.diagnostics);
    assert_eq!(TableName::ALL.to_vec(), loaded.feed.present_tables());
    assert_eq!(None, loaded.sha256);
    assert!(loaded.files.contains(&"readme.txt".to_owned()));

    let counts: Vec<_> = TableName::ALL
        .iter()
        .map(|t| loaded.feed.row_count(*t).unwrap())
        .collect();
    assert_eq!(vec![1, 1, 5, 2, 3, 1, 1, 7, 2, 2, 2, 2, 3, 1, 1, 1, 3], counts);
}

#[rstest]
#[case(TableName::Agency)]
#[case(TableName::Stops)]
#[case(TableName::StopTimes)]
#[case(TableName::Translations)]
fn raw_tables_are_parsed(#[case] table: TableName) {
    let raw = RawFeed::new("fixtures/basic").unwrap();
    assert!(matches!(raw.table(table), Some(Ok(t)) if !t.is_empty()));
}

#[test]
fn skip_stop_times() {
    let loaded = FeedReader::default()
        .distance_units(DistanceUnits::Kilometers)
        .read_stop_times(false)
        .read("fixtures/basic")
        .unwrap();
    assert!(loaded.feed.stop_times.is_none());
    assert_eq!(Some(3), loaded.feed.row_count(TableName::Trips));
}

#[test]
fn read_calendar() {
    let loaded = read("fixtures/basic");
    let calendar = loaded
        .relations
        .get_calendar(&loaded.feed, "service1")
        .unwrap();
    assert_eq!(1, calendar.monday);
    assert_eq!(0, calendar.saturday);
    assert_eq!(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), calendar.start_date);
    let weekend = loaded
        .relations
        .get_calendar(&loaded.feed, "service2")
        .unwrap();
    assert!(weekend.valid_weekday(NaiveDate::from_ymd_opt(2024, 4, 6).unwrap()));
}

#[test]
fn read_calendar_dates() {
    let loaded = read("fixtures/basic");
    let dates = loaded
        .relations
        .get_calendar_dates(&loaded.feed, "service1");
    assert_eq!(1, dates.len());
    assert_eq!(Exception::Deleted, dates[0].exception());
}

#[test]
fn read_defaults() {
    let loaded = read("fixtures/basic");
    let fare = loaded
        .relations
        .get_fare_attributes(&loaded.feed, "fare2")
        .unwrap();
    assert_eq!("JPY", fare.currency);
    assert_eq!(None, fare.transfers);
    assert_eq!(Some(3600), fare.transfer_duration);
    let route = loaded.relations.get_route(&loaded.feed, "route2").unwrap();
    assert_eq!(RouteType::Bus, route.route_type());
    assert_eq!("深夜急行", format!("{}", route));
}

#[test]
fn read_stop() {
    let loaded = read("fixtures/basic");
    let feed = &loaded.feed;
    let relations = &loaded.relations;
    let station = relations.get_stop(feed, "station1").unwrap();
    assert_eq!(LocationType::StopArea, station.location_type());
    let stop = relations.get_stop(feed, "stop1").unwrap();
    assert_eq!(LocationType::StopPoint, stop.location_type());
    assert_eq!("0101", stop.code.as_deref().unwrap());
    assert_eq!(35.659171, stop.latitude);
    assert_eq!(None, relations.get_stop(feed, "stop4").unwrap().location_type_code);

    assert_eq!("station1", relations.parent_of(feed, stop).unwrap().id);
    let children: Vec<_> = relations
        .children_of(feed, "station1")
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(vec!["stop1"], children);
    assert_eq!(1, relations.transfers_from(feed, "stop1").len());
}

#[test]
fn read_stop_times() {
    let loaded = read("fixtures/basic");
    let stop_times = loaded.relations.stop_times_of_trip(&loaded.feed, "trip2");
    let stops: Vec<_> = stop_times.iter().map(|st| st.stop_id.as_str()).collect();
    assert_eq!(vec!["stop3", "stop2", "stop1"], stops);
    assert_eq!(None, stop_times[1].arrival_time);
    assert_eq!(Some(8 * 3600), stop_times[0].departure_time);

    let late = loaded.relations.stop_times_of_trip(&loaded.feed, "trip3");
    assert_eq!(Some(25 * 3600 + 10 * 60), late[0].arrival_time);
}

#[test]
fn read_shapes() {
    let loaded = read("fixtures/basic");
    let sequences: Vec<_> = loaded
        .relations
        .get_shape(&loaded.feed, "shape1")
        .iter()
        .map(|s| s.sequence)
        .collect();
    assert_eq!(vec![1, 2, 3], sequences);
}

#[test]
fn read_trips_and_routes() {
    let loaded = read("fixtures/basic");
    let feed = &loaded.feed;
    let relations = &loaded.relations;
    assert_eq!(2, relations.trips_of_route(feed, "route1").len());
    assert_eq!(2, relations.routes_of_agency(feed, "agency1").len());
    assert_eq!(1, relations.trips_of_service(feed, "service2").len());
    let trip = relations.get_trip(feed, "trip1").unwrap();
    assert_eq!(
        "渋谷営業所",
        relations
            .get_office(feed, trip.office_id.as_deref().unwrap())
            .unwrap()
            .name
    );
    assert_eq!(
        Some("六本木".to_owned()),
        relations.get_pattern(feed, "pattern1").unwrap().via_stop
    );
    assert_eq!(1, relations.frequencies_of_trip(feed, "trip3").len());
    assert_eq!(1, relations.fare_rules_of(feed, "fare2").len());
    assert_eq!("都営バス", relations.get_agency(feed, "agency1").unwrap().name);
}

#[test]
fn round_trip_directory() {
    let loaded = read("fixtures/basic");
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("export");
    loaded.feed.write_to(&dest, None).unwrap();

    assert!(!dest.join("readme.txt").exists());
    let header = std::fs::read_to_string(dest.join("stops.txt")).unwrap();
    assert!(header.starts_with(
        "stop_id,stop_code,stop_name,stop_desc,stop_lat,stop_lon,zone_id,stop_url,location_type,parent_station,stop_timezone,wheelchair_boarding\n"
    ));

    let reread = read_path(&dest);
    assert_eq!(Vec::<Diagnostic>::new(), reread.diagnostics);
    assert_eq!(loaded.feed, reread.feed);
}

#[test]
fn round_trip_archive() {
    let loaded = read("fixtures/basic");
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("nested").join("feed.zip");
    loaded.feed.write_to(&dest, Some(6)).unwrap();
    assert!(dest.is_file());

    let reread = read_path(&dest);
    assert!(reread.sha256.is_some());
    assert_eq!(17, reread.files.len());
    assert_eq!(loaded.feed, reread.feed);
}

#[test]
fn copy_is_independent() {
    let loaded = read("fixtures/basic");
    let original = loaded.feed;
    let mut copy = original.clone();
    assert_eq!(original, copy);

    copy.stops.as_mut().unwrap()[0].name = "渋谷".to_owned();
    copy.transfers = None;
    assert_ne!(original, copy);
    assert_eq!("渋谷駅", original.stops.as_ref().unwrap()[0].name);
    assert!(original.is_present(TableName::Transfers));

    let mut original = original;
    let copy = original.clone();
    original.routes.as_mut().unwrap()[0].long_name = Some("渋谷線".to_owned());
    original.agency_jp = None;
    assert_ne!(original, copy);
    assert_ne!(Some("渋谷線"), copy.routes.as_ref().unwrap()[0].long_name.as_deref());
    assert!(copy.is_present(TableName::AgencyJp));
}

#[test]
fn equality_ignores_row_order() {
    let feed = read("fixtures/basic").feed;
    let mut shuffled = feed.clone();
    shuffled.stop_times.as_mut().unwrap().reverse();
    shuffled.stops.as_mut().unwrap().swap(0, 3);
    assert_eq!(feed, shuffled);

    let mut changed = feed.clone();
    changed.stop_times.as_mut().unwrap()[0].stop_sequence = 42;
    assert_ne!(feed, changed);

    let mut present = feed.clone();
    present.translations = None;
    let mut empty = feed.clone();
    empty.translations = Some(vec![]);
    assert_ne!(present, empty);
}

#[test]
fn equality_depends_on_units() {
    let km = read("fixtures/basic").feed;
    let m = Feed::read("fixtures/basic", DistanceUnits::Meters).unwrap();
    assert_ne!(km, m);
    assert_eq!(DistanceUnits::Meters, m.distance_units());
}

#[test]
fn invalid_units() {
    assert!(matches!(
        read_feed("fixtures/basic", "yards"),
        Err(Error::InvalidConfiguration(_))
    ));
    assert_eq!(Some(5), read_feed("fixtures/basic", "mi").unwrap().feed.row_count(TableName::Stops));
}

#[test]
fn missing_location() {
    assert!(matches!(
        FeedReader::default()
            .distance_units(DistanceUnits::Meters)
            .read("fixtures/nothing_here"),
        Err(Error::PathNotFound(_))
    ));
}

#[test]
fn distance_units_are_required() {
    assert!(matches!(
        FeedReader::default().read("fixtures/basic"),
        Err(Error::InvalidConfiguration(_))
    ));
    // the raw tables carry no distances
    assert!(FeedReader::default().raw().read("fixtures/basic").is_ok());
}

#[test]
fn trip_with_unknown_route() {
    let tmp = basic_copy();
    let mut trips = std::fs::OpenOptions::new()
        .append(true)
        .open(tmp.path().join("trips.txt"))
        .unwrap();
    writeln!(trips, "route9,service1,trip9,,,0,,,,,,,,").unwrap();

    let loaded = read_path(tmp.path());
    assert_eq!(Some(3), loaded.feed.row_count(TableName::Trips));
    assert_eq!(
        vec![Diagnostic::row(
            TableName::Trips,
            3,
            Some("route_id"),
            Issue::UnresolvedReference {
                target: TableName::Routes,
                value: "route9".to_owned()
            }
        )],
        loaded.diagnostics
    );
}

#[test]
fn empty_stops_file() {
    let tmp = basic_copy();
    std::fs::write(tmp.path().join("stops.txt"), "").unwrap();
    let loaded = read_path(tmp.path());
    assert!(!loaded.feed.is_present(TableName::Stops));
    // the references to the absent stops are not checked
    assert_eq!(Some(7), loaded.feed.row_count(TableName::StopTimes));
    assert_eq!(Some(1), loaded.feed.row_count(TableName::Transfers));
    assert!(loaded.diagnostics.is_empty());
}

#[test]
fn header_only_file_is_absent() {
    let tmp = basic_copy();
    std::fs::write(tmp.path().join("office_jp.txt"), "office_id,office_name\n").unwrap();
    let loaded = read_path(tmp.path());
    assert!(!loaded.feed.is_present(TableName::OfficeJp));
    // jp_office_id is not checked anymore
    assert_eq!(Some(3), loaded.feed.row_count(TableName::Trips));
}

#[test]
fn invalid_cell_rejects_its_row() {
    let tmp = basic_copy();
    let mut calendar = std::fs::OpenOptions::new()
        .append(true)
        .open(tmp.path().join("calendar.txt"))
        .unwrap();
    writeln!(calendar, "service3,yes,1,1,1,1,0,0,20240401,20250331").unwrap();
    writeln!(calendar, "service4,2,1,1,1,1,0,0,20240401,20250331").unwrap();
    writeln!(calendar, "service5,1,1,1,1,1,0,0,2024-04-01,20250331").unwrap();

    let loaded = read_path(tmp.path());
    assert_eq!(Some(2), loaded.feed.row_count(TableName::Calendar));
    let fields: Vec<_> = loaded.diagnostics.iter().map(|d| (d.row, d.field)).collect();
    assert_eq!(
        vec![
            (Some(2), Some("monday")),
            (Some(3), Some("monday")),
            (Some(4), Some("start_date"))
        ],
        fields
    );
    assert!(loaded
        .diagnostics
        .iter()
        .all(|d| matches!(d.issue, Issue::InvalidValue { .. })));
}

#[test]
fn route_needs_a_name() {
    let tmp = basic_copy();
    std::fs::write(
        tmp.path().join("routes.txt"),
        "route_id,agency_id,route_short_name,route_long_name,route_type\n\
         route1,agency1,01,,3\n\
         route2,agency1,nan,null,3\n",
    )
    .unwrap();
    let loaded = read_path(tmp.path());
    assert_eq!(Some(1), loaded.feed.row_count(TableName::Routes));
    // the rows referencing route2 are rejected with it
    assert_eq!(Some(2), loaded.feed.row_count(TableName::Trips));
    assert_eq!(Some(1), loaded.feed.row_count(TableName::FareRules));
    assert_eq!(
        Diagnostic::row(
            TableName::Routes,
            1,
            Some("route_long_name"),
            Issue::MissingValue
        ),
        loaded.diagnostics[0]
    );
}

#[test]
fn undecodable_table() {
    let tmp = basic_copy();
    std::fs::write(
        tmp.path().join("pattern_jp.txt"),
        "jp_pattern_id,origin_stop\npattern1,渋谷駅前,extra\n",
    )
    .unwrap();
    let loaded = read_path(tmp.path());
    assert!(!loaded.feed.is_present(TableName::PatternJp));
    assert!(loaded.diagnostics[0].is_table_level());
    assert_eq!(TableName::PatternJp, loaded.diagnostics[0].table);
}

#[test]
fn shapes_points_sharing_coordinates_collide() {
    let tmp = basic_copy();
    let mut shapes = std::fs::OpenOptions::new()
        .append(true)
        .open(tmp.path().join("shapes.txt"))
        .unwrap();
    // a loop going back through its first point
    writeln!(shapes, "shape1,35.659171,139.700565,4,7.5").unwrap();

    let loaded = read_path(tmp.path());
    assert_eq!(Some(3), loaded.feed.row_count(TableName::Shapes));
    assert!(matches!(
        &loaded.diagnostics[..],
        [Diagnostic {
            table: TableName::Shapes,
            row: Some(3),
            issue: Issue::DuplicateKey(_),
            ..
        }]
    ));
}

#[test]
fn serialization_deserialization() {
    let feed = read("fixtures/basic").feed;
    let string = serde_json::to_string(&feed).unwrap();
    let parsed: Feed = serde_json::from_str(&string).unwrap();
    assert_eq!(feed, parsed);

    let string = serde_json::to_string(&feed.stop_times.unwrap()).unwrap();
    let parsed: Vec<StopTime> = serde_json::from_str(&string).unwrap();
    assert_eq!(Some(7 * 3600), parsed[0].arrival_time);
}

struct ArchiveFetcher(Vec<u8>);

impl Fetcher for ArchiveFetcher {
    fn fetch(
        &self,
        url: &str,
        dest: &mut dyn Write,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        assert_eq!("https://example.com/gtfs-jp.zip", url);
        dest.write_all(&self.0)?;
        Ok(())
    }
}

#[test]
fn read_from_fetcher() {
    let feed = read("fixtures/basic").feed;
    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("feed.zip");
    feed.write_to(&archive, None).unwrap();

    let loaded = FeedReader::default()
        .distance_units(DistanceUnits::Kilometers)
        .fetcher(ArchiveFetcher(std::fs::read(&archive).unwrap()))
        .read("https://example.com/gtfs-jp.zip")
        .unwrap();
    assert_eq!(feed, loaded.feed);
}

#[test]
fn relations_are_rebuilt_after_replacing_a_table() {
    let mut loaded = read("fixtures/basic");
    loaded.feed.routes.as_mut().unwrap().retain(|r| r.id == "route1");
    loaded.relations = crate::Relations::build(&loaded.feed);
    assert!(loaded.relations.get_route(&loaded.feed, "route2").is_none());
    assert!(loaded.relations.get_route(&loaded.feed, "route1").is_some());
}
