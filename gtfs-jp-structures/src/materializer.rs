//! Turns the parsed tables into validated records
//!
//! The work is done in two passes. The first one builds every record of every table on its own:
//! rows with a missing or invalid value, and rows repeating the key of a previous row, are
//! rejected. Once every table is built, the second pass checks the references between tables,
//! following [LINK_ORDER] so that a table is always checked against already filtered tables.
//! A rejected row can thus reject the rows referencing it.
use crate::error::{Diagnostic, Issue};
use crate::objects::*;
use crate::raw_feed::RawFeed;
use crate::relations::Relations;
use crate::schema::TableName;
use crate::{Error, Feed, LoadedFeed};
use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

/// Order in which the references are checked: every table comes after the tables it references
pub const LINK_ORDER: [TableName; 17] = [
    TableName::Agency,
    TableName::AgencyJp,
    TableName::OfficeJp,
    TableName::PatternJp,
    TableName::Calendar,
    TableName::CalendarDates,
    TableName::Shapes,
    TableName::Stops,
    TableName::Routes,
    TableName::Trips,
    TableName::StopTimes,
    TableName::Frequencies,
    TableName::Transfers,
    TableName::FareAttributes,
    TableName::FareRules,
    TableName::FeedInfo,
    TableName::Translations,
];

/// Records built from a table, with the index of their row in the file
type Staged<R> = Option<Vec<(usize, R)>>;

/// Every table after the first pass, waiting for its references to be checked
struct StagedTables {
    agency: Staged<Agency>,
    agency_jp: Staged<AgencyJp>,
    stops: Staged<Stop>,
    routes: Staged<Route>,
    trips: Staged<Trip>,
    office_jp: Staged<OfficeJp>,
    pattern_jp: Staged<PatternJp>,
    stop_times: Staged<StopTime>,
    calendar: Staged<Calendar>,
    calendar_dates: Staged<CalendarDate>,
    fare_attributes: Staged<FareAttribute>,
    fare_rules: Staged<FareRule>,
    shapes: Staged<Shape>,
    frequencies: Staged<Frequency>,
    transfers: Staged<Transfer>,
    feed_info: Staged<FeedInfo>,
    translations: Staged<Translation>,
}

/// Builds a [Feed] out of a [RawFeed]
#[derive(Debug, Default)]
pub struct Materializer {
    diagnostics: Vec<Diagnostic>,
    ids: FxHashMap<TableName, FxHashSet<String>>,
}

impl Materializer {
    /// Validates every table of the raw feed
    ///
    /// Nothing here aborts: tables that could not be decoded become absent and invalid rows are
    /// left out, each with a [Diagnostic].
    pub fn materialize(raw: RawFeed, distance_units: DistanceUnits) -> LoadedFeed {
        let RawFeed {
            read_duration,
            mut tables,
            files,
            sha256,
        } = raw;
        let mut m = Materializer::default();

        let mut staged = StagedTables {
            agency: m.instantiate(&mut tables),
            agency_jp: m.instantiate(&mut tables),
            stops: m.instantiate(&mut tables),
            routes: m.instantiate(&mut tables),
            trips: m.instantiate(&mut tables),
            office_jp: m.instantiate(&mut tables),
            pattern_jp: m.instantiate(&mut tables),
            stop_times: m.instantiate(&mut tables),
            calendar: m.instantiate(&mut tables),
            calendar_dates: m.instantiate(&mut tables),
            fare_attributes: m.instantiate(&mut tables),
            fare_rules: m.instantiate(&mut tables),
            shapes: m.instantiate(&mut tables),
            frequencies: m.instantiate(&mut tables),
            transfers: m.instantiate(&mut tables),
            feed_info: m.instantiate(&mut tables),
            translations: m.instantiate(&mut tables),
        };

        let mut feed = Feed::new(distance_units);
        for table in LINK_ORDER {
            match table {
                TableName::Agency => feed.agency = m.link(staged.agency.take()),
                TableName::AgencyJp => feed.agency_jp = m.link(staged.agency_jp.take()),
                TableName::Stops => feed.stops = m.link_stops(staged.stops.take()),
                TableName::Routes => feed.routes = m.link(staged.routes.take()),
                TableName::Trips => feed.trips = m.link(staged.trips.take()),
                TableName::OfficeJp => feed.office_jp = m.link(staged.office_jp.take()),
                TableName::PatternJp => feed.pattern_jp = m.link(staged.pattern_jp.take()),
                TableName::StopTimes => feed.stop_times = m.link(staged.stop_times.take()),
                TableName::Calendar => feed.calendar = m.link(staged.calendar.take()),
                TableName::CalendarDates => feed.calendar_dates = m.link(staged.calendar_dates.take()),
                TableName::FareAttributes => feed.fare_attributes = m.link(staged.fare_attributes.take()),
                TableName::FareRules => feed.fare_rules = m.link(staged.fare_rules.take()),
                TableName::Shapes => feed.shapes = m.link(staged.shapes.take()),
                TableName::Frequencies => feed.frequencies = m.link(staged.frequencies.take()),
                TableName::Transfers => feed.transfers = m.link(staged.transfers.take()),
                TableName::FeedInfo => feed.feed_info = m.link(staged.feed_info.take()),
                TableName::Translations => feed.translations = m.link(staged.translations.take()),
            }
        }

        if !m.diagnostics.is_empty() {
            warn!("{} rows or tables were left out of the feed", m.diagnostics.len());
        }
        info!("{}", feed);

        LoadedFeed {
            relations: Relations::build(&feed),
            feed,
            diagnostics: m.diagnostics,
            files,
            sha256,
            read_duration,
        }
    }

    fn instantiate<R: Record>(
        &mut self,
        tables: &mut std::collections::BTreeMap<TableName, Result<crate::RawTable, Error>>,
    ) -> Staged<R> {
        let table = match tables.remove(&R::TABLE)? {
            Ok(table) => table,
            Err(e) => {
                let reason = match e {
                    Error::TableDecode { reason, .. } => reason,
                    e => e.to_string(),
                };
                self.diagnostics.push(Diagnostic::table(R::TABLE, reason));
                return None;
            }
        };

        let mut keys = FxHashSet::default();
        let mut records = Vec::with_capacity(table.len());
        for (i, row) in table.rows.iter().enumerate() {
            let values = match row {
                Ok(values) => values,
                Err(cell) => {
                    self.diagnostics.push(Diagnostic::row(
                        R::TABLE,
                        i,
                        Some(cell.column),
                        cell.clone().into(),
                    ));
                    continue;
                }
            };
            let record = match R::from_row(&table.view(values)) {
                Ok(record) => record,
                Err(e) => {
                    self.diagnostics
                        .push(Diagnostic::row(R::TABLE, i, e.field, e.issue));
                    continue;
                }
            };
            let key = record.key();
            if keys.contains(&key) {
                let key = key
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                self.diagnostics
                    .push(Diagnostic::row(R::TABLE, i, None, Issue::DuplicateKey(key)));
                continue;
            }
            keys.insert(key);
            records.push((i, record));
        }
        Some(records)
    }

    fn unresolved<R: Record>(&self, row: usize, record: &R) -> Option<Diagnostic> {
        record
            .references()
            .into_iter()
            .filter(|r| r.target != R::TABLE)
            .find(|r| {
                self.ids
                    .get(&r.target)
                    .map_or(false, |ids| !ids.contains(r.value))
            })
            .map(|r| {
                Diagnostic::row(
                    R::TABLE,
                    row,
                    Some(r.field),
                    Issue::UnresolvedReference {
                        target: r.target,
                        value: r.value.to_owned(),
                    },
                )
            })
    }

    fn link<R: Record>(&mut self, staged: Staged<R>) -> Option<Vec<R>> {
        let staged = staged?;
        let mut linked = Vec::with_capacity(staged.len());
        for (row, record) in staged {
            match self.unresolved(row, &record) {
                Some(diagnostic) => self.diagnostics.push(diagnostic),
                None => linked.push(record),
            }
        }
        self.register(&linked);
        Some(linked)
    }

    // A stop can only be kept once its parent station is kept, which can take several rounds
    fn link_stops(&mut self, staged: Staged<Stop>) -> Option<Vec<Stop>> {
        let mut stops = staged?;
        loop {
            let ids: FxHashSet<&str> = stops.iter().map(|(_, s)| s.id.as_str()).collect();
            let (kept, orphans): (Vec<_>, Vec<_>) = stops.iter().partition(|(_, s)| {
                s.parent_station
                    .as_deref()
                    .map_or(true, |parent| ids.contains(parent))
            });
            if orphans.is_empty() {
                break;
            }
            for (row, stop) in orphans {
                self.diagnostics.push(Diagnostic::row(
                    TableName::Stops,
                    *row,
                    Some("parent_station"),
                    Issue::UnresolvedReference {
                        target: TableName::Stops,
                        value: stop.parent_station.clone().unwrap_or_default(),
                    },
                ));
            }
            let kept: FxHashSet<usize> = kept.into_iter().map(|(row, _)| *row).collect();
            stops.retain(|(row, _)| kept.contains(row));
        }
        let stops: Vec<Stop> = stops.into_iter().map(|(_, s)| s).collect();
        self.register(&stops);
        Some(stops)
    }

    fn register<R: Record>(&mut self, records: &[R]) {
        let ids = records
            .iter()
            .filter_map(|r| r.id().map(str::to_owned))
            .collect();
        self.ids.insert(R::TABLE, ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_parser::TableParser;
    use std::collections::BTreeMap;

    fn raw(files: &[(TableName, &str)]) -> RawFeed {
        let mut tables = BTreeMap::new();
        for (table, content) in files {
            if let Some(t) = TableParser.parse_reader(*table, content.as_bytes()).transpose() {
                tables.insert(*table, t);
            }
        }
        RawFeed {
            read_duration: 0,
            tables,
            files: vec![],
            sha256: None,
        }
    }

    #[test]
    fn link_order_is_complete() {
        let mut sorted = LINK_ORDER.to_vec();
        sorted.sort();
        assert_eq!(TableName::ALL.to_vec(), sorted);
    }

    #[test]
    fn references_are_checked_in_link_order() {
        let loaded = Materializer::materialize(
            raw(&[
                (TableName::Agency, "agency_id,agency_name,agency_url\na,A,http://a\n"),
                (
                    TableName::Translations,
                    "table_name,field_name,language,translation\nstops,stop_name,en,Shibuya\n",
                ),
                (TableName::Trips, "route_id,service_id,trip_id\nr9,s,t\n"),
                (
                    TableName::Routes,
                    "route_id,agency_id,route_long_name\nr,zz,R\n",
                ),
                (TableName::AgencyJp, "agency_id\nzz\n"),
            ]),
            DistanceUnits::Kilometers,
        );
        let tables: Vec<_> = loaded.diagnostics.iter().map(|d| d.table).collect();
        assert_eq!(
            vec![TableName::AgencyJp, TableName::Routes, TableName::Trips],
            tables
        );
        let position = |t: &TableName| LINK_ORDER.iter().position(|l| l == t);
        assert!(tables.windows(2).all(|w| position(&w[0]) < position(&w[1])));
    }

    #[test]
    fn rejection_cascades() {
        let loaded = Materializer::materialize(
            raw(&[
                (TableName::Agency, "agency_id,agency_name,agency_url\na,A,http://a\n"),
                (
                    TableName::Routes,
                    "route_id,agency_id,route_long_name\nr1,a,One\nr2,zz,Two\n",
                ),
                (
                    TableName::Trips,
                    "route_id,service_id,trip_id\nr1,s,t1\nr2,s,t2\n",
                ),
                (TableName::StopTimes, "trip_id,stop_id,stop_sequence\nt1,x,1\nt2,x,1\n"),
            ]),
            DistanceUnits::Kilometers,
        );
        let feed = &loaded.feed;
        assert_eq!(Some(1), feed.row_count(TableName::Routes));
        assert_eq!(Some(1), feed.row_count(TableName::Trips));
        // stops.txt is absent, stop_id is not checked
        assert_eq!(Some(1), feed.row_count(TableName::StopTimes));
        assert_eq!(
            vec![
                Diagnostic::row(
                    TableName::Routes,
                    1,
                    Some("agency_id"),
                    Issue::UnresolvedReference {
                        target: TableName::Agency,
                        value: "zz".to_owned()
                    }
                ),
                Diagnostic::row(
                    TableName::Trips,
                    1,
                    Some("route_id"),
                    Issue::UnresolvedReference {
                        target: TableName::Routes,
                        value: "r2".to_owned()
                    }
                ),
                Diagnostic::row(
                    TableName::StopTimes,
                    1,
                    Some("trip_id"),
                    Issue::UnresolvedReference {
                        target: TableName::Trips,
                        value: "t2".to_owned()
                    }
                ),
            ],
            loaded.diagnostics
        );
    }

    #[test]
    fn parent_stations_are_resolved_transitively() {
        let loaded = Materializer::materialize(
            raw(&[(
                TableName::Stops,
                "stop_id,stop_name,stop_lat,stop_lon,parent_station\n\
                 a,A,35.0,139.0,\n\
                 b,B,35.0,139.0,a\n\
                 c,C,35.0,139.0,ghost\n\
                 d,D,35.0,139.0,c\n\
                 e,E,35.0,139.0,d\n",
            )]),
            DistanceUnits::Meters,
        );
        let ids: Vec<_> = loaded
            .feed
            .stops
            .iter()
            .flatten()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(vec!["a", "b"], ids);
        let rows: Vec<_> = loaded.diagnostics.iter().map(|d| d.row).collect();
        assert_eq!(vec![Some(2), Some(3), Some(4)], rows);
    }

    #[test]
    fn duplicates_keep_the_first_row() {
        let loaded = Materializer::materialize(
            raw(&[(
                TableName::OfficeJp,
                "office_id,office_name\no1,First\no1,Second\no2,\n",
            )]),
            DistanceUnits::Meters,
        );
        let offices = loaded.feed.office_jp.unwrap();
        assert_eq!(1, offices.len());
        assert_eq!("First", offices[0].name);
        assert_eq!(
            vec![
                Diagnostic::row(
                    TableName::OfficeJp,
                    1,
                    None,
                    Issue::DuplicateKey("o1".to_owned())
                ),
                Diagnostic::row(
                    TableName::OfficeJp,
                    2,
                    Some("office_name"),
                    Issue::MissingValue
                ),
            ],
            loaded.diagnostics
        );
    }

    #[test]
    fn undecodable_table_is_absent() {
        let loaded = Materializer::materialize(
            raw(&[(TableName::OfficeJp, "office_id,office_name\no1,a,b\n")]),
            DistanceUnits::Meters,
        );
        assert!(!loaded.feed.is_present(TableName::OfficeJp));
        assert_eq!(1, loaded.diagnostics.len());
        assert!(loaded.diagnostics[0].is_table_level());
    }

    #[test]
    fn fully_rejected_table_stays_present() {
        let loaded = Materializer::materialize(
            raw(&[
                (TableName::Calendar, "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\ns1,1,1,1,1,1,0,0,20240101,20241231\n"),
                (TableName::CalendarDates, "service_id,date,exception_type\nother,20240501,1\n"),
            ]),
            DistanceUnits::Meters,
        );
        assert_eq!(Some(0), loaded.feed.row_count(TableName::CalendarDates));
    }
}
