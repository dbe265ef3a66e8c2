use crate::objects::*;
use crate::schema::TableName;
use crate::table_parser::Value;
use crate::{Error, FeedReader, FeedWriter};
use std::fmt;
use std::path::Path;

/// Data structure with all the validated GTFS-JP records
///
/// Each table is `None` when its file was absent (or could not be decoded), and `Some` otherwise,
/// even if every row was rejected. The records never hold a reference that does not resolve.
///
/// A table can be replaced as a whole through its public field; [crate::Relations] must then be
/// rebuilt.
///
/// ```
/// use gtfs_jp_structures::{DistanceUnits, Feed};
/// let feed = Feed::read("fixtures/basic", DistanceUnits::Kilometers)?;
/// assert_eq!(feed.stops.as_ref().map(Vec::len), Some(5));
/// # Ok::<(), gtfs_jp_structures::error::Error>(())
/// ```
///
/// Cloning a feed gives a fully independent copy, at a cost proportional to the total number of
/// rows of all tables. Two feeds are equal when they have the same
/// distance units and, table by table, the same rows in any order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    distance_units: DistanceUnits,
    /// All agencies
    pub agency: Option<Vec<Agency>>,
    /// Registered offices of the agencies
    pub agency_jp: Option<Vec<AgencyJp>>,
    /// All stops, stations and areas
    pub stops: Option<Vec<Stop>>,
    /// All routes
    pub routes: Option<Vec<Route>>,
    /// All trips
    pub trips: Option<Vec<Trip>>,
    /// Operating offices
    pub office_jp: Option<Vec<OfficeJp>>,
    /// Stopping patterns
    pub pattern_jp: Option<Vec<PatternJp>>,
    /// All stop times
    pub stop_times: Option<Vec<StopTime>>,
    /// All calendars
    pub calendar: Option<Vec<Calendar>>,
    /// All calendar exceptions
    pub calendar_dates: Option<Vec<CalendarDate>>,
    /// All fares
    pub fare_attributes: Option<Vec<FareAttribute>>,
    /// Where the fares apply
    pub fare_rules: Option<Vec<FareRule>>,
    /// All shape points
    pub shapes: Option<Vec<Shape>>,
    /// Frequency based timetables
    pub frequencies: Option<Vec<Frequency>>,
    /// Transfers between stops
    pub transfers: Option<Vec<Transfer>>,
    /// Meta-data of the feed
    pub feed_info: Option<Vec<FeedInfo>>,
    /// Translations of the texts of the feed
    pub translations: Option<Vec<Translation>>,
}

macro_rules! dispatch {
    ($feed:expr, $table:expr, $f:ident) => {
        match $table {
            TableName::Agency => $f(&$feed.agency),
            TableName::AgencyJp => $f(&$feed.agency_jp),
            TableName::Stops => $f(&$feed.stops),
            TableName::Routes => $f(&$feed.routes),
            TableName::Trips => $f(&$feed.trips),
            TableName::OfficeJp => $f(&$feed.office_jp),
            TableName::PatternJp => $f(&$feed.pattern_jp),
            TableName::StopTimes => $f(&$feed.stop_times),
            TableName::Calendar => $f(&$feed.calendar),
            TableName::CalendarDates => $f(&$feed.calendar_dates),
            TableName::FareAttributes => $f(&$feed.fare_attributes),
            TableName::FareRules => $f(&$feed.fare_rules),
            TableName::Shapes => $f(&$feed.shapes),
            TableName::Frequencies => $f(&$feed.frequencies),
            TableName::Transfers => $f(&$feed.transfers),
            TableName::FeedInfo => $f(&$feed.feed_info),
            TableName::Translations => $f(&$feed.translations),
        }
    };
}

fn len<R>(table: &Option<Vec<R>>) -> Option<usize> {
    table.as_ref().map(Vec::len)
}

fn values<R: Record>(table: &Option<Vec<R>>) -> Option<Vec<Vec<Value>>> {
    table
        .as_ref()
        .map(|records| records.iter().map(Record::to_values).collect())
}

impl Feed {
    /// An empty feed: every table is absent
    pub fn new(distance_units: DistanceUnits) -> Self {
        Self {
            distance_units,
            agency: None,
            agency_jp: None,
            stops: None,
            routes: None,
            trips: None,
            office_jp: None,
            pattern_jp: None,
            stop_times: None,
            calendar: None,
            calendar_dates: None,
            fare_attributes: None,
            fare_rules: None,
            shapes: None,
            frequencies: None,
            transfers: None,
            feed_info: None,
            translations: None,
        }
    }

    /// Reads a feed from a local directory, a local zip archive or an url
    ///
    /// The rejected rows are only logged, use [FeedReader] to get them
    pub fn read(location: &str, distance_units: DistanceUnits) -> Result<Self, Error> {
        FeedReader::default()
            .distance_units(distance_units)
            .read(location)
            .map(|loaded| loaded.feed)
    }

    /// Unit of the `shape_dist_traveled` columns
    pub fn distance_units(&self) -> DistanceUnits {
        self.distance_units
    }

    /// True if the table is present, even with no row
    pub fn is_present(&self, table: TableName) -> bool {
        self.row_count(table).is_some()
    }

    /// Number of records of the table, None if the table is absent
    pub fn row_count(&self, table: TableName) -> Option<usize> {
        dispatch!(self, table, len)
    }

    /// The present tables, in their canonical order
    pub fn present_tables(&self) -> Vec<TableName> {
        TableName::ALL
            .iter()
            .copied()
            .filter(|t| self.is_present(*t))
            .collect()
    }

    /// Values of every record of the table, in the order of its canonical columns
    pub fn table_values(&self, table: TableName) -> Option<Vec<Vec<Value>>> {
        dispatch!(self, table, values)
    }

    /// Writes the feed to a directory, or to a zip archive if `path` ends with `.zip`
    ///
    /// Floats are rounded to `ndigits` decimals when given
    pub fn write_to<P: AsRef<Path>>(&self, path: P, ndigits: Option<usize>) -> Result<(), Error> {
        FeedWriter::default().ndigits(ndigits).write(self, path)
    }

    /// Prints on stdout the number of records of each table. Mostly to be sure that everything was read
    pub fn print_stats(&self) {
        println!("GTFS-JP data:");
        println!("  Distance units: {}", self.distance_units);
        for table in TableName::ALL {
            match self.row_count(table) {
                Some(n) => println!("  {}: {}", table, n),
                None => println!("  {}: File not present", table),
            }
        }
    }
}

impl PartialEq for Feed {
    fn eq(&self, other: &Self) -> bool {
        self.distance_units == other.distance_units
            && TableName::ALL.iter().all(|t| {
                match (self.table_values(*t), other.table_values(*t)) {
                    (None, None) => true,
                    (Some(mut a), Some(mut b)) => {
                        a.sort_unstable();
                        b.sort_unstable();
                        a == b
                    }
                    _ => false,
                }
            })
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "feed ({})", self.distance_units)?;
        for table in self.present_tables() {
            write!(f, ", {}: {}", table, self.row_count(table).unwrap_or_default())?;
        }
        Ok(())
    }
}
