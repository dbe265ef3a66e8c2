//! Static registry of the GTFS-JP tables and of their canonical columns
//!
//! The registry is a plain constant table: there is no runtime discovery of the record types.
use std::fmt;
use std::str::FromStr;

/// Type a column is coerced to when a table is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Free text, kept verbatim
    Str,
    /// 32 bits signed integer
    Int32,
    /// 16 bits signed integer
    Int16,
    /// Double precision float
    Float,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ColumnType::Str => "string",
            ColumnType::Int32 => "Int32",
            ColumnType::Int16 => "Int16",
            ColumnType::Float => "float",
        };
        write!(f, "{}", name)
    }
}

/// A canonical column of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Header of the column in the csv file
    pub name: &'static str,
    /// Declared type of the column
    pub column_type: ColumnType,
}

const fn col(name: &'static str, column_type: ColumnType) -> Column {
    Column { name, column_type }
}

use ColumnType::{Float, Int16, Int32, Str};

/// All the tables of a GTFS-JP feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableName {
    /// `agency.txt`
    Agency,
    /// `agency_jp.txt`, registered office of the agency
    AgencyJp,
    /// `stops.txt`
    Stops,
    /// `routes.txt`
    Routes,
    /// `trips.txt`
    Trips,
    /// `office_jp.txt`, operating offices referenced by the trips
    OfficeJp,
    /// `pattern_jp.txt`, stopping patterns referenced by the trips
    PatternJp,
    /// `stop_times.txt`
    StopTimes,
    /// `calendar.txt`
    Calendar,
    /// `calendar_dates.txt`
    CalendarDates,
    /// `fare_attributes.txt`
    FareAttributes,
    /// `fare_rules.txt`
    FareRules,
    /// `shapes.txt`
    Shapes,
    /// `frequencies.txt`
    Frequencies,
    /// `transfers.txt`
    Transfers,
    /// `feed_info.txt`
    FeedInfo,
    /// `translations.txt`
    Translations,
}

impl TableName {
    /// Every table, in the order they are written
    pub const ALL: [TableName; 17] = [
        TableName::Agency,
        TableName::AgencyJp,
        TableName::Stops,
        TableName::Routes,
        TableName::Trips,
        TableName::OfficeJp,
        TableName::PatternJp,
        TableName::StopTimes,
        TableName::Calendar,
        TableName::CalendarDates,
        TableName::FareAttributes,
        TableName::FareRules,
        TableName::Shapes,
        TableName::Frequencies,
        TableName::Transfers,
        TableName::FeedInfo,
        TableName::Translations,
    ];

    /// Name of the table, which is also the stem of its file
    pub fn as_str(&self) -> &'static str {
        self.schema().name
    }

    /// Name of the file holding the table
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.as_str(), TABLE_EXTENSION)
    }

    /// Canonical schema of the table
    pub fn schema(&self) -> &'static TableSchema {
        &TABLES[*self as usize]
    }

    /// Finds a table from the name of a file in the feed (`stops.txt` → [TableName::Stops])
    ///
    /// Only the exact stem and the `txt` extension are recognized
    pub fn from_file_name(file_name: &str) -> Option<TableName> {
        let (stem, extension) = file_name.rsplit_once('.')?;
        if extension != TABLE_EXTENSION {
            return None;
        }
        stem.parse().ok()
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("{s} is not a GTFS-JP table"))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extension of the files holding the tables
pub const TABLE_EXTENSION: &str = "txt";

/// Canonical description of one table
#[derive(Debug)]
pub struct TableSchema {
    /// The table described
    pub table: TableName,
    /// Name of the table
    pub name: &'static str,
    /// Canonical columns, in the order they are written
    pub columns: &'static [Column],
}

impl TableSchema {
    /// Declared type of a column, None if the column is not part of the schema
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }
}

/// The registry, indexed by `TableName as usize`
pub static TABLES: [TableSchema; 17] = [
    TableSchema {
        table: TableName::Agency,
        name: "agency",
        columns: &[
            col("agency_id", Str),
            col("agency_name", Str),
            col("agency_url", Str),
            col("agency_timezone", Str),
            col("agency_lang", Str),
            col("agency_phone", Str),
            col("agency_fare_url", Str),
            col("agency_email", Str),
        ],
    },
    TableSchema {
        table: TableName::AgencyJp,
        name: "agency_jp",
        columns: &[
            col("agency_id", Str),
            col("agency_official_name", Str),
            col("agency_zip_number", Str),
            col("agency_address", Str),
            col("agency_president_pos", Str),
            col("agency_president_name", Str),
        ],
    },
    TableSchema {
        table: TableName::Stops,
        name: "stops",
        columns: &[
            col("stop_id", Str),
            col("stop_code", Str),
            col("stop_name", Str),
            col("stop_desc", Str),
            col("stop_lat", Float),
            col("stop_lon", Float),
            col("zone_id", Str),
            col("stop_url", Str),
            col("location_type", Int32),
            col("parent_station", Str),
            col("stop_timezone", Str),
            col("wheelchair_boarding", Int32),
        ],
    },
    TableSchema {
        table: TableName::Routes,
        name: "routes",
        columns: &[
            col("route_id", Str),
            col("agency_id", Str),
            col("route_short_name", Str),
            col("route_long_name", Str),
            col("route_desc", Str),
            col("route_type", Int32),
            col("route_url", Str),
            col("route_color", Str),
            col("route_text_color", Str),
            col("jp_parent_route_id", Str),
        ],
    },
    TableSchema {
        table: TableName::Trips,
        name: "trips",
        columns: &[
            col("route_id", Str),
            col("service_id", Str),
            col("trip_id", Str),
            col("trip_headsign", Str),
            col("trip_short_name", Str),
            col("direction_id", Int32),
            col("block_id", Str),
            col("shape_id", Str),
            col("wheelchair_accessible", Int32),
            col("bikes_allowed", Int32),
            col("jp_trip_desc", Str),
            col("jp_trip_desc_symbol", Str),
            col("jp_office_id", Str),
            col("jp_pattern_id", Str),
        ],
    },
    TableSchema {
        table: TableName::OfficeJp,
        name: "office_jp",
        columns: &[
            col("office_id", Str),
            col("office_name", Str),
            col("office_url", Str),
            col("office_phone", Str),
        ],
    },
    TableSchema {
        table: TableName::PatternJp,
        name: "pattern_jp",
        columns: &[
            col("jp_pattern_id", Str),
            col("route_update_date", Str),
            col("origin_stop", Str),
            col("via_stop", Str),
            col("destination_stop", Str),
        ],
    },
    TableSchema {
        table: TableName::StopTimes,
        name: "stop_times",
        columns: &[
            col("trip_id", Str),
            col("arrival_time", Str),
            col("departure_time", Str),
            col("stop_id", Str),
            col("stop_sequence", Int32),
            col("stop_headsign", Str),
            col("pickup_type", Int32),
            col("drop_off_type", Int32),
            col("shape_dist_traveled", Float),
            col("timepoint", Int32),
        ],
    },
    TableSchema {
        table: TableName::Calendar,
        name: "calendar",
        columns: &[
            col("service_id", Str),
            col("monday", Int32),
            col("tuesday", Int32),
            col("wednesday", Int32),
            col("thursday", Int32),
            col("friday", Int32),
            col("saturday", Int32),
            col("sunday", Int32),
            col("start_date", Str),
            col("end_date", Str),
        ],
    },
    TableSchema {
        table: TableName::CalendarDates,
        name: "calendar_dates",
        columns: &[
            col("service_id", Str),
            col("date", Str),
            col("exception_type", Int32),
        ],
    },
    TableSchema {
        table: TableName::FareAttributes,
        name: "fare_attributes",
        columns: &[
            col("fare_id", Str),
            col("price", Float),
            col("currency_type", Str),
            col("payment_method", Int32),
            col("transfers", Int32),
            col("transfer_duration", Int16),
        ],
    },
    TableSchema {
        table: TableName::FareRules,
        name: "fare_rules",
        columns: &[
            col("fare_id", Str),
            col("route_id", Str),
            col("origin_id", Str),
            col("destination_id", Str),
            col("contains_id", Str),
        ],
    },
    TableSchema {
        table: TableName::Shapes,
        name: "shapes",
        columns: &[
            col("shape_id", Str),
            col("shape_pt_lat", Float),
            col("shape_pt_lon", Float),
            col("shape_pt_sequence", Int32),
            col("shape_dist_traveled", Float),
        ],
    },
    TableSchema {
        table: TableName::Frequencies,
        name: "frequencies",
        columns: &[
            col("trip_id", Str),
            col("start_time", Str),
            col("end_time", Str),
            col("headway_secs", Int16),
            col("exact_times", Int32),
        ],
    },
    TableSchema {
        table: TableName::Transfers,
        name: "transfers",
        columns: &[
            col("from_stop_id", Str),
            col("to_stop_id", Str),
            col("transfer_type", Int32),
            col("min_transfer_time", Int16),
        ],
    },
    TableSchema {
        table: TableName::FeedInfo,
        name: "feed_info",
        columns: &[
            col("feed_publisher_name", Str),
            col("feed_publisher_url", Str),
            col("feed_lang", Str),
            col("feed_start_date", Str),
            col("feed_end_date", Str),
            col("feed_version", Str),
        ],
    },
    TableSchema {
        table: TableName::Translations,
        name: "translations",
        columns: &[
            col("table_name", Str),
            col("field_name", Str),
            col("language", Str),
            col("translation", Str),
            col("record_id", Str),
            col("record_sub_id", Str),
            col("field_value", Str),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_indexed_by_table() {
        for table in TableName::ALL {
            assert_eq!(table, table.schema().table);
        }
    }

    #[test]
    fn recognizes_only_txt_tables() {
        assert_eq!(Some(TableName::Stops), TableName::from_file_name("stops.txt"));
        assert_eq!(
            Some(TableName::OfficeJp),
            TableName::from_file_name("office_jp.txt")
        );
        assert_eq!(None, TableName::from_file_name("stops.csv"));
        assert_eq!(None, TableName::from_file_name("readme.txt"));
        assert_eq!(None, TableName::from_file_name("stops"));
    }

    #[test]
    fn calendar_weekdays_are_integers() {
        let schema = TableName::Calendar.schema();
        assert_eq!(Some(ColumnType::Int32), schema.column_type("monday"));
        assert_eq!(Some(ColumnType::Str), schema.column_type("start_date"));
        assert_eq!(None, schema.column_type("unknown"));
    }
}
