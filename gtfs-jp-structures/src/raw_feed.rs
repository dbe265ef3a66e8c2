use crate::archive::ResolvedFeed;
use crate::schema::TableName;
use crate::table_parser::{RawTable, TableParser};
use crate::{Error, FeedReader};
use chrono::Utc;
use log::{debug, warn};
use std::collections::BTreeMap;

/// The tables of a feed parsed according to their schema, before any validation
///
/// This is used to analyze the feed and detect anomalies.
/// To manipulate the transit data, [crate::Feed] will be more convenient
#[derive(Debug)]
pub struct RawFeed {
    /// Time needed to read and parse the tables in milliseconds
    pub read_duration: i64,
    /// Every table with a file holding at least one row. A missing entry means the table is absent
    pub tables: BTreeMap<TableName, Result<RawTable, Error>>,
    /// All files that are present in the feed
    pub files: Vec<String>,
    /// sha256 sum of the feed, when read from an archive
    pub sha256: Option<String>,
}

impl RawFeed {
    /// Reads and parses a feed from a local path or an url with the default configuration
    pub fn new(location: &str) -> Result<Self, Error> {
        FeedReader::default().raw().read(location)
    }

    /// Parses every table file found in the directory of the resolved feed
    ///
    /// Files that are not tables are ignored. The `stop_times` table is skipped when
    /// `read_stop_times` is false.
    pub fn parse(
        resolved: &ResolvedFeed,
        parser: &TableParser,
        read_stop_times: bool,
    ) -> Result<Self, Error> {
        let now = Utc::now();
        let mut entries: Vec<_> = std::fs::read_dir(resolved.dir())?
            .filter_map(|d| d.ok().map(|d| d.path()))
            .filter(|p| p.is_file())
            .collect();
        entries.sort();

        let mut tables = BTreeMap::new();
        for path in entries {
            let file_name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("invalid_file_name");
            let table = match TableName::from_file_name(file_name) {
                Some(table) => table,
                None => {
                    debug!("ignoring {}, it is not a GTFS-JP table", file_name);
                    continue;
                }
            };
            if table == TableName::StopTimes && !read_stop_times {
                debug!("skipping {}", file_name);
                continue;
            }
            if let Some(parsed) = parser.parse_file(table, &path) {
                if let Err(e) = &parsed {
                    warn!("{}: {}", file_name, e);
                }
                tables.insert(table, parsed);
            }
        }

        Ok(Self {
            read_duration: Utc::now().signed_duration_since(now).num_milliseconds(),
            tables,
            files: resolved.files.clone(),
            sha256: resolved.sha256.clone(),
        })
    }

    /// The parsed table, None if it is absent
    pub fn table(&self, table: TableName) -> Option<&Result<RawTable, Error>> {
        self.tables.get(&table)
    }

    /// Prints on stdout the number of rows of each table. Mostly to be sure that everything was read
    pub fn print_stats(&self) {
        println!("GTFS-JP data:");
        println!("  Read in {} ms", self.read_duration);
        for table in TableName::ALL {
            println!("  {}: {}", table, file_summary(self.table(table)));
        }
    }
}

fn file_summary(table: Option<&Result<RawTable, Error>>) -> String {
    match table {
        Some(Ok(t)) => format!("{} rows", t.len()),
        Some(Err(e)) => format!("Could not read {}", e),
        None => "File not present".to_string(),
    }
}
