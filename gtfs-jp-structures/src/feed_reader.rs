use crate::archive::{ArchiveResolver, Fetcher};
use crate::error::Diagnostic;
use crate::materializer::Materializer;
use crate::objects::DistanceUnits;
use crate::table_parser::TableParser;
use crate::{Error, Feed, RawFeed, Relations};
use log::info;
use std::time::Duration;

/// Allows to parameterize how the parsing library behaves
///
/// ```
///let loaded = gtfs_jp_structures::FeedReader::default()
///    .distance_units("km".parse()?)
///    .read_stop_times(false) // Won’t read the stop times to save time and memory
///    .read("fixtures/basic")?;
///assert!(loaded.feed.stop_times.is_none());
/// # Ok::<(), gtfs_jp_structures::error::Error>(())
///```
///
/// You can also get a [RawFeed] by doing
/// ```
///let raw = gtfs_jp_structures::FeedReader::default()
///    .raw()
///    .read("fixtures/basic")?;
///assert!(raw.table(gtfs_jp_structures::TableName::Stops).is_some());
/// # Ok::<(), gtfs_jp_structures::error::Error>(())
///```
#[derive(Derivative)]
#[derivative(Default)]
pub struct FeedReader {
    /// Unit of the `shape_dist_traveled` columns of the feed, required to build a [Feed]
    #[derivative(Default(value = "None"))]
    pub distance_units: Option<DistanceUnits>,
    /// [crate::objects::StopTime] are very large and not always needed. This allows to skip reading them
    #[derivative(Default(value = "true"))]
    pub read_stop_times: bool,
    /// Maximum duration of the download of a remote feed, no limit when None
    #[derivative(Default(value = "None"))]
    pub fetch_timeout: Option<Duration>,
    #[derivative(Default(value = "None"))]
    fetcher: Option<Box<dyn Fetcher>>,
}

impl FeedReader {
    /// Sets the unit of the distances of the feed (no default, [FeedReader::read] fails without it)
    ///
    /// Returns Self and can be chained
    pub fn distance_units(mut self, distance_units: DistanceUnits) -> Self {
        self.distance_units = Some(distance_units);
        self
    }

    /// Configures the reader to read or not the stop times (default: true)
    ///
    /// This can be useful to save time and memory with large datasets when the timetable are not needed
    /// Returns Self and can be chained
    pub fn read_stop_times(mut self, read_stop_times: bool) -> Self {
        self.read_stop_times = read_stop_times;
        self
    }

    /// Limits the duration of the download of a remote feed (default: None)
    ///
    /// Returns Self and can be chained
    pub fn fetch_timeout(mut self, fetch_timeout: Option<Duration>) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Downloads remote feeds with the given [Fetcher] instead of the default http client
    ///
    /// Returns Self and can be chained
    pub fn fetcher<F: Fetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Reads from an url (if starts with `http://` or `https://`), or a local path (either a directory or zipped file)
    ///
    /// To read from an url without a custom [Fetcher], build with the read-url feature.
    /// Fails with [Error::InvalidConfiguration] if [FeedReader::distance_units] was not called.
    pub fn read(self, location: &str) -> Result<LoadedFeed, Error> {
        let distance_units = self.distance_units.ok_or_else(|| {
            Error::InvalidConfiguration("distance units of the feed are not set".to_owned())
        })?;
        self.raw()
            .read(location)
            .map(|raw| Materializer::materialize(raw, distance_units))
    }

    /// Read the feed as a [RawFeed], without any validation
    pub fn raw(self) -> RawFeedReader {
        RawFeedReader { reader: self }
    }

    fn resolver(self) -> ArchiveResolver {
        match self.fetcher {
            Some(fetcher) => ArchiveResolver::from_boxed(fetcher),
            #[cfg(feature = "read-url")]
            None => ArchiveResolver::with_fetcher(crate::archive::HttpFetcher {
                timeout: self.fetch_timeout,
            }),
            #[cfg(not(feature = "read-url"))]
            None => ArchiveResolver::new(),
        }
    }
}

/// This reader generates [RawFeed]. It must be built using [FeedReader::raw]
pub struct RawFeedReader {
    reader: FeedReader,
}

impl RawFeedReader {
    /// Reads from an url (if starts with `http://` or `https://`), or a local path (either a directory or zipped file)
    pub fn read(self, location: &str) -> Result<RawFeed, Error> {
        let read_stop_times = self.reader.read_stop_times;
        let resolved = self.reader.resolver().resolve(location)?;
        info!("reading feed {}", location);
        RawFeed::parse(&resolved, &TableParser, read_stop_times)
    }
}

/// A validated feed, with what was left out while reading it
#[derive(Debug, Clone)]
pub struct LoadedFeed {
    /// The validated records
    pub feed: Feed,
    /// Indices over the records of [LoadedFeed::feed]
    pub relations: Relations,
    /// Every table and row that was left out of the feed
    pub diagnostics: Vec<Diagnostic>,
    /// All files that are present in the feed
    pub files: Vec<String>,
    /// sha256 sum of the feed, when read from an archive
    pub sha256: Option<String>,
    /// Time needed to read and parse the tables in milliseconds
    pub read_duration: i64,
}

impl LoadedFeed {
    /// Prints on stdout the number of records of each table and the diagnostics
    pub fn print_stats(&self) {
        self.feed.print_stats();
        println!("  Read in {} ms", self.read_duration);
        if let Some(sha256) = &self.sha256 {
            println!("  sha256: {}", sha256);
        }
        println!("  Diagnostics: {}", self.diagnostics.len());
        for diagnostic in &self.diagnostics {
            println!("    {}", diagnostic);
        }
    }
}

/// Reads a feed from a path or an url, the distance units being one of `ft`, `mi`, `m`, `km`
pub fn read_feed(location: &str, distance_units: &str) -> Result<LoadedFeed, Error> {
    FeedReader::default()
        .distance_units(distance_units.parse()?)
        .read(location)
}
