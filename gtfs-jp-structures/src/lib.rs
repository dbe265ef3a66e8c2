/*! [GTFS-JP](https://www.mlit.go.jp/sogoseisaku/transport/sosei_transport_tk_000067.html) is the Japanese profile of the
[General Transit Feed Specification](https://gtfs.org/) (GTFS), the commonly used model to represent public transit data.

This crate brings [serde](https://serde.rs) structures of this model and helpers to read, validate and write GTFS-JP feeds.

To get started, see [FeedReader] and [Feed].

## What is GTFS-JP

A feed is a collection of CSV files (often bundled as a zip file).
Each file represents a collection of one type (stops, lines, etc.) that have relationships through unique identifiers.
GTFS-JP adds a few files (`agency_jp.txt`, `office_jp.txt`, `pattern_jp.txt`) and columns (`jp_parent_route_id`, `jp_office_id`…) to GTFS.

This crate reads a feed, deserializes the rows into Rust structs and verifies the relationships.

## Design decisions

### Three steps

The location of the feed is first resolved into a directory ([archive]), then every table is parsed
according to its schema into a [RawFeed], without any validation. The [RawFeed] is then materialized
into a [Feed], which only holds rows that are valid and whose references resolve.

### Nothing is fatal

Every file is optional. A table whose file cannot be decoded is left out of the [Feed], a row with
an invalid value or a dangling reference is left out of its table. Each of them is reported as a
[error::Diagnostic] in the [LoadedFeed].

### Reference

The canonical columns of every table are listed in [schema::TABLES]. Optional fields are [std::option],
while missing mandatory elements reject the row. If a default value is defined, we will use it.

### Renaming

We kept some names even if they can be confusing (a [Calendar] will be referenced by `service_id`), but we strip the object type (`route_short_name` is [Route::short_name]).

*/
#![warn(missing_docs)]

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

pub mod archive;
mod cleaners;
mod enums;
pub mod error;
mod exporter;
mod feed;
mod feed_reader;
mod fields;
pub mod materializer;
pub(crate) mod objects;
mod raw_feed;
mod relations;
pub mod schema;
mod serde_helpers;
mod table_parser;

#[cfg(test)]
mod tests;

pub use archive::{list_feed, ArchiveResolver, Fetcher, ResolvedFeed};
pub use cleaners::clean_column_names;
pub use error::Error;
pub use exporter::FeedWriter;
pub use feed::Feed;
pub use feed_reader::{read_feed, FeedReader, LoadedFeed, RawFeedReader};
pub use materializer::Materializer;
pub use objects::*;
pub use raw_feed::RawFeed;
pub use relations::Relations;
pub use schema::{ColumnType, TableName};
pub use table_parser::{RawTable, TableParser, Value, NULL_TOKENS};
