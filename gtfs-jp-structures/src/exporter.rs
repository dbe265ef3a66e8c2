//! Serializes a [Feed] back to csv files
use crate::schema::TableName;
use crate::table_parser::Value;
use crate::{Error, Feed};
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};
use zip::write::FileOptions;

/// Allows to parameterize how a feed is written
///
/// ```no_run
/// # let feed = gtfs_jp_structures::Feed::new(gtfs_jp_structures::DistanceUnits::Meters);
/// gtfs_jp_structures::FeedWriter::default()
///     .ndigits(Some(6))
///     .write(&feed, "out/feed.zip")?;
/// # Ok::<(), gtfs_jp_structures::error::Error>(())
/// ```
#[derive(Derivative, Debug, Clone)]
#[derivative(Default)]
pub struct FeedWriter {
    /// Number of decimals of the float columns, full precision when None
    #[derivative(Default(value = "None"))]
    pub ndigits: Option<usize>,
}

impl FeedWriter {
    /// Rounds every float column to the given number of decimals (default: None)
    ///
    /// Returns Self and can be chained
    pub fn ndigits(mut self, ndigits: Option<usize>) -> Self {
        self.ndigits = ndigits;
        self
    }

    /// Writes every present table of the feed
    ///
    /// A destination ending with `.zip` is written as an archive, which only appears once it is
    /// complete. Any other destination is a directory, created if needed.
    pub fn write<P: AsRef<Path>>(&self, feed: &Feed, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let res = if is_archive(path) {
            self.write_archive(feed, path)
        } else {
            self.write_directory(feed, path)
        };
        match res {
            Ok(()) => {
                info!("feed written to {}", path.display());
                Ok(())
            }
            Err(e) => Err(Error::ExportFailed {
                path: path.to_owned(),
                source: Box::new(e),
            }),
        }
    }

    fn write_directory(&self, feed: &Feed, dir: &Path) -> Result<(), Error> {
        std::fs::create_dir_all(dir)?;
        for table in feed.present_tables() {
            let rows = feed.table_values(table).unwrap_or_default();
            self.write_table(table, &rows, &dir.join(table.file_name()))?;
        }
        Ok(())
    }

    fn write_table(&self, table: TableName, rows: &[Vec<Value>], path: &Path) -> Result<(), Error> {
        let csv_error = |e: csv::Error| Error::NamedFileIO {
            file_name: table.file_name(),
            source: Box::new(e),
        };
        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        wtr.write_record(table.schema().columns.iter().map(|c| c.name))
            .map_err(csv_error)?;
        for row in rows {
            wtr.write_record(row.iter().map(|v| self.format(v)))
                .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn format(&self, value: &Value) -> String {
        match self.ndigits {
            Some(ndigits) => value.rounded(ndigits),
            None => value.to_string(),
        }
    }

    fn write_archive(&self, feed: &Feed, path: &Path) -> Result<(), Error> {
        let scratch = TempDir::new()?;
        self.write_directory(feed, scratch.path())?;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;
        let mut archive = NamedTempFile::new_in(parent)?;
        {
            let mut zip = zip::ZipWriter::new(archive.as_file_mut());
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            for table in feed.present_tables() {
                let file_name = table.file_name();
                zip.start_file(file_name.as_str(), options)?;
                std::io::copy(&mut File::open(scratch.path().join(&file_name))?, &mut zip)?;
            }
            zip.finish()?.flush()?;
        }
        archive.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("zip"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::*;

    fn feed() -> Feed {
        let mut feed = Feed::new(DistanceUnits::Meters);
        feed.shapes = Some(vec![Shape {
            id: "sh".to_owned(),
            latitude: 35.681236789,
            longitude: 139.767125123,
            sequence: 1,
            dist_traveled: None,
        }]);
        feed.office_jp = Some(vec![]);
        feed
    }

    #[test]
    fn rounds_floats_and_writes_nulls_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        FeedWriter::default()
            .ndigits(Some(3))
            .write(&feed(), tmp.path())
            .unwrap();
        let content = std::fs::read_to_string(tmp.path().join("shapes.txt")).unwrap();
        assert_eq!(
            "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence,shape_dist_traveled\n\
             sh,35.681,139.767,1,\n",
            content
        );
    }

    #[test]
    fn present_tables_only() {
        let tmp = tempfile::tempdir().unwrap();
        feed().write_to(tmp.path(), None).unwrap();
        assert!(tmp.path().join("office_jp.txt").is_file());
        assert!(!tmp.path().join("stops.txt").exists());
    }

    #[test]
    fn failed_archive_leaves_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        // a directory stands where the archive must be written
        let dest = tmp.path().join("feed.zip");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("keep"), "").unwrap();
        let res = feed().write_to(&dest, None);
        assert!(matches!(res, Err(Error::ExportFailed { .. })));
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(1, leftovers.len());
    }
}
