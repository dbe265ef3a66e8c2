//! Turns the location of a feed (directory, zip archive or url) into a readable directory
use crate::schema::TABLE_EXTENSION;
use crate::Error;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Downloads a remote archive
///
/// A single attempt is made, errors are never retried.
pub trait Fetcher {
    /// Writes the whole body found at `url` into `dest`
    fn fetch(
        &self,
        url: &str,
        dest: &mut dyn Write,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// [Fetcher] doing a blocking http(s) request
#[cfg(feature = "read-url")]
#[derive(Debug, Default, Clone)]
pub struct HttpFetcher {
    /// Maximum duration of the whole request, no limit if None
    pub timeout: Option<std::time::Duration>,
}

#[cfg(feature = "read-url")]
impl Fetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        dest: &mut dyn Write,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let mut res = builder.build()?.get(url).send()?.error_for_status()?;
        res.copy_to(dest)?;
        Ok(())
    }
}

/// A feed ready to be parsed
///
/// When the feed came from an archive, the extracted files live in a scratch directory
/// owned by this value and removed when it is dropped.
#[derive(Debug)]
pub struct ResolvedFeed {
    dir: PathBuf,
    /// Files present in the feed, as listed by the archive or the directory
    pub files: Vec<String>,
    /// sha256 sum of the archive, None for a directory
    pub sha256: Option<String>,
    _scratch: Option<TempDir>,
}

impl ResolvedFeed {
    /// Directory holding the table files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True if the files were extracted in a scratch directory
    pub fn is_extracted(&self) -> bool {
        self._scratch.is_some()
    }
}

/// Finds the feed behind a location
pub struct ArchiveResolver {
    fetcher: Option<Box<dyn Fetcher>>,
}

impl Default for ArchiveResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveResolver {
    /// A resolver for local paths, and for urls when the `read-url` feature is enabled
    pub fn new() -> Self {
        #[cfg(feature = "read-url")]
        let fetcher: Option<Box<dyn Fetcher>> = Some(Box::new(HttpFetcher::default()));
        #[cfg(not(feature = "read-url"))]
        let fetcher: Option<Box<dyn Fetcher>> = None;
        Self { fetcher }
    }

    /// A resolver downloading the urls with the given [Fetcher]
    pub fn with_fetcher<F: Fetcher + 'static>(fetcher: F) -> Self {
        Self::from_boxed(Box::new(fetcher))
    }

    pub(crate) fn from_boxed(fetcher: Box<dyn Fetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
        }
    }

    /// Resolves a local directory, a local zip archive or an http(s) url
    pub fn resolve(&self, location: &str) -> Result<ResolvedFeed, Error> {
        let path = Path::new(location);
        if path.is_dir() {
            debug!("reading feed from directory {}", location);
            return Ok(ResolvedFeed {
                dir: path.to_owned(),
                files: list_dir(path)?.into_iter().map(|(name, _)| name).collect(),
                sha256: None,
                _scratch: None,
            });
        }
        if path.is_file() {
            debug!("reading feed from archive {}", location);
            return extract(File::open(path)?);
        }
        if is_url(location) {
            if let Some(fetcher) = &self.fetcher {
                info!("downloading {}", location);
                let mut archive = tempfile::tempfile()?;
                fetcher
                    .fetch(location, &mut archive)
                    .map_err(|source| Error::FetchFailed {
                        url: location.to_owned(),
                        source,
                    })?;
                archive.seek(SeekFrom::Start(0))?;
                return extract(archive);
            }
        }
        Err(Error::PathNotFound(location.to_owned()))
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn extract<R: Read + Seek>(reader: R) -> Result<ResolvedFeed, Error> {
    let mut hasher = Sha256::new();
    let mut buf_reader = BufReader::new(reader);
    std::io::copy(&mut buf_reader, &mut hasher)?;
    let hash = hasher.finalize();
    buf_reader.seek(SeekFrom::Start(0))?;

    let mut archive = zip::ZipArchive::new(buf_reader)?;
    let files = archive.file_names().map(String::from).collect();
    let scratch = TempDir::new()?;
    archive.extract(scratch.path())?;

    Ok(ResolvedFeed {
        dir: feed_root(scratch.path())?,
        files,
        sha256: Some(format!("{:x}", hash)),
        _scratch: Some(scratch),
    })
}

// Archives built by zipping a folder hold the tables one level down
fn feed_root(dir: &Path) -> Result<PathBuf, Error> {
    let mut has_tables = false;
    let mut sub_dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            sub_dirs.push(path);
        } else if path.extension().and_then(|e| e.to_str()) == Some(TABLE_EXTENSION) {
            has_tables = true;
        }
    }
    match (has_tables, sub_dirs.len()) {
        (false, 1) => Ok(sub_dirs.remove(0)),
        _ => Ok(dir.to_owned()),
    }
}

fn list_dir(dir: &Path) -> Result<Vec<(String, u64)>, Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            files.push((entry.file_name().to_string_lossy().into_owned(), metadata.len()));
        }
    }
    files.sort();
    Ok(files)
}

/// Lists the files of a local archive or directory with their size in bytes, without parsing them
pub fn list_feed<P: AsRef<Path>>(path: P) -> Result<Vec<(String, u64)>, Error> {
    let p = path.as_ref();
    if p.is_dir() {
        list_dir(p)
    } else if p.is_file() {
        let mut archive = zip::ZipArchive::new(BufReader::new(File::open(p)?))?;
        let mut files = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            if file.is_file() {
                files.push((file.name().to_owned(), file.size()));
            }
        }
        Ok(files)
    } else {
        Err(Error::PathNotFound(format!("{}", p.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::FileOptions;

    struct StaticFetcher(Vec<u8>);

    impl Fetcher for StaticFetcher {
        fn fetch(
            &self,
            _url: &str,
            dest: &mut dyn Write,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            dest.write_all(&self.0)?;
            Ok(())
        }
    }

    struct FailingFetcher;

    impl Fetcher for FailingFetcher {
        fn fetch(
            &self,
            _url: &str,
            _dest: &mut dyn Write,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("connection refused".into())
        }
    }

    fn zipped(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn unknown_location() {
        let res = ArchiveResolver::new().resolve("fixtures/does_not_exist");
        assert!(matches!(res, Err(Error::PathNotFound(_))));
    }

    #[test]
    fn url_without_fetcher_is_not_found() {
        let resolver = ArchiveResolver { fetcher: None };
        let res = resolver.resolve("https://example.com/feed.zip");
        assert!(matches!(res, Err(Error::PathNotFound(_))));
    }

    #[test]
    fn fetched_archive_is_extracted_then_released() {
        let body = zipped(&[("agency.txt", "agency_id\na\n")]);
        let resolver = ArchiveResolver::with_fetcher(StaticFetcher(body));
        let resolved = resolver.resolve("https://example.com/feed.zip").unwrap();
        let dir = resolved.dir().to_owned();
        assert!(resolved.is_extracted());
        assert!(dir.join("agency.txt").is_file());
        assert_eq!(vec!["agency.txt".to_owned()], resolved.files);
        assert_eq!(64, resolved.sha256.as_ref().unwrap().len());
        drop(resolved);
        assert!(!dir.exists());
    }

    #[test]
    fn failed_fetch() {
        let resolver = ArchiveResolver::with_fetcher(FailingFetcher);
        let res = resolver.resolve("http://example.com/feed.zip");
        assert!(matches!(res, Err(Error::FetchFailed { url, .. }) if url == "http://example.com/feed.zip"));
    }

    #[test]
    fn nested_archive_root() {
        let body = zipped(&[("feed/stops.txt", "stop_id\ns\n")]);
        let resolved = ArchiveResolver::with_fetcher(StaticFetcher(body))
            .resolve("https://example.com/feed.zip")
            .unwrap();
        assert!(resolved.dir().join("stops.txt").is_file());
    }

    #[test]
    fn list_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("feed.zip");
        std::fs::write(&path, zipped(&[("agency.txt", "agency_id\na\n"), ("readme.txt", "")])).unwrap();
        assert_eq!(
            vec![("agency.txt".to_owned(), 12), ("readme.txt".to_owned(), 0)],
            list_feed(&path).unwrap()
        );
    }
}
