use gtfs_jp_structures::RawFeed;

/// prints some stats about the GTFS-JP feed given as a cli argument, before any validation
fn main() {
    let file_path = std::env::args()
        .nth(1)
        .expect("you should put the path of the file to load");

    println!("reading file {}", &file_path);
    match RawFeed::new(&file_path) {
        Ok(raw) => raw.print_stats(),
        Err(e) => eprintln!("error: {:?}", e),
    }
}
