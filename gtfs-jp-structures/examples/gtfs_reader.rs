fn main() {
    /* FeedReader::read will guess if you provide a directory, a local zip file or a remote zip file.
     */
    let loaded = gtfs_jp_structures::FeedReader::default()
        .distance_units(gtfs_jp_structures::DistanceUnits::Kilometers)
        .read_stop_times(false)
        .read("fixtures/basic")
        .expect("impossible to read feed");
    loaded.print_stats();

    let route_1 = loaded
        .relations
        .get_route(&loaded.feed, "route1")
        .expect("no route1");
    println!("{}: {:?}", route_1, route_1);
    for trip in loaded.relations.trips_of_route(&loaded.feed, "route1") {
        println!("  {}", trip);
    }
}
