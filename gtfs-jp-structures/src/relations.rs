use crate::objects::*;
use crate::Feed;
use rustc_hash::FxHashMap;

/// Indices over the records of a [Feed]
///
/// The indices hold positions in the tables of the feed they were built from, never the records
/// themselves. They must be rebuilt with [Relations::build] when a table of the feed is replaced.
///
/// ```
/// use gtfs_jp_structures::{DistanceUnits, FeedReader};
/// let loaded = FeedReader::default()
///     .distance_units(DistanceUnits::Kilometers)
///     .read("fixtures/basic")?;
/// let trip = loaded.relations.get_trip(&loaded.feed, "trip1").unwrap();
/// assert_eq!("route1", trip.route_id);
/// # Ok::<(), gtfs_jp_structures::error::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct Relations {
    agencies: FxHashMap<String, usize>,
    stops: FxHashMap<String, usize>,
    routes: FxHashMap<String, usize>,
    trips: FxHashMap<String, usize>,
    offices: FxHashMap<String, usize>,
    patterns: FxHashMap<String, usize>,
    calendar: FxHashMap<String, usize>,
    fare_attributes: FxHashMap<String, usize>,
    children: FxHashMap<String, Vec<usize>>,
    routes_of_agency: FxHashMap<String, Vec<usize>>,
    trips_of_route: FxHashMap<String, Vec<usize>>,
    trips_of_service: FxHashMap<String, Vec<usize>>,
    stop_times_of_trip: FxHashMap<String, Vec<usize>>,
    stop_times_of_stop: FxHashMap<String, Vec<usize>>,
    calendar_dates: FxHashMap<String, Vec<usize>>,
    shapes: FxHashMap<String, Vec<usize>>,
    frequencies: FxHashMap<String, Vec<usize>>,
    fare_rules: FxHashMap<String, Vec<usize>>,
    transfers_from: FxHashMap<String, Vec<usize>>,
}

fn to_map<'a>(ids: impl Iterator<Item = &'a str>) -> FxHashMap<String, usize> {
    ids.enumerate().map(|(i, id)| (id.to_owned(), i)).collect()
}

fn group<'a>(keys: impl Iterator<Item = &'a str>) -> FxHashMap<String, Vec<usize>> {
    let mut res: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (i, key) in keys.enumerate() {
        res.entry(key.to_owned()).or_default().push(i);
    }
    res
}

fn pick<'a, T>(table: &'a Option<Vec<T>>, index: Option<&usize>) -> Option<&'a T> {
    table.as_ref()?.get(*index?)
}

fn pick_all<'a, T>(table: &'a Option<Vec<T>>, indices: Option<&Vec<usize>>) -> Vec<&'a T> {
    match (table, indices) {
        (Some(records), Some(indices)) => indices.iter().filter_map(|i| records.get(*i)).collect(),
        _ => Vec::new(),
    }
}

fn records<T>(table: &Option<Vec<T>>) -> &[T] {
    table.as_deref().unwrap_or_default()
}

impl Relations {
    /// Indexes every table of the feed
    pub fn build(feed: &Feed) -> Self {
        let stops = records(&feed.stops);
        let stop_times = records(&feed.stop_times);
        let shapes = records(&feed.shapes);

        let mut stop_times_of_trip = group(stop_times.iter().map(|st| st.trip_id.as_str()));
        for indices in stop_times_of_trip.values_mut() {
            indices.sort_by_key(|i| stop_times[*i].stop_sequence);
        }
        let mut shape_points = group(shapes.iter().map(|s| s.id.as_str()));
        // we sort the shape by it's pt_sequence
        for indices in shape_points.values_mut() {
            indices.sort_by_key(|i| shapes[*i].sequence);
        }

        let mut children: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (i, stop) in stops.iter().enumerate() {
            if let Some(parent) = &stop.parent_station {
                children.entry(parent.clone()).or_default().push(i);
            }
        }

        Self {
            agencies: to_map(records(&feed.agency).iter().map(|a| a.id.as_str())),
            stops: to_map(stops.iter().map(|s| s.id.as_str())),
            routes: to_map(records(&feed.routes).iter().map(|r| r.id.as_str())),
            trips: to_map(records(&feed.trips).iter().map(|t| t.id.as_str())),
            offices: to_map(records(&feed.office_jp).iter().map(|o| o.id.as_str())),
            patterns: to_map(records(&feed.pattern_jp).iter().map(|p| p.id.as_str())),
            calendar: to_map(records(&feed.calendar).iter().map(|c| c.id.as_str())),
            fare_attributes: to_map(records(&feed.fare_attributes).iter().map(|f| f.id.as_str())),
            children,
            routes_of_agency: group(records(&feed.routes).iter().map(|r| r.agency_id.as_str())),
            trips_of_route: group(records(&feed.trips).iter().map(|t| t.route_id.as_str())),
            trips_of_service: group(records(&feed.trips).iter().map(|t| t.service_id.as_str())),
            stop_times_of_trip,
            stop_times_of_stop: group(stop_times.iter().map(|st| st.stop_id.as_str())),
            calendar_dates: group(
                records(&feed.calendar_dates)
                    .iter()
                    .map(|c| c.service_id.as_str()),
            ),
            shapes: shape_points,
            frequencies: group(records(&feed.frequencies).iter().map(|f| f.trip_id.as_str())),
            fare_rules: group(records(&feed.fare_rules).iter().map(|f| f.fare_id.as_str())),
            transfers_from: group(
                records(&feed.transfers)
                    .iter()
                    .map(|t| t.from_stop_id.as_str()),
            ),
        }
    }

    /// Gets an [Agency] by its `agency_id`
    pub fn get_agency<'a>(&self, feed: &'a Feed, id: &str) -> Option<&'a Agency> {
        pick(&feed.agency, self.agencies.get(id))
    }

    /// Gets a [Stop] by its `stop_id`
    pub fn get_stop<'a>(&self, feed: &'a Feed, id: &str) -> Option<&'a Stop> {
        pick(&feed.stops, self.stops.get(id))
    }

    /// Gets a [Route] by its `route_id`
    pub fn get_route<'a>(&self, feed: &'a Feed, id: &str) -> Option<&'a Route> {
        pick(&feed.routes, self.routes.get(id))
    }

    /// Gets a [Trip] by its `trip_id`
    pub fn get_trip<'a>(&self, feed: &'a Feed, id: &str) -> Option<&'a Trip> {
        pick(&feed.trips, self.trips.get(id))
    }

    /// Gets an [OfficeJp] by its `office_id`
    pub fn get_office<'a>(&self, feed: &'a Feed, id: &str) -> Option<&'a OfficeJp> {
        pick(&feed.office_jp, self.offices.get(id))
    }

    /// Gets a [PatternJp] by its `jp_pattern_id`
    pub fn get_pattern<'a>(&self, feed: &'a Feed, id: &str) -> Option<&'a PatternJp> {
        pick(&feed.pattern_jp, self.patterns.get(id))
    }

    /// Gets a [Calendar] by its `service_id`
    pub fn get_calendar<'a>(&self, feed: &'a Feed, id: &str) -> Option<&'a Calendar> {
        pick(&feed.calendar, self.calendar.get(id))
    }

    /// Gets a [FareAttribute] by its `fare_id`
    pub fn get_fare_attributes<'a>(&self, feed: &'a Feed, id: &str) -> Option<&'a FareAttribute> {
        pick(&feed.fare_attributes, self.fare_attributes.get(id))
    }

    /// The station containing a stop
    pub fn parent_of<'a>(&self, feed: &'a Feed, stop: &Stop) -> Option<&'a Stop> {
        self.get_stop(feed, stop.parent_station.as_deref()?)
    }

    /// The stops whose `parent_station` is the given stop
    pub fn children_of<'a>(&self, feed: &'a Feed, stop_id: &str) -> Vec<&'a Stop> {
        pick_all(&feed.stops, self.children.get(stop_id))
    }

    /// Routes operated by an agency
    pub fn routes_of_agency<'a>(&self, feed: &'a Feed, agency_id: &str) -> Vec<&'a Route> {
        pick_all(&feed.routes, self.routes_of_agency.get(agency_id))
    }

    /// Trips running along a route
    pub fn trips_of_route<'a>(&self, feed: &'a Feed, route_id: &str) -> Vec<&'a Trip> {
        pick_all(&feed.trips, self.trips_of_route.get(route_id))
    }

    /// Trips running on a service
    pub fn trips_of_service<'a>(&self, feed: &'a Feed, service_id: &str) -> Vec<&'a Trip> {
        pick_all(&feed.trips, self.trips_of_service.get(service_id))
    }

    /// Stop times of a trip, ordered by `stop_sequence`
    pub fn stop_times_of_trip<'a>(&self, feed: &'a Feed, trip_id: &str) -> Vec<&'a StopTime> {
        pick_all(&feed.stop_times, self.stop_times_of_trip.get(trip_id))
    }

    /// Stop times at a stop
    pub fn stop_times_at_stop<'a>(&self, feed: &'a Feed, stop_id: &str) -> Vec<&'a StopTime> {
        pick_all(&feed.stop_times, self.stop_times_of_stop.get(stop_id))
    }

    /// Gets all [CalendarDate] of a `service_id`
    pub fn get_calendar_dates<'a>(&self, feed: &'a Feed, service_id: &str) -> Vec<&'a CalendarDate> {
        pick_all(&feed.calendar_dates, self.calendar_dates.get(service_id))
    }

    /// Gets all [Shape] points of a `shape_id`, ordered by their sequence
    pub fn get_shape<'a>(&self, feed: &'a Feed, shape_id: &str) -> Vec<&'a Shape> {
        pick_all(&feed.shapes, self.shapes.get(shape_id))
    }

    /// Frequencies of a trip
    pub fn frequencies_of_trip<'a>(&self, feed: &'a Feed, trip_id: &str) -> Vec<&'a Frequency> {
        pick_all(&feed.frequencies, self.frequencies.get(trip_id))
    }

    /// Rules where a fare applies
    pub fn fare_rules_of<'a>(&self, feed: &'a Feed, fare_id: &str) -> Vec<&'a FareRule> {
        pick_all(&feed.fare_rules, self.fare_rules.get(fare_id))
    }

    /// Transfers leaving a stop
    pub fn transfers_from<'a>(&self, feed: &'a Feed, stop_id: &str) -> Vec<&'a Transfer> {
        pick_all(&feed.transfers, self.transfers_from.get(stop_id))
    }
}
