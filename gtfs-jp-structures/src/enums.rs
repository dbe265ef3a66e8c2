use crate::Error;
use std::fmt;
use std::str::FromStr;

/// Unit in which the distances of the feed (`shape_dist_traveled`) are expressed
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnits {
    /// `ft`
    #[serde(rename = "ft")]
    Feet,
    /// `mi`
    #[serde(rename = "mi")]
    Miles,
    /// `m`
    #[serde(rename = "m")]
    Meters,
    /// `km`
    #[serde(rename = "km")]
    Kilometers,
}

impl DistanceUnits {
    /// All the accepted units
    pub const ALL: [DistanceUnits; 4] = [
        DistanceUnits::Feet,
        DistanceUnits::Miles,
        DistanceUnits::Meters,
        DistanceUnits::Kilometers,
    ];

    /// Abbreviation of the unit
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnits::Feet => "ft",
            DistanceUnits::Miles => "mi",
            DistanceUnits::Meters => "m",
            DistanceUnits::Kilometers => "km",
        }
    }
}

impl FromStr for DistanceUnits {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistanceUnits::ALL
            .iter()
            .find(|u| u.as_str() == s)
            .copied()
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "distance units are required and must be one of ft, mi, m, km, got '{}'",
                    s
                ))
            })
    }
}

impl fmt::Display for DistanceUnits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Describes the kind of [crate::Stop]. See <https://gtfs.org/reference/static/#stopstxt> `location_type`
#[derive(Derivative, Debug, Copy, Clone, PartialEq, Eq)]
#[derivative(Default(bound = ""))]
pub enum LocationType {
    /// Stop (or Platform). A location where passengers board or disembark from a transit vehicle. Is called a platform when defined within a parent_station
    #[derivative(Default)]
    StopPoint,
    /// Station. A physical structure or area that contains one or more platform
    StopArea,
    /// A location where passengers can enter or exit a station from the street
    StationEntrance,
    /// A location within a station, not matching any other [crate::Stop::location_type]
    GenericNode,
    /// A specific location on a platform, where passengers can board and/or alight vehicles
    BoardingArea,
    /// An unknown value
    Unknown(i32),
}

impl From<Option<i32>> for LocationType {
    fn from(value: Option<i32>) -> Self {
        match value {
            None | Some(0) => LocationType::StopPoint,
            Some(1) => LocationType::StopArea,
            Some(2) => LocationType::StationEntrance,
            Some(3) => LocationType::GenericNode,
            Some(4) => LocationType::BoardingArea,
            Some(i) => LocationType::Unknown(i),
        }
    }
}

/// Describes the kind of [crate::Route]. See <https://gtfs.org/reference/static/#routestxt> `route_type`
///
/// Some route types are extended GTFS (<https://developers.google.com/transit/gtfs/reference/extended-route-types)>
#[derive(Debug, Derivative, Copy, Clone, PartialEq, Eq, Hash)]
#[derivative(Default(bound = ""))]
pub enum RouteType {
    /// Tram, Streetcar, Light rail. Any light rail or street level system within a metropolitan area
    Tramway,
    /// Subway, Metro. Any underground rail system within a metropolitan area
    Subway,
    /// Used for intercity or long-distance travel
    Rail,
    /// Used for short- and long-distance bus routes
    #[derivative(Default)]
    Bus,
    /// Used for short- and long-distance boat service
    Ferry,
    /// Used for street-level rail cars where the cable runs beneath the vehicle
    CableCar,
    /// Aerial lift, suspended cable car (e.g., gondola lift, aerial tramway)
    Gondola,
    /// Any rail system designed for steep inclines
    Funicular,
    /// (extended) Used for intercity bus services
    Coach,
    /// (extended) Airplanes
    Air,
    /// (extended) Taxi, Cab
    Taxi,
    /// (extended) any other value
    Other(i32),
}

impl From<i32> for RouteType {
    fn from(i: i32) -> Self {
        let hundreds = i / 100;
        match (i, hundreds) {
            (0, _) | (_, 9) => RouteType::Tramway,
            (1, _) | (_, 4) => RouteType::Subway,
            (2, _) | (_, 1) => RouteType::Rail,
            (3, _) | (_, 7) | (_, 8) => RouteType::Bus,
            (4, _) | (_, 10) | (_, 12) => RouteType::Ferry,
            (5, _) => RouteType::CableCar,
            (6, _) | (_, 13) => RouteType::Gondola,
            (7, _) | (_, 14) => RouteType::Funicular,
            (_, 2) => RouteType::Coach,
            (_, 11) => RouteType::Air,
            (_, 15) => RouteType::Taxi,
            _ => RouteType::Other(i),
        }
    }
}

/// Defines if a [crate::CalendarDate] is added or deleted from a [crate::Calendar]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// There will be a service on that day
    Added,
    /// There won’t be a service on that day
    Deleted,
    /// Any other value
    Unknown(i32),
}

impl From<i32> for Exception {
    fn from(i: i32) -> Self {
        match i {
            1 => Exception::Added,
            2 => Exception::Deleted,
            i => Exception::Unknown(i),
        }
    }
}

#[test]
fn distance_units_are_a_closed_set() {
    assert_eq!(DistanceUnits::Kilometers, "km".parse().unwrap());
    assert_eq!(DistanceUnits::Feet, "ft".parse().unwrap());
    assert!(matches!(
        "yd".parse::<DistanceUnits>(),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!("KM".parse::<DistanceUnits>().is_err());
}

#[test]
fn extended_route_types() {
    assert_eq!(RouteType::Bus, RouteType::from(3));
    assert_eq!(RouteType::Bus, RouteType::from(704));
    assert_eq!(RouteType::Coach, RouteType::from(200));
    assert_eq!(RouteType::Other(42), RouteType::from(42));
}
