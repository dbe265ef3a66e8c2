pub use crate::enums::*;
use crate::error::FieldError;
use crate::fields::*;
use crate::schema::TableName;
use crate::serde_helpers::*;
use crate::table_parser::{RowView, Value};
use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;

/// A typed row of one of the tables of the feed
///
/// [Record::to_values] must return the values in the order of the canonical columns of [Record::TABLE].
pub trait Record: Clone + fmt::Debug + Sized {
    /// The table holding the records
    const TABLE: TableName;

    /// Builds the record from a parsed row, without looking at any other table
    fn from_row(row: &RowView) -> Result<Self, FieldError>;

    /// Values of the record, in the order of the canonical columns
    fn to_values(&self) -> Vec<Value>;

    /// Values that must be unique within the table
    fn key(&self) -> Vec<Value>;

    /// Identifier referenced by the other tables, if any
    fn id(&self) -> Option<&str> {
        None
    }

    /// Foreign keys of the record that are not null
    fn references(&self) -> Vec<Reference<'_>> {
        Vec::new()
    }
}

/// A foreign key held by a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Column holding the key
    pub field: &'static str,
    /// The table where a record with this [Record::id] must exist
    pub target: TableName,
    /// The key
    pub value: &'a str,
}

fn reference<'a>(
    field: &'static str,
    target: TableName,
    value: Option<&'a String>,
) -> Option<Reference<'a>> {
    value.map(|v| Reference {
        field,
        target,
        value: v.as_str(),
    })
}

fn s(v: &str) -> Value {
    Value::Str(v.to_owned())
}

fn opt(v: &Option<String>) -> Value {
    v.clone().into()
}

/// General informations about the agency running the network. See <https://gtfs.org/reference/static/#agencytxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Agency {
    /// Unique technical (not for the traveller) identifier for the Agency
    #[serde(rename = "agency_id")]
    pub id: String,
    ///Full name of the transit agency
    #[serde(rename = "agency_name")]
    pub name: String,
    /// URL of the transit agency
    #[serde(rename = "agency_url")]
    pub url: String,
    /// Timezone where the transit agency is located, `Asia/Tokyo` when not given
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    /// Primary language used by this transit agency, `ja` when not given
    #[serde(rename = "agency_lang")]
    pub lang: String,
    /// A voice telephone number for the specified agency
    #[serde(rename = "agency_phone")]
    pub phone: Option<String>,
    /// URL of a web page that allows a rider to purchase tickets online
    #[serde(rename = "agency_fare_url")]
    pub fare_url: Option<String>,
    /// Email address actively monitored by the agency’s customer service department
    #[serde(rename = "agency_email")]
    pub email: Option<String>,
}

impl Record for Agency {
    const TABLE: TableName = TableName::Agency;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            id: required_text(row, "agency_id")?,
            name: required_text(row, "agency_name")?,
            url: required_text(row, "agency_url")?,
            timezone: text_or(row, "agency_timezone", "Asia/Tokyo"),
            lang: text_or(row, "agency_lang", "ja"),
            phone: text(row, "agency_phone"),
            fare_url: text(row, "agency_fare_url"),
            email: text(row, "agency_email"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.id),
            s(&self.name),
            s(&self.url),
            s(&self.timezone),
            s(&self.lang),
            opt(&self.phone),
            opt(&self.fare_url),
            opt(&self.email),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.id)]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Registered office of an [Agency] (GTFS-JP `agency_jp.txt`)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AgencyJp {
    /// The [Agency] described
    pub agency_id: String,
    /// Official registered name
    #[serde(rename = "agency_official_name")]
    pub official_name: Option<String>,
    /// Postal code of the registered office
    #[serde(rename = "agency_zip_number")]
    pub zip_number: Option<String>,
    /// Address of the registered office
    #[serde(rename = "agency_address")]
    pub address: Option<String>,
    /// Title of the representative
    #[serde(rename = "agency_president_pos")]
    pub president_pos: Option<String>,
    /// Name of the representative
    #[serde(rename = "agency_president_name")]
    pub president_name: Option<String>,
}

impl Record for AgencyJp {
    const TABLE: TableName = TableName::AgencyJp;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            agency_id: required_text(row, "agency_id")?,
            official_name: text(row, "agency_official_name"),
            zip_number: text(row, "agency_zip_number"),
            address: text(row, "agency_address"),
            president_pos: text(row, "agency_president_pos"),
            president_name: text(row, "agency_president_name"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.agency_id),
            opt(&self.official_name),
            opt(&self.zip_number),
            opt(&self.address),
            opt(&self.president_pos),
            opt(&self.president_name),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.agency_id)]
    }

    fn references(&self) -> Vec<Reference<'_>> {
        reference("agency_id", TableName::Agency, Some(&self.agency_id))
            .into_iter()
            .collect()
    }
}

/// A physical stop, station or area. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Stop {
    /// Unique technical identifier (not for the traveller) of the stop
    #[serde(rename = "stop_id")]
    pub id: String,
    /// Short text or a number that identifies the location for riders
    #[serde(rename = "stop_code")]
    pub code: Option<String>,
    ///Name of the location. Use a name that people will understand in the local and tourist vernacular
    #[serde(rename = "stop_name")]
    pub name: String,
    /// Description of the location that provides useful, quality information
    #[serde(rename = "stop_desc")]
    pub description: Option<String>,
    /// Latitude of the stop
    #[serde(rename = "stop_lat")]
    pub latitude: f64,
    /// Longitude of the stop
    #[serde(rename = "stop_lon")]
    pub longitude: f64,
    /// Identifies the fare zone for a stop
    pub zone_id: Option<String>,
    /// URL of a web page about the location
    #[serde(rename = "stop_url")]
    pub url: Option<String>,
    /// Type of the location, see [Stop::location_type]
    #[serde(rename = "location_type")]
    pub location_type_code: Option<i32>,
    /// The station containing this stop, another row of the same table
    pub parent_station: Option<String>,
    /// Timezone of the location
    #[serde(rename = "stop_timezone")]
    pub timezone: Option<String>,
    /// Indicates whether wheelchair boardings are possible from the location
    pub wheelchair_boarding: Option<i32>,
}

impl Stop {
    /// Type of the location
    pub fn location_type(&self) -> LocationType {
        LocationType::from(self.location_type_code)
    }
}

impl Record for Stop {
    const TABLE: TableName = TableName::Stops;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            id: required_text(row, "stop_id")?,
            code: text(row, "stop_code"),
            name: required_text(row, "stop_name")?,
            description: text(row, "stop_desc"),
            latitude: required_float(row, "stop_lat")?,
            longitude: required_float(row, "stop_lon")?,
            zone_id: text(row, "zone_id"),
            url: text(row, "stop_url"),
            location_type_code: int32(row, "location_type"),
            parent_station: text(row, "parent_station"),
            timezone: text(row, "stop_timezone"),
            wheelchair_boarding: int32(row, "wheelchair_boarding"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.id),
            opt(&self.code),
            s(&self.name),
            opt(&self.description),
            Value::Float(self.latitude),
            Value::Float(self.longitude),
            opt(&self.zone_id),
            opt(&self.url),
            self.location_type_code.into(),
            opt(&self.parent_station),
            opt(&self.timezone),
            self.wheelchair_boarding.into(),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.id)]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn references(&self) -> Vec<Reference<'_>> {
        reference(
            "parent_station",
            TableName::Stops,
            self.parent_station.as_ref(),
        )
        .into_iter()
        .collect()
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A route is a commercial line (there can be various stop sequences for a same line). See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Route {
    /// Unique technical (not for the traveller) identifier for the route
    #[serde(rename = "route_id")]
    pub id: String,
    /// Agency operating the route
    pub agency_id: String,
    /// Short name of a route, like "32" or "Green"
    #[serde(rename = "route_short_name")]
    pub short_name: Option<String>,
    /// Full name of a route, often including the destination or stop
    #[serde(rename = "route_long_name")]
    pub long_name: Option<String>,
    /// Description of a route that provides useful, quality information
    #[serde(rename = "route_desc")]
    pub desc: Option<String>,
    /// Indicates the type of transportation used on a route, 3 (bus) when not given
    #[serde(rename = "route_type")]
    pub route_type_code: i32,
    /// URL of a web page about the particular route
    #[serde(rename = "route_url")]
    pub url: Option<String>,
    /// Route color designation that matches public facing material
    #[serde(rename = "route_color")]
    pub color: Option<String>,
    /// Legible color to use for text drawn against a background of [Route::color]
    #[serde(rename = "route_text_color")]
    pub text_color: Option<String>,
    /// Route grouping this route in the timetables of the operator
    #[serde(rename = "jp_parent_route_id")]
    pub parent_route_id: Option<String>,
}

impl Route {
    /// Indicates the type of transportation used on a route
    pub fn route_type(&self) -> RouteType {
        RouteType::from(self.route_type_code)
    }
}

impl Record for Route {
    const TABLE: TableName = TableName::Routes;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        let route = Self {
            id: required_text(row, "route_id")?,
            agency_id: required_text(row, "agency_id")?,
            short_name: text(row, "route_short_name"),
            long_name: text(row, "route_long_name"),
            desc: text(row, "route_desc"),
            route_type_code: int32(row, "route_type").unwrap_or(3),
            url: text(row, "route_url"),
            color: text(row, "route_color"),
            text_color: text(row, "route_text_color"),
            parent_route_id: text(row, "jp_parent_route_id"),
        };
        if route.short_name.is_none() && route.long_name.is_none() {
            return Err(FieldError::missing("route_long_name"));
        }
        Ok(route)
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.id),
            s(&self.agency_id),
            opt(&self.short_name),
            opt(&self.long_name),
            opt(&self.desc),
            Value::Int32(self.route_type_code),
            opt(&self.url),
            opt(&self.color),
            opt(&self.text_color),
            opt(&self.parent_route_id),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.id)]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn references(&self) -> Vec<Reference<'_>> {
        reference("agency_id", TableName::Agency, Some(&self.agency_id))
            .into_iter()
            .collect()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.long_name, &self.short_name) {
            (Some(name), _) | (None, Some(name)) => write!(f, "{}", name),
            (None, None) => write!(f, "{}", self.id),
        }
    }
}

/// A Trip is a vehicle that follows a sequence of [StopTime] on certain days. See <https://gtfs.org/reference/static/#tripstxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Trip {
    /// Unique technical identifier (not for the traveller) for the Trip
    #[serde(rename = "trip_id")]
    pub id: String,
    /// References along which [Route] this trip runs
    pub route_id: String,
    /// References the [Calendar] on which this trip runs
    pub service_id: String,
    /// Text that appears on signage identifying the trip's destination to riders
    pub trip_headsign: Option<String>,
    /// Public facing text used to identify the trip to riders
    pub trip_short_name: Option<String>,
    /// Indicates the direction of travel for a trip
    pub direction_id: Option<i32>,
    /// Identifies the block to which the trip belongs
    pub block_id: Option<String>,
    /// [Shape] of the trip
    pub shape_id: Option<String>,
    /// Indicates wheelchair accessibility
    pub wheelchair_accessible: Option<i32>,
    /// Indicates whether bikes are allowed
    pub bikes_allowed: Option<i32>,
    /// Free description of the trip shown in the timetables
    #[serde(rename = "jp_trip_desc")]
    pub desc: Option<String>,
    /// Symbol shown next to the trip in the timetables
    #[serde(rename = "jp_trip_desc_symbol")]
    pub desc_symbol: Option<String>,
    /// [OfficeJp] operating the trip
    #[serde(rename = "jp_office_id")]
    pub office_id: Option<String>,
    /// [PatternJp] followed by the trip
    #[serde(rename = "jp_pattern_id")]
    pub pattern_id: Option<String>,
}

impl Record for Trip {
    const TABLE: TableName = TableName::Trips;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            id: required_text(row, "trip_id")?,
            route_id: required_text(row, "route_id")?,
            service_id: required_text(row, "service_id")?,
            trip_headsign: text(row, "trip_headsign"),
            trip_short_name: text(row, "trip_short_name"),
            direction_id: int32(row, "direction_id"),
            block_id: text(row, "block_id"),
            shape_id: text(row, "shape_id"),
            wheelchair_accessible: int32(row, "wheelchair_accessible"),
            bikes_allowed: int32(row, "bikes_allowed"),
            desc: text(row, "jp_trip_desc"),
            desc_symbol: text(row, "jp_trip_desc_symbol"),
            office_id: text(row, "jp_office_id"),
            pattern_id: text(row, "jp_pattern_id"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.route_id),
            s(&self.service_id),
            s(&self.id),
            opt(&self.trip_headsign),
            opt(&self.trip_short_name),
            self.direction_id.into(),
            opt(&self.block_id),
            opt(&self.shape_id),
            self.wheelchair_accessible.into(),
            self.bikes_allowed.into(),
            opt(&self.desc),
            opt(&self.desc_symbol),
            opt(&self.office_id),
            opt(&self.pattern_id),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.id)]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn references(&self) -> Vec<Reference<'_>> {
        [
            reference("route_id", TableName::Routes, Some(&self.route_id)),
            reference("service_id", TableName::Calendar, Some(&self.service_id)),
            reference("shape_id", TableName::Shapes, self.shape_id.as_ref()),
            reference("jp_office_id", TableName::OfficeJp, self.office_id.as_ref()),
            reference("jp_pattern_id", TableName::PatternJp, self.pattern_id.as_ref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "route id: {}, service id: {}",
            self.route_id, self.service_id
        )
    }
}

/// Operating office of the trips (GTFS-JP `office_jp.txt`)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OfficeJp {
    /// Unique identifier of the office
    #[serde(rename = "office_id")]
    pub id: String,
    /// Name of the office
    #[serde(rename = "office_name")]
    pub name: String,
    /// URL of the office
    #[serde(rename = "office_url")]
    pub url: Option<String>,
    /// Phone number of the office
    #[serde(rename = "office_phone")]
    pub phone: Option<String>,
}

impl Record for OfficeJp {
    const TABLE: TableName = TableName::OfficeJp;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            id: required_text(row, "office_id")?,
            name: required_text(row, "office_name")?,
            url: text(row, "office_url"),
            phone: text(row, "office_phone"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![s(&self.id), s(&self.name), opt(&self.url), opt(&self.phone)]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.id)]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Stopping pattern of the trips (GTFS-JP `pattern_jp.txt`)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PatternJp {
    /// Unique identifier of the pattern
    #[serde(rename = "jp_pattern_id")]
    pub id: String,
    /// Date of the last change of the route
    pub route_update_date: Option<String>,
    /// Name of the first stop
    pub origin_stop: Option<String>,
    /// Name of a notable intermediate stop
    pub via_stop: Option<String>,
    /// Name of the last stop
    pub destination_stop: Option<String>,
}

impl Record for PatternJp {
    const TABLE: TableName = TableName::PatternJp;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            id: required_text(row, "jp_pattern_id")?,
            route_update_date: text(row, "route_update_date"),
            origin_stop: text(row, "origin_stop"),
            via_stop: text(row, "via_stop"),
            destination_stop: text(row, "destination_stop"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.id),
            opt(&self.route_update_date),
            opt(&self.origin_stop),
            opt(&self.via_stop),
            opt(&self.destination_stop),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.id)]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// The moment where a vehicle, running on [Trip] stops at a [Stop]. See <https://gtfs.org/reference/static/#stop_timestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StopTime {
    /// [Trip] to which this stop time belongs to
    pub trip_id: String,
    /// Arrival time of the stop time, in seconds after midnight.
    /// It's an option since the intermediate stops can have have no arrival
    #[serde(
        deserialize_with = "deserialize_optional_time",
        serialize_with = "serialize_optional_time"
    )]
    pub arrival_time: Option<u32>,
    /// Departure time of the stop time, in seconds after midnight
    #[serde(
        deserialize_with = "deserialize_optional_time",
        serialize_with = "serialize_optional_time"
    )]
    pub departure_time: Option<u32>,
    /// Identifier of the [Stop] where the vehicle stops
    pub stop_id: String,
    /// Order of stops for a particular trip. The values must increase along the trip but do not need to be consecutive
    pub stop_sequence: i32,
    /// Text that appears on signage identifying the trip's destination to riders
    pub stop_headsign: Option<String>,
    /// Indicates pickup method
    pub pickup_type: Option<i32>,
    /// Indicates drop off method
    pub drop_off_type: Option<i32>,
    /// Actual distance traveled along the associated shape, in the [DistanceUnits] of the feed
    pub shape_dist_traveled: Option<f64>,
    /// Indicates if arrival and departure times for a stop are strictly adhered to by the vehicle
    pub timepoint: Option<i32>,
}

impl Record for StopTime {
    const TABLE: TableName = TableName::StopTimes;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            trip_id: required_text(row, "trip_id")?,
            arrival_time: time(row, "arrival_time")?,
            departure_time: time(row, "departure_time")?,
            stop_id: required_text(row, "stop_id")?,
            stop_sequence: required_int32(row, "stop_sequence")?,
            stop_headsign: text(row, "stop_headsign"),
            pickup_type: int32(row, "pickup_type"),
            drop_off_type: int32(row, "drop_off_type"),
            shape_dist_traveled: float(row, "shape_dist_traveled"),
            timepoint: int32(row, "timepoint"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.trip_id),
            self.arrival_time.map(format_time).into(),
            self.departure_time.map(format_time).into(),
            s(&self.stop_id),
            Value::Int32(self.stop_sequence),
            opt(&self.stop_headsign),
            self.pickup_type.into(),
            self.drop_off_type.into(),
            self.shape_dist_traveled.into(),
            self.timepoint.into(),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.trip_id), Value::Int32(self.stop_sequence)]
    }

    fn references(&self) -> Vec<Reference<'_>> {
        [
            reference("trip_id", TableName::Trips, Some(&self.trip_id)),
            reference("stop_id", TableName::Stops, Some(&self.stop_id)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// A calender describes on which days the vehicle runs. See <https://gtfs.org/reference/static/#calendartxt>
///
/// The days are kept as the 0/1 integers of the file
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Calendar {
    /// Unique technical identifier (not for the traveller) of this calendar
    #[serde(rename = "service_id")]
    pub id: String,
    /// Does the service run on mondays
    pub monday: i32,
    /// Does the service run on tuesdays
    pub tuesday: i32,
    /// Does the service run on wednesdays
    pub wednesday: i32,
    /// Does the service run on thursdays
    pub thursday: i32,
    /// Does the service run on fridays
    pub friday: i32,
    /// Does the service run on saturdays
    pub saturday: i32,
    /// Does the service run on sundays
    pub sunday: i32,
    /// Start service day for the service interval
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub start_date: NaiveDate,
    /// End service day for the service interval. This service day is included in the interval
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub end_date: NaiveDate,
}

impl Calendar {
    /// Returns true if there is a service running on that day of the week
    pub fn valid_weekday(&self, date: NaiveDate) -> bool {
        let flag = match date.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        };
        flag == 1
    }
}

impl Record for Calendar {
    const TABLE: TableName = TableName::Calendar;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            id: required_text(row, "service_id")?,
            monday: required_flag(row, "monday")?,
            tuesday: required_flag(row, "tuesday")?,
            wednesday: required_flag(row, "wednesday")?,
            thursday: required_flag(row, "thursday")?,
            friday: required_flag(row, "friday")?,
            saturday: required_flag(row, "saturday")?,
            sunday: required_flag(row, "sunday")?,
            start_date: required_date(row, "start_date")?,
            end_date: required_date(row, "end_date")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.id),
            Value::Int32(self.monday),
            Value::Int32(self.tuesday),
            Value::Int32(self.wednesday),
            Value::Int32(self.thursday),
            Value::Int32(self.friday),
            Value::Int32(self.saturday),
            Value::Int32(self.sunday),
            Value::Str(format_date(&self.start_date)),
            Value::Str(format_date(&self.end_date)),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.id)]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.start_date, self.end_date)
    }
}

/// Defines a specific date that can be added or removed from a [Calendar]. See <https://gtfs.org/reference/static/#calendar_datestxt>
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CalendarDate {
    /// Identifier of the service that is modified at this date
    pub service_id: String,
    /// Date where the service will be added or deleted
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub date: NaiveDate,
    /// Is the service added (1) or deleted (2), see [CalendarDate::exception]
    pub exception_type: i32,
}

impl CalendarDate {
    /// Is the service added or deleted
    pub fn exception(&self) -> Exception {
        Exception::from(self.exception_type)
    }
}

impl Record for CalendarDate {
    const TABLE: TableName = TableName::CalendarDates;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            service_id: required_text(row, "service_id")?,
            date: required_date(row, "date")?,
            exception_type: required_int32(row, "exception_type")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.service_id),
            Value::Str(format_date(&self.date)),
            Value::Int32(self.exception_type),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.service_id), Value::Str(format_date(&self.date))]
    }

    fn references(&self) -> Vec<Reference<'_>> {
        reference("service_id", TableName::Calendar, Some(&self.service_id))
            .into_iter()
            .collect()
    }
}

/// Defines one possible fare. See <https://gtfs.org/reference/static/#fare_attributestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FareAttribute {
    /// Unique technical (not for the traveller) identifier for the FareAttribute
    #[serde(rename = "fare_id")]
    pub id: String,
    /// Fare price, in the unit specified by [FareAttribute::currency]
    pub price: f64,
    /// Currency used to pay the fare, `JPY` when not given
    #[serde(rename = "currency_type")]
    pub currency: String,
    ///Indicates when the fare must be paid
    pub payment_method: i32,
    /// Indicates the number of transfers permitted on this fare, None for unlimited transfers
    pub transfers: Option<i32>,
    /// Length of time in seconds before a transfer expires
    pub transfer_duration: Option<i16>,
}

impl Record for FareAttribute {
    const TABLE: TableName = TableName::FareAttributes;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            id: required_text(row, "fare_id")?,
            price: required_float(row, "price")?,
            currency: text_or(row, "currency_type", "JPY"),
            payment_method: required_int32(row, "payment_method")?,
            transfers: int32(row, "transfers"),
            transfer_duration: int16(row, "transfer_duration"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.id),
            Value::Float(self.price),
            s(&self.currency),
            Value::Int32(self.payment_method),
            self.transfers.into(),
            self.transfer_duration.into(),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.id)]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Defines to which journeys a [FareAttribute] applies. See <https://gtfs.org/reference/static/#fare_rulestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FareRule {
    /// The [FareAttribute] applied
    pub fare_id: String,
    /// The [Route] on which the fare applies
    pub route_id: Option<String>,
    /// Fare zone of the departure
    pub origin_id: Option<String>,
    /// Fare zone of the arrival
    pub destination_id: Option<String>,
    /// Fare zone crossed by the journey
    pub contains_id: Option<String>,
}

impl Record for FareRule {
    const TABLE: TableName = TableName::FareRules;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            fare_id: required_text(row, "fare_id")?,
            route_id: text(row, "route_id"),
            origin_id: text(row, "origin_id"),
            destination_id: text(row, "destination_id"),
            contains_id: text(row, "contains_id"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.fare_id),
            opt(&self.route_id),
            opt(&self.origin_id),
            opt(&self.destination_id),
            opt(&self.contains_id),
        ]
    }

    fn key(&self) -> Vec<Value> {
        self.to_values()
    }

    fn references(&self) -> Vec<Reference<'_>> {
        [
            reference("fare_id", TableName::FareAttributes, Some(&self.fare_id)),
            reference("route_id", TableName::Routes, self.route_id.as_ref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// A single geographical point decribing the shape of a [Trip]. See <https://gtfs.org/reference/static/#shapestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Shape {
    /// Technical identifier shared by all the points of the shape
    #[serde(rename = "shape_id")]
    pub id: String,
    /// Latitude of a shape point
    #[serde(rename = "shape_pt_lat")]
    pub latitude: f64,
    /// Longitude of a shape point
    #[serde(rename = "shape_pt_lon")]
    pub longitude: f64,
    /// Sequence in which the shape points connect to form the shape
    #[serde(rename = "shape_pt_sequence")]
    pub sequence: i32,
    /// Distance traveled along the shape from the first shape point, in the [DistanceUnits] of the feed
    #[serde(rename = "shape_dist_traveled")]
    pub dist_traveled: Option<f64>,
}

impl Record for Shape {
    const TABLE: TableName = TableName::Shapes;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            id: required_text(row, "shape_id")?,
            latitude: required_float(row, "shape_pt_lat")?,
            longitude: required_float(row, "shape_pt_lon")?,
            sequence: required_int32(row, "shape_pt_sequence")?,
            dist_traveled: float(row, "shape_dist_traveled"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.id),
            Value::Float(self.latitude),
            Value::Float(self.longitude),
            Value::Int32(self.sequence),
            self.dist_traveled.into(),
        ]
    }

    // The profile keys a point by its coordinates, not by its sequence: a shape passing twice
    // through the same coordinates keeps only its first point. Kept as declared until the
    // authors of the profile confirm which key is intended.
    fn key(&self) -> Vec<Value> {
        vec![
            s(&self.id),
            Value::Float(self.latitude),
            Value::Float(self.longitude),
        ]
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Timetables can be defined by the frequency of their vehicles. See <https://gtfs.org/reference/static/#frequenciestxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Frequency {
    /// References the [Trip] that uses frequency
    pub trip_id: String,
    /// Time at which the first vehicle departs from the first stop of the trip
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub start_time: u32,
    /// Time at which service changes to a different headway (or ceases) at the first stop in the trip
    #[serde(
        deserialize_with = "deserialize_time",
        serialize_with = "serialize_time"
    )]
    pub end_time: u32,
    /// Time, in seconds, between departures from the same stop (headway) for the trip
    pub headway_secs: i16,
    /// Indicates the type of service for a trip
    pub exact_times: Option<i32>,
}

impl Record for Frequency {
    const TABLE: TableName = TableName::Frequencies;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            trip_id: required_text(row, "trip_id")?,
            start_time: required_time(row, "start_time")?,
            end_time: required_time(row, "end_time")?,
            headway_secs: required_int16(row, "headway_secs")?,
            exact_times: int32(row, "exact_times"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.trip_id),
            Value::Str(format_time(self.start_time)),
            Value::Str(format_time(self.end_time)),
            Value::Int16(self.headway_secs),
            self.exact_times.into(),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.trip_id), Value::Str(format_time(self.start_time))]
    }

    fn references(&self) -> Vec<Reference<'_>> {
        reference("trip_id", TableName::Trips, Some(&self.trip_id))
            .into_iter()
            .collect()
    }
}

/// Transfer information between stops. See <https://gtfs.org/reference/static/#transferstxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transfer {
    /// Stop from which to leave
    pub from_stop_id: String,
    /// Stop which to transfer to
    pub to_stop_id: String,
    /// Type of the transfer
    pub transfer_type: i32,
    /// Minimum time needed to make the transfer in seconds
    pub min_transfer_time: Option<i16>,
}

impl Record for Transfer {
    const TABLE: TableName = TableName::Transfers;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            from_stop_id: required_text(row, "from_stop_id")?,
            to_stop_id: required_text(row, "to_stop_id")?,
            transfer_type: required_int32(row, "transfer_type")?,
            min_transfer_time: int16(row, "min_transfer_time"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.from_stop_id),
            s(&self.to_stop_id),
            Value::Int32(self.transfer_type),
            self.min_transfer_time.into(),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.from_stop_id), s(&self.to_stop_id)]
    }

    fn references(&self) -> Vec<Reference<'_>> {
        [
            reference("from_stop_id", TableName::Stops, Some(&self.from_stop_id)),
            reference("to_stop_id", TableName::Stops, Some(&self.to_stop_id)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Meta-data about the feed. See <https://gtfs.org/reference/static/#feed_infotxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FeedInfo {
    /// Full name of the organization that publishes the dataset.
    #[serde(rename = "feed_publisher_name")]
    pub name: String,
    /// URL of the dataset publishing organization's website
    #[serde(rename = "feed_publisher_url")]
    pub url: String,
    /// Default language used for the text in this dataset, `ja` when not given
    #[serde(rename = "feed_lang")]
    pub lang: String,
    /// The dataset provides complete and reliable schedule information for service in the period from this date
    #[serde(
        deserialize_with = "deserialize_option_date",
        serialize_with = "serialize_option_date",
        rename = "feed_start_date",
        default
    )]
    pub start_date: Option<NaiveDate>,
    ///The dataset provides complete and reliable schedule information for service in the period until this date
    #[serde(
        deserialize_with = "deserialize_option_date",
        serialize_with = "serialize_option_date",
        rename = "feed_end_date",
        default
    )]
    pub end_date: Option<NaiveDate>,
    /// String that indicates the current version of their dataset
    #[serde(rename = "feed_version")]
    pub version: Option<String>,
}

impl Record for FeedInfo {
    const TABLE: TableName = TableName::FeedInfo;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            name: required_text(row, "feed_publisher_name")?,
            url: required_text(row, "feed_publisher_url")?,
            lang: text_or(row, "feed_lang", "ja"),
            start_date: date(row, "feed_start_date")?,
            end_date: date(row, "feed_end_date")?,
            version: text(row, "feed_version"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.name),
            s(&self.url),
            s(&self.lang),
            self.start_date.as_ref().map(format_date).into(),
            self.end_date.as_ref().map(format_date).into(),
            opt(&self.version),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![s(&self.name)]
    }
}

impl fmt::Display for FeedInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Translation of a text of the feed. See <https://gtfs.org/reference/static/#translationstxt>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Translation {
    /// Table holding the translated text
    pub table_name: String,
    /// Column holding the translated text
    pub field_name: String,
    /// Language of the translation
    pub language: String,
    /// The translated text
    pub translation: String,
    /// Record holding the translated text
    pub record_id: Option<String>,
    /// Second part of the key of the record, for tables with a composite key
    pub record_sub_id: Option<String>,
    /// Translated text, when the translation applies to every record holding it
    pub field_value: Option<String>,
}

impl Record for Translation {
    const TABLE: TableName = TableName::Translations;

    fn from_row(row: &RowView) -> Result<Self, FieldError> {
        Ok(Self {
            table_name: required_text(row, "table_name")?,
            field_name: required_text(row, "field_name")?,
            language: required_text(row, "language")?,
            translation: required_text(row, "translation")?,
            record_id: text(row, "record_id"),
            record_sub_id: text(row, "record_sub_id"),
            field_value: text(row, "field_value"),
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            s(&self.table_name),
            s(&self.field_name),
            s(&self.language),
            s(&self.translation),
            opt(&self.record_id),
            opt(&self.record_sub_id),
            opt(&self.field_value),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![
            s(&self.table_name),
            s(&self.field_name),
            s(&self.language),
            opt(&self.record_id),
            opt(&self.record_sub_id),
            opt(&self.field_value),
        ]
    }
}
