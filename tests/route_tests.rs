use bustrack::{
    route::{Error, RouteDescriptor, Stop},
    shared::Coordinate,
};

const DETAILS: &str = r#"{
    "stops": { "stops": [
        { "name": "Majestic", "latitude": 12.9767, "longitude": 77.5713 },
        { "name": "Corporation", "latitude": 12.9634, "longitude": 77.5855 }
    ] },
    "route_polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
    "bus": { "id": 42, "current_latitude": 12.97, "current_longitude": 77.58 }
}"#;

#[test]
fn parses_route_details() {
    let route = RouteDescriptor::from_route_details(DETAILS).unwrap();
    assert_eq!(route.stops().len(), 2);
    assert_eq!(route.first_stop().name.as_ref(), "Majestic");
    assert_eq!(route.vehicle_id(), "42");
    assert_eq!(route.initial_position(), Coordinate::new(12.97, 77.58));
    assert_eq!(route.decode_path().unwrap().len(), 3);
}

#[test]
fn parses_wrapped_route_details() {
    let wrapped = format!(r#"{{ "route": {DETAILS} }}"#);
    let route = RouteDescriptor::from_route_details(&wrapped).unwrap();
    assert_eq!(route.vehicle_id(), "42");
}

#[test]
fn rejects_routes_without_stops() {
    let empty = DETAILS.replace(
        r#"{ "name": "Majestic", "latitude": 12.9767, "longitude": 77.5713 },
        { "name": "Corporation", "latitude": 12.9634, "longitude": 77.5855 }"#,
        "",
    );
    assert!(matches!(
        RouteDescriptor::from_route_details(&empty),
        Err(Error::NoStops)
    ));
}

#[test]
fn rejects_malformed_json() {
    assert!(matches!(
        RouteDescriptor::from_route_details("{\"stops\":"),
        Err(Error::Json(_))
    ));
}

#[test]
fn validates_descriptor_fields() {
    let stops = || vec![Stop::new("Majestic", 12.9767, 77.5713)];
    let start = Coordinate::new(12.97, 77.58);

    assert!(matches!(
        RouteDescriptor::new(vec![Stop::new("Nowhere", 120.0, 0.0)], "", "bus-1", start),
        Err(Error::InvalidStop { index: 0, .. })
    ));
    assert!(matches!(
        RouteDescriptor::new(stops(), "", " ", start),
        Err(Error::MissingVehicleId)
    ));
    assert!(matches!(
        RouteDescriptor::new(stops(), "", "bus-1", Coordinate::new(0.0, 200.0)),
        Err(Error::InvalidInitialPosition(_))
    ));
    assert!(RouteDescriptor::new(stops(), "", "bus-1", start).is_ok());
}
