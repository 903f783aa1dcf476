pub use shared::{
    Anchor, Coordinate, Difficulty, GeoPoint, NearbyPoi, PointOfInterest, RouteSummary,
    StartLocation,
};
