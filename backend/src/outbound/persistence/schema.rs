//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations`. Geography columns
//! (`trips.origin`, `trips.destination`, `locations.geom`) have no Diesel SQL
//! type and are only touched through the raw PostGIS statements in the
//! repositories, so they are omitted here.

diesel::table! {
    /// Driver profiles.
    drivers (id) {
        /// Primary key.
        id -> Uuid,
        /// Owning user account.
        user_id -> Uuid,
        /// One of `offline`, `available`, `busy`.
        status -> Text,
        /// Average rider rating.
        rating -> Double,
    }
}

diesel::table! {
    /// Rider-requested trips.
    trips (id) {
        /// Primary key.
        id -> Uuid,
        /// Rider who requested the trip.
        rider_id -> Uuid,
        /// Assigned driver; null until accepted.
        driver_id -> Nullable<Uuid>,
        /// One of `requested`, `accepted`, `started`, `completed`.
        status -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Set when the trip starts.
        started_at -> Nullable<Timestamptz>,
        /// Set when the trip completes.
        ended_at -> Nullable<Timestamptz>,
    }
}
