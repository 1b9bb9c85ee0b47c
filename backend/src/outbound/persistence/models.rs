//! Row types returned by raw PostGIS statements.
//!
//! These are internal to the persistence layer. Conversion into domain types
//! validates every field, so a malformed row is reported rather than trusted.

use diesel::QueryableByName;
use diesel::sql_types::{Double, Nullable, Text, Uuid as SqlUuid};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    DriverId, GeoPoint, NearbyDriver, TripId, TripStatus, TripStatusChange, UserId,
};

/// Row returned by a lifecycle `UPDATE ... RETURNING`.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct TripTransitionRow {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = Nullable<SqlUuid>)]
    pub driver_id: Option<Uuid>,
    #[diesel(sql_type = Text)]
    pub status: String,
}

impl TripTransitionRow {
    /// Convert into the domain change, reporting `applied` when the stored
    /// status text cannot be decoded.
    ///
    /// The row only exists once the conditional update has committed, so the
    /// transition's target status is authoritative either way.
    pub(crate) fn into_change(self, applied: TripStatus) -> TripStatusChange {
        let status = self.status.parse::<TripStatus>().unwrap_or_else(|err| {
            warn!(trip_id = %self.id, error = %err, "undecodable status on applied transition");
            applied
        });
        TripStatusChange {
            trip_id: TripId::from_uuid(self.id),
            driver_id: self.driver_id.map(DriverId::from_uuid),
            status,
        }
    }
}

/// Candidate row from the proximity query.
///
/// Every column is nullable so one bad row decodes as `None`s and can be
/// skipped without failing the whole result set.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct NearbyDriverRow {
    #[diesel(sql_type = Nullable<SqlUuid>)]
    pub driver_id: Option<Uuid>,
    #[diesel(sql_type = Nullable<SqlUuid>)]
    pub user_id: Option<Uuid>,
    #[diesel(sql_type = Nullable<Double>)]
    pub distance_m: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub lat: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub lng: Option<f64>,
}

impl TryFrom<NearbyDriverRow> for NearbyDriver {
    type Error = String;

    fn try_from(row: NearbyDriverRow) -> Result<Self, Self::Error> {
        let driver_id = row.driver_id.ok_or("driver_id is null")?;
        let user_id = row.user_id.ok_or("user_id is null")?;
        let distance_m = row
            .distance_m
            .filter(|d| d.is_finite())
            .ok_or("distance_m is null or non-finite")?;
        let (Some(lat), Some(lng)) = (row.lat, row.lng) else {
            return Err("position is null".to_owned());
        };
        let position = GeoPoint::new(lat, lng).map_err(|err| err.to_string())?;

        Ok(Self {
            driver_id: DriverId::from_uuid(driver_id),
            user_id: UserId::from_uuid(user_id),
            distance_m,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn transition_row() -> TripTransitionRow {
        TripTransitionRow {
            id: Uuid::new_v4(),
            driver_id: Some(Uuid::new_v4()),
            status: "accepted".to_owned(),
        }
    }

    #[rstest]
    fn transition_row_converts(transition_row: TripTransitionRow) {
        let trip_id = transition_row.id;
        let change = transition_row.into_change(TripStatus::Accepted);
        assert_eq!(change.trip_id, TripId::from_uuid(trip_id));
        assert_eq!(change.status, TripStatus::Accepted);
        assert!(change.driver_id.is_some());
    }

    #[rstest]
    fn undecodable_status_reports_the_applied_target(mut transition_row: TripTransitionRow) {
        transition_row.status = "cancelled".to_owned();
        let change = transition_row.into_change(TripStatus::Completed);
        assert_eq!(change.status, TripStatus::Completed);
    }

    #[rstest]
    fn nearby_row_with_null_position_is_rejected() {
        let row = NearbyDriverRow {
            driver_id: Some(Uuid::new_v4()),
            user_id: Some(Uuid::new_v4()),
            distance_m: Some(12.0),
            lat: None,
            lng: Some(0.0),
        };
        assert!(NearbyDriver::try_from(row).is_err());
    }

    #[rstest]
    fn nearby_row_converts() {
        let row = NearbyDriverRow {
            driver_id: Some(Uuid::new_v4()),
            user_id: Some(Uuid::new_v4()),
            distance_m: Some(12.0),
            lat: Some(51.5),
            lng: Some(-0.1),
        };
        let driver = NearbyDriver::try_from(row).expect("valid row");
        assert!((driver.distance_m - 12.0).abs() < f64::EPSILON);
    }
}
