use async_trait::async_trait;
use sqlx::Row;
use tracing::debug;

use vaxflow_core::domain::stock::{CommodityId, LocationId, StockPosition};
use vaxflow_core::errors::CollaboratorError;
use vaxflow_core::redistribution::distance::{haversine_km, EARTH_RADIUS_KM};
use vaxflow_core::redistribution::ports::StockPositionProvider;

use super::{parse_timestamp, retain_surplus, RepositoryError, StockPositionRepository};
use crate::DbPool;

const KM_PER_DEGREE_LATITUDE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
// box is widened so every point within the haversine radius stays inside it
const BOX_PADDING: f64 = 1.05;

const SELECT_COLUMNS: &str = "SELECT location_id, location_name, district_id, district_name,
        region_id, region_name, commodity_id, commodity_name, quantity_on_hand,
        average_monthly_consumption, latitude, longitude, updated_at
 FROM stock_position";

pub struct SqlStockPositionRepository {
    pool: DbPool,
}

impl SqlStockPositionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        location_id: &LocationId,
        commodity_id: &CommodityId,
    ) -> Result<Option<StockPosition>, RepositoryError> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE location_id = ? AND commodity_id = ?"
        ))
        .bind(&location_id.0)
        .bind(&commodity_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_position).transpose()
    }

    /// Bounding-box prefilter in SQL, then the exact great-circle radius.
    pub async fn within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<StockPosition>, RepositoryError> {
        if !latitude.is_finite() || !longitude.is_finite() || !radius_km.is_finite() {
            return Err(RepositoryError::Invalid(format!(
                "search origin ({latitude}, {longitude}) with radius {radius_km} is not finite"
            )));
        }

        let bounds = BoundingBox::around(latitude, longitude, radius_km.max(0.0));
        let rows = match bounds.longitude {
            Some((min_lon, max_lon)) => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS}
                     WHERE latitude BETWEEN ? AND ? AND longitude BETWEEN ? AND ?
                     ORDER BY location_id, commodity_id"
                ))
                .bind(bounds.min_lat)
                .bind(bounds.max_lat)
                .bind(min_lon)
                .bind(max_lon)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "{SELECT_COLUMNS}
                     WHERE latitude BETWEEN ? AND ?
                     ORDER BY location_id, commodity_id"
                ))
                .bind(bounds.min_lat)
                .bind(bounds.max_lat)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let prefiltered = rows.len();
        let positions = rows
            .iter()
            .map(row_to_position)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|position| {
                haversine_km(latitude, longitude, position.latitude, position.longitude)
                    <= radius_km
            })
            .collect::<Vec<_>>();

        debug!(
            event_name = "db.stock_position.radius_query",
            radius_km,
            prefiltered,
            matched = positions.len(),
            "radius query completed"
        );

        Ok(positions)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    /// `None` when the box spans a pole or the antimeridian.
    longitude: Option<(f64, f64)>,
}

impl BoundingBox {
    fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let lat_delta = radius_km * BOX_PADDING / KM_PER_DEGREE_LATITUDE;
        let min_lat = (latitude - lat_delta).max(-90.0);
        let max_lat = (latitude + lat_delta).min(90.0);

        let widest_cos = min_lat.to_radians().cos().min(max_lat.to_radians().cos());
        let longitude = if min_lat <= -90.0 || max_lat >= 90.0 || widest_cos <= f64::EPSILON {
            None
        } else {
            let lon_delta = radius_km * BOX_PADDING / (KM_PER_DEGREE_LATITUDE * widest_cos);
            let (min_lon, max_lon) = (longitude - lon_delta, longitude + lon_delta);
            if min_lon < -180.0 || max_lon > 180.0 {
                None
            } else {
                Some((min_lon, max_lon))
            }
        };

        Self { min_lat, max_lat, longitude }
    }
}

fn row_to_position(row: &sqlx::sqlite::SqliteRow) -> Result<StockPosition, RepositoryError> {
    let decode = |error: sqlx::Error| RepositoryError::Decode(error.to_string());
    let updated_at: String = row.try_get("updated_at").map_err(decode)?;

    Ok(StockPosition {
        location_id: LocationId(row.try_get("location_id").map_err(decode)?),
        location_name: row.try_get("location_name").map_err(decode)?,
        district_id: row.try_get("district_id").map_err(decode)?,
        district_name: row.try_get("district_name").map_err(decode)?,
        region_id: row.try_get("region_id").map_err(decode)?,
        region_name: row.try_get("region_name").map_err(decode)?,
        commodity_id: CommodityId(row.try_get("commodity_id").map_err(decode)?),
        commodity_name: row.try_get("commodity_name").map_err(decode)?,
        quantity_on_hand: row.try_get("quantity_on_hand").map_err(decode)?,
        average_monthly_consumption: row
            .try_get("average_monthly_consumption")
            .map_err(decode)?,
        latitude: row.try_get("latitude").map_err(decode)?,
        longitude: row.try_get("longitude").map_err(decode)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[async_trait]
impl StockPositionRepository for SqlStockPositionRepository {
    async fn save(&self, position: StockPosition) -> Result<(), RepositoryError> {
        position.validate().map_err(RepositoryError::Invalid)?;

        sqlx::query(
            "INSERT INTO stock_position (location_id, location_name, district_id, district_name,
                                         region_id, region_name, commodity_id, commodity_name,
                                         quantity_on_hand, average_monthly_consumption,
                                         latitude, longitude, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(location_id, commodity_id) DO UPDATE SET
                 location_name = excluded.location_name,
                 district_id = excluded.district_id,
                 district_name = excluded.district_name,
                 region_id = excluded.region_id,
                 region_name = excluded.region_name,
                 commodity_name = excluded.commodity_name,
                 quantity_on_hand = excluded.quantity_on_hand,
                 average_monthly_consumption = excluded.average_monthly_consumption,
                 latitude = excluded.latitude,
                 longitude = excluded.longitude,
                 updated_at = excluded.updated_at",
        )
        .bind(&position.location_id.0)
        .bind(&position.location_name)
        .bind(&position.district_id)
        .bind(&position.district_name)
        .bind(&position.region_id)
        .bind(&position.region_name)
        .bind(&position.commodity_id.0)
        .bind(&position.commodity_name)
        .bind(position.quantity_on_hand)
        .bind(position.average_monthly_consumption)
        .bind(position.latitude)
        .bind(position.longitude)
        .bind(position.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_commodity(
        &self,
        commodity_id: &CommodityId,
    ) -> Result<Vec<StockPosition>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE commodity_id = ? ORDER BY location_id"
        ))
        .bind(&commodity_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_position).collect()
    }
}

#[async_trait]
impl StockPositionProvider for SqlStockPositionRepository {
    async fn get_stock_position(
        &self,
        location_id: &LocationId,
        commodity_id: &CommodityId,
    ) -> Result<Option<StockPosition>, CollaboratorError> {
        Ok(self.find(location_id, commodity_id).await?)
    }

    async fn find_nearby_positions(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<StockPosition>, CollaboratorError> {
        Ok(self.within_radius(latitude, longitude, radius_km).await?)
    }

    async fn filter_surplus(
        &self,
        positions: Vec<StockPosition>,
        commodity_id: &CommodityId,
        min_months_of_stock: f64,
    ) -> Result<Vec<StockPosition>, CollaboratorError> {
        Ok(retain_surplus(positions, commodity_id, min_months_of_stock))
    }
}
