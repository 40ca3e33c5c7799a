use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Expected rows of the demo network, checked by [`NetworkSeedDataset::verify`].
const SEED_POSITIONS: &[SeedPositionContract] = &[
    SeedPositionContract::new("ikeja", "bcg", "Lagos", 40.0, 200.0),
    SeedPositionContract::new("ikeja", "measles", "Lagos", 600.0, 200.0),
    SeedPositionContract::new("agege", "bcg", "Lagos", 2400.0, 150.0),
    SeedPositionContract::new("ikorodu", "bcg", "Lagos", 500.0, 150.0),
    SeedPositionContract::new("epe", "bcg", "Lagos", 500.0, 100.0),
    SeedPositionContract::new("ota", "bcg", "Ogun", 1800.0, 200.0),
    SeedPositionContract::new("abeokuta", "bcg", "Ogun", 3000.0, 150.0),
    SeedPositionContract::new("maiduguri", "bcg", "Borno", 60.0, 300.0),
    SeedPositionContract::new("jere", "bcg", "Borno", 4000.0, 250.0),
    SeedPositionContract::new("konduga", "bcg", "Borno", 2000.0, 200.0),
    SeedPositionContract::new("damaturu", "bcg", "Yobe", 3500.0, 200.0),
];

/// Deterministic demo distribution network.
///
/// Two clusters: Lagos/Ogun, where `ikeja` is short of BCG with sources at
/// varying distances, and a north-east cluster in high-risk regions where
/// `maiduguri` is short.
pub struct NetworkSeedDataset;

impl NetworkSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/network_seed.sql");

    /// Load the network. Loading twice leaves the same rows behind.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let positions_seeded = SEED_POSITIONS
            .iter()
            .map(|seed| SeededPosition {
                location_id: seed.location_id,
                commodity_id: seed.commodity_id,
                region_name: seed.region_name,
            })
            .collect();

        Ok(SeedResult { positions_seeded })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(SEED_POSITIONS.len());

        for seed in SEED_POSITIONS {
            let matches: i64 = sqlx::query_scalar(
                "SELECT EXISTS(
                     SELECT 1 FROM stock_position
                     WHERE location_id = ?1 AND commodity_id = ?2 AND region_name = ?3
                       AND quantity_on_hand = ?4 AND average_monthly_consumption = ?5)",
            )
            .bind(seed.location_id)
            .bind(seed.commodity_id)
            .bind(seed.region_name)
            .bind(seed.quantity_on_hand)
            .bind(seed.average_monthly_consumption)
            .fetch_one(pool)
            .await?;
            checks.push((seed.label(), matches == 1));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }

    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        for seed in SEED_POSITIONS {
            sqlx::query("DELETE FROM stock_position WHERE location_id = ?1 AND commodity_id = ?2")
                .bind(seed.location_id)
                .bind(seed.commodity_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedPositionContract {
    location_id: &'static str,
    commodity_id: &'static str,
    region_name: &'static str,
    quantity_on_hand: f64,
    average_monthly_consumption: f64,
}

impl SeedPositionContract {
    const fn new(
        location_id: &'static str,
        commodity_id: &'static str,
        region_name: &'static str,
        quantity_on_hand: f64,
        average_monthly_consumption: f64,
    ) -> Self {
        Self { location_id, commodity_id, region_name, quantity_on_hand, average_monthly_consumption }
    }

    fn label(&self) -> String {
        format!("{}/{}", self.location_id, self.commodity_id)
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub positions_seeded: Vec<SeededPosition>,
}

#[derive(Debug)]
pub struct SeededPosition {
    pub location_id: &'static str,
    pub commodity_id: &'static str,
    pub region_name: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}
