//! Read-only views over the supply chain: a table of every apple and a per-apple report.

pub mod format;

pub use format::{format_array, format_timestamp, FreshnessGrade, PriceChange, Quality};

use crate::model::{AppleId, AppleRecord};
use crate::services::{ServiceError, ShelfItem, SupplyChainService};
use std::fmt;
use tracing::{info, instrument};

/// Every record the service knows about, in id order.
#[instrument(skip(service))]
pub async fn fetch_all(
    service: &dyn SupplyChainService,
) -> Result<Vec<AppleRecord>, ServiceError> {
    let mut apples = service.list_apples().await?;
    apples.sort_by_key(|a| a.id);
    info!(count = apples.len(), "Loaded apples");
    Ok(apples)
}

#[instrument(skip(service))]
pub async fn fetch_one(
    service: &dyn SupplyChainService,
    id: AppleId,
) -> Result<AppleRecord, ServiceError> {
    service
        .get_apple(id)
        .await?
        .ok_or(ServiceError::NotFound(id))
}

pub fn render_list(apples: &[AppleRecord]) -> String {
    AppleTable(apples).to_string()
}

pub fn render_details(apple: &AppleRecord) -> String {
    AppleReport(apple).to_string()
}

/// Table of apples offered for sale.
pub fn render_shelf(items: &[ShelfItem]) -> String {
    Shelf(items).to_string()
}

struct Shelf<'a>(&'a [ShelfItem]);

impl fmt::Display for Shelf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No apples on sale.");
        }
        writeln!(
            f,
            "{:<8} {:<8} {:<10} {:<8} {:<10}",
            "ID", "Temp", "Ethylene", "Price", "Freshness"
        )?;
        for item in self.0 {
            writeln!(
                f,
                "{:<8} {:<8} {:<10} {:<8} {:<10}",
                format!("#{}", item.apple_id.value()),
                format!("{}°C", item.temperature),
                format!("{} ppm", item.ethylene_level),
                item.price,
                format!("{}/100", item.freshness_score),
            )?;
        }
        Ok(())
    }
}

struct AppleTable<'a>(&'a [AppleRecord]);

impl fmt::Display for AppleTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No apples found.");
        }
        writeln!(f, "All Apples ({} total)", self.0.len())?;
        writeln!(
            f,
            "{:<8} {:<24} {:<10} {:<10} {:<8} {:<10}",
            "ID", "Harvested", "Soil", "Transport", "Logs", "Status"
        )?;
        for apple in self.0 {
            writeln!(
                f,
                "{:<8} {:<24} {:<10} {:<10} {:<8} {:<10}",
                format!("#{}", apple.id.value()),
                format_timestamp(apple.harvest.timestamp),
                apple.harvest.soil_composition,
                if apple.has_transport() { "yes" } else { "no" },
                apple.warehouse_logs.len(),
                if apple.is_sold() { "Sold" } else { "Available" },
            )?;
        }
        Ok(())
    }
}

struct AppleReport<'a>(&'a AppleRecord);

impl fmt::Display for AppleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let apple = self.0;
        writeln!(f, "Apple #{}", apple.id.value())?;

        writeln!(f, "\n[Harvest]")?;
        writeln!(f, "  Soil:       {}", apple.harvest.soil_composition)?;
        writeln!(f, "  Humidity:   {}", format_array(&apple.harvest.humidity))?;
        writeln!(f, "  Chemicals:  {}", format_array(&apple.harvest.chemicals))?;
        writeln!(f, "  Harvested:  {}", format_timestamp(apple.harvest.timestamp))?;

        writeln!(f, "\n[Transport]")?;
        match &apple.transport {
            Some(log) => {
                writeln!(f, "  Start:        {}", format_timestamp(log.start_timestamp))?;
                writeln!(f, "  End:          {}", format_timestamp(log.end_timestamp))?;
                writeln!(f, "  Duration:     {} min", log.duration_minutes())?;
                writeln!(f, "  GPS:          {}", format_array(&log.gps_coordinates))?;
                writeln!(f, "  Temperatures: {}", format_array(&log.temperatures))?;
                writeln!(f, "  Ethylene:     {}", format_array(&log.ethylene_levels))?;
            }
            None => writeln!(f, "  No data")?,
        }

        writeln!(f, "\n[Warehouse]")?;
        if apple.warehouse_logs.is_empty() {
            writeln!(f, "  No data")?;
        }
        for (n, log) in apple.warehouse_logs.iter().enumerate() {
            writeln!(
                f,
                "  #{n:<3} {}  {}°C  {} ppm  freshness {} ({})  {}",
                format_timestamp(log.timestamp),
                log.temperature,
                log.ethylene_level,
                log.freshness_score,
                FreshnessGrade::of(log.freshness_score.value()),
                log.location,
            )?;
        }

        writeln!(f, "\n[Store]")?;
        let store = &apple.store;
        if store.is_listed() {
            writeln!(f, "  Listed:     {}", format_timestamp(store.timestamp))?;
            writeln!(f, "  Ethylene:   {} ppm", store.ethylene_level)?;
            writeln!(f, "  Freshness:  {}", store.freshness_score)?;
            writeln!(
                f,
                "  Quality:    {}",
                Quality::assess(store.ethylene_level, store.freshness_score.value())
            )?;
        } else {
            writeln!(f, "  Not listed")?;
        }
        if store.sold {
            writeln!(f, "  Sold to:    {}", store.buyer.as_deref().unwrap_or("unknown"))?;
            if let Some(at) = store.sold_at {
                writeln!(f, "  Sold at:    {}", format_timestamp(at))?;
            }
        }

        writeln!(f, "\n[History]")?;
        match apple.current_price() {
            Some(price) => writeln!(f, "  Current:    {price}")?,
            None => writeln!(f, "  Current:    No data")?,
        }
        if let Some(change) = PriceChange::of(&apple.prices) {
            writeln!(f, "  Change:     {change}")?;
        }
        writeln!(f, "  Prices:     {}", format_array(&apple.prices))?;
        writeln!(f, "  Freshness:  {}", format_array(&apple.freshness_history))?;
        Ok(())
    }
}
