//! CSV ingest and normalization.
//!
//! This module turns the cleaned auction export into `AuctionRecord`s the
//! valuation engine can consume.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Lenient optional fields**: missing equipment flags fall back to defaults
//! - **Separation of concerns**: no valuation logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use csv::StringRecord;

use crate::domain::{
    AuctionRecord, ModelFamily, TaxTreatment, TireStrategy, TrustTier, VehicleConfiguration,
    age_at_auction_months,
};
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 6] = [
    "auction_id",
    "model",
    "variant_clean",
    "end_time",
    "first_registration",
    "mileage",
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: parsed records + row errors + counters.
#[derive(Debug, Clone)]
pub struct LedgerData {
    pub records: Vec<AuctionRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load the auction ledger from `path`.
pub fn load_auction_ledger(path: &Path) -> Result<LedgerData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open ledger CSV '{}': {e}", path.display())))?;
    let data = read_auction_ledger(file)?;

    if data.rows_used == 0 {
        return Err(AppError::no_data(format!(
            "No valid auction rows in '{}'.",
            path.display()
        )));
    }
    Ok(data)
}

/// Parse a ledger from any reader. An empty result is not an error here.
pub fn read_auction_ledger<R: std::io::Read>(input: R) -> Result<LedgerData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let row = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&row, &header_map) {
            Ok(record) => records.push(record),
            Err(message) => row_errors.push(RowError {
                line,
                id: get_optional(&row, &header_map, "auction_id").map(str::to_string),
                message,
            }),
        }
    }

    let rows_used = records.len();
    Ok(LedgerData {
        records,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::input(format!("Missing required column: `{column}`")));
        }
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<AuctionRecord, String> {
    let auction_id = get_required(record, header_map, "auction_id")?.to_string();

    let model_raw = get_required(record, header_map, "model")?;
    let model = ModelFamily::parse(model_raw).ok_or_else(|| format!("Unsupported model '{model_raw}'."))?;

    let variant = get_required(record, header_map, "variant_clean")?.to_ascii_lowercase();

    let tax_type = match get_optional(record, header_map, "tax_type") {
        Some(raw) => TaxTreatment::parse(raw).ok_or_else(|| format!("Invalid `tax_type` '{raw}'."))?,
        None => TaxTreatment::Margin,
    };

    let end_time = parse_datetime(get_required(record, header_map, "end_time")?)?;
    let first_registration = parse_datetime(get_required(record, header_map, "first_registration")?)?.date_naive();

    let mileage = parse_f64(get_required(record, header_map, "mileage")?, "mileage")?;
    if mileage < 0.0 || mileage > f64::from(u32::MAX) {
        return Err(format!(
            "Invalid `mileage` {mileage} (must be between 0 and {}).",
            u32::MAX
        ));
    }

    let final_price = match get_optional(record, header_map, "final_price") {
        Some(raw) => Some(parse_f64(raw, "final_price")?),
        None => None,
    };

    let age_at_auction_months = match get_optional(record, header_map, "age_at_auction_months") {
        Some(raw) => {
            let months = parse_f64(raw, "age_at_auction_months")?;
            if months < 0.0 {
                return Err("Invalid `age_at_auction_months` (must be >= 0).".to_string());
            }
            months.round() as u32
        }
        None => age_at_auction_months(first_registration, end_time),
    };

    let bid_count = match get_optional(record, header_map, "number_of_bids") {
        Some(raw) => {
            let bids = parse_f64(raw, "number_of_bids")?;
            if bids < 0.0 {
                return Err("Invalid `number_of_bids` (must be >= 0).".to_string());
            }
            bids.round() as u32
        }
        None => 0,
    };

    let vehicle = VehicleConfiguration {
        model,
        variant,
        is_highland: parse_flag(record, header_map, "is_highland")?,
        tax_type,
        accident_free: parse_flag(record, header_map, "is_accident_free")?,
        autopilot: get_optional(record, header_map, "autopilot")
            .unwrap_or("Standard")
            .to_string(),
        tire_strategy: get_optional(record, header_map, "tire_strategy")
            .map(TireStrategy::parse)
            .unwrap_or(TireStrategy::Unknown),
        has_heat_pump: parse_flag(record, header_map, "has_heatpump")?,
        has_hitch: parse_flag(record, header_map, "has_hitch")?,
        mileage_km: mileage.round() as u32,
        first_registration,
    };

    Ok(AuctionRecord {
        auction_id,
        vehicle,
        age_at_auction_months,
        end_time,
        final_price,
        status: get_optional(record, header_map, "status").unwrap_or("").to_string(),
        bid_count,
        trust_tier: TrustTier::from_label(get_optional(record, header_map, "trust_tier").unwrap_or("")),
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_flag(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<bool, String> {
    match get_optional(record, header_map, name) {
        Some(raw) => parse_bool(raw).ok_or_else(|| format!("Invalid boolean `{name}` '{raw}'.")),
        None => Ok(false),
    }
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid number for `{name}`: '{s}'."))
}

/// Parse an ISO date or datetime. Naive values are taken as UTC.
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    const OFFSET_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"];
    for fmt in OFFSET_FMTS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    const NAIVE_FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in NAIVE_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(NaiveTime::MIN).and_utc());
    }

    Err(format!(
        "Invalid date '{s}'. Expected YYYY-MM-DD or an ISO datetime (YYYY-MM-DD[T ]HH:MM:SS[.fff][+HH:MM])."
    ))
}
