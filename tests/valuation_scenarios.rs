//! End-to-end scenarios against the public library API.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use ev_comps::domain::{
    AuctionRecord, ModelFamily, TaxTreatment, TireStrategy, TrustTier, VehicleConfiguration,
    age_at_auction_months,
};
use ev_comps::io::load_auction_ledger;
use ev_comps::valuation::{
    AdjustmentFactor, ValuationEngine, ValuationError, dealer_insights, prior_records,
    run_backtest,
};

fn reference() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
}

fn model3_long_range(mileage_km: u32) -> VehicleConfiguration {
    VehicleConfiguration {
        model: ModelFamily::Model3,
        variant: "m3_lr".to_string(),
        is_highland: false,
        tax_type: TaxTreatment::Margin,
        accident_free: true,
        autopilot: "Standard".to_string(),
        tire_strategy: TireStrategy::FourSummer,
        has_heat_pump: false,
        has_hitch: false,
        mileage_km,
        first_registration: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
    }
}

fn auction(
    id: &str,
    vehicle: VehicleConfiguration,
    end_time: DateTime<Utc>,
    price: f64,
    status: &str,
) -> AuctionRecord {
    AuctionRecord {
        auction_id: id.to_string(),
        age_at_auction_months: age_at_auction_months(vehicle.first_registration, end_time),
        vehicle,
        end_time,
        final_price: Some(price),
        status: status.to_string(),
        bid_count: 6,
        trust_tier: TrustTier::Tier1,
    }
}

#[test]
fn three_matching_comparables_bracket_the_estimate() {
    let records = vec![
        auction("A", model3_long_range(42_000), reference() - Duration::days(20), 31_000.0, "closed_seller_accepted"),
        auction("B", model3_long_range(55_000), reference() - Duration::days(45), 29_500.0, "closed_seller_accepted"),
        auction("C", model3_long_range(68_000), reference() - Duration::days(80), 27_200.0, "closed_seller_accepted"),
    ];
    let engine = ValuationEngine::default();
    let result = engine.estimate(&model3_long_range(50_000), &records, Some(reference()));

    let valuation = result.valuation().expect("estimate");
    assert_eq!(valuation.cohort_stats.size, 3);
    assert_eq!(valuation.neighbors.len(), 3);

    let adjusted: Vec<f64> = valuation.neighbors.iter().map(|n| n.adjusted_price).collect();
    let lo = adjusted.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = adjusted.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let estimate = valuation.estimated_value as f64;
    assert!(lo < estimate && estimate < hi, "{lo} < {estimate} < {hi}");

    let total: f64 = valuation.neighbors.iter().map(|n| n.weight_percentage).sum();
    assert!((total - 100.0).abs() <= 0.1 + 1e-9);
}

#[test]
fn unmatched_variant_yields_no_estimate() {
    let records = vec![auction(
        "A",
        model3_long_range(42_000),
        reference() - Duration::days(20),
        31_000.0,
        "closed_seller_accepted",
    )];
    let mut target = model3_long_range(50_000);
    target.variant = "m3_p".to_string();

    let result = ValuationEngine::default().estimate(&target, &records, Some(reference()));
    assert_eq!(result.estimated_value(), None);
    assert_eq!(result.cohort_size(), 0);
    assert_eq!(result.error(), Some(ValuationError::EmptyCohort));
}

#[test]
fn hitch_equipped_comparable_is_adjusted_down_by_250() {
    let mut with_hitch = model3_long_range(50_000);
    with_hitch.has_hitch = true;
    let records = vec![
        auction("plain", model3_long_range(50_000), reference() - Duration::days(10), 30_000.0, "closed_seller_accepted"),
        auction("hitch", with_hitch, reference() - Duration::days(10), 30_000.0, "closed_seller_accepted"),
    ];

    let result = ValuationEngine::default().estimate(&model3_long_range(50_000), &records, Some(reference()));
    let neighbor = result
        .neighbors()
        .iter()
        .find(|n| n.record.auction_id == "hitch")
        .expect("hitch comparable selected");

    assert_eq!(neighbor.original_price, 30_000.0);
    assert_eq!(neighbor.adjusted_price, 29_750.0);
    assert_eq!(neighbor.price_adjustments.len(), 1);
    assert_eq!(neighbor.price_adjustments[0].factor, AdjustmentFactor::TrailerHitch);
    assert_eq!(neighbor.price_adjustments[0].amount, -250.0);
}

#[test]
fn historical_valuation_never_sees_the_future() {
    let t0 = reference() - Duration::days(200);
    let mut records: Vec<AuctionRecord> = (0..8)
        .map(|i| {
            auction(
                &format!("R{i}"),
                model3_long_range(40_000 + i * 3_000),
                t0 + Duration::days(i64::from(i) * 20),
                31_000.0 - f64::from(i) * 400.0,
                if i % 3 == 0 { "closed_seller_declined" } else { "closed_seller_accepted" },
            )
        })
        .collect();
    let target = records[5].clone();
    let engine = ValuationEngine::default();

    let visible = prior_records(&target, &records);
    assert!(visible.iter().all(|r| r.end_time < target.end_time));
    assert!(visible.iter().all(|r| r.auction_id != target.auction_id));

    let before = engine.estimate_for_historical_auction(&target, &records);
    assert!(before.full_cohort.iter().all(|r| r.end_time < target.end_time));
    assert_eq!(before.full_cohort.len(), 5);

    // Rewrite the target's own outcome and everything after it.
    for record in records.iter_mut().skip(5) {
        record.final_price = Some(99_999.0);
    }
    let after = engine.estimate_for_historical_auction(&target, &records);
    assert_eq!(before.result, after.result);

    let insights = dealer_insights(&before).expect("insights");
    assert_eq!(insights.cohort_size, 5);
    assert!(insights.declined_avg_bid.is_some());
    assert!((0..=100).contains(&insights.win_probability));
}

#[test]
fn backtest_runs_on_an_ingested_csv() {
    let path = std::env::temp_dir().join(format!("ev_comps_scenario_{}.csv", std::process::id()));
    let mut csv = String::from(
        "auction_id,model,variant_clean,is_highland,tax_type,is_accident_free,tire_strategy,\
has_hitch,autopilot,has_heatpump,mileage,age_at_auction_months,first_registration,end_time,\
final_price,status,number_of_bids,trust_tier\n",
    );
    for i in 0..12u32 {
        let day = 1 + i * 2;
        csv.push_str(&format!(
            "L{i},Model 3,m3_lr,false,margin,true,4_summer,false,Standard,false,{mileage},,\
2022-06-01,2024-09-{day:02} 14:00:00,{price},{status},{bids},Tier 1\n",
            mileage = 40_000 + i * 2_500,
            price = 31_000 - i * 150,
            status = if i % 4 == 0 { "closed_seller_declined" } else { "closed_seller_accepted" },
            bids = 3 + i % 5,
        ));
    }
    csv.push_str("BAD,Model 3,m3_lr,false,margin,true,4_summer,false,Standard,false,not-a-number,,2022-06-01,2024-09-30,30000,closed_seller_accepted,4,Tier 1\n");
    std::fs::write(&path, csv).unwrap();

    let ledger = load_auction_ledger(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(ledger.rows_used, 12);
    assert_eq!(ledger.row_errors.len(), 1);

    let report = run_backtest(&ValuationEngine::default(), &ledger.records, 5);
    let ids: Vec<&str> = report
        .entries
        .iter()
        .map(|e| e.auction_id.as_str())
        .chain(report.skipped.iter().map(|s| s.auction_id.as_str()))
        .collect();
    assert_eq!(ids.len(), 5);
    assert!(report.entries.iter().all(|e| e.neighbor_count <= 3));

    let summary = report.summary.expect("at least one estimate");
    assert_eq!(summary.evaluated, report.entries.len());
    assert!(summary.median_abs_error_pct >= 0.0);
}
