use chrono::Utc;

use super::domain::{PriceAnalysis, PricePoint, RiskLevel};

const EXPLANATION_HIGH: &str = "Multiple price drops and/or extended time on market suggests potential issues with the property or area.";
const EXPLANATION_MEDIUM: &str =
    "Some price adjustments detected. Property may be overpriced or have minor concerns.";
const EXPLANATION_LOW: &str = "Price history appears normal. No significant red flags.";
const EXPLANATION_EMPTY: &str = "No price history available. Property may be new to market.";

/// Derive a risk signal purely from the price timeline. Total function: an
/// empty history is itself a valid, low-risk outcome.
///
/// `history` is ordered oldest to newest. Each strictly-decreasing
/// consecutive pair counts as one drop and contributes its percentage
/// decrease to the running total; the total is rounded once, after
/// accumulation, never per pair.
pub fn analyze_price_history(
    history: &[PricePoint],
    current_price: Option<u64>,
    days_on_market: u32,
) -> PriceAnalysis {
    if history.is_empty() {
        let timeline = current_price
            .map(|price| vec![PricePoint::new(Utc::now(), price)])
            .unwrap_or_default();

        return PriceAnalysis {
            confidence: 20,
            risk_level: RiskLevel::Low,
            drop_count: 0,
            total_decrease: 0,
            days_on_market,
            timeline,
            explanation: EXPLANATION_EMPTY,
        };
    }

    let mut drop_count: u32 = 0;
    let mut total_decrease = 0.0_f64;

    for pair in history.windows(2) {
        let (prev, curr) = (pair[0].price, pair[1].price);
        if curr < prev {
            drop_count += 1;
            total_decrease += (prev - curr) as f64 / prev as f64 * 100.0;
        }
    }

    let total_decrease = total_decrease.round() as i64;

    // Fixed decision table, evaluated in order: a listing that matches the
    // first row lands high even if it also matches the second.
    let confidence = if drop_count >= 3 || total_decrease >= 20 || days_on_market > 60 {
        80
    } else if drop_count >= 2 || total_decrease >= 10 {
        60
    } else {
        30
    };
    let risk_level = RiskLevel::from_confidence(confidence);

    let explanation = match risk_level {
        RiskLevel::High => EXPLANATION_HIGH,
        RiskLevel::Medium => EXPLANATION_MEDIUM,
        RiskLevel::Low => EXPLANATION_LOW,
    };

    PriceAnalysis {
        confidence,
        risk_level,
        drop_count,
        total_decrease,
        days_on_market,
        timeline: history.to_vec(),
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn timeline(prices: &[u64]) -> Vec<PricePoint> {
        let start = Utc::now() - Duration::days(prices.len() as i64 * 30);
        prices
            .iter()
            .enumerate()
            .map(|(i, price)| PricePoint::new(start + Duration::days(i as i64 * 30), *price))
            .collect()
    }

    #[test]
    fn empty_history_is_low_risk_with_synthetic_point() {
        let analysis = analyze_price_history(&[], Some(2000), 0);
        assert_eq!(analysis.confidence, 20);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(analysis.drop_count, 0);
        assert_eq!(analysis.total_decrease, 0);
        assert_eq!(analysis.timeline.len(), 1);
        assert_eq!(analysis.timeline[0].price, 2000);
        assert_eq!(
            analysis.explanation,
            "No price history available. Property may be new to market."
        );
    }

    #[test]
    fn empty_history_without_current_price_has_empty_timeline() {
        let analysis = analyze_price_history(&[], None, 5);
        assert!(analysis.timeline.is_empty());
        assert_eq!(analysis.days_on_market, 5);
    }

    #[test]
    fn two_steep_drops_land_high_on_total_decrease() {
        // (2800-2500)/2800 = 10.71%, (2500-2200)/2500 = 12.0%; rounded once.
        let history = timeline(&[2800, 2500, 2200]);
        let analysis = analyze_price_history(&history, Some(2200), 10);
        assert_eq!(analysis.drop_count, 2);
        assert_eq!(analysis.total_decrease, 23);
        assert_eq!(analysis.confidence, 80);
        assert_eq!(analysis.risk_level, RiskLevel::High);
    }

    #[test]
    fn three_drops_land_high_regardless_of_magnitude() {
        let history = timeline(&[1000, 999, 998, 997]);
        let analysis = analyze_price_history(&history, None, 10);
        assert_eq!(analysis.drop_count, 3);
        assert!(analysis.total_decrease < 20);
        assert_eq!(analysis.confidence, 80);
        assert_eq!(analysis.risk_level, RiskLevel::High);
    }

    #[test]
    fn stale_listing_lands_high_on_days_on_market_alone() {
        let history = timeline(&[2000, 2000]);
        let analysis = analyze_price_history(&history, None, 61);
        assert_eq!(analysis.drop_count, 0);
        assert_eq!(analysis.confidence, 80);
        assert_eq!(analysis.risk_level, RiskLevel::High);
    }

    #[test]
    fn sixty_days_on_market_is_not_high() {
        let history = timeline(&[2000, 2000]);
        let analysis = analyze_price_history(&history, None, 60);
        assert_eq!(analysis.confidence, 30);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
    }

    #[test]
    fn two_small_drops_land_medium() {
        // Two drops of ~2% each: drop_count rule fires, total stays under 10.
        let history = timeline(&[2000, 1960, 1980, 1940]);
        let analysis = analyze_price_history(&history, None, 10);
        assert_eq!(analysis.drop_count, 2);
        assert_eq!(analysis.confidence, 60);
        assert_eq!(analysis.risk_level, RiskLevel::Medium);
        assert_eq!(
            analysis.explanation,
            "Some price adjustments detected. Property may be overpriced or have minor concerns."
        );
    }

    #[test]
    fn monotonic_increase_is_low_risk() {
        let history = timeline(&[1800, 1900, 2000]);
        let analysis = analyze_price_history(&history, None, 10);
        assert_eq!(analysis.drop_count, 0);
        assert_eq!(analysis.total_decrease, 0);
        assert_eq!(analysis.confidence, 30);
        assert_eq!(
            analysis.explanation,
            "Price history appears normal. No significant red flags."
        );
    }

    #[test]
    fn timeline_echoes_input_unchanged() {
        let history = timeline(&[2800, 2500, 2200]);
        let analysis = analyze_price_history(&history, Some(2200), 10);
        assert_eq!(analysis.timeline, history);
    }

    #[test]
    fn reversed_history_changes_the_signal() {
        let falling = timeline(&[2800, 2500, 2200]);
        let mut rising = falling.clone();
        rising.reverse();

        let falling_analysis = analyze_price_history(&falling, None, 10);
        let rising_analysis = analyze_price_history(&rising, None, 10);
        assert_eq!(falling_analysis.drop_count, 2);
        assert_eq!(rising_analysis.drop_count, 0);
        assert_ne!(
            falling_analysis.total_decrease,
            rising_analysis.total_decrease
        );
    }

    #[test]
    fn rounding_happens_once_after_accumulation() {
        // Three drops of 1.4% each: per-pair rounding would give 3, the
        // accumulated 4.2% rounds to 4.
        let history = timeline(&[10000, 9860, 9999, 9859, 9998, 9858]);
        let analysis = analyze_price_history(&history, None, 0);
        assert_eq!(analysis.drop_count, 3);
        assert_eq!(analysis.total_decrease, 4);
    }
}
