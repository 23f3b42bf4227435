use super::domain::{ImageAnalysis, OverallRisk, PriceAnalysis, RiskLevel, TextAnalysis};

const IMAGE_WEIGHT: f64 = 0.4;
const PRICE_WEIGHT: f64 = 0.3;
const TEXT_WEIGHT: f64 = 0.3;

/// Combine the three partial analyses into one weighted composite.
///
/// A skipped image analysis contributes confidence 0 to the weighted sum;
/// the weights are fixed and never renormalized, so a missing aspect drags
/// the composite down instead of being excluded from the denominator.
pub fn overall_risk(
    image: &ImageAnalysis,
    price: &PriceAnalysis,
    text: &TextAnalysis,
) -> OverallRisk {
    let image_confidence = match image {
        ImageAnalysis::Skipped { .. } => 0,
        ImageAnalysis::Completed { confidence, .. } => *confidence,
    };

    let score = (f64::from(image_confidence) * IMAGE_WEIGHT
        + f64::from(price.confidence) * PRICE_WEIGHT
        + f64::from(text.confidence) * TEXT_WEIGHT)
        .round() as u8;

    let flag_count = image.discrepancies().len() + price.drop_count as usize + text.red_flags.len();

    OverallRisk {
        score,
        level: RiskLevel::from_confidence(score),
        flag_count,
    }
}

/// Actionable follow-ups for the renter: verify each photo discrepancy,
/// question price drops, then the text analysis questions verbatim, in that
/// order.
pub fn build_recommendations(
    image: &ImageAnalysis,
    price: &PriceAnalysis,
    text: &TextAnalysis,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let ImageAnalysis::Completed { discrepancies, .. } = image {
        for discrepancy in discrepancies {
            recommendations.push(format!("Verify: {discrepancy}"));
        }
    }

    if price.drop_count > 0 {
        recommendations.push(format!(
            "Ask why the price has dropped {} time(s)",
            price.drop_count
        ));
    }

    recommendations.extend(text.recommendations.iter().cloned());
    recommendations
}
