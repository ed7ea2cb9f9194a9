use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Single daily close for a given date, supplied by the quote-history
/// collaborator in ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// One predicted future close. The date is derived, one day after the
/// previous point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Historical series joined with its forecast, ready for charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub history: Vec<PricePoint>,
    pub predicted: Vec<ForecastPoint>,
}

/// Close values of an ordered price series
pub fn close_prices(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_point_deserializes_iso_dates() {
        let point: PricePoint =
            serde_json::from_str(r#"{"date":"2024-03-01","close":123.45}"#).unwrap();
        assert_eq!(point.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(point.close, 123.45);

        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("2024-03-01"), "Date should serialize as ISO-8601, got {}", json);
    }

    #[test]
    fn test_close_prices_preserves_order() {
        let points = vec![
            PricePoint { date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), close: 10.0 },
            PricePoint { date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), close: 12.0 },
            PricePoint { date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), close: 11.0 },
        ];
        assert_eq!(close_prices(&points), vec![10.0, 12.0, 11.0]);
    }
}
