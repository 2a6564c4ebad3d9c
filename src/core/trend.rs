//! Period-over-period net worth movement across saved entries.
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub net_worth: f64,
    pub change: Option<f64>,
    /// Percent change relative to the previous point's magnitude.
    pub change_pct: Option<f64>,
}

/// Builds trend points from `(date, net worth)` pairs, sorting them by date.
pub fn trend(points: &[(NaiveDate, f64)]) -> Vec<TrendPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|(date, _)| *date);

    let mut previous: Option<f64> = None;
    sorted
        .into_iter()
        .map(|(date, net_worth)| {
            let change = previous.map(|prev| net_worth - prev);
            let change_pct = previous
                .filter(|prev| *prev != 0.0)
                .map(|prev| (net_worth - prev) / prev.abs() * 100.0);
            previous = Some(net_worth);
            TrendPoint {
                date,
                net_worth,
                change,
                change_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_changes_between_entries() {
        let points = trend(&[(d(31), 1200.0), (d(1), 1000.0), (d(15), 1100.0)]);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, d(1));
        assert_eq!(points[0].change, None);
        assert_eq!(points[0].change_pct, None);

        assert_eq!(points[1].change, Some(100.0));
        assert_eq!(points[1].change_pct, Some(10.0));
        assert_eq!(points[2].change, Some(100.0));
        assert!((points[2].change_pct.unwrap() - 9.0909).abs() < 0.001);
    }

    #[test]
    fn test_change_from_zero_or_negative() {
        let points = trend(&[(d(1), 0.0), (d(2), 500.0), (d(3), -500.0), (d(4), -250.0)]);

        assert_eq!(points[1].change, Some(500.0));
        assert_eq!(points[1].change_pct, None);
        assert_eq!(points[2].change_pct, Some(-200.0));
        // Debt shrinking is an improvement
        assert_eq!(points[3].change_pct, Some(50.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(trend(&[]).is_empty());
    }
}
