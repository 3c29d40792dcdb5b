//! Resolving a raw fee-schedule catalog into the candidates the annual fee
//! calculator consumes.

use chrono::NaiveDate;

use crate::model::FeeSchedule;
use crate::types::ProductTypeId;

/// Schedules of `product_type_id` valid on `as_of`, one per bracket.
///
/// When several valid schedules price the same bracket (same tier, minimum
/// and maximum), the one added last to the catalog wins. Brackets keep the
/// position of their first appearance.
pub fn select_applicable_schedules(
    catalog: &[FeeSchedule],
    product_type_id: ProductTypeId,
    as_of: NaiveDate,
) -> Vec<FeeSchedule> {
    let mut selected: Vec<FeeSchedule> = Vec::new();
    for schedule in catalog
        .iter()
        .filter(|s| s.product_type_id == product_type_id && s.is_valid_on(as_of))
    {
        let key = schedule.bracket_key();
        match selected.iter_mut().find(|s| s.bracket_key() == key) {
            Some(existing) => *existing = schedule.clone(),
            None => selected.push(schedule.clone()),
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn schedule(id: &str, product: i32, start: NaiveDate, end: NaiveDate) -> FeeSchedule {
        FeeSchedule {
            id: Some(id.into()),
            product_type_id: product,
            tier_level: 0,
            asset_size_minimum: dec!(0),
            asset_size_maximum: dec!(0),
            annual_fee_fixed: dec!(0),
            annual_fee_percentage: dec!(0.001),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_filters_by_product_and_date() {
        let catalog = vec![
            schedule("a", 1, d(2014, 1, 1), d(2015, 12, 31)),
            schedule("b", 2, d(2016, 1, 1), d(2016, 12, 31)),
        ];
        assert!(select_applicable_schedules(&catalog, 1, d(2016, 6, 1)).is_empty());
        let selected = select_applicable_schedules(&catalog, 1, d(2015, 12, 31));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id.as_deref(), Some("a"));
    }

    #[test]
    fn test_most_recently_added_wins_per_bracket() {
        let mut upper = schedule("upper", 1, d(2014, 1, 1), d(2020, 12, 31));
        upper.asset_size_minimum = dec!(1_000_000);
        let catalog = vec![
            schedule("old", 1, d(2014, 1, 1), d(2020, 12, 31)),
            upper,
            schedule("new", 1, d(2015, 1, 1), d(2020, 12, 31)),
        ];
        let selected = select_applicable_schedules(&catalog, 1, d(2016, 1, 1));
        let ids: Vec<_> = selected.iter().filter_map(|s| s.id.as_deref()).collect();
        assert_eq!(ids, vec!["new", "upper"]);
    }
}
