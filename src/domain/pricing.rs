use uuid::Uuid;

use super::form::LineItem;
use super::order::{FieldKey, OrderValues};
use super::tier::RateTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    pub item_id: Uuid,
    pub quantity: i64,
    pub unit_rate: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub tier: RateTier,
    pub lines: Vec<LinePrice>,
    pub grand_total: i64,
}

/// Quantity used to price `item`.
///
/// With no Form-class Quantity fields this is the manual quantity, falling
/// back to the item default and then 0. Otherwise it is the product of every
/// quantity field, an unset field counting as 0. The manual quantity is
/// ignored in that case.
pub fn effective_quantity(item: &LineItem, values: &OrderValues) -> i64 {
    let mut fields = item.quantity_fields().peekable();

    if fields.peek().is_none() {
        return values
            .manual_quantity(item.id)
            .or(item.default_quantity)
            .unwrap_or(0)
            .max(0);
    }

    fields
        .map(|f| {
            let key = FieldKey {
                item_id: item.id,
                class: f.class,
                field_id: f.id,
            };
            values.field(&key).and_then(|v| v.as_quantity()).unwrap_or(0)
        })
        .fold(1i64, i64::saturating_mul)
}

pub fn price_line(item: &LineItem, values: &OrderValues, tier: RateTier) -> LinePrice {
    let quantity = effective_quantity(item, values);
    let unit_rate = item.rates.for_tier(tier);
    LinePrice {
        item_id: item.id,
        quantity,
        unit_rate,
        total: quantity.saturating_mul(unit_rate),
    }
}

/// Price every item of a form. The grand total is the plain sum of the line
/// totals; an expired tier zeroes everything.
pub fn price_order(items: &[LineItem], values: &OrderValues, tier: RateTier) -> PriceBreakdown {
    let lines: Vec<LinePrice> = items
        .iter()
        .map(|item| price_line(item, values, tier))
        .collect();
    let grand_total = lines
        .iter()
        .fold(0i64, |acc, l| acc.saturating_add(l.total));

    PriceBreakdown {
        tier,
        lines,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::{FieldClass, MetaField, MetaFieldType, Rates};
    use crate::domain::order::FieldValue;

    const RATES: Rates = Rates {
        early_bird: 15000,
        standard: 18800,
        onsite: 22400,
    };

    fn field(class: FieldClass, field_type: MetaFieldType) -> MetaField {
        MetaField {
            id: Uuid::new_v4(),
            class,
            field_type,
            label: format!("{:?}", field_type),
            minimum_quantity: None,
            maximum_quantity: None,
            options: vec![],
        }
    }

    fn item(meta_fields: Vec<MetaField>, default_quantity: Option<i64>) -> LineItem {
        LineItem {
            id: Uuid::new_v4(),
            code: "BOOTH".to_string(),
            name: "Booth".to_string(),
            rates: RATES,
            default_quantity,
            meta_fields,
        }
    }

    fn two_quantity_item() -> LineItem {
        item(
            vec![
                field(FieldClass::Form, MetaFieldType::Quantity),
                field(FieldClass::Form, MetaFieldType::Text),
                field(FieldClass::Form, MetaFieldType::Quantity),
            ],
            None,
        )
    }

    fn set_quantities(values: &mut OrderValues, item: &LineItem, quantities: &[i64]) {
        for (f, q) in item.quantity_fields().zip(quantities) {
            values.set_field(
                FieldKey {
                    item_id: item.id,
                    class: f.class,
                    field_id: f.id,
                },
                FieldValue::Number(*q),
            );
        }
    }

    #[test]
    fn default_quantity_without_quantity_fields() {
        let booth = item(vec![field(FieldClass::Form, MetaFieldType::Text)], Some(3));
        assert_eq!(effective_quantity(&booth, &OrderValues::new()), 3);
    }

    #[test]
    fn manual_quantity_wins_over_default() {
        let booth = item(vec![], Some(3));
        let mut values = OrderValues::new();
        values.set_manual_quantity(booth.id, 5);
        assert_eq!(effective_quantity(&booth, &values), 5);
    }

    #[test]
    fn no_quantity_source_is_zero() {
        let booth = item(vec![], None);
        assert_eq!(effective_quantity(&booth, &OrderValues::new()), 0);
    }

    #[test]
    fn item_class_quantity_fields_do_not_multiply() {
        let booth = item(vec![field(FieldClass::Item, MetaFieldType::Quantity)], Some(2));
        assert_eq!(effective_quantity(&booth, &OrderValues::new()), 2);
    }

    #[test]
    fn quantity_fields_multiply() {
        let booth = two_quantity_item();
        let mut values = OrderValues::new();
        set_quantities(&mut values, &booth, &[2, 4]);
        assert_eq!(effective_quantity(&booth, &values), 8);
    }

    #[test]
    fn unset_quantity_field_zeroes_the_product() {
        let booth = two_quantity_item();
        let mut values = OrderValues::new();
        set_quantities(&mut values, &booth, &[2]);
        assert_eq!(effective_quantity(&booth, &values), 0);
    }

    #[test]
    fn manual_quantity_is_ignored_when_quantity_fields_exist() {
        let booth = two_quantity_item();
        let mut values = OrderValues::new();
        set_quantities(&mut values, &booth, &[3, 3]);
        values.set_manual_quantity(booth.id, 100);
        assert_eq!(effective_quantity(&booth, &values), 9);
    }

    #[test]
    fn early_bird_line_total() {
        let booth = two_quantity_item();
        let mut values = OrderValues::new();
        set_quantities(&mut values, &booth, &[2, 4]);

        let line = price_line(&booth, &values, RateTier::EarlyBird);
        assert_eq!(line.quantity, 8);
        assert_eq!(line.unit_rate, 15000);
        assert_eq!(line.total, 120000);
    }

    #[test]
    fn standard_fixture_totals() {
        let first = two_quantity_item();
        let second = two_quantity_item();
        let mut values = OrderValues::new();
        set_quantities(&mut values, &first, &[2, 4]);
        set_quantities(&mut values, &second, &[1, 2]);

        let breakdown = price_order(&[first, second], &values, RateTier::Standard);
        assert_eq!(breakdown.lines[0].total, 150400);
        assert_eq!(breakdown.lines[1].total, 37600);
        assert_eq!(breakdown.grand_total, 188000);
    }

    #[test]
    fn grand_total_is_sum_of_lines() {
        let items = vec![two_quantity_item(), item(vec![], Some(7)), item(vec![], None)];
        let mut values = OrderValues::new();
        set_quantities(&mut values, &items[0], &[5, 3]);

        for tier in [RateTier::EarlyBird, RateTier::Standard, RateTier::Onsite] {
            let breakdown = price_order(&items, &values, tier);
            let sum: i64 = breakdown.lines.iter().map(|l| l.total).sum();
            assert_eq!(breakdown.grand_total, sum);
        }
    }

    #[test]
    fn expired_tier_zeroes_everything() {
        let items = vec![two_quantity_item(), item(vec![], Some(7))];
        let mut values = OrderValues::new();
        set_quantities(&mut values, &items[0], &[2, 4]);

        let breakdown = price_order(&items, &values, RateTier::Expired);
        assert_eq!(breakdown.tier, RateTier::Expired);
        assert!(breakdown.lines.iter().all(|l| l.total == 0 && l.unit_rate == 0));
        assert_eq!(breakdown.lines[0].quantity, 8);
        assert_eq!(breakdown.grand_total, 0);
    }

    #[test]
    fn huge_quantities_saturate() {
        let booth = two_quantity_item();
        let mut values = OrderValues::new();
        set_quantities(&mut values, &booth, &[i64::MAX, 2]);
        assert_eq!(effective_quantity(&booth, &values), i64::MAX);
        assert_eq!(price_line(&booth, &values, RateTier::Onsite).total, i64::MAX);
    }
}
