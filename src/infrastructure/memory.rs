use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::form::OrderForm;
use crate::domain::order::{
    ListResult, NewSponsorOrder, SavedFieldValue, SponsorOrderLineView, SponsorOrderView,
};
use crate::domain::ports::OrderFormRepository;

/// Repository kept in process memory, used by service and handler tests.
#[derive(Default)]
pub struct InMemoryOrderFormRepository {
    forms: Mutex<HashMap<Uuid, OrderForm>>,
    orders: Mutex<Vec<SponsorOrderView>>,
}

impl InMemoryOrderFormRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> DomainError {
        DomainError::Internal("repository lock poisoned".to_string())
    }
}

impl OrderFormRepository for InMemoryOrderFormRepository {
    fn create_form(&self, form: &OrderForm) -> Result<(), DomainError> {
        let mut forms = self.forms.lock().map_err(|_| Self::poisoned())?;
        forms.insert(form.id, form.clone());
        Ok(())
    }

    fn find_form(&self, id: Uuid) -> Result<Option<OrderForm>, DomainError> {
        let forms = self.forms.lock().map_err(|_| Self::poisoned())?;
        Ok(forms.get(&id).cloned())
    }

    fn save_order(&self, order: NewSponsorOrder) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        let lines = order
            .pricing
            .lines
            .iter()
            .map(|line| SponsorOrderLineView {
                id: Uuid::new_v4(),
                item_id: line.item_id,
                quantity: line.quantity,
                unit_rate: line.unit_rate,
                line_total: line.total,
                notes: order.values.notes(line.item_id).map(str::to_string),
                values: order
                    .values
                    .fields_for_item(line.item_id)
                    .map(|(k, v)| SavedFieldValue {
                        class: k.class,
                        field_id: k.field_id,
                        value: v.clone(),
                    })
                    .collect(),
            })
            .collect();

        let mut orders = self.orders.lock().map_err(|_| Self::poisoned())?;
        orders.push(SponsorOrderView {
            id,
            form_id: order.form_id,
            sponsor_id: order.sponsor_id,
            tier: order.pricing.tier,
            discount: order.discount,
            grand_total: order.pricing.grand_total,
            created_at: Utc::now(),
            lines,
        });
        Ok(id)
    }

    fn find_order(&self, id: Uuid) -> Result<Option<SponsorOrderView>, DomainError> {
        let orders = self.orders.lock().map_err(|_| Self::poisoned())?;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let orders = self.orders.lock().map_err(|_| Self::poisoned())?;
        let offset = page.saturating_sub(1).saturating_mul(limit) as usize;
        Ok(ListResult {
            items: orders
                .iter()
                .rev()
                .skip(offset)
                .take(limit as usize)
                .map(|o| SponsorOrderView {
                    lines: vec![],
                    ..o.clone()
                })
                .collect(),
            total: orders.len() as i64,
        })
    }
}
