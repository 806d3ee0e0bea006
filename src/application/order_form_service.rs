use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::form::{
    LineItem, LineItemDraft, MetaField, MetaFieldDraft, MetaFieldType, OrderForm, OrderFormDraft,
};
use crate::domain::order::{
    Discount, FieldValue, ListResult, NewSponsorOrder, OrderValues, SponsorOrderView,
};
use crate::domain::ports::OrderFormRepository;
use crate::domain::pricing::{price_order, PriceBreakdown};
use crate::domain::tier::{parse_timezone, resolve_tier, RateTier};

pub const MAX_PAGE_SIZE: i64 = 100;

// Column widths in the order form tables.
const MAX_NAME_LEN: usize = 255;
const MAX_CODE_LEN: usize = 64;
const MAX_LABEL_LEN: usize = 255;

/// Service type shared with the HTTP layer.
pub type SharedOrderFormService = OrderFormService<Box<dyn OrderFormRepository>>;

#[derive(Debug, Clone)]
pub struct SaveOrderCommand {
    pub form_id: Uuid,
    pub sponsor_id: Uuid,
    pub values: OrderValues,
    pub discount: Option<Discount>,
}

#[derive(Debug, Clone)]
pub struct SavedOrder {
    pub id: Uuid,
    pub pricing: PriceBreakdown,
}

pub struct OrderFormService<R> {
    repo: R,
}

impl<R: OrderFormRepository> OrderFormService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_form(&self, draft: OrderFormDraft) -> Result<Uuid, DomainError> {
        if draft.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("form name is required".to_string()));
        }
        check_len("form name", &draft.name, MAX_NAME_LEN)?;
        parse_timezone(&draft.timezone)?;
        if !draft.schedule.is_monotonic() {
            log::warn!(
                "Order form '{}' has cutoffs out of order: {:?}",
                draft.name,
                draft.schedule
            );
        }

        let items = draft
            .items
            .into_iter()
            .map(build_item)
            .collect::<Result<Vec<_>, _>>()?;
        let form = OrderForm {
            id: Uuid::new_v4(),
            name: draft.name,
            timezone: draft.timezone,
            schedule: draft.schedule,
            items,
        };

        self.repo.create_form(&form)?;
        log::info!(
            "Created order form {} '{}' with {} items",
            form.id,
            form.name,
            form.items.len()
        );
        Ok(form.id)
    }

    pub fn get_form(&self, id: Uuid) -> Result<Option<OrderForm>, DomainError> {
        self.repo.find_form(id)
    }

    pub fn resolve_tier(&self, form_id: Uuid, at: DateTime<Utc>) -> Result<RateTier, DomainError> {
        let form = self.load_form(form_id)?;
        tier_for(&form, at)
    }

    /// Price a draft without persisting anything.
    pub fn quote(
        &self,
        form_id: Uuid,
        values: &OrderValues,
        at: DateTime<Utc>,
    ) -> Result<PriceBreakdown, DomainError> {
        let form = self.load_form(form_id)?;
        validate_values(&form, values)?;
        let pricing = price_order(&form.items, values, tier_for(&form, at)?);
        log::debug!(
            "Quoted form {} at {}: tier={} total={}",
            form_id,
            at,
            pricing.tier,
            pricing.grand_total
        );
        Ok(pricing)
    }

    /// Re-price the draft at `at` and persist it. An expired form still
    /// accepts the order, with zero totals.
    pub fn save_order(
        &self,
        cmd: SaveOrderCommand,
        at: DateTime<Utc>,
    ) -> Result<SavedOrder, DomainError> {
        let form = self.load_form(cmd.form_id)?;
        if let Err(e) = validate_values(&form, &cmd.values) {
            log::warn!("Rejected order draft for form {}: {}", cmd.form_id, e);
            return Err(e);
        }
        if let Some(discount) = &cmd.discount {
            discount.validate()?;
        }

        let pricing = price_order(&form.items, &cmd.values, tier_for(&form, at)?);
        let id = self.repo.save_order(NewSponsorOrder {
            form_id: cmd.form_id,
            sponsor_id: cmd.sponsor_id,
            discount: cmd.discount,
            values: cmd.values,
            pricing: pricing.clone(),
        })?;

        log::info!(
            "Saved sponsor order {} for sponsor {} (tier={}, total={})",
            id,
            cmd.sponsor_id,
            pricing.tier,
            pricing.grand_total
        );
        Ok(SavedOrder { id, pricing })
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<SponsorOrderView>, DomainError> {
        self.repo.find_order(id)
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        // Past this page the offset no longer fits in an i64.
        let page = page.clamp(1, i64::MAX / limit);
        self.repo.list_orders(page, limit)
    }

    fn load_form(&self, id: Uuid) -> Result<OrderForm, DomainError> {
        self.repo
            .find_form(id)?
            .ok_or(DomainError::NotFound("Order form"))
    }
}

fn tier_for(form: &OrderForm, at: DateTime<Utc>) -> Result<RateTier, DomainError> {
    let tz = parse_timezone(&form.timezone)?;
    Ok(resolve_tier(at, tz, &form.schedule))
}

fn build_item(draft: LineItemDraft) -> Result<LineItem, DomainError> {
    check_len("item code", &draft.code, MAX_CODE_LEN)?;
    check_len("item name", &draft.name, MAX_NAME_LEN)?;
    let rates = draft.rates;
    if rates.early_bird < 0 || rates.standard < 0 || rates.onsite < 0 {
        return Err(DomainError::InvalidInput(format!(
            "item '{}' has a negative rate",
            draft.code
        )));
    }
    if draft.default_quantity.is_some_and(|q| q < 0) {
        return Err(DomainError::InvalidInput(format!(
            "item '{}' has a negative default quantity",
            draft.code
        )));
    }

    let meta_fields = draft
        .meta_fields
        .into_iter()
        .map(|f| build_meta_field(&draft.code, f))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LineItem {
        id: Uuid::new_v4(),
        code: draft.code,
        name: draft.name,
        rates,
        default_quantity: draft.default_quantity,
        meta_fields,
    })
}

fn build_meta_field(item_code: &str, draft: MetaFieldDraft) -> Result<MetaField, DomainError> {
    check_len("field label", &draft.label, MAX_LABEL_LEN)?;
    if let (Some(min), Some(max)) = (draft.minimum_quantity, draft.maximum_quantity) {
        if min > max {
            return Err(DomainError::InvalidInput(format!(
                "field '{}' on item '{}' has minimum {} above maximum {}",
                draft.label, item_code, min, max
            )));
        }
    }

    Ok(MetaField {
        id: Uuid::new_v4(),
        class: draft.class,
        field_type: draft.field_type,
        label: draft.label,
        minimum_quantity: draft.minimum_quantity,
        maximum_quantity: draft.maximum_quantity,
        options: draft.options,
    })
}

/// Lengths count characters, as Postgres `VARCHAR(n)` does.
fn check_len(what: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::InvalidInput(format!(
            "{} is {} characters long, at most {} allowed",
            what, len, max
        )));
    }
    Ok(())
}

/// Check that every value addresses a field of the form and fits its type.
fn validate_values(form: &OrderForm, values: &OrderValues) -> Result<(), DomainError> {
    for (key, value) in values.fields() {
        let item = known_item(form, key.item_id)?;
        let field = item
            .meta_field(key.field_id)
            .filter(|f| f.class == key.class)
            .ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "item '{}' has no {} field {}",
                    item.code, key.class, key.field_id
                ))
            })?;
        validate_field_value(field, value)?;
    }

    for (item_id, quantity) in values.manual_quantities() {
        let item = known_item(form, item_id)?;
        if quantity < 0 {
            return Err(DomainError::InvalidInput(format!(
                "quantity for item '{}' must not be negative",
                item.code
            )));
        }
    }

    for (item_id, _) in values.all_notes() {
        known_item(form, item_id)?;
    }

    Ok(())
}

fn known_item(form: &OrderForm, item_id: Uuid) -> Result<&LineItem, DomainError> {
    form.item(item_id).ok_or_else(|| {
        DomainError::InvalidInput(format!("form {} has no line item {}", form.id, item_id))
    })
}

fn validate_field_value(field: &MetaField, value: &FieldValue) -> Result<(), DomainError> {
    if field.field_type == MetaFieldType::Quantity {
        let n = value.as_integer().ok_or_else(|| {
            DomainError::InvalidInput(format!("'{}' must be a whole number", field.label))
        })?;
        let min = field.minimum_quantity.unwrap_or(0);
        if n < min {
            return Err(DomainError::InvalidInput(format!(
                "'{}' must be at least {}",
                field.label, min
            )));
        }
        if let Some(max) = field.maximum_quantity {
            if n > max {
                return Err(DomainError::InvalidInput(format!(
                    "'{}' must be at most {}",
                    field.label, max
                )));
            }
        }
        return Ok(());
    }

    let shape_ok = match field.field_type {
        MetaFieldType::CheckBox => matches!(value, FieldValue::Bool(_)),
        MetaFieldType::CheckBoxList => matches!(value, FieldValue::List(_)),
        _ => matches!(value, FieldValue::Text(_)),
    };
    if !shape_ok {
        return Err(DomainError::InvalidInput(format!(
            "'{}' expects {}",
            field.label,
            expected_shape(field.field_type)
        )));
    }

    if field.field_type.has_options() && !field.options.is_empty() {
        let chosen: Vec<&String> = match value {
            FieldValue::Text(s) => vec![s],
            FieldValue::List(list) => list.iter().collect(),
            _ => vec![],
        };
        if let Some(bad) = chosen.into_iter().find(|c| !field.options.contains(c)) {
            return Err(DomainError::InvalidInput(format!(
                "'{}' is not an option of '{}'",
                bad, field.label
            )));
        }
    }

    Ok(())
}

fn expected_shape(field_type: MetaFieldType) -> &'static str {
    match field_type {
        MetaFieldType::Quantity => "a whole number",
        MetaFieldType::CheckBox => "true or false",
        MetaFieldType::CheckBoxList => "a list of options",
        _ => "text",
    }
}
