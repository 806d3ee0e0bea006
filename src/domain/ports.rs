use uuid::Uuid;

use super::errors::DomainError;
use super::form::OrderForm;
use super::order::{ListResult, NewSponsorOrder, SponsorOrderView};

pub trait OrderFormRepository: Send + Sync + 'static {
    fn create_form(&self, form: &OrderForm) -> Result<(), DomainError>;
    fn find_form(&self, id: Uuid) -> Result<Option<OrderForm>, DomainError>;
    fn save_order(&self, order: NewSponsorOrder) -> Result<Uuid, DomainError>;
    fn find_order(&self, id: Uuid) -> Result<Option<SponsorOrderView>, DomainError>;
    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}

impl<T: OrderFormRepository + ?Sized> OrderFormRepository for Box<T> {
    fn create_form(&self, form: &OrderForm) -> Result<(), DomainError> {
        (**self).create_form(form)
    }

    fn find_form(&self, id: Uuid) -> Result<Option<OrderForm>, DomainError> {
        (**self).find_form(id)
    }

    fn save_order(&self, order: NewSponsorOrder) -> Result<Uuid, DomainError> {
        (**self).save_order(order)
    }

    fn find_order(&self, id: Uuid) -> Result<Option<SponsorOrderView>, DomainError> {
        (**self).find_order(id)
    }

    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        (**self).list_orders(page, limit)
    }
}
