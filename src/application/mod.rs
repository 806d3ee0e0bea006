pub mod order_form_service;
