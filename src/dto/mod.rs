pub mod invoice_dto;
pub mod telegram_dto;
