pub mod bot_client;
pub mod invoice_service;
pub mod payment_service;
pub mod polling_service;
pub mod update_service;
