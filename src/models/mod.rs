pub mod init_data;
pub mod invoice;
pub mod payment;
