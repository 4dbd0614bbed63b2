pub mod crm_service;
pub mod seed;
