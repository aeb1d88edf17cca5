pub mod connect_service;
pub mod error;
pub mod escrow_service;
pub mod payment_processor;
pub mod state_bridge;
pub mod webhook_service;

#[cfg(test)]
pub mod test_support;
