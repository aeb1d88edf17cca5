pub mod connectdb;
pub mod db;
pub mod jobdb;
pub mod paymentdb;
