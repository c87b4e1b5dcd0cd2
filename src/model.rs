pub mod booking_status;
pub mod employee;
pub mod shift;
