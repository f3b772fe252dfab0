pub mod payment_signal;
