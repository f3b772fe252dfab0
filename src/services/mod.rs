pub mod notifier;
pub mod payments;
