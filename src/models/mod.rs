pub mod invoice;
pub mod order;
pub mod telegram;
