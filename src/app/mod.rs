pub mod dispatch;
pub mod startup;
