pub mod blink;
pub mod pulse;
