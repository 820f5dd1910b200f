pub mod markers;
pub mod palette;
pub mod poses;
