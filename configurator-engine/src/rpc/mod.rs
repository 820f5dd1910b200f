/// Message bridge to the hosting web page.
pub mod host_bridge;
