pub mod dhw_demand;
pub mod draw_events;
pub mod misc;
