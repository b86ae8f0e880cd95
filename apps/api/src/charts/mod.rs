// Podcast charts: time windows, score display, and the chart/show endpoints.
// Pure logic lives in time_window, score, and text; everything touching the
// data source goes through repository.

pub mod handlers;
pub mod repository;
pub mod score;
pub mod service;
pub mod text;
pub mod time_window;
pub mod view;
