mod tracker;

pub use tracker::TracingTracker;
