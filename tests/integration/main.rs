mod error_handling;
mod run_tracking;
