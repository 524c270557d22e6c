mod builder;
mod scheduler;
