pub mod day_lock;
