/// Type alias for Results in this crate
pub type Result<T> = anyhow::Result<T>;
