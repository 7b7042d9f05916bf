/// File exports for a finished run.
pub mod export;
