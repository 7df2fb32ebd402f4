mod usage;

pub use usage::Usage;
