mod managed;
pub use managed::Managed;
