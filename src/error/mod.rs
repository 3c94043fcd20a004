pub mod dispatch;

pub use dispatch::{DispatchError, MismatchReason};

pub type DispatchResult<T> = Result<T, DispatchError>;
