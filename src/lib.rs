//! In-process publish/subscribe with concurrent, isolated handler invocation.
//!
//! Handlers subscribe to topics on an [`EventDispatcher`]. Publishing to a
//! topic starts one tokio task per subscribed handler and returns an
//! [`InvocationHandle`] for each; a failure in one handler never reaches the
//! publisher or the other handlers.
//!
//! ```no_run
//! use eventdispatch::{arguments, wait_all, EventDispatcher, Handler};
//!
//! # async fn run() {
//! let dispatcher = EventDispatcher::<String>::new();
//! dispatcher.subscribe(
//!     "greet",
//!     Handler::new(|args| async move {
//!         let name: String = args.require("name")?;
//!         println!("hello, {name}");
//!         Ok::<_, anyhow::Error>(())
//!     }),
//! );
//!
//! let handles = dispatcher.publish("greet", arguments!("name" => "world"));
//! for result in wait_all(handles).await {
//!     result.unwrap();
//! }
//! # }
//! ```

/// Named argument bags passed to handlers.
pub mod arguments;
/// Dispatcher configuration loading.
pub mod config;
/// Topic registry and publishing.
pub mod dispatcher;
/// Dispatch error types.
pub mod error;
/// Handler values, identity and signatures.
pub mod handler;
/// Handles to running invocations.
pub mod invocation;
/// Console logging setup.
pub mod logging;
/// Suppress-and-log adapters.
pub mod suppress;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

pub use arguments::Arguments;
pub use config::DispatcherConfig;
pub use dispatcher::{DispatchStats, EventDispatcher, Topic};
pub use error::{DispatchError, DispatchResult, MismatchReason};
pub use handler::{Handler, HandlerOutput, Param, Signature};
pub use invocation::{wait_all, InvocationHandle};
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingHandle};
pub use suppress::{suppress, suppress_sync, CollectingSink, DiagnosticSink, Suppressor, TracingSink};
