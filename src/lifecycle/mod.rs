//! # Console Lifecycle
//!
//! Starting the console is where the pieces meet: the session check, the
//! document skeleton, the module registry and the section router are all
//! built and wired together by [`AdminConsole::start`].
//!
//! ## Startup sequence
//!
//! 1. **Validate configuration** - invalid paging or readiness values stop startup
//! 2. **Check the session** - non-admins get [`ConsoleError::Unauthorized`](console_framework::ConsoleError::Unauthorized)
//! 3. **Declare the skeleton** - one panel, content and pagination container per section
//! 4. **Register modules** - dashboard plus one resource manager per model, constructed lazily
//! 5. **Land** - activate the dashboard through the normal navigation path
//!
//! ## Shutdown
//!
//! [`AdminConsole::shutdown`] aborts module constructions still in flight and
//! fails their waiters. Loaded modules hold no background tasks beyond
//! pending debounce timers, which resolve on their own.

pub mod console;
pub mod telemetry;

pub use console::*;
pub use telemetry::*;
