//! # Directory Selection Service
//!
//! Lets the user pick a directory through a native chooser and turns the
//! choice into a persisted, serializable handle.
//!
//! ## Philosophy
//!
//! - **One pending request**: A second selection while one is outstanding
//!   fails fast instead of queueing
//! - **Cancellation is not an error**: Dismissal, an unavailable chooser or a
//!   failed grant all end as "no selection"
//! - **Grants before handles**: A handle is only returned after its grant
//!   has been durably persisted
//!
//! ## Flow
//!
//! ```text
//! Idle -> AwaitingUserChoice -> Granted | Cancelled
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use services_file_picker::{DirectorySelector, ScriptedChooser, ChooserOutcome};
//!
//! let chooser = Arc::new(ScriptedChooser::new([ChooserOutcome::Chosen(path)]));
//! let selector = DirectorySelector::new(chooser, Platform::Linux);
//! match selector.select(&storage)? {
//!     Some(handle) => store(handle.to_string()),
//!     None => { /* user cancelled */ }
//! }
//! ```

pub mod chooser;
pub mod selector;
pub mod session;

pub use chooser::{
    ChooserError, ChooserOutcome, DeferredChooser, DirectoryChooser, ScriptedChooser,
    SelectionRequest,
};
pub use selector::DirectorySelector;
pub use session::{SelectionError, SelectionSession};
