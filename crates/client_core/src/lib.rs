//! Client-side token registry console: a single form reconciled against the
//! registry's token list.

pub mod console;
pub mod error;
pub mod form;
pub mod list;
pub mod registry;

pub use console::{MutationGate, MutationGuard, SubmitOutcome, TokenConsole};
pub use error::{ConsoleError, MutationKind};
pub use form::{coerce_number, Draft, FormController, FormField, FormMode, SubmitPlan};
pub use list::{
    Confirmation, DeleteOutcome, ListSynchronizer, RefreshOutcome, RefreshTicket, DELETE_PROMPT,
};
pub use registry::{HttpRegistryClient, RegistryService, DEFAULT_SERVER_URL};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
