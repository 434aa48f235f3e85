//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod confirmation;
mod dialog_hooks;
mod extras_backend;
mod notifier;
mod task_scheduler;

#[cfg(test)]
pub use confirmation::MockConfirmation;
pub use confirmation::{Confirmation, FixedConfirmation};
#[cfg(test)]
pub use dialog_hooks::MockDialogHooks;
pub use dialog_hooks::{DialogHooks, NoOpDialogHooks};
#[cfg(test)]
pub use extras_backend::MockExtrasBackend;
pub use extras_backend::{
    BackendError, Envelope, ExtrasBackend, FixtureExtrasBackend, MutationAck, TransferListing,
};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notice, NoticeLevel, NoticeTarget, Notifier, TracingNotifier};
#[cfg(test)]
pub use task_scheduler::MockTaskScheduler;
pub use task_scheduler::{TaskScheduler, TokioTaskScheduler};
