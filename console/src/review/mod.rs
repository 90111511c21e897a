pub mod dialog;
pub mod state;

pub use dialog::{ReviewDialog, ReviewError, SubmitBlocked};
pub use state::AccountReviewState;
