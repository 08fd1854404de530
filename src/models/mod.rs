mod gig;
mod state;

pub use gig::{Gig, GigStatus, NewGig, normalize_tags};
pub use state::AppState;
