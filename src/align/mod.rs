pub mod ses_banded;

pub use ses_banded::{ses_distance_banded, SesResults};
