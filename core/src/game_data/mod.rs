mod conditions;
mod sample;

pub use conditions::{
    DEFAULT_CONDITIONS, INVESTITURE_SUGGESTIONS, Polarity, condition_polarity, is_standard_condition,
};
pub use sample::{sample_roster, sample_state};
