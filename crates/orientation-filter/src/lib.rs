//! Direct-form FIR filter bank for deriving gravity, movement, and north
//! vectors from raw accelerometer/magnetometer samples.
//!
//! All three filters are single-precision, unclipped direct-form
//! convolutions against a fixed coefficient table — no adaptive filtering,
//! no frequency-domain analysis. Coefficients come straight from the
//! sensor's reference filter design (see [`coefficients`]).

pub mod bank;
pub mod coefficients;
pub mod fir;
pub mod vector;

pub use bank::FilterBank;
pub use fir::Fir;
pub use vector::CartesianVector;
