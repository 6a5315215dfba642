pub mod attribution;
pub mod hotspots;
pub mod psri;
pub mod rates;
pub mod rules;
pub mod tdi;
