pub mod errors;
pub mod icons;
pub mod paths;
