pub mod groups;
pub mod proteome;
pub mod regulators;
