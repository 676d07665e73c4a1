// Boundaries to external providers

pub mod pose;
