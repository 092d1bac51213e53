// Utility modules shared by models and services

pub mod color;
