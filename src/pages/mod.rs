pub mod analysis;
pub mod home;
pub mod not_found;
