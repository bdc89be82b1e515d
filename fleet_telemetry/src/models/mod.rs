pub mod capability;
pub mod device;
pub mod identifier;
pub mod reading;
pub mod row;
pub mod summary;
