pub mod alert;
pub mod device;
pub mod site;
pub mod sync;
pub mod tenant;
