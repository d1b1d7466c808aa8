pub mod defaults;
pub mod params;
pub mod retcode;
