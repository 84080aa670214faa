pub mod jwt;
pub mod logging;
pub mod password;
pub mod uid;
