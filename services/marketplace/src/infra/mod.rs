pub mod db;
pub mod http;
pub mod s3;
pub mod ses;
pub mod sigv4;
pub mod stripe;
