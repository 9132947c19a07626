pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod files;
pub mod investor_profiles;
pub mod mailer;
pub mod matching;
pub mod middleware;
pub mod routes;
pub mod signup;
pub mod startup_profiles;
pub mod storage;

#[cfg(test)]
mod test_support;
