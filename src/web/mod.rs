pub mod admin;
pub mod lfg;
pub mod login;
pub mod logout;
pub mod profile;

/// Configures the web app by adding services from each web file.
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Route resolution stops at the first match; higher traffic routes
    // should be registered first.
    lfg::configure(conf);
    admin::configure(conf);
    login::configure(conf);
    logout::configure(conf);
    profile::configure(conf);
}
