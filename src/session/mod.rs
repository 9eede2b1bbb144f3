/// Load → project → compose → stream driver.
pub mod overlay_session;
