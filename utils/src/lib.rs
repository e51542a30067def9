pub mod surf_logging;
pub mod url_path;
