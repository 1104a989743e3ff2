mod line_frontend;

pub use line_frontend::{format_result, LineFrontend};
