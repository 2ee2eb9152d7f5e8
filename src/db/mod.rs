pub mod screenshot_tokens;
pub mod submissions;
