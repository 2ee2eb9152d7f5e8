pub mod screenshot_token;

pub use screenshot_token::ScreenshotToken;
