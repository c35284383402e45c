pub const APP_NAME: &str = "timecap";

pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

pub const MANIFEST_FILE: &str = "data.json";
pub const FRAME_FILE_PREFIX: &str = "shot";
pub const FRAME_FILE_EXT: &str = "png";

pub const PREVIEW_STEP_MS: u64 = 10;
pub const COUNTDOWN_SECS: u64 = 3;
