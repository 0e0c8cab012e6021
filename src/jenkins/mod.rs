pub mod executor;

pub use executor::{open_in_browser, JenkinsClient, JenkinsReplay, JenkinsRunControl, Offline, replayed_run_url};
