use std::time::Duration;

pub(crate) const STARTING: &str = "starting discovery";

pub(crate) fn collecting(window: Duration) -> String {
    format!("discovering for {}", human_duration(&window))
}

pub(crate) fn found(count: usize) -> String {
    format!("found {count} device(s)")
}

pub(crate) fn human_duration(duration: &Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1_000 == 0 {
        format!("{}s", millis / 1_000)
    } else {
        format!("{millis}ms")
    }
}
