use lib_cinema::cinemas::SessionGroup;
use std::collections::BTreeMap;

/// One `<title> <timeslot>` line per showing on `date`.
pub fn showtime_lines(sessions: &BTreeMap<String, SessionGroup>, date: &str) -> Vec<String> {
    sessions
        .values()
        .flat_map(|group| {
            group
                .showings_on(date)
                .map(move |timeslot| format!("{} {}", group.title, timeslot))
        })
        .collect()
}
