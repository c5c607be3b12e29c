//! Turn segmentation and unit grouping.
//!
//! This is the algorithmic core of the crate: partition a time-sorted
//! message sequence into speaker *turns*, and (for pairwise conversations)
//! group turns into same-calendar-date *units*.
//!
//! A turn is a maximal run of consecutive messages from one sender in which
//! no two adjacent messages are more than [`TURN_BREAK_SECONDS`] apart. The
//! comparison is strict: a gap of exactly 1800 seconds continues the turn.
//!
//! # Example
//!
//! ```
//! use chatcode::core::segment_turns;
//! use chatcode::Message;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
//! let messages = vec![
//!     Message::new(t0, "alice", "hi"),
//!     Message::new(t0 + Duration::seconds(60), "alice", "you there?"),
//!     Message::new(t0 + Duration::seconds(90), "bob", "yes"),
//! ];
//!
//! let turns = segment_turns(messages);
//! assert_eq!(turns.len(), 2);
//! assert_eq!(turns[0].sender(), "alice");
//! assert_eq!(turns[1].sender(), "bob");
//! ```

use chrono::NaiveDate;

use crate::Message;

/// Maximum gap between consecutive messages of the same turn, in seconds.
///
/// A larger gap closes the turn even when the sender stays the same.
pub const TURN_BREAK_SECONDS: i64 = 1800;

/// A maximal run of messages by one sender.
///
/// Invariants: never empty; all messages share one sender; adjacent
/// timestamps are at most [`TURN_BREAK_SECONDS`] apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    messages: Vec<Message>,
}

impl Turn {
    /// The sender of every message in this turn.
    pub fn sender(&self) -> &str {
        &self.messages[0].sender
    }

    /// The messages of this turn, in time order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in this turn (always at least 1).
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always `false`; present for clippy's sake alongside [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// First message of the turn.
    pub fn first(&self) -> &Message {
        &self.messages[0]
    }

    /// Last message of the turn.
    pub fn last(&self) -> &Message {
        self.messages.last().expect("turns are never empty")
    }

    /// Consumes the turn, returning its messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// One calendar date's worth of a conversation, segmented into turns.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    turns: Vec<Turn>,
}

impl Unit {
    /// The turns of this unit, in time order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns in this unit.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if the unit holds no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The calendar date shared by every message in this unit, if any.
    pub fn date(&self) -> Option<NaiveDate> {
        self.turns.first().map(|turn| turn.first().date())
    }
}

/// Partitions a time-sorted message sequence into speaker turns.
///
/// The caller is responsible for sorting `messages` ascending by timestamp.
/// The first message opens the current turn; each later message closes it
/// and opens a new one when the sender changes or the gap to the turn's
/// last message exceeds [`TURN_BREAK_SECONDS`] (strictly). The final open
/// turn is always emitted.
///
/// Empty input yields an empty output; a single message yields exactly one
/// one-message turn. Single pass, no allocation beyond the output.
pub fn segment_turns(messages: Vec<Message>) -> Vec<Turn> {
    let mut turns = Vec::new();
    let mut current: Vec<Message> = Vec::new();

    for msg in messages {
        if let Some(last) = current.last() {
            let gap = (msg.timestamp - last.timestamp).num_seconds();
            if msg.sender != last.sender || gap > TURN_BREAK_SECONDS {
                turns.push(Turn {
                    messages: std::mem::take(&mut current),
                });
            }
        }
        current.push(msg);
    }

    if !current.is_empty() {
        turns.push(Turn { messages: current });
    }

    turns
}

/// Groups a time-sorted message sequence by calendar date (UTC), in
/// first-seen date order.
pub fn group_by_date(messages: Vec<Message>) -> Vec<Vec<Message>> {
    let mut groups: Vec<(NaiveDate, Vec<Message>)> = Vec::new();

    for msg in messages {
        let date = msg.date();
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, group)) => group.push(msg),
            None => groups.push((date, vec![msg])),
        }
    }

    groups.into_iter().map(|(_, group)| group).collect()
}

/// Groups messages by calendar date, then segments each date group into
/// turns independently. Used by the pairwise-conversation pipeline.
pub fn segment_units(messages: Vec<Message>) -> Vec<Unit> {
    group_by_date(messages)
        .into_iter()
        .map(|group| Unit {
            turns: segment_turns(group),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn msg(offset_secs: i64, sender: &str) -> Message {
        Message::new(
            t0() + Duration::seconds(offset_secs),
            sender,
            format!("message at +{offset_secs}s"),
        )
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(segment_turns(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_message_yields_single_turn() {
        let turns = segment_turns(vec![msg(0, "alice")]);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].len(), 1);
        assert_eq!(turns[0].sender(), "alice");
    }

    #[test]
    fn test_sender_change_breaks_turn() {
        let turns = segment_turns(vec![msg(0, "alice"), msg(10, "bob"), msg(20, "alice")]);
        assert_eq!(turns.len(), 3);
    }

    #[test]
    fn test_gap_at_exactly_threshold_continues_turn() {
        let turns = segment_turns(vec![msg(0, "alice"), msg(TURN_BREAK_SECONDS, "alice")]);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].len(), 2);
    }

    #[test]
    fn test_gap_over_threshold_breaks_turn() {
        let turns = segment_turns(vec![msg(0, "alice"), msg(TURN_BREAK_SECONDS + 1, "alice")]);
        assert_eq!(turns.len(), 2);
    }

    #[test]
    fn test_five_message_scenario() {
        // t, t+60, t+3600, t+3660, t+3700 from A,A,B,B,A must give
        // [m1,m2] [m3,m4] [m5]: the m2->m3 sender change dominates the
        // 3540s gap, and all within-turn gaps stay under the threshold.
        let messages = vec![
            msg(0, "A"),
            msg(60, "A"),
            msg(3600, "B"),
            msg(3660, "B"),
            msg(3700, "A"),
        ];
        let turns = segment_turns(messages);

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].sender(), "A");
        assert_eq!(turns[0].len(), 2);
        assert_eq!(turns[1].sender(), "B");
        assert_eq!(turns[1].len(), 2);
        assert_eq!(turns[2].sender(), "A");
        assert_eq!(turns[2].len(), 1);
    }

    #[test]
    fn test_concatenation_reconstructs_input() {
        let messages = vec![
            msg(0, "alice"),
            msg(100, "alice"),
            msg(5000, "alice"),
            msg(5050, "bob"),
            msg(5100, "alice"),
        ];
        let expected = messages.clone();

        let rebuilt: Vec<Message> = segment_turns(messages)
            .into_iter()
            .flat_map(Turn::into_messages)
            .collect();

        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_turn_accessors() {
        let turns = segment_turns(vec![msg(0, "alice"), msg(30, "alice")]);
        let turn = &turns[0];
        assert_eq!(turn.first().timestamp, t0());
        assert_eq!(turn.last().timestamp, t0() + Duration::seconds(30));
        assert!(!turn.is_empty());
    }

    #[test]
    fn test_group_by_date_splits_on_midnight() {
        let messages = vec![
            msg(0, "alice"),
            msg(60, "bob"),
            // next calendar day (t0 is 09:00, so +16h crosses midnight)
            msg(16 * 3600, "alice"),
        ];
        let groups = group_by_date(messages);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_group_by_date_first_seen_order() {
        let groups = group_by_date(vec![msg(0, "a"), msg(16 * 3600, "a"), msg(17 * 3600, "b")]);
        assert_eq!(groups[0][0].date(), t0().date_naive());
        assert!(groups[1][0].date() > groups[0][0].date());
    }

    #[test]
    fn test_segment_units_respects_dates_and_senders() {
        let messages = vec![
            msg(0, "alice"),
            msg(60, "bob"),
            msg(16 * 3600, "bob"),
            msg(16 * 3600 + 30, "bob"),
        ];
        let units = segment_units(messages);

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].len(), 2); // alice turn, bob turn
        assert_eq!(units[1].len(), 1); // one bob turn
        assert_eq!(units[1].turns()[0].len(), 2);
        assert!(units[0].date().unwrap() < units[1].date().unwrap());
    }

    #[test]
    fn test_unit_turns_never_cross_dates() {
        // same sender 10 minutes apart, but on either side of midnight:
        // the date grouping must split them even though the gap is small
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 55, 0).unwrap();
        let messages = vec![
            Message::new(late, "alice", "almost midnight"),
            Message::new(late + Duration::minutes(10), "alice", "past midnight"),
        ];
        let units = segment_units(messages);
        assert_eq!(units.len(), 2);
    }
}
